use htree_core::errors::{ExError, ExErrorKind, HTreeError};

#[test]
fn test_parent_not_found_verifiable_by_kind() {
    let err = HTreeError::ParentNotFound {
        parent_key: "Root.missing".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::NotFound);
    assert_eq!(ex_err.code(), "ERR_NOT_FOUND");
    assert_eq!(ex_err.node_key(), Some("Root.missing"));
}

#[test]
fn test_index_out_of_range_is_range_error() {
    let err = HTreeError::IndexOutOfRange { index: 7, len: 2 };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::RangeError);
    assert_eq!(ex_err.code(), "ERR_RANGE");
    assert_eq!(ex_err.index(), Some(7));
    assert!(ex_err.message().contains('2'));
}

#[test]
fn test_link_field_not_found_structured_fields() {
    let err = HTreeError::LinkFieldNotFound {
        node_key: "Root.r1".to_string(),
        field: "items".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::InvalidInput);
    assert_eq!(ex_err.node_key(), Some("Root.r1"));
    assert_eq!(ex_err.field(), Some("items"));
}

#[test]
fn test_unsupported_operations_are_not_implemented() {
    let errors = vec![
        HTreeError::UnsupportedChange {
            change: "DeleteTreeNode",
        },
        HTreeError::UnsupportedLinkAction {
            action: "move",
            shape: "single",
        },
    ];

    for err in errors {
        let ex_err: ExError = err.into();
        assert_eq!(ex_err.kind(), ExErrorKind::NotImplemented);
        assert_eq!(ex_err.code(), "ERR_NOT_IMPLEMENTED");
    }
}

#[test]
fn test_conflicts_are_distinct_kinds() {
    let exists: ExError = HTreeError::NodeAlreadyExists {
        node_key: "Leaf.L1".to_string(),
    }
    .into();
    let reserved: ExError = HTreeError::ReservedId {
        node_key: "Leaf.NOACTUALID".to_string(),
    }
    .into();

    assert_eq!(exists.kind(), ExErrorKind::AlreadyExists);
    assert_eq!(reserved.kind(), ExErrorKind::InvalidInput);
    assert_eq!(reserved.code(), "ERR_INVALID_INPUT");
    assert_eq!(reserved.op(), Some("add_node"));
    assert_eq!(reserved.node_key(), Some("Leaf.NOACTUALID"));
}

#[test]
fn test_kind_errors() {
    let unknown: ExError = HTreeError::UnknownNodeKind {
        kind: "Ghost".to_string(),
    }
    .into();
    let invalid: ExError = HTreeError::InvalidNodeKind {
        kind: "a.b".to_string(),
        reason: "kind tag cannot contain '.'".to_string(),
    }
    .into();

    assert_eq!(unknown.code(), "ERR_INVALID_KIND");
    assert_eq!(invalid.code(), "ERR_INVALID_KIND");
    assert!(unknown.message().contains("Ghost"));
}

#[test]
fn test_invariant_violations() {
    let cycle: ExError = HTreeError::CycleDetected {
        node_key: "Leaf.a".to_string(),
    }
    .into();
    let root: ExError = HTreeError::RootHasParent {
        node_key: "Root.r1".to_string(),
    }
    .into();

    assert_eq!(cycle.kind(), ExErrorKind::CycleDetected);
    assert_eq!(root.kind(), ExErrorKind::ConstraintViolation);
}

#[test]
fn test_htree_error_display() {
    let err = HTreeError::ParentNotFound {
        parent_key: "Root.r1".to_string(),
    };
    assert_eq!(err.to_string(), "No parent found: Root.r1");
}
