//! Boundary events for tree operations
//!
//! Every public overlay operation brackets its work with a `start` event and
//! exactly one of `end` or `end_error`. Extra fields such as `parent_key` or
//! `change_count` follow the op name.

/// Emit the `start` event of `op`
///
/// ```
/// # use htree_core::log_op_start;
/// log_op_start!("apply_changes");
/// log_op_start!("add_node", parent_key = "Root.r1", link_field = "items");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = htree_core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = htree_core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Emit the `end` event of `op`
///
/// `duration_ms` is required.
///
/// ```
/// # use htree_core::log_op_end;
/// log_op_end!("add_node", duration_ms = 3, node_key = "Leaf.r2");
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = htree_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = htree_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Emit the `end_error` event of `op`
///
/// Anything convertible into [`ExError`](crate::errors::ExError) is accepted.
/// The event carries its `err.kind` and `err.code`.
///
/// ```
/// # use htree_core::{log_op_error, errors::HTreeError};
/// let err = HTreeError::ParentNotFound { parent_key: "Root.r1".to_string() };
/// log_op_error!("add_node", err, duration_ms = 1);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        use $crate::errors::ExError;
        let ex_err: ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = htree_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        use $crate::errors::ExError;
        let ex_err: ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = htree_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            $($field)*
        );
    }};
}
