//! Opaque id generation
//!
//! Trees take their id generator as an injected capability so that tests
//! can supply deterministic ids.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

use crate::model::Id;

/// Source of ids for synthesized nodes
///
/// Implementations must return a distinct id on every call.
pub trait IdGenerator: Send + Sync + fmt::Debug {
    fn next_id(&self) -> Id;
}

/// Default generator producing UUID v7 strings (time-ordered)
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV7Generator;

impl IdGenerator for UuidV7Generator {
    fn next_id(&self) -> Id {
        Id::from(Uuid::now_v7().to_string())
    }
}

/// Deterministic generator yielding `prefix1`, `prefix2`, ...
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> Id {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        Id::from(format!("{}{}", self.prefix, n))
    }
}
