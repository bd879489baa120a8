//! Structured logging for tree operations
//!
//! `init` installs a subscriber. Tests use `test_capture` instead to record
//! the events emitted by the `log_op_*` macros.
//!
//! ```rust
//! use htree_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```
//!
//! Overlay operations own the start/end boundary events. Reducers and the
//! lazy map only emit `tracing::debug!` details.

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
