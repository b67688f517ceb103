//! Centralized error handling for `chdata`.
//!
//! Every fallible operation of the value layer and the codec returns
//! [`DataResult`]. The error side is a [`StackError`]: a shared root error
//! implementing [`ErrorExt`] plus the chain of contexts added while the error
//! travelled up the stack.

pub mod ext;
pub mod macros;
pub mod stack;
pub mod status_code;
pub mod types;

// Publicly re-export all error types and functions from the submodules to
// simplify access from external code.
pub use ext::*;
pub use macros::*;
pub use stack::*;
pub use status_code::*;
pub use types::*;

pub type DataResult<T> = Result<T, StackError>;
