//! Call-stack capture for stackshot.
//!
//! [`capture`] brackets a [`Trace`] between installing a frame-dropping hook
//! and restoring whatever hook was there before. See [`hook`] for the slot
//! itself.

mod capture;
pub mod hook;
mod trace;

pub use capture::{capture, capture_with_fresh_hook};
pub use hook::{
    Hook, HookScope, prepare_stack_trace, same_hook, set_prepare_stack_trace,
    take_prepare_stack_trace,
};
pub use stackshot_types::{CallSite, ModulePath, StackSnapshot};
pub use trace::Trace;
