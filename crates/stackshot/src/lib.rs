//! Capture the current call stack as a list of call sites.
//!
//! ```rust,no_run
//! fn handler() {
//!     let snapshot = stackshot::capture();
//!     let caller = snapshot.caller().expect("handler is on the stack");
//!     println!(
//!         "called from {}:{}:{}",
//!         caller.file_name().unwrap_or("<unknown>"),
//!         caller.line_number().unwrap_or(0),
//!         caller.column_number().unwrap_or(0),
//!     );
//! }
//! ```
//!
//! The snapshot is ordered innermost first: index 0 is the place where
//! `capture()` was called, never `capture` itself. Frames the symbolizer
//! cannot map to source (no debug info, foreign code) are kept, with no file,
//! line or column, and report [`CallSite::is_native`].
//!
//! # How it works
//!
//! Stacks are materialized through a process-wide stack-formatting hook
//! ([`set_prepare_stack_trace`]). A [`Trace`] records raw frames when it is
//! built and, the first time its stack is read, resolves them and hands them
//! to the installed hook. `capture()` installs a hook that drops its own frame,
//! builds a trace, reads it, and puts the previous hook back before returning,
//! also when a panic unwinds through it.
//!
//! The slot is guarded by a re-entrant lock held for the whole install,
//! capture, restore sequence, so other threads never see the temporary hook.
//! Captures on different threads run one at a time.
//!
//! Line and column information requires debug info in the binary.

pub use stackshot_capture::{
    Hook, HookScope, Trace, capture, capture_with_fresh_hook, prepare_stack_trace, same_hook,
    set_prepare_stack_trace, take_prepare_stack_trace,
};
pub use stackshot_types::{CallSite, InvariantError, ModulePath, StackSnapshot};
