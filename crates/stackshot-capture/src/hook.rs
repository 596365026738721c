//! The process-wide stack-formatting hook.
//!
//! One slot holds the hook that [`Trace`] materialization passes its raw call
//! sites through. The slot sits behind a re-entrant lock: materialization
//! holds it while reading and invoking the hook, and a [`HookScope`] holds it
//! for as long as its temporary hook is installed, so no other thread ever
//! sees that hook.

use crate::Trace;
use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use stackshot_types::CallSite;
use std::cell::RefCell;
use std::sync::{Arc, OnceLock};
use tracing::trace;

/// Receives a trace and its raw call sites (innermost first) and returns the
/// stack that trace exposes.
///
/// The hook runs without the slot lock, except inside a [`HookScope`], which
/// holds it for its whole lifetime. A hook installed through a scope must not
/// wait on other threads that capture or install hooks.
pub type Hook = Arc<dyn Fn(&Trace, Vec<CallSite>) -> Vec<CallSite> + Send + Sync>;

type Slot = ReentrantMutex<RefCell<Option<Hook>>>;
pub(crate) type SlotGuard = ReentrantMutexGuard<'static, RefCell<Option<Hook>>>;

fn slot() -> &'static Slot {
    static SLOT: OnceLock<Slot> = OnceLock::new();
    SLOT.get_or_init(|| ReentrantMutex::new(RefCell::new(None)))
}

pub(crate) fn lock_slot() -> SlotGuard {
    slot().lock()
}

/// The currently installed hook, if any.
pub fn prepare_stack_trace() -> Option<Hook> {
    lock_slot().borrow().clone()
}

/// Installs `hook` (or restores default formatting with `None`) and returns
/// the hook it replaced.
pub fn set_prepare_stack_trace(hook: Option<Hook>) -> Option<Hook> {
    let slot = lock_slot();
    slot.replace(hook)
}

pub fn take_prepare_stack_trace() -> Option<Hook> {
    set_prepare_stack_trace(None)
}

/// Whether two handles point at the same hook.
pub fn same_hook(left: &Hook, right: &Hook) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(left), Arc::as_ptr(right))
}

/// Temporarily installed hook. Dropping the scope puts the previous hook
/// back, also when unwinding.
///
/// The scope keeps the slot locked until it is dropped. Other threads that
/// touch the slot wait; the owning thread may re-enter freely.
#[must_use = "the hook is restored as soon as the scope is dropped"]
pub struct HookScope {
    prior: Option<Hook>,
    slot: SlotGuard,
}

impl HookScope {
    pub fn install(hook: Option<Hook>) -> Self {
        let slot = lock_slot();
        let prior = slot.replace(hook);
        trace!(had_prior = prior.is_some(), "stack-formatting hook installed");
        Self { prior, slot }
    }

    /// The hook that will be restored on drop.
    pub fn prior(&self) -> Option<&Hook> {
        self.prior.as_ref()
    }
}

impl Drop for HookScope {
    fn drop(&mut self) {
        self.slot.replace(self.prior.take());
    }
}
