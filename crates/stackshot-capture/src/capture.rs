use crate::hook::{Hook, HookScope};
use crate::trace::Trace;
use stackshot_types::{CallSite, StackSnapshot};
use std::sync::{Arc, OnceLock};

fn drop_capture_frame(_trace: &Trace, mut sites: Vec<CallSite>) -> Vec<CallSite> {
    if !sites.is_empty() {
        sites.remove(0);
    }
    sites
}

fn shared_hook() -> Hook {
    static HOOK: OnceLock<Hook> = OnceLock::new();
    Arc::clone(HOOK.get_or_init(|| {
        let hook: Hook = Arc::new(drop_capture_frame);
        hook
    }))
}

/// Captures the caller's stack, innermost frame first.
///
/// The first entry is the call site of `capture` itself inside the calling
/// function; `capture`'s own frame is never part of the result. Whatever
/// hook was installed before the call is installed again afterwards.
#[inline(never)]
pub fn capture() -> StackSnapshot {
    let _scope = HookScope::install(Some(shared_hook()));
    StackSnapshot::new(Trace::here().into_stack())
}

/// Same contract as [`capture`], but builds a new hook on every call and
/// copies the tail of the raw list instead of shifting it in place.
///
/// Kept as the baseline for `stackshot-bench`.
#[inline(never)]
pub fn capture_with_fresh_hook() -> StackSnapshot {
    let hook: Hook = Arc::new(|_trace: &Trace, sites: Vec<CallSite>| {
        sites.get(1..).map(<[CallSite]>::to_vec).unwrap_or_default()
    });
    let _scope = HookScope::install(Some(hook));
    StackSnapshot::new(Trace::here().into_stack())
}
