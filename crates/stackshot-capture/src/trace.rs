use crate::hook;
use backtrace::Frame;
use stackshot_types::{CallSite, ModulePath};
use std::cell::OnceCell;
use std::ffi::c_void;
use std::fmt;
use tracing::{debug, warn};

/// Raw frames recorded at construction, resolved on first use.
///
/// Reading [`Trace::stack`] resolves every frame to call sites and passes them
/// through the installed stack-formatting hook. The result is kept on the
/// trace, so the hook runs at most once per trace.
#[derive(Debug)]
pub struct Trace {
    frames: Vec<Frame>,
    stack: OnceCell<Vec<CallSite>>,
}

impl Trace {
    /// Records the current thread's stack, starting at the caller of `here`.
    #[inline(never)]
    pub fn here() -> Self {
        let marker = Self::here as fn() -> Self as usize;
        let mut frames = Vec::new();
        backtrace::trace(|frame| {
            frames.push(frame.clone());
            true
        });

        match own_frame(&frames, marker, "Trace::here") {
            Some(own) => frames = frames.split_off(own + 1),
            None => warn!(
                frame_count = frames.len(),
                "could not locate Trace::here on the stack; keeping unwinder frames"
            ),
        }

        Self {
            frames,
            stack: OnceCell::new(),
        }
    }

    pub fn raw_frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Materialized call sites, innermost first.
    ///
    /// Panics if the hook reads the stack of the trace it is formatting.
    pub fn stack(&self) -> &[CallSite] {
        self.stack.get_or_init(|| self.materialize())
    }

    pub fn into_stack(mut self) -> Vec<CallSite> {
        match self.stack.take() {
            Some(stack) => stack,
            None => self.materialize(),
        }
    }

    fn materialize(&self) -> Vec<CallSite> {
        let mut sites = Vec::with_capacity(self.frames.len());
        for frame in &self.frames {
            resolve_into(frame, &mut sites);
        }

        // A `HookScope` on this thread keeps the slot locked on its own; the
        // hook itself runs unlocked.
        let hook = hook::lock_slot().borrow().clone();
        match hook {
            Some(hook) => hook(self, sites),
            None => sites,
        }
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, site) in self.stack().iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }
            write!(f, "    at {site}")?;
        }
        Ok(())
    }
}

// Upper bound on the size of the function whose frame `position_near` looks for.
const MAX_FUNCTION_SPAN: usize = 0x1_0000;

/// Index of the frame executing the function that starts at `entry`.
///
/// Tries the unwinder's enclosing-symbol address, then the return address
/// closest above `entry`, then symbol names. `path` is the function's path
/// suffix, such as `Trace::here`.
fn own_frame(frames: &[Frame], entry: usize, path: &str) -> Option<usize> {
    if let Some(index) = position_by_address(frames, entry) {
        return Some(index);
    }
    debug!(
        frame_count = frames.len(),
        "symbol addresses missed {path}; matching return addresses"
    );
    if let Some(index) = position_near(frames, entry) {
        return Some(index);
    }
    debug!(frame_count = frames.len(), "return addresses missed {path}; matching by name");
    position_by_name(frames, path)
}

fn position_by_address(frames: &[Frame], entry: usize) -> Option<usize> {
    frames
        .iter()
        .position(|frame| frame.symbol_address() as usize == entry)
}

// Return addresses inside the function sit just above its entry; among the
// closest, the innermost frame wins.
fn position_near(frames: &[Frame], entry: usize) -> Option<usize> {
    let offset = |frame: &Frame| {
        (frame.ip() as usize)
            .checked_sub(entry)
            .filter(|offset| *offset > 0 && *offset < MAX_FUNCTION_SPAN)
    };
    let closest = frames.iter().filter_map(offset).min()?;
    frames.iter().position(|frame| offset(frame) == Some(closest))
}

fn position_by_name(frames: &[Frame], path: &str) -> Option<usize> {
    frames.iter().position(|frame| {
        let mut found = false;
        backtrace::resolve_frame(frame, |symbol| {
            if let Some(name) = symbol.name() {
                found |= name_matches(&format!("{name:#}"), path);
            }
        });
        found
    })
}

// Full debug info gives `crate::module::Type::function`, reduced debug info
// only `function`.
fn name_matches(name: &str, path: &str) -> bool {
    let last = path.rsplit("::").next().unwrap_or(path);
    name == last
        || name == path
        || name
            .strip_suffix(path)
            .is_some_and(|prefix| prefix.ends_with("::"))
}

// Inlined calls expand one frame into several call sites, innermost first.
fn resolve_into(frame: &Frame, sites: &mut Vec<CallSite>) {
    let module = module_path_for_ip(frame.ip());
    let start = sites.len();
    backtrace::resolve_frame(frame, |symbol| {
        let site = CallSite::resolved(
            symbol.name().map(|name| format!("{name:#}")),
            symbol.filename().map(|path| path.display().to_string()),
            symbol.lineno(),
            symbol.colno(),
        );
        sites.push(with_module(site, &module));
    });
    if sites.len() == start {
        sites.push(with_module(CallSite::native(None), &module));
    }
}

fn with_module(site: CallSite, module: &Option<ModulePath>) -> CallSite {
    match module {
        Some(module) => site.with_module_path(module.clone()),
        None => site,
    }
}

#[cfg(any(target_os = "linux", target_os = "macos"))]
fn module_path_for_ip(ip: *mut c_void) -> Option<ModulePath> {
    use std::ffi::CStr;

    let mut info = std::mem::MaybeUninit::<libc::Dl_info>::zeroed();
    let ok = unsafe { libc::dladdr(ip as *const c_void, info.as_mut_ptr()) };
    if ok == 0 {
        return None;
    }

    let info = unsafe { info.assume_init() };
    if info.dli_fname.is_null() {
        return None;
    }

    let path = unsafe { CStr::from_ptr(info.dli_fname) }
        .to_string_lossy()
        .into_owned();
    ModulePath::new(path).ok()
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn module_path_for_ip(_ip: *mut c_void) -> Option<ModulePath> {
    None
}
