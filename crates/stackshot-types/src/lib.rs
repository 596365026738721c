//! Call-site descriptors and stack snapshots.
//!
//! A [`StackSnapshot`] is an ordered list of [`CallSite`]s, innermost frame
//! first. Values are produced by `stackshot-capture` and handed to callers
//! unmodified; nothing in here walks the stack.

use facet::Facet;
use std::error::Error;
use std::fmt;
use std::ops::Index;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantError {
    EmptyField(&'static str),
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "{field} must be non-empty"),
        }
    }
}

impl Error for InvariantError {}

/// Path of the loaded object (executable or shared library) a frame belongs to.
#[derive(Facet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModulePath(String);

impl ModulePath {
    pub fn new(value: impl Into<String>) -> Result<Self, InvariantError> {
        let value = value.into();
        if value.is_empty() {
            return Err(InvariantError::EmptyField("module_path"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One resolved frame of a captured stack.
///
/// Line and column numbers are 1-based. Debug info uses 0 for "unknown", and
/// such values are stored as `None`.
#[derive(Facet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallSite {
    function_name: Option<String>,
    file_name: Option<String>,
    line_number: Option<u32>,
    column_number: Option<u32>,
    module_path: Option<ModulePath>,
}

impl CallSite {
    pub fn resolved(
        function_name: Option<String>,
        file_name: Option<String>,
        line_number: Option<u32>,
        column_number: Option<u32>,
    ) -> Self {
        Self {
            function_name: function_name.filter(|name| !name.is_empty()),
            file_name: file_name.filter(|name| !name.is_empty()),
            line_number: line_number.filter(|line| *line > 0),
            column_number: column_number.filter(|column| *column > 0),
            module_path: None,
        }
    }

    /// A frame the symbolizer could not map back to source.
    pub fn native(function_name: Option<String>) -> Self {
        Self::resolved(function_name, None, None, None)
    }

    pub fn with_module_path(mut self, module_path: ModulePath) -> Self {
        self.module_path = Some(module_path);
        self
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn line_number(&self) -> Option<u32> {
        self.line_number
    }

    pub fn column_number(&self) -> Option<u32> {
        self.column_number
    }

    pub fn function_name(&self) -> Option<&str> {
        self.function_name.as_deref()
    }

    pub fn module_path(&self) -> Option<&ModulePath> {
        self.module_path.as_ref()
    }

    pub fn is_native(&self) -> bool {
        self.file_name.is_none() && self.line_number.is_none()
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.function_name().unwrap_or("<unknown>"))?;
        let Some(file) = self.file_name() else {
            return f.write_str(" (native)");
        };
        write!(f, " ({file}")?;
        if let Some(line) = self.line_number {
            write!(f, ":{line}")?;
            if let Some(column) = self.column_number {
                write!(f, ":{column}")?;
            }
        }
        f.write_str(")")
    }
}

/// Call sites of one capture, innermost first.
///
/// Index 0 is the immediate caller of the capture operation.
#[derive(Facet, Debug, Clone, Default, PartialEq, Eq)]
pub struct StackSnapshot {
    frames: Vec<CallSite>,
}

impl StackSnapshot {
    pub fn new(frames: Vec<CallSite>) -> Self {
        Self { frames }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CallSite> {
        self.frames.get(index)
    }

    /// The frame that asked for the snapshot.
    pub fn caller(&self) -> Option<&CallSite> {
        self.frames.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CallSite> {
        self.frames.iter()
    }

    pub fn frames(&self) -> &[CallSite] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<CallSite> {
        self.frames
    }
}

impl From<Vec<CallSite>> for StackSnapshot {
    fn from(frames: Vec<CallSite>) -> Self {
        Self::new(frames)
    }
}

impl Index<usize> for StackSnapshot {
    type Output = CallSite;

    fn index(&self, index: usize) -> &CallSite {
        &self.frames[index]
    }
}

impl AsRef<[CallSite]> for StackSnapshot {
    fn as_ref(&self) -> &[CallSite] {
        &self.frames
    }
}

impl IntoIterator for StackSnapshot {
    type Item = CallSite;
    type IntoIter = std::vec::IntoIter<CallSite>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.into_iter()
    }
}

impl<'a> IntoIterator for &'a StackSnapshot {
    type Item = &'a CallSite;
    type IntoIter = std::slice::Iter<'a, CallSite>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

impl fmt::Display for StackSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, frame) in self.frames.iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }
            write!(f, "    at {frame}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(line: u32) -> CallSite {
        CallSite::resolved(
            Some("demo::handler".to_string()),
            Some("src/handler.rs".to_string()),
            Some(line),
            Some(9),
        )
    }

    #[test]
    fn module_path_rejects_empty() {
        let err = ModulePath::new("").expect_err("empty module path must fail");
        assert!(matches!(err, InvariantError::EmptyField("module_path")));
    }

    #[test]
    fn zero_positions_are_unknown() {
        let site = CallSite::resolved(None, Some("src/lib.rs".to_string()), Some(0), Some(0));
        assert_eq!(site.line_number(), None);
        assert_eq!(site.column_number(), None);
        assert!(!site.is_native());
    }

    #[test]
    fn native_frames_have_no_location() {
        let site = CallSite::native(Some("__libc_start_main".to_string()));
        assert!(site.is_native());
        assert_eq!(site.file_name(), None);
        assert_eq!(site.to_string(), "__libc_start_main (native)");
    }

    #[test]
    fn accessors_are_stable_across_reads() {
        let site = site(42);
        for _ in 0..3 {
            assert_eq!(site.file_name(), Some("src/handler.rs"));
            assert_eq!(site.line_number(), Some(42));
            assert_eq!(site.column_number(), Some(9));
        }
    }

    #[test]
    fn snapshot_renders_innermost_first() {
        let snapshot = StackSnapshot::new(vec![
            site(10),
            CallSite::resolved(
                Some("demo::main".to_string()),
                Some("src/main.rs".to_string()),
                Some(3),
                None,
            ),
        ]);
        assert_eq!(snapshot.caller(), Some(&site(10)));
        assert_eq!(
            snapshot.to_string(),
            "    at demo::handler (src/handler.rs:10:9)\n    at demo::main (src/main.rs:3)"
        );
    }
}
