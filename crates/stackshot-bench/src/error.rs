use crate::harness::Variant;
use std::error::Error;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum BenchError {
    ZeroIterations,
    InvalidSetting { name: &'static str, value: String },
    UnknownVariant(String),
    UnknownFormat(String),
    EmptySamples,
    UnstableStack {
        variant: Variant,
        expected: usize,
        got: usize,
    },
    VariantMismatch { left: Variant, right: Variant },
    Encode(String),
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for BenchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroIterations => write!(f, "iterations must be greater than zero"),
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid value for {name}: {value:?} is not a non-negative integer")
            }
            Self::UnknownVariant(value) => write!(
                f,
                "unknown variant {value:?}; expected one of: {}",
                Variant::ALL.map(Variant::name).join(", ")
            ),
            Self::UnknownFormat(value) => {
                write!(f, "unknown format {value:?}; expected markdown or json")
            }
            Self::EmptySamples => write!(f, "cannot summarize an empty sample set"),
            Self::UnstableStack {
                variant,
                expected,
                got,
            } => write!(
                f,
                "{} returned {got} frames where the reference capture had {expected}",
                variant.name()
            ),
            Self::VariantMismatch { left, right } => write!(
                f,
                "{} and {} disagree on the captured frames",
                left.name(),
                right.name()
            ),
            Self::Encode(message) => write!(f, "failed to encode report: {message}"),
            Self::Write { path, source } => {
                write!(f, "failed to write report to {}: {source}", path.display())
            }
        }
    }
}

impl Error for BenchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Write { source, .. } => Some(source),
            _ => None,
        }
    }
}
