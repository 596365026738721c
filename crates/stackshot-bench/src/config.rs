//! Benchmark settings: CLI flag, then environment variable, then default.

use crate::error::BenchError;
use crate::harness::Variant;
use std::path::PathBuf;

pub const ITERATIONS_ENV: &str = "STACKSHOT_BENCH_ITERATIONS";
pub const WARMUP_ENV: &str = "STACKSHOT_BENCH_WARMUP";
pub const DEPTH_ENV: &str = "STACKSHOT_BENCH_DEPTH";

pub const DEFAULT_ITERATIONS: u64 = 10_000;
pub const DEFAULT_WARMUP: u64 = 1_000;
pub const DEFAULT_DEPTH: u64 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Markdown,
    Json,
}

impl Format {
    pub fn parse(value: &str) -> Result<Self, BenchError> {
        match value.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            _ => Err(BenchError::UnknownFormat(value.to_string())),
        }
    }
}

/// Values given on the command line. `None` falls through to the
/// environment, then to the defaults.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub iterations: Option<u64>,
    pub warmup: Option<u64>,
    pub depth: Option<u64>,
    pub variant: Option<String>,
    pub format: Option<String>,
    pub output: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchConfig {
    pub iterations: u64,
    pub warmup: u64,
    /// Call frames between the harness and the capture call.
    pub depth: usize,
    pub variants: Vec<Variant>,
    pub format: Format,
    pub output: Option<PathBuf>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            warmup: DEFAULT_WARMUP,
            depth: DEFAULT_DEPTH as usize,
            variants: Variant::ALL.to_vec(),
            format: Format::Markdown,
            output: None,
        }
    }
}

impl BenchConfig {
    /// `env` looks up an environment variable; the binary passes
    /// `std::env::var`.
    pub fn resolve(
        overrides: Overrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, BenchError> {
        let iterations = setting(overrides.iterations, &env, ITERATIONS_ENV, DEFAULT_ITERATIONS)?;
        if iterations == 0 {
            return Err(BenchError::ZeroIterations);
        }
        let warmup = setting(overrides.warmup, &env, WARMUP_ENV, DEFAULT_WARMUP)?;
        let depth = setting(overrides.depth, &env, DEPTH_ENV, DEFAULT_DEPTH)?;
        let depth = usize::try_from(depth).map_err(|_| BenchError::InvalidSetting {
            name: DEPTH_ENV,
            value: depth.to_string(),
        })?;

        let variants = match overrides.variant.as_deref() {
            None => Variant::ALL.to_vec(),
            Some(value) => vec![
                Variant::parse(value).ok_or_else(|| BenchError::UnknownVariant(value.to_string()))?,
            ],
        };
        let format = match overrides.format.as_deref() {
            None => Format::Markdown,
            Some(value) => Format::parse(value)?,
        };

        Ok(Self {
            iterations,
            warmup,
            depth,
            variants,
            format,
            output: overrides.output.map(PathBuf::from),
        })
    }
}

fn setting(
    flag: Option<u64>,
    env: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: u64,
) -> Result<u64, BenchError> {
    if let Some(value) = flag {
        return Ok(value);
    }
    match env(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| BenchError::InvalidSetting { name, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_apply_without_flags_or_env() {
        let config = BenchConfig::resolve(Overrides::default(), no_env).expect("defaults resolve");
        assert_eq!(config, BenchConfig::default());
    }

    #[test]
    fn flags_win_over_environment() {
        let overrides = Overrides {
            iterations: Some(50),
            ..Overrides::default()
        };
        let config = BenchConfig::resolve(overrides, |name| {
            (name == ITERATIONS_ENV || name == DEPTH_ENV).then(|| "7".to_string())
        })
        .expect("config resolves");
        assert_eq!(config.iterations, 50);
        assert_eq!(config.depth, 7);
        assert_eq!(config.warmup, DEFAULT_WARMUP);
    }

    #[test]
    fn zero_iterations_are_rejected() {
        let overrides = Overrides {
            iterations: Some(0),
            ..Overrides::default()
        };
        let err = BenchConfig::resolve(overrides, no_env).expect_err("zero iterations must fail");
        assert!(matches!(err, BenchError::ZeroIterations));
    }

    #[test]
    fn malformed_environment_values_are_reported() {
        let err = BenchConfig::resolve(Overrides::default(), |name| {
            (name == WARMUP_ENV).then(|| "lots".to_string())
        })
        .expect_err("non-numeric warmup must fail");
        assert!(matches!(
            err,
            BenchError::InvalidSetting { name: WARMUP_ENV, ref value } if value == "lots"
        ));
    }

    #[test]
    fn single_variant_and_format_are_parsed() {
        let overrides = Overrides {
            variant: Some("fresh-hook".to_string()),
            format: Some("JSON".to_string()),
            output: Some("report.json".to_string()),
            ..Overrides::default()
        };
        let config = BenchConfig::resolve(overrides, no_env).expect("config resolves");
        assert_eq!(config.variants, vec![Variant::FreshHook]);
        assert_eq!(config.format, Format::Json);
        assert_eq!(config.output, Some(PathBuf::from("report.json")));
    }

    #[test]
    fn unknown_variant_is_rejected() {
        let overrides = Overrides {
            variant: Some("cached".to_string()),
            ..Overrides::default()
        };
        let err = BenchConfig::resolve(overrides, no_env).expect_err("unknown variant must fail");
        assert!(matches!(err, BenchError::UnknownVariant(ref value) if value == "cached"));
    }
}
