use crate::config::BenchConfig;
use crate::error::BenchError;
use stackshot::StackSnapshot;
use std::hint::black_box;
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// One shared hook, first frame shifted out in place.
    ReusedHook,
    /// A hook allocated per call, tail copied into a new list.
    FreshHook,
}

impl Variant {
    pub const ALL: [Variant; 2] = [Variant::ReusedHook, Variant::FreshHook];

    pub fn name(self) -> &'static str {
        match self {
            Self::ReusedHook => "reused-hook",
            Self::FreshHook => "fresh-hook",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|variant| variant.name() == value)
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::ReusedHook => "shared hook, in-place removal of the capture frame",
            Self::FreshHook => "hook allocated per call, tail copied into a new list",
        }
    }

    fn capture_fn(self) -> fn() -> StackSnapshot {
        match self {
            Self::ReusedHook => stackshot::capture,
            Self::FreshHook => stackshot::capture_with_fresh_hook,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VariantRun {
    pub variant: Variant,
    /// Snapshot taken before timing; every timed capture has its length.
    pub reference: StackSnapshot,
    pub samples_ns: Vec<u64>,
}

// Sample buffers grow past this instead of reserving up front.
const MAX_PREALLOCATED_SAMPLES: usize = 1 << 20;

fn sample_capacity(iterations: u64) -> usize {
    usize::try_from(iterations)
        .unwrap_or(usize::MAX)
        .min(MAX_PREALLOCATED_SAMPLES)
}

// Each level returns through `black_box` so optimized builds keep one frame
// per level instead of turning the calls into tail calls.
#[inline(never)]
fn descend(depth: usize, capture_fn: fn() -> StackSnapshot) -> StackSnapshot {
    if depth == 0 {
        return black_box(capture_fn());
    }
    black_box(descend(depth - 1, capture_fn))
}

pub fn run_variant(variant: Variant, config: &BenchConfig) -> Result<VariantRun, BenchError> {
    let capture_fn = variant.capture_fn();

    for _ in 0..config.warmup {
        drop(black_box(descend(config.depth, capture_fn)));
    }
    debug!(variant = variant.name(), warmup = config.warmup, "warmup done");

    let reference = descend(config.depth, capture_fn);
    let mut samples_ns = Vec::with_capacity(sample_capacity(config.iterations));
    for _ in 0..config.iterations {
        let started = Instant::now();
        let snapshot = descend(config.depth, capture_fn);
        let elapsed = started.elapsed();

        if snapshot.len() != reference.len() {
            return Err(BenchError::UnstableStack {
                variant,
                expected: reference.len(),
                got: snapshot.len(),
            });
        }
        samples_ns.push(u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX));
        drop(black_box(snapshot));
    }

    info!(
        variant = variant.name(),
        iterations = config.iterations,
        frames = reference.len(),
        "variant measured"
    );
    Ok(VariantRun {
        variant,
        reference,
        samples_ns,
    })
}

/// Measures every configured variant and checks that they captured the same
/// frames.
pub fn run(config: &BenchConfig) -> Result<Vec<VariantRun>, BenchError> {
    let mut runs: Vec<VariantRun> = Vec::with_capacity(config.variants.len());
    for &variant in &config.variants {
        let run = run_variant(variant, config)?;
        if let Some(first) = runs.first()
            && first.reference != run.reference
        {
            return Err(BenchError::VariantMismatch {
                left: first.variant,
                right: variant,
            });
        }
        runs.push(run);
    }
    Ok(runs)
}
