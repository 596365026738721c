//! Benchmark report: Markdown prose for people, JSON for tooling.

use crate::config::BenchConfig;
use crate::error::BenchError;
use crate::harness::VariantRun;
use crate::stats::Summary;
use facet::Facet;
use std::fmt::Write as _;

#[derive(Facet, Debug, Clone, PartialEq)]
pub struct VariantReport {
    pub variant: String,
    pub description: String,
    pub frames: u64,
    pub summary: Summary,
}

#[derive(Facet, Debug, Clone, PartialEq)]
pub struct BenchReport {
    pub iterations: u64,
    pub warmup: u64,
    pub depth: u64,
    pub variants: Vec<VariantReport>,
}

impl BenchReport {
    pub fn from_runs(config: &BenchConfig, runs: &[VariantRun]) -> Result<Self, BenchError> {
        let variants = runs
            .iter()
            .map(|run| {
                Ok(VariantReport {
                    variant: run.variant.name().to_string(),
                    description: run.variant.description().to_string(),
                    frames: run.reference.len() as u64,
                    summary: Summary::from_samples(&run.samples_ns)?,
                })
            })
            .collect::<Result<Vec<_>, BenchError>>()?;

        Ok(Self {
            iterations: config.iterations,
            warmup: config.warmup,
            depth: config.depth as u64,
            variants,
        })
    }

    /// One paragraph comparing median latencies.
    pub fn findings(&self) -> String {
        let mut by_median: Vec<&VariantReport> = self.variants.iter().collect();
        by_median.sort_by_key(|report| report.summary.median_ns);

        let mut prose = match by_median.as_slice() {
            [] => return "No variants were measured.".to_string(),
            [only] => format!(
                "Only `{}` was measured, so there is nothing to compare it against.",
                only.variant
            ),
            [fastest, .., slowest] if fastest.summary.median_ns == slowest.summary.median_ns => {
                "All variants have the same median latency.".to_string()
            }
            [fastest, .., slowest] if fastest.summary.median_ns == 0 => format!(
                "`{}` finished below the clock resolution by median latency; `{}` took {} ns.",
                fastest.variant, slowest.variant, slowest.summary.median_ns
            ),
            [fastest, .., slowest] => format!(
                "`{}` is {:.2}x faster than `{}` by median latency ({} ns against {} ns).",
                fastest.variant,
                slowest.summary.median_ns as f64 / fastest.summary.median_ns as f64,
                slowest.variant,
                fastest.summary.median_ns,
                slowest.summary.median_ns
            ),
        };

        if let Some(widest) = by_median
            .iter()
            .max_by_key(|report| report.summary.p99_ns)
        {
            let _ = write!(
                prose,
                " The widest tail belongs to `{}`, with a p99 of {} ns.",
                widest.variant, widest.summary.p99_ns
            );
        }
        if let Some(first) = by_median.first() {
            let _ = write!(
                prose,
                " Each capture returned {} frames from a call chain {} frames deep.",
                first.frames, self.depth
            );
        }
        prose
    }

    pub fn render_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# stackshot capture benchmark");
        let _ = writeln!(out);
        let _ = writeln!(out, "- iterations: {}", self.iterations);
        let _ = writeln!(out, "- warmup: {}", self.warmup);
        let _ = writeln!(out, "- call depth: {}", self.depth);
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "| variant | frames | min (ns) | median (ns) | mean (ns) | p99 (ns) | max (ns) |"
        );
        let _ = writeln!(out, "|---|---:|---:|---:|---:|---:|---:|");
        for report in &self.variants {
            let summary = &report.summary;
            let _ = writeln!(
                out,
                "| `{}` | {} | {} | {} | {} | {} | {} |",
                report.variant,
                report.frames,
                summary.min_ns,
                summary.median_ns,
                summary.mean_ns,
                summary.p99_ns,
                summary.max_ns
            );
        }
        let _ = writeln!(out);
        for report in &self.variants {
            let _ = writeln!(out, "- `{}`: {}", report.variant, report.description);
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "## Findings");
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", self.findings());
        out
    }

    pub fn render_json(&self) -> Result<String, BenchError> {
        facet_json::to_string(self).map_err(|e| BenchError::Encode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(name: &str, median_ns: u64, p99_ns: u64) -> VariantReport {
        VariantReport {
            variant: name.to_string(),
            description: format!("{name} description"),
            frames: 14,
            summary: Summary {
                samples: 100,
                min_ns: median_ns / 2,
                median_ns,
                mean_ns: median_ns + 5,
                p99_ns,
                max_ns: p99_ns * 2,
            },
        }
    }

    fn report(variants: Vec<VariantReport>) -> BenchReport {
        BenchReport {
            iterations: 100,
            warmup: 10,
            depth: 8,
            variants,
        }
    }

    #[test]
    fn findings_compare_medians() {
        let report = report(vec![
            variant("fresh-hook", 2_000, 9_000),
            variant("reused-hook", 1_600, 4_000),
        ]);
        assert_eq!(
            report.findings(),
            "`reused-hook` is 1.25x faster than `fresh-hook` by median latency \
             (1600 ns against 2000 ns). The widest tail belongs to `fresh-hook`, \
             with a p99 of 9000 ns. Each capture returned 14 frames from a call \
             chain 8 frames deep."
        );
    }

    #[test]
    fn findings_handle_a_single_variant() {
        let report = report(vec![variant("reused-hook", 1_600, 4_000)]);
        assert!(
            report
                .findings()
                .starts_with("Only `reused-hook` was measured")
        );
    }

    #[test]
    fn findings_handle_equal_medians() {
        let report = report(vec![
            variant("reused-hook", 1_000, 4_000),
            variant("fresh-hook", 1_000, 4_000),
        ]);
        assert!(
            report
                .findings()
                .starts_with("All variants have the same median latency.")
        );
    }

    #[test]
    fn markdown_has_a_row_per_variant() {
        let markdown = report(vec![
            variant("reused-hook", 1_600, 4_000),
            variant("fresh-hook", 2_000, 9_000),
        ])
        .render_markdown();

        assert!(markdown.starts_with("# stackshot capture benchmark\n"));
        assert!(markdown.contains("- call depth: 8\n"));
        assert!(markdown.contains("| `reused-hook` | 14 | 800 | 1600 | 1605 | 4000 | 8000 |\n"));
        assert!(markdown.contains("| `fresh-hook` | 14 | 1000 | 2000 | 2005 | 9000 | 18000 |\n"));
        assert!(markdown.contains("\n## Findings\n\n`reused-hook` is 1.25x faster"));
    }

    #[test]
    fn json_carries_the_summaries() {
        let json = report(vec![variant("reused-hook", 1_600, 4_000)])
            .render_json()
            .expect("report encodes");
        assert!(json.contains("\"variant\":\"reused-hook\""));
        assert!(json.contains("\"median_ns\":1600"));
        assert!(json.contains("\"depth\":8"));
    }
}
