use facet::Facet;
use figue as args;
use stackshot_bench::{BenchConfig, BenchError, BenchReport, Format, Overrides, run};
use tracing::info;

#[derive(Facet, Debug)]
struct BenchCli {
    #[facet(flatten)]
    builtins: args::FigueBuiltins,
    #[facet(args::named, default)]
    iterations: Option<u64>,
    #[facet(args::named, default)]
    warmup: Option<u64>,
    #[facet(args::named, default)]
    depth: Option<u64>,
    #[facet(args::named, default)]
    variant: Option<String>,
    #[facet(args::named, default)]
    format: Option<String>,
    #[facet(args::named, default)]
    output: Option<String>,
}

fn main() {
    if let Err(err) = run_bench() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run_bench() -> Result<(), String> {
    let cli = parse_cli()?;

    // Report goes to stdout; keep logs off it.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let overrides = Overrides {
        iterations: cli.iterations,
        warmup: cli.warmup,
        depth: cli.depth,
        variant: cli.variant,
        format: cli.format,
        output: cli.output,
    };
    let config = BenchConfig::resolve(overrides, |name| std::env::var(name).ok())
        .map_err(|e| e.to_string())?;
    info!(
        iterations = config.iterations,
        warmup = config.warmup,
        depth = config.depth,
        variants = config.variants.len(),
        "starting capture benchmark"
    );

    let runs = run(&config).map_err(|e| e.to_string())?;
    let report = BenchReport::from_runs(&config, &runs).map_err(|e| e.to_string())?;
    let rendered = match config.format {
        Format::Markdown => report.render_markdown(),
        Format::Json => report.render_json().map_err(|e| e.to_string())? + "\n",
    };

    match &config.output {
        Some(path) => {
            std::fs::write(path, rendered.as_bytes())
                .map_err(|source| BenchError::Write {
                    path: path.clone(),
                    source,
                })
                .map_err(|e| e.to_string())?;
            info!(path = %path.display(), "report written");
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

fn parse_cli() -> Result<BenchCli, String> {
    let figue_config = args::builder::<BenchCli>()
        .map_err(|e| format!("failed to build CLI schema: {e}"))?
        .cli(|cli| cli.strict())
        .help(|h| {
            h.program_name("stackshot-bench")
                .description("Benchmark stackshot's capture variants and report the findings")
                .version(option_env!("CARGO_PKG_VERSION").unwrap_or("dev"))
        })
        .build();
    let cli = args::Driver::new(figue_config)
        .run()
        .into_result()
        .map_err(|e| e.to_string())?;
    Ok(cli.value)
}
