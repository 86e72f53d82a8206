use anyhow::Result;
use clap::Parser;
use medir::aggregate::DelayUnits;
use medir::batch::{self, BatchConfig, Layout, PairSpec};
use medir::cli::{Cli, DelayUnitsArg, LayoutArg, OutputFormat};
use medir::json_output::JsonReport;
use medir::report;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn build_config(args: &Cli) -> Result<BatchConfig> {
    let layout = match args.layout {
        LayoutArg::Scenarios => Layout::Scenarios,
        LayoutArg::Pairs => Layout::Pairs,
    };

    if args.truth.len() != args.pred.len() {
        anyhow::bail!(
            "--truth and --pred must be given in matching pairs ({} vs {})",
            args.truth.len(),
            args.pred.len()
        );
    }
    if matches!(layout, Layout::Pairs) && args.truth.is_empty() {
        anyhow::bail!("pairs layout requires at least one --truth/--pred pair");
    }

    let scenarios = if args.scenarios.is_empty() {
        BatchConfig::default_scenarios()
    } else {
        args.scenarios.clone()
    };

    let pairs = args
        .truth
        .iter()
        .zip(args.pred.iter())
        .map(|(truth, pred)| PairSpec {
            truth: truth.clone(),
            pred: pred.clone(),
        })
        .collect();

    Ok(BatchConfig {
        root: args.root.clone(),
        layout,
        scenarios,
        trials: args.trials,
        pairs,
        variants: args.variants,
        count_missing: args.count_missing,
    })
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.debug);

    let config = build_config(&args)?;
    let units = match args.delay_units {
        DelayUnitsArg::Rows => DelayUnits::Rows,
        DelayUnitsArg::Seconds => DelayUnits::Seconds,
    };

    let batch_report = batch::run_batch(&config)?;

    match args.format {
        OutputFormat::Text => {
            print!(
                "{}",
                report::render_text(&batch_report, units, args.count_missing)
            );
        }
        OutputFormat::Json => {
            let json = JsonReport::build(&batch_report, units, args.count_missing);
            println!("{}", json.to_json()?);
        }
        OutputFormat::Csv => {
            print!(
                "{}",
                report::render_csv(&batch_report, units, args.count_missing)
            );
        }
    }

    if let Some(dir) = &args.output_dir {
        let written = report::export_csv(&batch_report, units, args.count_missing, dir)?;
        for path in written {
            eprintln!("wrote {}", path.display());
        }
    }

    Ok(())
}
