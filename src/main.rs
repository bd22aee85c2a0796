use anyhow::anyhow;
use clap::Parser;
use heating_payback::output::FileOutput;
use heating_payback::{run_project, ProjectFlags, ScenarioOutcome};
use std::ffi::OsStr;
use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser, Default, Debug)]
#[clap(author, version, about, long_about = None)]
struct PaybackArgs {
    #[arg(help = "Path to project input file in .json format")]
    input_file: String,
    #[arg(
        long,
        short,
        help = "Directory to write results into (defaults to <input file stem>__results)"
    )]
    output_dir: Option<String>,
    #[clap(
        long,
        default_value_t = false,
        help = "Skip writing a results table per scenario"
    )]
    no_csv: bool,
    #[clap(
        long,
        short,
        default_value_t = false,
        help = "Write all scenario outcomes and the A/B comparison to a JSON summary"
    )]
    summary: bool,
    #[clap(long, default_value_t = false, help = "Whether to log out spans")]
    log_spans: bool,
    #[clap(
        long,
        short,
        default_value_t = false,
        help = "Log everything down to trace level rather than info"
    )]
    verbose: bool,
}

impl From<&PaybackArgs> for ProjectFlags {
    fn from(args: &PaybackArgs) -> Self {
        let mut flags = ProjectFlags::empty();
        if !args.no_csv {
            flags.insert(ProjectFlags::WRITE_CSV);
        }
        if args.summary {
            flags.insert(ProjectFlags::WRITE_SUMMARY);
        }

        flags
    }
}

fn main() -> anyhow::Result<()> {
    let args = PaybackArgs::parse();

    // set up basic tracing
    let tracing_subscriber = {
        let max_level = if args.verbose {
            tracing::Level::TRACE
        } else {
            tracing::Level::INFO
        };
        let mut builder = tracing_subscriber::fmt::fmt().with_max_level(max_level);

        if args.log_spans {
            builder = builder.with_span_events(FmtSpan::CLOSE);
        }

        builder.finish()
    };
    tracing::subscriber::set_global_default(tracing_subscriber)?;

    let input_file = Path::new(args.input_file.as_str());
    let input_file_stem = input_file
        .file_stem()
        .and_then(OsStr::to_str)
        .ok_or_else(|| anyhow!("could not read a file name from {}", args.input_file))?;

    let output_path = match &args.output_dir {
        Some(dir) => PathBuf::from(dir),
        None => input_file.with_file_name(format!("{input_file_stem}__results")),
    };
    fs::create_dir_all(&output_path)?;
    let file_output = FileOutput::new(output_path, format!("{input_file_stem}__{{}}.{{}}"));

    let project_flags = (&args).into();

    let results = run_project(
        BufReader::new(File::open(input_file)?),
        &file_output,
        &project_flags,
    )?;

    for (name, outcome) in &results.scenarios {
        match outcome {
            ScenarioOutcome::Evaluated { summary, .. } => info!(
                "scenario {name}: cheapest to run is {}, lowest CO2 is {}",
                summary.cheapest_annual_cost, summary.lowest_co2
            ),
            ScenarioOutcome::Failed { error } => warn!("scenario {name} failed: {error}"),
        }
    }
    if let Some(comparison) = &results.comparison {
        debug!(
            "comparison of {} against {}: {}",
            comparison.scenario_b,
            comparison.scenario_a,
            serde_json::to_string_pretty(comparison)?
        );
    }

    Ok(())
}
