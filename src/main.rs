use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

mod aggregate;
mod chart;
mod config;
mod error;
mod input;
mod logging;
mod models;
mod normalize;
mod pipeline;
mod report;
mod summary;
mod threshold;

use chart::ChartOptions;
use config::{Basis, FileConfig, LogFormat, Overrides, Settings, WeeklySort};
use models::CurveType;
use pipeline::{Analysis, AnalysisInput};

#[derive(Parser)]
#[command(name = "epicurve")]
#[command(about = "Epidemic curve and outbreak threshold analysis for case line lists", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the epidemic curve chart and print the summary
    Analyze {
        #[command(flatten)]
        run: RunArgs,
        #[arg(long, default_value = "epicurve.html")]
        out: PathBuf,
        /// Also write the chart figure as JSON
        #[arg(long)]
        figure: Option<PathBuf>,
        /// Start with the summary box collapsed
        #[arg(long)]
        hide_summary: bool,
    },
    /// Print thresholds, flagged buckets and the bilingual summary
    Summary {
        #[command(flatten)]
        run: RunArgs,
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        run: RunArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Case line list (CSV with a header row)
    #[arg(long)]
    input: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = CurveType::Weekly)]
    curve: CurveType,
    #[arg(long, value_enum)]
    basis: Option<Basis>,
    #[arg(long)]
    year_column: Option<String>,
    #[arg(long)]
    week_column: Option<String>,
    #[arg(long)]
    date_column: Option<String>,
    #[arg(long, value_enum)]
    sort: Option<WeeklySort>,
    #[arg(long)]
    title: Option<String>,
    #[arg(long, env = "EPICURVE_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long)]
    log_level: Option<String>,
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

impl RunArgs {
    fn settings(self, hide_summary: bool) -> anyhow::Result<Settings> {
        let file = FileConfig::load(self.config.as_deref())?;
        let overrides = Overrides {
            basis: self.basis,
            year_column: self.year_column,
            week_column: self.week_column,
            date_column: self.date_column,
            sort: self.sort,
            title: self.title,
            hide_summary,
            log_level: self.log_level,
            log_format: self.log_format,
        };
        let settings = Settings::resolve(self.curve, self.input, file, overrides);
        logging::init_logger(&settings.logging)?;
        Ok(settings)
    }
}

async fn analyze(settings: &Settings) -> anyhow::Result<Analysis> {
    let file = input::acquire(settings.input.as_deref()).await?;
    let analysis = pipeline::run(&AnalysisInput {
        file,
        columns: settings.columns.clone(),
    })?;
    Ok(analysis)
}

fn source_name(settings: &Settings) -> String {
    settings
        .input
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_default()
}

fn print_summary(analysis: &Analysis) {
    let thresholds = &analysis.thresholds;
    println!(
        "{} curve: {} rows read, {} skipped, {} buckets",
        analysis.curve,
        analysis.rows_read,
        analysis.rows_skipped,
        analysis.series.len()
    );
    println!(
        "Mean {:.2} | SD {:.2} | Alert {:.2} | Action {:.2}",
        thresholds.mean, thresholds.sd, thresholds.alert_line, thresholds.action_line
    );
    if analysis.exceeding.is_empty() {
        println!("Buckets above action line: none");
    } else {
        println!(
            "Buckets above action line: {}",
            analysis.exceeding.join(", ")
        );
    }
    println!();
    println!("English: {}", analysis.summary.en);
    println!();
    println!("Bahasa Melayu: {}", analysis.summary.bm);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            run,
            out,
            figure,
            hide_summary,
        } => {
            let settings = run.settings(hide_summary)?;
            let analysis = analyze(&settings).await?;
            let options =
                ChartOptions::for_curve(analysis.curve, settings.basis, settings.title.clone());

            let page = chart::render_html(&analysis, &options, settings.show_summary)?;
            std::fs::write(&out, page)
                .with_context(|| format!("failed to write chart to {}", out.display()))?;
            if let Some(path) = figure {
                let json = serde_json::to_string_pretty(&chart::figure(&analysis, &options))?;
                std::fs::write(&path, json)
                    .with_context(|| format!("failed to write figure to {}", path.display()))?;
                println!("Figure written to {}.", path.display());
            }

            print_summary(&analysis);
            println!();
            println!("Chart written to {}.", out.display());
        }
        Commands::Summary { run, json } => {
            let settings = run.settings(false)?;
            let analysis = analyze(&settings).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                print_summary(&analysis);
            }
        }
        Commands::Report { run, out } => {
            let settings = run.settings(false)?;
            let analysis = analyze(&settings).await?;
            let options =
                ChartOptions::for_curve(analysis.curve, settings.basis, settings.title.clone());
            let report = report::build_report(&options.title, &source_name(&settings), &analysis);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write report to {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
