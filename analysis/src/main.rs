use argyle_analysis::{
    config::{AnalysisConfig, ColumnLayout, PlotConfig},
    dataset::{
        pairing::{ConstraintSelector, SolverFilter},
        BenchmarkDataset,
    },
    plot::Figure,
    AnalysisError,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::{path::PathBuf, process::ExitCode};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Compare solver times of complementary constraint configurations")]
struct Cli {
    /// YAML config file, defaults apply for everything left out
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database with the benchmark results
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// column layout preset, overrides database.layout of the config
    #[arg(long, value_enum)]
    layout: Option<LayoutPreset>,

    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LayoutPreset {
    Compact,
    Detailed,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every column of the result table
    Columns,
    /// Print the columns assumed to name the constraints
    Constraints,
    /// Print the loaded dataset
    Dump,
    /// Compare a named constraint against its opposite for one solver
    Compare {
        #[arg(long, default_value = "z3")]
        solver: String,
        /// e.g. `distinct` or its opposite `PbEq`
        #[arg(long)]
        constraint: String,
        #[command(flatten)]
        plot: PlotArgs,
    },
    /// Compare a constraint selected by position for one solver
    CompareIndex {
        #[arg(long, allow_negative_numbers = true)]
        index: i64,
        #[arg(long, default_value = "z3")]
        solver: String,
        #[command(flatten)]
        plot: PlotArgs,
    },
    /// Compare a constraint for several solvers, one panel each
    CompareAll {
        #[arg(long, allow_negative_numbers = true)]
        index: i64,
        /// may be repeated, all solvers if left out
        #[arg(long = "solver")]
        solvers: Vec<String>,
        /// add a panel over all selected solvers
        #[arg(long)]
        combined: bool,
        #[command(flatten)]
        plot: PlotArgs,
    },
}

#[derive(Args, Debug)]
struct PlotArgs {
    /// SVG file to write, a name derived from the command by default
    #[arg(short, long)]
    output: Option<PathBuf>,
    #[arg(long)]
    x_max: Option<f64>,
    #[arg(long)]
    y_max: Option<f64>,
    /// panel width in inches
    #[arg(long)]
    width: Option<f64>,
    /// panel height in inches
    #[arg(long)]
    height: Option<f64>,
}

impl PlotArgs {
    fn apply(&self, mut config: PlotConfig) -> Result<PlotConfig, AnalysisError> {
        config.x_max = self.x_max.unwrap_or(config.x_max);
        config.y_max = self.y_max.unwrap_or(config.y_max);
        config.width = self.width.unwrap_or(config.width);
        config.height = self.height.unwrap_or(config.height);

        if config.preflight_checks() {
            Err(argyle_analysis::config::ConfigErrors::Invalid.into())
        } else {
            Ok(config)
        }
    }

    fn output(&self, default: String) -> PathBuf {
        self.output.clone().unwrap_or_else(|| PathBuf::from(default))
    }
}

fn load_config(cli: &Cli) -> Result<AnalysisConfig, AnalysisError> {
    let mut config = match cli.config {
        Some(ref path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };

    if let Some(ref path) = cli.database {
        config.database.path = path.clone();
    }

    match cli.layout {
        Some(LayoutPreset::Compact) => config.database.layout = ColumnLayout::compact(),
        Some(LayoutPreset::Detailed) => config.database.layout = ColumnLayout::detailed(),
        None => {}
    }

    debug!(config = ?config, "Using config");

    Ok(config)
}

fn run(cli: Cli) -> Result<(), AnalysisError> {
    let config = load_config(&cli)?;
    let dataset = BenchmarkDataset::load(&config.database.path, &config.database.layout)?;

    match cli.command {
        Command::Columns => print!("{}", serde_yaml::to_string(&dataset.list_columns())?),
        Command::Constraints => print!("{}", serde_yaml::to_string(&dataset.list_constraints())?),
        Command::Dump => print!("{}", serde_yaml::to_string(dataset.instances())?),
        Command::Compare {
            solver,
            constraint,
            plot,
        } => {
            let plot_config = plot.apply(config.plot.clone())?;
            let (resolved, pairing) = dataset.pair_selected(
                &ConstraintSelector::Name(constraint.clone()),
                &config.constraints,
                &SolverFilter::Only(vec![solver.clone()]),
            )?;

            let output = plot.output(format!("compare-{solver}-{constraint}.svg"));
            Figure::compare_named(&pairing, resolved, &config.constraints, &solver)?
                .render(&output, &plot_config)?;
        }
        Command::CompareIndex {
            index,
            solver,
            plot,
        } => {
            let plot_config = plot.apply(config.plot.clone())?;
            let column = dataset.constraint_column(index)?;
            let (_, pairing) = dataset.pair_selected(
                &ConstraintSelector::Index(index),
                &config.constraints,
                &SolverFilter::Only(vec![solver.clone()]),
            )?;

            let output = plot.output(format!("compare-index-{index}-{solver}.svg"));
            Figure::compare_index(&pairing, &column, &solver)?.render(&output, &plot_config)?;
        }
        Command::CompareAll {
            index,
            solvers,
            combined,
            plot,
        } => {
            let plot_config = plot.apply(config.plot.clone())?;
            let filter = SolverFilter::from_names(solvers);
            let (_, pairing) = dataset.pair_selected(
                &ConstraintSelector::Index(index),
                &config.constraints,
                &filter,
            )?;

            let output = plot.output(format!("compare-all-{index}.svg"));
            Figure::compare_all(&pairing, &filter, &config.constraints, combined)
                .render(&output, &plot_config)?;
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => {
            info!("Done");
            ExitCode::SUCCESS
        }
        Err(error) => {
            error!("{error}");
            ExitCode::FAILURE
        }
    }
}
