use std::io::{self,BufRead};
use std::path::{Path,PathBuf};

use chrono::Utc;
use clap::{Parser,Subcommand};
use tracing::{info,warn};
use tracing_subscriber::{layer::SubscriberExt,util::SubscriberInitExt};

use covid19_dashboard::chart::ChartAdapter;
use covid19_dashboard::clipboard::Stdout;
use covid19_dashboard::config::Config;
use covid19_dashboard::dashboard::{Dashboard,Event};
use covid19_dashboard::database::{Database,parse_date};
use covid19_dashboard::dataset::RegionDataset;
use covid19_dashboard::error::{Error,Result};
use covid19_dashboard::export;
use covid19_dashboard::graph::VegaRenderer;
use covid19_dashboard::metrics::MetricsEngine;
use covid19_dashboard::notify::NotificationSink;
use covid19_dashboard::selection::SelectionController;


#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (dashboard.toml when present)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Report date to show instead of the latest one
    #[arg(long, value_name = "DATE")]
    as_of: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the view of a region as JSON
    Show {
	region: String,
    },
    /// Write the four charts of a region
    Charts {
	region: String,
    },
    /// Export the sub-region table of a region as CSV
    Export {
	region: String,
	csv: PathBuf,
    },
    /// Read events from stdin, one per line
    Session,
}


/// Prints notifications on stderr.
struct Console;

impl NotificationSink for Console {
    fn show(&mut self, message: &str) {
	eprintln!("[notification] {}", message);
    }
    fn hide(&mut self) {
	eprintln!("[notification hidden]");
    }
}


fn main() {

    tracing_subscriber::registry()
	.with(tracing_subscriber::EnvFilter::try_from_default_env()
	      .unwrap_or_else(|_| "covid19_dashboard=info,warn".into()))
	.with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
	.init();

    let cli = Cli::parse();

    if let Err(err) = run(cli) {
	eprintln!("Error: {}", err);
	std::process::exit(1);
    }

}


fn run(cli: Cli) -> Result<()> {

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(date) = &cli.as_of {
	config.as_of = Some(parse_date(date)?);
    }

    let db = Database::load(&config.database)?;
    let as_of = config.as_of.or_else(|| db.latest()).ok_or(Error::MissingData)?;
    let dataset = RegionDataset::build(&db, as_of, config.days_to_show)?;
    let engine = MetricsEngine::new(config.metrics.clone());

    match cli.command {
	Commands::Show { region } => {
	    if !dataset.contains(&region) {
		warn!("Unknown region {:?}, known regions: {}", region,
		      dataset.ids().collect::<Vec<_>>().join(", "));
	    }
	    let controller = SelectionController::new(dataset, engine, &config.home);
	    let view = controller.view(&region);
	    println!("{}", serde_json::to_string_pretty(&view)?);
	}
	Commands::Charts { region } => {
	    let controller = SelectionController::new(dataset, engine, &config.home);
	    let view = controller.view(&region);
	    let mut charts = ChartAdapter::new(VegaRenderer::new(&config.chart_dir));
	    charts.open();
	    charts.render_series(&view.name, &view.series);
	    info!("{} charts for {:?} in {}", charts.live_count(), view.name,
		  config.chart_dir.display());
	}
	Commands::Export { region, csv } => {
	    export::sub_regions_file(&dataset, &region, &csv)?;
	}
	Commands::Session => {
	    session(&config, dataset, engine)?;
	}
    }

    Ok(())

}


fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
	Some(path) => Config::load(path),
	None => {
	    let path = Path::new("dashboard.toml");
	    match path.exists() {
		true => Config::load(path),
		false => Ok(Config::default())
	    }
	}
    }
}


fn session(config: &Config, dataset: RegionDataset, engine: MetricsEngine) -> Result<()> {

    let controller = SelectionController::new(dataset, engine, &config.home);
    let mut dashboard = Dashboard::new(controller, VegaRenderer::new(&config.chart_dir),
				       Stdout, Console, &config.notifications);

    let view = dashboard.start(Utc::now());
    println!("> {}", view.name);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
	let line = line?;
	match line.parse::<Event>() {
	    Ok(event) => {
		let view = dashboard.dispatch(event, Utc::now());
		println!("> {}", view.name);
	    }
	    Err(err) => eprintln!("Error: {}", err)
	}
    }

    dashboard.shutdown();
    Ok(())

}
