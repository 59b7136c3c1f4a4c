mod encoder;
mod error;
mod features;
mod form;
mod model;
mod records;
#[cfg(test)]
mod testdata;
mod train;

use std::io;
use std::path::PathBuf;
use std::time::Instant;

use clap::{ArgAction, Parser, Subcommand};
use env_logger::{Builder, Env};
use log::{debug, info, LevelFilter};

use crate::error::HeartRiskError;
use crate::model::HeartModel;

#[derive(Parser, Debug)]
#[command(author, version, about = "Heart disease risk prediction", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[arg(short, long, action = ArgAction::Count, help = "Verbose level")]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Train the classifier on a labeled dataset and persist the artifacts.
    Train {
        #[arg(short, long, help = "Training dataset (csv with header)")]
        input: PathBuf,
        #[arg(short, long, default_value = "artifacts", help = "Artifact directory")]
        artifacts: PathBuf,
    },
    /// Load the artifacts and predict the risk for one patient.
    Predict {
        #[arg(short, long, default_value = "artifacts", help = "Artifact directory")]
        artifacts: PathBuf,
        #[arg(
            short,
            long,
            help = "13 comma-separated values in dataset column order; skips the interactive form"
        )]
        record: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), HeartRiskError> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        1 => LevelFilter::Debug,
        2 => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };
    let env = Env::new().filter("HEART_LOG");
    Builder::new()
        .filter(Some("heart_risk"), log_level)
        .parse_env(env)
        .init();

    debug!("Arguments {:#?}", cli);
    let start_time = Instant::now();

    match cli.command {
        Commands::Train { input, artifacts } => {
            train::train(&input, &artifacts).await?;
        }
        Commands::Predict { artifacts, record } => {
            let model = HeartModel::load(&artifacts)?;
            let patient = match record {
                Some(raw) => form::parse_record_arg(&raw)?,
                None => {
                    let stdin = io::stdin();
                    form::read_record(&mut stdin.lock(), &mut io::stdout())?
                }
            };
            let prediction = model.predict(&patient)?;
            println!("{}", form::render(&prediction));
        }
    }

    info!("completed in {:?}", start_time.elapsed());
    Ok(())
}
