use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use fundmatch_config::Config;
use fundmatch_limiter::Pacer;
use fundmatch_storage::{ProcessedLedger, SimilarityIndex};

#[derive(Debug, Parser)]
#[command(version, rename_all = "kebab")]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Process pending funding CSV files into the similarity index.
	Ingest,
	/// Match a researcher profile against the indexed opportunities.
	Match {
		/// Person JSON file describing the researcher.
		#[arg(long, value_name = "FILE")]
		profile: PathBuf,
		/// Plain-text files with already-extracted document content.
		#[arg(long = "document", value_name = "FILE")]
		documents: Vec<PathBuf>,
	},
	/// Print index and ledger statistics.
	Stats,
}

#[derive(Debug, Serialize)]
struct Stats {
	opportunities_tracked: usize,
	index_entries: usize,
	csv_files_pending: usize,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = fundmatch_config::load(&args.config)?;

	init_tracing(&config);

	let pacer = Pacer::new(config.limiter.calls_per_minute);
	let mut index = SimilarityIndex::load(&config.storage.index_path)?;
	let mut ledger = ProcessedLedger::load(&config.storage.ledger_path)?;

	match args.command {
		Command::Ingest => {
			let summary =
				fundmatch_service::ingest::process_csv_files(&config, &pacer, &mut index, &mut ledger)
					.await?;

			index.save(&config.storage.index_path)?;
			ledger.save(&config.storage.ledger_path)?;
			tracing::info!(
				files = summary.processed_files.len(),
				new = summary.new_opportunities,
				duplicates = summary.duplicate_skipped,
				expired = summary.expired_skipped,
				"Ingestion finished."
			);
			println!("{}", serde_json::to_string_pretty(&summary)?);
		},
		Command::Match { profile, documents } => {
			let profile = fundmatch_service::profile::build_user_profile(&profile, &documents)?;
			let records =
				fundmatch_service::matching::match_profile(&config, &pacer, &index, &profile).await?;

			println!("{}", serde_json::to_string_pretty(&records)?);
		},
		Command::Stats => {
			let stats = Stats {
				opportunities_tracked: ledger.opportunities.len(),
				index_entries: index.len(),
				csv_files_pending: fundmatch_service::ingest::discover_csv_files(
					&config.ingest.funding_dir,
				)
				.map(|files| files.len())
				.unwrap_or(0),
			};

			println!("{}", serde_json::to_string_pretty(&stats)?);
		},
	}

	Ok(())
}

fn init_tracing(config: &Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();
}
