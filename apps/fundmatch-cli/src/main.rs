use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = fundmatch_cli::Args::parse();

	fundmatch_cli::run(args).await
}
