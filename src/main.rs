//! `etrade` binary.

// crates.io
use clap::Parser;
use color_eyre::{Report, Result, Section};
// self
use etrade_cli::cli::{self, Cli};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let cli = Cli::parse();

	cli::init_tracing(cli.debug);

	if let Err(e) = cli::run(&cli, &mut std::io::stdout()).await {
		let hint = e.hint();
		let report = Report::new(e);

		return Err(match hint {
			Some(hint) => report.suggestion(hint),
			None => report,
		});
	}

	Ok(())
}
