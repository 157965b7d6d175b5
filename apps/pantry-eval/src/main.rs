// crates.io
use clap::Parser;
// self
use pantry_eval::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = Args::parse();
	pantry_eval::run(args).await
}
