use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = counsel_ask::Args::parse();
	counsel_ask::run(args).await
}
