use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = redee_api::Args::parse();
	redee_api::run(args).await
}
