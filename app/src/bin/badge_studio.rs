use clap::Parser;

use badge_studio_lib::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    badge_studio_lib::init_tracing(cli.verbose);

    tracing::debug!("Starting badge-studio {}", env!("CARGO_PKG_VERSION"));
    badge_studio_lib::run(cli).await
}
