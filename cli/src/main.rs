use clap::Parser;
use ledger_cli::Cli;
use ledger_cli::init_tracing;
use ledger_cli::run_main;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();
    run_main(cli).await
}
