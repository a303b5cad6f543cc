mod api_client;
mod brackets;
mod client;
mod cmd;
mod config;
mod error;
mod extract;
mod json_path;
mod platforms;
mod resolver;
mod types;

use clap::Parser;

use crate::cmd::Cli;
use crate::config::Config;

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::from_env()?;
    cli.cmd.run(&config).await
}
