use anyhow::Result;
use clap::Parser;
use cli::Cli;
use linkup_common::observability::{LogConfig, LogFormat, init_logging};
use linkup_config::SettingsLoader;
use linkup_sdk::LinkupClient;
mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let log_path = init_logging(LogConfig {
        emit_stderr: args.verbose,
        format: LogFormat::from_env(),
        ..LogConfig::default()
    })?;
    tracing::debug!(log = %log_path.display(), "linkup.cli.start");

    // env wins over the file
    let settings = SettingsLoader::new()
        .with_optional_file(&args.config)
        .load()?;
    let client = LinkupClient::from_settings(&settings)?;

    let out = cli::run(&client, args.command).await?;
    println!("{out}");
    Ok(())
}
