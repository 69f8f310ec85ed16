use std::sync::Arc;

use clap::Parser;
use log::info;

use notopia::{
    App, Cli, Config, FileKeyValueStore, LocalDocumentStore, NotopiaClient, Result, Session,
};

pub fn initialize_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .format_module_path(true)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(&config_path)?;
    if let Some(data_dir) = cli.data_dir.clone() {
        config.data_dir = data_dir;
    }

    info!(
        "Starting notopia (store: {}, offline: {})",
        config.data_dir.display(),
        cli.offline
    );

    let remote = Arc::new(LocalDocumentStore::new(config.data_dir.clone())?);
    let local = Arc::new(FileKeyValueStore::new(config.buffer_dir.clone())?);

    let client = NotopiaClient::new(remote, local, !cli.offline);
    client.set_session(Some(Session {
        uid: config.user_uid.clone(),
        email: config.user_email.clone(),
    }));

    let mut app = App::new(client, config, config_path, cli.verbose);
    app.run(cli.command).await
}

#[tokio::main]
async fn main() {
    initialize_logger();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        // Operation boundary: every failure is a message, never a crash.
        eprintln!("{} {}", console::style("error:").red().bold(), e);
        std::process::exit(1);
    }
}
