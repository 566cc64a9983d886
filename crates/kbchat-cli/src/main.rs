use std::sync::Arc;
use tokio::io::BufReader;

use kbchat_cli::{config::Config, logging::init_logging, Repl, TerminalRenderer};
use kbchat_persist::{FileStore, LocalStore};
use kbchat_session::SessionManager;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config.logging);

    let exchange = config.exchange();
    exchange
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid [chat] configuration: {}", e))?;

    let client = config.client().build_client()?;
    tracing::info!(base_url = client.base_url(), "Chat client ready");

    let store = FileStore::open(&config.store.dir).await?;
    tracing::info!(dir = %config.store.dir.display(), "History store opened");

    let manager = SessionManager::builder()
        .client(Arc::new(client))
        .store(LocalStore::new(Arc::new(store)))
        .observer(Arc::new(TerminalRenderer::stdout()))
        .build()
        .await?;

    println!("kbchat: connected to {}. Type /help for commands.", config.api.base_url);

    let mut repl = Repl::new(Arc::new(manager), exchange);
    repl.run(BufReader::new(tokio::io::stdin())).await?;

    Ok(())
}
