pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod scope;
pub mod shell;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use tokio::io::BufReader;

use crate::api::HttpGateway;
use crate::config::Config;
use crate::context::SessionContext;
use crate::shell::Shell;

pub use api::DocsApi;
pub use error::{ActionError, ApiError, ApiResult};

/// Run the terminal front end on stdin/stdout against the configured backend
pub async fn run_shell(config: Config) -> anyhow::Result<()> {
    let gateway = HttpGateway::new(&config)?;
    tracing::info!("Using backend at {}", gateway.base_url());

    let session = SessionContext::new(Arc::new(gateway));
    let mut shell = Shell::new(
        session,
        config.search_debounce,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    );
    shell.run().await
}
