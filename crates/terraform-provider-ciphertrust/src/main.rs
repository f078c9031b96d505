//! Provider binary launched by Terraform

use terraform_provider_ciphertrust::{
    CipherTrustProvider,
    logging::{LoggingConfig, init_logging},
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the plugin handshake, so logs only ever go to stderr
    let _logging_guard = init_logging(&LoggingConfig::from_env())
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting CipherTrust Manager provider"
    );

    if let Err(e) = ciphertrust_plugin::serve(CipherTrustProvider::new()).await {
        error!(error = %e, "Provider server stopped");
        return Err(e.into());
    }

    Ok(())
}
