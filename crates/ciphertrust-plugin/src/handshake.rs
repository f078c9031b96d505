//! go-plugin handshake and server startup
//!
//! Terraform launches the provider binary with a magic cookie in the
//! environment and reads a single handshake line from stdout describing
//! where to connect. With automatic mTLS the line also carries the server
//! certificate. Everything else the process prints must go to stderr.

use std::io::Write;

use base64::Engine;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::{Identity, Server, ServerTlsConfig};
use tracing::info;

use crate::error::PluginError;
use crate::proto::provider_server::ProviderServer;
use crate::provider::ProviderService;
use crate::server::PluginServer;

pub const MAGIC_COOKIE_KEY: &str = "TF_PLUGIN_MAGIC_COOKIE";
pub const MAGIC_COOKIE_VALUE: &str =
    "d602bf8f470bc67ca7faa0386276bbdd4330efaf76d1a219cb4d6991ca9872b2";

/// go-plugin core protocol version
pub const CORE_PROTOCOL_VERSION: u32 = 1;

/// Terraform plugin protocol version served
pub const PROTOCOL_VERSION: u32 = 6;

const PROTOCOL_VERSIONS_KEY: &str = "PLUGIN_PROTOCOL_VERSIONS";
const CLIENT_CERT_KEY: &str = "PLUGIN_CLIENT_CERT";

/// Check the environment Terraform sets when launching a plugin
pub fn check_environment(
    cookie: Option<&str>,
    protocol_versions: Option<&str>,
) -> Result<(), PluginError> {
    if cookie != Some(MAGIC_COOKIE_VALUE) {
        return Err(PluginError::Handshake(
            "this binary is a Terraform plugin and is not meant to be executed directly"
                .to_string(),
        ));
    }

    if let Some(versions) = protocol_versions {
        let supported = versions
            .split(',')
            .filter_map(|v| v.trim().parse::<u32>().ok())
            .any(|v| v == PROTOCOL_VERSION);
        if !supported {
            return Err(PluginError::Handshake(format!(
                "Terraform offered protocol versions {versions}, this plugin requires {PROTOCOL_VERSION}"
            )));
        }
    }

    Ok(())
}

/// Format the line go-plugin reads from stdout
pub fn handshake_line(address: &str, server_cert: Option<&[u8]>) -> String {
    let mut line = format!("{CORE_PROTOCOL_VERSION}|{PROTOCOL_VERSION}|tcp|{address}|grpc");
    if let Some(der) = server_cert {
        line.push('|');
        line.push_str(&STANDARD_NO_PAD.encode(der));
    }
    line
}

/// Serve the provider until Terraform terminates the process
pub async fn serve<P: ProviderService>(provider: P) -> Result<(), PluginError> {
    check_environment(
        std::env::var(MAGIC_COOKIE_KEY).ok().as_deref(),
        std::env::var(PROTOCOL_VERSIONS_KEY).ok().as_deref(),
    )?;

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let address = listener.local_addr()?.to_string();

    let mut builder = Server::builder();
    let mut server_cert = None;

    // Automatic mTLS: Terraform sent its client certificate and expects ours
    // back in the handshake line
    if std::env::var(CLIENT_CERT_KEY).is_ok_and(|cert| !cert.is_empty()) {
        let certified = rcgen::generate_simple_self_signed(vec!["localhost".to_string()])?;
        let identity = Identity::from_pem(certified.cert.pem(), certified.key_pair.serialize_pem());
        builder = builder.tls_config(ServerTlsConfig::new().identity(identity))?;
        server_cert = Some(certified.cert.der().to_vec());
    }

    let service = ProviderServer::new(PluginServer::new(provider));

    {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", handshake_line(&address, server_cert.as_deref()))?;
        stdout.flush()?;
    }

    info!(address = %address, tls = server_cert.is_some(), "Plugin server listening");

    builder
        .add_service(service)
        .serve_with_incoming(TcpListenerStream::new(listener))
        .await?;

    Ok(())
}
