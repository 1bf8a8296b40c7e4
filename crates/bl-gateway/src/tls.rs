//! TLS configuration for mTLS connections to the bridge broker.
//!
//! Loads the client certificate, private key, and CA certificate
//! from PEM files and configures rumqttc's TLS transport.

use rumqttc::Transport;

use crate::config::MqttConfig;
use crate::error::{GatewayError, GatewayResult};

fn read_pem(path: &str, what: &str) -> GatewayResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| GatewayError::Tls(format!("failed to read {what} '{path}': {e}")))
}

/// Build a TLS transport from certificate file paths in the config.
pub fn load_tls_transport(config: &MqttConfig) -> GatewayResult<Transport> {
    let ca = read_pem(&config.ca_cert_path, "CA cert")?;
    let client_cert = read_pem(&config.client_cert_path, "client cert")?;
    let client_key = read_pem(&config.client_key_path, "client key")?;

    Ok(Transport::tls_with_config(
        rumqttc::TlsConfiguration::Simple {
            ca,
            alpn: None,
            client_auth: Some((client_cert, client_key)),
        },
    ))
}
