use serde::Deserialize;

/// MQTT bridge connection configuration, loadable from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct MqttConfig {
    /// MQTT broker hostname.
    pub broker_host: String,
    /// MQTT broker port (default 8883 for TLS).
    #[serde(default = "default_port")]
    pub broker_port: u16,
    /// MQTT client ID (unique per bot process).
    pub client_id: String,
    /// Bot identity used in topic names.
    #[serde(default = "default_bot_id")]
    pub bot_id: String,
    /// Enable TLS (mTLS). When false, connects plaintext (local dev).
    #[serde(default = "default_use_tls")]
    pub use_tls: bool,
    /// Path to client X.509 certificate (PEM).
    #[serde(default)]
    pub client_cert_path: String,
    /// Path to client private key (PEM).
    #[serde(default)]
    pub client_key_path: String,
    /// Path to CA certificate.
    #[serde(default)]
    pub ca_cert_path: String,
    /// Keep-alive interval in seconds.
    #[serde(default = "default_keepalive")]
    pub keepalive_secs: u16,
    /// How long `send` waits for the bridge to acknowledge a message.
    #[serde(default = "default_send_timeout")]
    pub send_timeout_secs: u64,
}

fn default_use_tls() -> bool {
    true
}

fn default_port() -> u16 {
    8883
}

fn default_bot_id() -> String {
    "baselard".into()
}

fn default_keepalive() -> u16 {
    30
}

fn default_send_timeout() -> u64 {
    10
}
