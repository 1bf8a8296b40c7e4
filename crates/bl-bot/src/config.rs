//! Bot configuration, loadable from TOML.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::ensure;
use serde::Deserialize;

use bl_classifier::OllamaConfig;
use bl_gateway::MqttConfig;
use bl_protocol::{ChannelId, GuildId, MessageEvent};

/// Top-level configuration for the bot.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Command prefix.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Separator for lists in replies.
    #[serde(default = "default_separator")]
    pub separator: String,
    /// Minimum confidence for acting on a classified intent.
    #[serde(default = "default_threshold")]
    pub nlp_confidence_threshold: f64,
    /// Whether the natural-language interface starts switched on.
    #[serde(default = "default_chat_enabled")]
    pub chat_enabled: bool,
    /// Guilds the bot answers in. Empty together with `enabled_channels`
    /// means everywhere.
    #[serde(default)]
    pub enabled_guilds: HashSet<GuildId>,
    /// Channels the bot answers in, on top of `enabled_guilds`.
    #[serde(default)]
    pub enabled_channels: HashSet<ChannelId>,
    /// Age after which an unanswered confirmation is dropped.
    #[serde(default = "default_confirmation_ttl")]
    pub confirmation_ttl_secs: u64,
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
    /// JSON utterance file backing the intent model.
    #[serde(default = "default_intents_path")]
    pub intents_path: PathBuf,
    /// PostgreSQL URL. None disables the Genshin mining feature.
    #[serde(default)]
    pub database_url: Option<String>,
    /// MQTT bridge connection settings.
    pub mqtt: MqttConfig,
    /// Ollama classifier settings. Disabled unless configured.
    #[serde(default)]
    pub ollama: OllamaConfig,
}

fn default_prefix() -> String {
    "/".into()
}

fn default_separator() -> String {
    ", ".into()
}

fn default_threshold() -> f64 {
    bl_router::DEFAULT_CONFIDENCE_THRESHOLD
}

fn default_chat_enabled() -> bool {
    true
}

fn default_confirmation_ttl() -> u64 {
    300
}

fn default_sweep_interval() -> u64 {
    30
}

fn default_intents_path() -> PathBuf {
    "intents.json".into()
}

impl BotConfig {
    /// Load and validate config from a TOML file path.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(!self.prefix.trim().is_empty(), "prefix must not be blank");
        ensure!(
            (0.0..=1.0).contains(&self.nlp_confidence_threshold),
            "nlp_confidence_threshold must be within [0, 1], got {}",
            self.nlp_confidence_threshold
        );
        ensure!(self.sweep_interval_secs > 0, "sweep_interval_secs must be positive");
        Ok(())
    }

    pub fn confirmation_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::try_from(self.confirmation_ttl_secs).unwrap_or(i64::MAX))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn filter(&self) -> ChannelFilter {
        ChannelFilter {
            guilds: self.enabled_guilds.clone(),
            channels: self.enabled_channels.clone(),
        }
    }
}

/// Where the bot is allowed to answer.
#[derive(Debug, Clone, Default)]
pub struct ChannelFilter {
    pub guilds: HashSet<GuildId>,
    pub channels: HashSet<ChannelId>,
}

impl ChannelFilter {
    /// A message passes if nothing is configured, or if its guild or its
    /// channel is enabled.
    pub fn allows(&self, message: &MessageEvent) -> bool {
        if self.guilds.is_empty() && self.channels.is_empty() {
            return true;
        }
        self.channels.contains(&message.channel_id)
            || message.guild_id.is_some_and(|g| self.guilds.contains(&g))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bl_protocol::{MessageId, UserId};

    const MINIMAL: &str = r#"
[mqtt]
broker_host = "localhost"
client_id = "baselard-dev"
use_tls = false
"#;

    #[test]
    fn deserialize_minimal_config() {
        let config = BotConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(config.prefix, "/");
        assert_eq!(config.separator, ", ");
        assert_eq!(config.nlp_confidence_threshold, 0.9);
        assert!(config.chat_enabled);
        assert!(config.enabled_guilds.is_empty());
        assert_eq!(config.confirmation_ttl_secs, 300);
        assert_eq!(config.sweep_interval_secs, 30);
        assert_eq!(config.intents_path, PathBuf::from("intents.json"));
        assert!(config.database_url.is_none());
        assert!(!config.ollama.enabled);
        assert_eq!(config.mqtt.bot_id, "baselard");
    }

    #[test]
    fn deserialize_full_config() {
        let toml = r#"
prefix = "!"
separator = " | "
nlp_confidence_threshold = 0.75
chat_enabled = false
enabled_guilds = [858926254719107092]
enabled_channels = [563785796050485259, 453918676022722561]
confirmation_ttl_secs = 60
sweep_interval_secs = 5
intents_path = "/var/lib/baselard/intents.json"
database_url = "postgres://baselard@localhost/baselard"

[mqtt]
broker_host = "bridge.example.com"
client_id = "baselard-1"
bot_id = "baselard-prod"
client_cert_path = "/certs/cert.pem"
client_key_path = "/certs/key.pem"
ca_cert_path = "/certs/ca.pem"

[ollama]
model = "gemma:2b"
enabled = true
"#;
        let config = BotConfig::from_toml(toml).unwrap();
        assert_eq!(config.prefix, "!");
        assert_eq!(config.nlp_confidence_threshold, 0.75);
        assert!(!config.chat_enabled);
        assert!(config.enabled_guilds.contains(&GuildId(858926254719107092)));
        assert_eq!(config.enabled_channels.len(), 2);
        assert_eq!(config.confirmation_ttl(), chrono::Duration::seconds(60));
        assert_eq!(config.sweep_interval(), Duration::from_secs(5));
        assert_eq!(config.database_url.as_deref(), Some("postgres://baselard@localhost/baselard"));
        assert_eq!(config.mqtt.bot_id, "baselard-prod");
        assert!(config.ollama.enabled);
        assert_eq!(config.ollama.model, "gemma:2b");
    }

    #[test]
    fn example_config_parses() {
        let config = BotConfig::from_toml(include_str!("../bot.example.toml")).unwrap();
        assert!(!config.mqtt.use_tls);
        assert_eq!(config.mqtt.broker_port, 1883);
        assert_eq!(config.intents_path, PathBuf::from("intents.json"));
    }

    #[test]
    fn threshold_out_of_range_is_rejected() {
        let toml = format!("nlp_confidence_threshold = 1.5\n{MINIMAL}");
        let err = BotConfig::from_toml(&toml).unwrap_err();
        assert!(err.to_string().contains("nlp_confidence_threshold"));
    }

    #[test]
    fn blank_prefix_is_rejected() {
        let toml = format!("prefix = \" \"\n{MINIMAL}");
        assert!(BotConfig::from_toml(&toml).is_err());
    }

    #[test]
    fn zero_sweep_interval_is_rejected() {
        let toml = format!("sweep_interval_secs = 0\n{MINIMAL}");
        assert!(BotConfig::from_toml(&toml).is_err());
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bot.toml");
        std::fs::write(&path, MINIMAL).unwrap();

        let config = BotConfig::from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(config.mqtt.client_id, "baselard-dev");
    }

    #[test]
    fn filter_allows_everything_when_unconfigured() {
        let filter = ChannelFilter::default();
        let dm = MessageEvent::new(MessageId(1), ChannelId(9), UserId(1), "hi");
        assert!(filter.allows(&dm));
    }

    #[test]
    fn filter_matches_guild_or_channel() {
        let filter = ChannelFilter {
            guilds: [GuildId(100)].into(),
            channels: [ChannelId(7)].into(),
        };
        let in_guild = MessageEvent::new(MessageId(1), ChannelId(1), UserId(1), "hi").in_guild(GuildId(100));
        let in_channel = MessageEvent::new(MessageId(2), ChannelId(7), UserId(1), "hi").in_guild(GuildId(555));
        let elsewhere = MessageEvent::new(MessageId(3), ChannelId(8), UserId(1), "hi").in_guild(GuildId(555));
        let dm = MessageEvent::new(MessageId(4), ChannelId(8), UserId(1), "hi");

        assert!(filter.allows(&in_guild));
        assert!(filter.allows(&in_channel));
        assert!(!filter.allows(&elsewhere));
        assert!(!filter.allows(&dm));
    }
}
