//! Baselard chat bot.
//!
//! Wires the MQTT chat bridge, the intent classifier, the optional
//! PostgreSQL store and the feature handlers into a single binary.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use bl_bot::bot::Bot;
use bl_bot::config::BotConfig;
use bl_bot::state::BotState;
use bl_bot::{event_loop, features, sweeper};
use bl_classifier::{ClassifierGateway, OllamaClassifier, UtteranceModel};
use bl_gateway::{MqttTransport, Transport};
use bl_router::Router;
use bl_store::{PgRowStore, RowStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "baselard starting");

    // ── Load config ─────────────────────────────────────────────
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/etc/baselard/bot.toml".to_string());

    let config = BotConfig::from_file(&config_path)?;
    tracing::info!(
        bot_id = %config.mqtt.bot_id,
        prefix = %config.prefix,
        threshold = config.nlp_confidence_threshold,
        "config loaded"
    );

    // ── Intent classifier ───────────────────────────────────────
    let model = Arc::new(UtteranceModel::load(&config.intents_path)?);
    let classifier: Arc<dyn ClassifierGateway> = if config.ollama.enabled {
        tracing::info!(
            host = %config.ollama.host,
            model = %config.ollama.model,
            "ollama classifier enabled"
        );
        Arc::new(OllamaClassifier::new(config.ollama.clone(), model.intents())?)
    } else {
        tracing::info!(intents = model.intents().len(), "utterance model classifier enabled");
        model.clone()
    };

    // ── Chat bridge ─────────────────────────────────────────────
    let (transport, eventloop) = if config.mqtt.use_tls {
        MqttTransport::new(&config.mqtt)?
    } else {
        tracing::info!("MQTT plaintext mode (no TLS)");
        MqttTransport::new_plaintext(&config.mqtt)
    };
    let transport = Arc::new(transport);

    // ── Row store ───────────────────────────────────────────────
    let store: Option<Arc<dyn RowStore>> = match &config.database_url {
        Some(url) => {
            let store = PgRowStore::connect(url).await?;
            tracing::info!("running database migrations");
            store.run_script(features::genshin::MIGRATION).await?;
            Some(Arc::new(store))
        }
        None => None,
    };

    // ── Handlers and routing ────────────────────────────────────
    let state = Arc::new(BotState::new(
        transport.clone() as Arc<dyn Transport>,
        &config,
    ));
    let registry = features::build_registry(&state, model, store)?;
    let router = Router::new(
        Arc::new(registry),
        classifier,
        config.prefix.clone(),
        config.nlp_confidence_threshold,
    );
    let bot = Arc::new(Bot::new(state.clone(), router, config.filter()));

    tracing::info!("baselard ready");

    tokio::select! {
        // Drive the MQTT event loop + dispatch events
        () = event_loop::run(eventloop, transport, bot) => {
            tracing::error!("event loop exited unexpectedly");
        }
        // Expire abandoned confirmations
        () = sweeper::run(
            &state.confirmations,
            config.sweep_interval(),
            config.confirmation_ttl(),
        ) => {
            tracing::error!("confirmation sweeper exited unexpectedly");
        }
        // Graceful shutdown on SIGINT
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
    }

    tracing::info!("baselard stopped");
    Ok(())
}
