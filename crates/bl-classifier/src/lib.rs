//! Natural-language intent classification.
//!
//! Turns free chat text into a ranked list of `(intent label, confidence)`
//! pairs. The router treats any implementation of `ClassifierGateway` as a
//! black-box oracle.
//!
//! Two implementations:
//! - **UtteranceModel** (local): token-overlap scoring against training
//!   utterances, editable and hot-reloadable at runtime.
//! - **OllamaClassifier** (local LLM): asks an Ollama model to pick a label.

pub mod error;
pub mod gateway;
pub mod model;
pub mod ollama;

pub use error::{ClassificationError, ClassifierResult};
pub use gateway::{ClassificationResult, ClassifierGateway, rank};
pub use model::{IntentUtterances, UtteranceModel};
pub use ollama::{OllamaClassifier, OllamaConfig};
