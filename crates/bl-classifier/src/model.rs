//! Utterance model: token-overlap intent scoring with live retraining.
//!
//! Training data is a list of intents, each with example utterances. An
//! intent's score for a text is the best Jaccard similarity between the
//! text's word set and any of its utterances' word sets.
//!
//! Edits (`add_utterance`) go to the training data and the backing file
//! immediately but only affect classification after `reload()`, which
//! swaps in a freshly trained snapshot. A `classify` call clones the
//! snapshot `Arc` up front, so it sees either the old or the new model.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock, Mutex, PoisonError, RwLock};

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ClassificationError, ClassifierResult};
use crate::gateway::{ClassificationResult, ClassifierGateway, rank};

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z0-9']+").expect("word pattern is valid"));

/// Training data for one intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentUtterances {
    pub label: String,
    #[serde(default)]
    pub utterances: Vec<String>,
}

impl IntentUtterances {
    pub fn new(label: impl Into<String>, utterances: &[&str]) -> Self {
        Self {
            label: label.into(),
            utterances: utterances.iter().map(|u| u.to_string()).collect(),
        }
    }
}

/// On-disk layout of the utterance file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct IntentFile {
    #[serde(default)]
    intents: Vec<IntentUtterances>,
}

/// Immutable trained snapshot.
#[derive(Debug, Default)]
struct Trained {
    intents: Vec<(String, Vec<HashSet<String>>)>,
}

impl Trained {
    fn train(data: &[IntentUtterances]) -> Self {
        let intents = data
            .iter()
            .map(|intent| {
                let sets = intent
                    .utterances
                    .iter()
                    .map(|u| tokenize(u))
                    .filter(|set| !set.is_empty())
                    .collect();
                (intent.label.clone(), sets)
            })
            .collect();
        Self { intents }
    }

    fn score(&self, text: &str) -> Vec<ClassificationResult> {
        let words = tokenize(text);
        self.intents
            .iter()
            .map(|(label, sets)| {
                let best = sets
                    .iter()
                    .map(|set| jaccard(&words, set))
                    .fold(0.0_f64, f64::max);
                ClassificationResult::new(label.clone(), best)
            })
            .collect()
    }
}

fn tokenize(text: &str) -> HashSet<String> {
    let lower = text.to_lowercase();
    WORD.find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let shared = a.intersection(b).count() as f64;
    let union = a.union(b).count() as f64;
    shared / union
}

/// Editable, hot-reloadable intent model.
pub struct UtteranceModel {
    /// Backing file; `None` keeps edits in memory only.
    path: Option<PathBuf>,
    data: Mutex<Vec<IntentUtterances>>,
    trained: RwLock<Arc<Trained>>,
    changed: AtomicBool,
}

impl UtteranceModel {
    /// Build an in-memory model and train it immediately.
    pub fn from_intents(intents: Vec<IntentUtterances>) -> Self {
        let trained = Trained::train(&intents);
        Self {
            path: None,
            data: Mutex::new(intents),
            trained: RwLock::new(Arc::new(trained)),
            changed: AtomicBool::new(false),
        }
    }

    /// Load training data from a JSON utterance file and train on it.
    ///
    /// A missing file yields an empty (untrained) model that will create
    /// the file on the first edit.
    pub fn load(path: impl AsRef<Path>) -> ClassifierResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str::<IntentFile>(&contents)
                .map_err(|e| ClassificationError::Serialization(e.to_string()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "utterance file missing, starting untrained");
                IntentFile::default()
            }
            Err(e) => return Err(ClassificationError::Io(e.to_string())),
        };

        let mut model = Self::from_intents(file.intents);
        model.path = Some(path);
        Ok(model)
    }

    /// Intent labels in training order.
    pub fn intents(&self) -> Vec<String> {
        self.data()
            .iter()
            .map(|intent| intent.label.clone())
            .collect()
    }

    /// Training utterances for one intent, including unreloaded edits.
    pub fn utterances(&self, label: &str) -> Option<Vec<String>> {
        self.data()
            .iter()
            .find(|intent| intent.label == label)
            .map(|intent| intent.utterances.clone())
    }

    /// Whether edits exist that `reload()` has not yet applied.
    pub fn has_pending_changes(&self) -> bool {
        self.changed.load(Ordering::SeqCst)
    }

    /// Add a training utterance to an existing intent and persist it.
    pub fn add_utterance(&self, label: &str, utterance: &str) -> ClassifierResult<()> {
        let utterance = utterance.trim();
        if tokenize(utterance).is_empty() {
            return Err(ClassificationError::EmptyUtterance);
        }

        let mut data = self.data();
        let intent = data
            .iter_mut()
            .find(|intent| intent.label == label)
            .ok_or_else(|| ClassificationError::UnknownIntent(label.to_string()))?;

        if intent
            .utterances
            .iter()
            .any(|u| u.eq_ignore_ascii_case(utterance))
        {
            return Err(ClassificationError::DuplicateUtterance {
                label: label.to_string(),
                utterance: utterance.to_string(),
            });
        }

        intent.utterances.push(utterance.to_string());
        if let Err(e) = self.persist(&data) {
            // Keep memory and disk in agreement.
            if let Some(intent) = data.iter_mut().find(|intent| intent.label == label) {
                intent.utterances.pop();
            }
            return Err(e);
        }
        self.changed.store(true, Ordering::SeqCst);
        drop(data);

        tracing::info!(intent = %label, utterance = %utterance, "training utterance added");
        Ok(())
    }

    /// Retrain from the current training data and swap the snapshot in.
    /// Returns the number of trained intents.
    ///
    /// The training data stays locked until the pending flag is cleared, so
    /// an edit racing the reload keeps its flag.
    pub fn reload(&self) -> usize {
        let data = self.data();
        let trained = Trained::train(&data);
        let count = trained.intents.len();
        *self.trained.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(trained);
        self.changed.store(false, Ordering::SeqCst);
        drop(data);
        tracing::info!(intents = count, "utterance model reloaded");
        count
    }

    fn data(&self) -> std::sync::MutexGuard<'_, Vec<IntentUtterances>> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self) -> Arc<Trained> {
        self.trained
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn persist(&self, data: &[IntentUtterances]) -> ClassifierResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let file = IntentFile {
            intents: data.to_vec(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| ClassificationError::Serialization(e.to_string()))?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| ClassificationError::Io(e.to_string()))?;
        std::fs::rename(&tmp, path).map_err(|e| ClassificationError::Io(e.to_string()))
    }
}

#[async_trait]
impl ClassifierGateway for UtteranceModel {
    async fn classify(&self, text: &str) -> ClassifierResult<Vec<ClassificationResult>> {
        let snapshot = self.snapshot();
        if snapshot.intents.is_empty() {
            return Err(ClassificationError::Untrained);
        }
        let mut results = snapshot.score(text);
        rank(&mut results);
        Ok(results)
    }

    fn name(&self) -> &str {
        "utterance"
    }
}
