//! Confidence-gated intent dispatch.
//!
//! Free text goes to the classifier; the best label is acted on only when
//! its confidence clears the threshold. Every failure mode here is silent
//! towards the chat: a bot sharing a channel with humans should rather say
//! nothing than answer something unrelated.

use std::cmp::Ordering;
use std::sync::{Arc, PoisonError, RwLock};

use bl_classifier::{ClassificationResult, ClassifierGateway};
use bl_protocol::MessageEvent;

use crate::error::DispatchError;
use crate::handler::IntentInvocation;
use crate::registry::Registry;

pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.9;

/// What happened to one message at the intent stage.
#[derive(Debug)]
pub enum IntentOutcome {
    /// The classifier errored (unavailable, untrained, malformed output).
    ClassifierFailed,
    /// The classifier produced no usable result.
    NoResult,
    BelowThreshold { label: String, confidence: f64 },
    /// The winning label has no registered handler.
    Unhandled { label: String, confidence: f64 },
    Handled { label: String, confidence: f64 },
    Failed(DispatchError),
}

impl IntentOutcome {
    /// True when an intent handler ran (successfully or not).
    pub fn invoked_handler(&self) -> bool {
        matches!(self, Self::Handled { .. } | Self::Failed(_))
    }
}

/// Routes unprefixed messages to intent handlers via a classifier.
pub struct IntentDispatcher {
    registry: Arc<Registry>,
    classifier: RwLock<Arc<dyn ClassifierGateway>>,
    threshold: f64,
}

impl IntentDispatcher {
    pub fn new(
        registry: Arc<Registry>,
        classifier: Arc<dyn ClassifierGateway>,
        threshold: f64,
    ) -> Self {
        Self {
            registry,
            classifier: RwLock::new(classifier),
            threshold,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Swap the classifier. Dispatches already in flight finish on the one
    /// they started with.
    pub fn set_classifier(&self, classifier: Arc<dyn ClassifierGateway>) {
        let name = classifier.name().to_string();
        *self
            .classifier
            .write()
            .unwrap_or_else(PoisonError::into_inner) = classifier;
        tracing::info!(classifier = %name, "intent classifier replaced");
    }

    fn classifier(&self) -> Arc<dyn ClassifierGateway> {
        self.classifier
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Order results best-first. Equal confidences go to the intent that
    /// registered first; labels without a handler sort after those with one.
    /// NaN scores are discarded.
    pub fn rank(&self, mut results: Vec<ClassificationResult>) -> Vec<ClassificationResult> {
        results.retain(|r| !r.confidence.is_nan());
        results.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
                .then_with(|| self.order_of(&a.label).cmp(&self.order_of(&b.label)))
        });
        results
    }

    fn order_of(&self, label: &str) -> usize {
        self.registry.intent_order(label).unwrap_or(usize::MAX)
    }

    pub async fn dispatch(&self, message: &MessageEvent) -> IntentOutcome {
        let classifier = self.classifier();
        let results = match classifier.classify(&message.text).await {
            Ok(results) => results,
            Err(e) => {
                tracing::debug!(classifier = classifier.name(), error = %e, "classification failed");
                return IntentOutcome::ClassifierFailed;
            }
        };

        let Some(top) = self.rank(results).into_iter().next() else {
            return IntentOutcome::NoResult;
        };
        let ClassificationResult { label, confidence } = top;

        if confidence < self.threshold {
            tracing::debug!(
                label = %label,
                confidence,
                threshold = self.threshold,
                "best intent below threshold"
            );
            return IntentOutcome::BelowThreshold { label, confidence };
        }

        let Some(handler) = self.registry.resolve_intent(&label) else {
            tracing::warn!(
                label = %label,
                confidence,
                classifier = classifier.name(),
                "classifier returned a label with no registered handler"
            );
            return IntentOutcome::Unhandled { label, confidence };
        };

        tracing::info!(label = %label, confidence, author = %message.author_id, "dispatching intent");
        let invocation = IntentInvocation {
            author: message.author_id,
            confidence,
            message,
        };

        match handler.on_intent_detected(invocation).await {
            Ok(()) => IntentOutcome::Handled { label, confidence },
            Err(cause) => {
                tracing::error!(label = %label, error = %format!("{cause:#}"), "intent handler failed");
                IntentOutcome::Failed(DispatchError::Intent { label, cause })
            }
        }
    }
}
