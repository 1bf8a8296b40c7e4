//! The classifier contract the intent dispatcher consumes.

use async_trait::async_trait;

use crate::error::ClassifierResult;

/// One scored intent label.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub label: String,
    /// Score in [0, 1].
    pub confidence: f64,
}

impl ClassificationResult {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// Black-box intent oracle.
///
/// Implementations return results best-first. An oracle with zero trained
/// labels reports `ClassificationError::Untrained` rather than an empty list.
#[async_trait]
pub trait ClassifierGateway: Send + Sync {
    /// Classify free text into ranked intent labels.
    async fn classify(&self, text: &str) -> ClassifierResult<Vec<ClassificationResult>>;

    /// Name of this classifier (for logging).
    fn name(&self) -> &str;
}

/// Order results by descending confidence. The sort is stable, so equal
/// scores keep the order they arrived in.
pub fn rank(results: &mut [ClassificationResult]) {
    results.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_is_descending_and_stable() {
        let mut results = vec![
            ClassificationResult::new("farewell", 0.5),
            ClassificationResult::new("greeting", 0.9),
            ClassificationResult::new("headpat", 0.5),
            ClassificationResult::new("genshin_mine", 0.9),
        ];
        rank(&mut results);
        let labels: Vec<&str> = results.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["greeting", "genshin_mine", "farewell", "headpat"]);
    }
}
