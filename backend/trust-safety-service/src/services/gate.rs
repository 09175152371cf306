//! Moderation gate.
//!
//! Decision order:
//! 1. nothing to moderate: unflagged, no classifier call, no stats
//! 2. development without a classifier: keyword screen
//! 3. external classifier over the mixed text/image batch
//! 4. classifier failure: fail open in development, fail closed elsewhere
//!
//! Every non-empty call is counted in [`ModerationStats`], including
//! failures.

use super::classifier::ContentClassifier;
use super::keyword_screen;
use super::stats::ModerationStats;
use crate::config::Environment;
use crate::error::{Result, TrustSafetyError};
use crate::metrics::{
    CLASSIFIER_ERRORS_TOTAL, CONTENT_REJECTED_TOTAL, MODERATION_DECISIONS_TOTAL,
    MODERATION_DURATION_SECONDS,
};
use crate::models::{ModeratedContent, ModerationInput, ModerationResult};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, warn};

pub struct ModerationGate {
    classifier: Option<Arc<dyn ContentClassifier>>,
    environment: Environment,
    stats: Arc<ModerationStats>,
}

impl ModerationGate {
    pub fn new(
        classifier: Option<Arc<dyn ContentClassifier>>,
        environment: Environment,
        stats: Arc<ModerationStats>,
    ) -> Self {
        Self {
            classifier,
            environment,
            stats,
        }
    }

    pub fn stats(&self) -> &ModerationStats {
        &self.stats
    }

    /// Convenience form taking the raw fields
    pub async fn moderate_content(
        &self,
        text_content: Option<&str>,
        image_urls: Option<&[String]>,
    ) -> ModerationResult {
        let input = ModerationInput {
            text_content: text_content.map(str::to_string),
            image_urls: image_urls.map(<[String]>::to_vec),
        };
        self.moderate(&input).await
    }

    /// Classify a submission. Never fails; classifier errors become a
    /// fail-open or fail-closed verdict depending on the environment.
    pub async fn moderate(&self, input: &ModerationInput) -> ModerationResult {
        if input.is_empty() {
            record_decision("empty", false, 0.0);
            return ModerationResult::unflagged();
        }

        let started = Instant::now();
        let (path, result) = self.decide(input).await;
        let elapsed = started.elapsed();

        self.stats
            .increment(result.flagged, elapsed.as_secs_f64() * 1000.0);
        record_decision(path, result.flagged, elapsed.as_secs_f64());

        debug!(
            path,
            flagged = result.flagged,
            elapsed_ms = elapsed.as_millis() as u64,
            "Moderation decision"
        );

        result
    }

    async fn decide(&self, input: &ModerationInput) -> (&'static str, ModerationResult) {
        if self.environment.is_development() && self.classifier.is_none() {
            return ("mock", keyword_screen::screen(input));
        }

        let outcome = match &self.classifier {
            Some(classifier) => self.classify(classifier.as_ref(), input).await,
            None => Err(TrustSafetyError::Config(
                "no moderation classifier configured".to_string(),
            )),
        };

        match outcome {
            Ok(result) => ("classifier", result),
            Err(e) => {
                CLASSIFIER_ERRORS_TOTAL.inc();
                if self.environment.is_development() {
                    warn!(error = %e, "Moderation classifier failed, failing open");
                    ("fail_open", ModerationResult::fail_open(&e))
                } else {
                    error!(
                        error = %e,
                        environment = %self.environment,
                        "Moderation classifier failed, failing closed"
                    );
                    ("fail_closed", ModerationResult::fail_closed())
                }
            }
        }
    }

    async fn classify(
        &self,
        classifier: &dyn ContentClassifier,
        input: &ModerationInput,
    ) -> Result<ModerationResult> {
        let items = input.classifier_items();
        let results = classifier.classify(&items).await?;
        aggregate(results).ok_or_else(|| {
            TrustSafetyError::Classifier(format!("{} returned no results", classifier.name()))
        })
    }

    /// Blocking form used before publishing user content
    pub async fn ensure_allowed(
        &self,
        input: &ModerationInput,
        content: ModeratedContent,
    ) -> Result<ModerationResult> {
        let result = self.moderate(input).await;
        if result.flagged {
            CONTENT_REJECTED_TOTAL
                .with_label_values(&[content.as_str()])
                .inc();
            return Err(TrustSafetyError::ContentRejected {
                content_type: content.as_str().to_string(),
                flagged_categories: result.flagged_categories(),
            });
        }
        Ok(result)
    }
}

/// Batch verdict: flagged if any item is; details from the first flagged
/// item, else the first item.
fn aggregate(results: Vec<ModerationResult>) -> Option<ModerationResult> {
    let any_flagged = results.iter().any(|r| r.flagged);
    let chosen = if any_flagged {
        results.into_iter().find(|r| r.flagged)
    } else {
        results.into_iter().next()
    };
    chosen.map(|mut result| {
        result.flagged = any_flagged;
        result
    })
}

fn record_decision(path: &str, flagged: bool, seconds: f64) {
    let verdict = if flagged { "flagged" } else { "clean" };
    MODERATION_DECISIONS_TOTAL
        .with_label_values(&[path, verdict])
        .inc();
    MODERATION_DURATION_SECONDS
        .with_label_values(&[path])
        .observe(seconds);
}
