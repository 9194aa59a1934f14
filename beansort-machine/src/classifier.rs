//! Classification collaborator
//!
//! The engine calls the classifier exactly once per item during the
//! scanning hold and treats it as potentially slow: the call is async and
//! nothing in the engine assumes a synchronous return. Production
//! deployments swap [`RandomClassifier`] for a real inference client
//! without touching the engine.

use async_trait::async_trait;
use beansort_common::types::{Classification, ClassificationFailed, ClassifyOutcome, ItemSnapshot, RoastClass};
use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Duration;
use tracing::debug;

/// External classification operation
///
/// Returns either a `(label, confidence)` pair or the failure marker. A
/// failure is a normal lifecycle outcome (the item routes to the error
/// lane), never an `Error`.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, item: &ItemSnapshot) -> ClassifyOutcome;
}

/// Default latency simulated by the stub classifier
pub const DEFAULT_STUB_LATENCY: Duration = Duration::from_millis(150);

/// Stub classifier standing in for real inference
///
/// Produces a uniformly random class from its configured list with a
/// confidence in [0.75, 0.99), or the failure marker with the configured
/// probability, after a short simulated inference latency.
pub struct RandomClassifier {
    classes: Vec<RoastClass>,
    error_probability: f64,
    latency: Duration,
}

impl RandomClassifier {
    /// Create a stub over the given class list
    ///
    /// An empty list falls back to the canonical ordering; the probability
    /// is clamped to [0, 1].
    pub fn new(classes: Vec<RoastClass>, error_probability: f64) -> Self {
        let classes = if classes.is_empty() {
            RoastClass::default_order()
        } else {
            classes
        };
        Self {
            classes,
            error_probability: error_probability.clamp(0.0, 1.0),
            latency: DEFAULT_STUB_LATENCY,
        }
    }

    /// Override the simulated inference latency
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

#[async_trait]
impl Classifier for RandomClassifier {
    async fn classify(&self, item: &ItemSnapshot) -> ClassifyOutcome {
        tokio::time::sleep(self.latency).await;

        // ThreadRng is not Send; keep it out of scope across the await above.
        let outcome = {
            let mut rng = rand::thread_rng();
            if rng.gen_bool(self.error_probability) {
                Err(ClassificationFailed)
            } else {
                let label = *self
                    .classes
                    .choose(&mut rng)
                    .expect("class list is never empty");
                let confidence = 0.75 + rng.gen::<f64>() * 0.24;
                Ok(Classification { label, confidence })
            }
        };

        debug!("stub classified {}: {:?}", item.id, outcome);
        outcome
    }
}
