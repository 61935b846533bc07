use crate::Explainer;
use kindred_core::ProductRecord;
use tracing::warn;

/// Returned whenever an explanation cannot be produced.
pub const FALLBACK_EXPLANATION: &str =
    "We think you'll like this product based on your recent activity.";

/// Wraps an [`Explainer`] so that callers always get a string back.
pub struct FallbackExplainer<E: ?Sized> {
    inner: Box<E>,
}

impl<E: Explainer + ?Sized> FallbackExplainer<E> {
    pub fn new(inner: Box<E>) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    /// The inner explanation, or [`FALLBACK_EXPLANATION`] on any error.
    pub async fn explain_or_fallback(
        &self,
        source: &ProductRecord,
        recommended: &ProductRecord,
    ) -> String {
        match self.inner.explain(source, recommended).await {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    "Explanation for {} -> {} failed: {}",
                    source.id, recommended.id, e
                );
                FALLBACK_EXPLANATION.to_string()
            }
        }
    }
}
