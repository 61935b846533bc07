//! # kindred Explain
//!
//! Short natural-language explanations for recommendations.
//!
//! An [`Explainer`] turns a source product and a recommended product into a
//! one-sentence reason. Explanations are optional decoration: callers go
//! through [`FallbackExplainer`], which never fails and never touches the
//! ranked recommendation list.

pub mod client;
pub mod error;
pub mod fallback;
pub mod prompt;

pub use client::{ChatCompletionsExplainer, DisabledExplainer, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use error::ExplainError;
pub use fallback::{FallbackExplainer, FALLBACK_EXPLANATION};
pub use prompt::build_prompt;

use async_trait::async_trait;
use kindred_core::ProductRecord;

/// Produces a reason for recommending `recommended` to someone who viewed
/// `source`.
#[async_trait]
pub trait Explainer: Send + Sync {
    async fn explain(
        &self,
        source: &ProductRecord,
        recommended: &ProductRecord,
    ) -> Result<String, ExplainError>;
}
