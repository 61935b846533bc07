//! # kindred
//!
//! Content-based product recommendations over an in-memory catalog.
//!
//! kindred turns each product's name, category and description into a
//! TF-IDF vector, precomputes the full cosine similarity matrix once, and
//! then answers "top-K products most similar to X" with a row lookup and a
//! sort.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! kindred --catalog data/db.sqlite3 --http-port 8000
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use kindred::prelude::*;
//!
//! let catalog = Catalog::from_records(vec![
//!     ProductRecord::new("A", "red cotton shirt", "", ""),
//!     ProductRecord::new("B", "blue cotton shirt", "", ""),
//!     ProductRecord::new("C", "wireless bluetooth speaker", "", ""),
//! ])
//! .unwrap();
//!
//! let engine = Engine::build(catalog).unwrap();
//! assert_eq!(engine.recommend("A", 2).unwrap(), vec!["B", "C"]);
//! ```
//!
//! ## Crate Structure
//!
//! - `kindred-core` - Catalog, loaders, TF-IDF, similarity matrix, engine
//! - `kindred-explain` - Optional LLM explanations with a fixed fallback
//! - `kindred-api` - REST API

// Re-export core types
pub use kindred_core::{
    source_from_path, source_from_path_with_table, Catalog, CatalogSource, Engine, EngineError,
    EngineHandle, EngineStats, JsonFileSource, JsonLinesSource, LoadError, MemorySource,
    ProductRecord, Recommendation, Result, SqliteSource,
};

// Re-export explanations
pub use kindred_explain::{
    ChatCompletionsExplainer, DisabledExplainer, ExplainError, Explainer, FallbackExplainer,
};

// Re-export API
pub use kindred_api::{ActivityError, AppState, RestApi, UserActivity};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Catalog, CatalogSource, Engine, EngineError, EngineHandle, LoadError, ProductRecord,
        Recommendation, Result,
    };
}
