//! # kindred Core
//!
//! Core library for kindred content-based product recommendations.
//!
//! This crate provides the catalog model and the similarity engine:
//!
//! - [`ProductRecord`] / [`Catalog`] - Products in load order with unique ids
//! - [`CatalogSource`] - JSON, JSON Lines, SQLite and in-memory loaders
//! - [`TfidfModel`] - Stop-word filtered, smoothed TF-IDF vectors
//! - [`SimilarityMatrix`] - Dense pairwise cosine similarity
//! - [`Engine`] - Top-K similar products by id
//! - [`EngineHandle`] - Atomic swap of a rebuilt engine
//!
//! ## Example
//!
//! ```rust
//! use kindred_core::{Catalog, Engine, ProductRecord};
//!
//! let catalog = Catalog::from_records(vec![
//!     ProductRecord::new("A", "red cotton shirt", "", ""),
//!     ProductRecord::new("B", "blue cotton shirt", "", ""),
//!     ProductRecord::new("C", "wireless bluetooth speaker", "", ""),
//! ])
//! .unwrap();
//!
//! let engine = Engine::build(catalog).unwrap();
//! assert_eq!(engine.recommend("A", 1).unwrap(), vec!["B"]);
//! ```

pub mod engine;
pub mod error;
pub mod handle;
pub mod loader;
pub mod matrix;
pub mod product;
pub mod text;
pub mod tfidf;

pub use engine::{Engine, EngineStats, Recommendation};
pub use error::{EngineError, LoadError, Result};
pub use handle::EngineHandle;
pub use loader::{
    source_from_path, source_from_path_with_table, CatalogSource, JsonFileSource,
    JsonLinesSource, MemorySource, SqliteSource, DEFAULT_TABLE,
};
pub use matrix::SimilarityMatrix;
pub use product::{Catalog, ProductRecord};
pub use tfidf::{TermVector, TfidfModel, Vocabulary};
