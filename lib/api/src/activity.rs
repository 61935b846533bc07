use ahash::AHashMap;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ActivityError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed activity file: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Viewing history per user, oldest first.
///
/// Loaded from a JSON object mapping user ids to product id lists:
/// `{"user123": ["p1", "p7"]}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct UserActivity {
    views: AHashMap<String, Vec<String>>,
}

impl UserActivity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ActivityError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn record_view(&mut self, user_id: impl Into<String>, product_id: impl Into<String>) {
        self.views
            .entry(user_id.into())
            .or_default()
            .push(product_id.into());
    }

    pub fn contains_user(&self, user_id: &str) -> bool {
        self.views.contains_key(user_id)
    }

    /// Most recently viewed product of a user.
    pub fn last_viewed(&self, user_id: &str) -> Option<&str> {
        self.views
            .get(user_id)
            .and_then(|views| views.last())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}
