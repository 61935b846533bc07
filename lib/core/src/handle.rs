use crate::engine::Engine;
use crate::error::Result;
use crate::loader::CatalogSource;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{info, warn};

/// Shared owner of the currently served engine.
///
/// Readers take an `Arc<Engine>` snapshot and query it without holding the
/// lock. A rebuilt engine is installed with [`EngineHandle::swap`]; snapshots
/// taken earlier keep the previous engine alive until they are dropped.
#[derive(Debug)]
pub struct EngineHandle {
    current: RwLock<Arc<Engine>>,
}

impl EngineHandle {
    pub fn new(engine: Engine) -> Self {
        Self {
            current: RwLock::new(Arc::new(engine)),
        }
    }

    #[inline]
    pub fn current(&self) -> Arc<Engine> {
        self.current.read().clone()
    }

    /// Install `engine` and return the one it replaced.
    pub fn swap(&self, engine: Engine) -> Arc<Engine> {
        let next = Arc::new(engine);
        std::mem::replace(&mut *self.current.write(), next)
    }

    /// Load and build a fresh engine from `source`, then swap it in.
    ///
    /// On any error the installed engine is left untouched.
    pub fn rebuild_from(&self, source: &dyn CatalogSource) -> Result<Arc<Engine>> {
        let engine = source
            .load()
            .map_err(Into::into)
            .and_then(Engine::build)
            .map_err(|e| {
                warn!("Rebuild from {} failed: {}", source.describe(), e);
                e
            })?;
        let products = engine.len();
        let previous = self.swap(engine);
        info!(
            "Swapped engine: {} -> {} products",
            previous.len(),
            products
        );
        Ok(self.current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::loader::MemorySource;
    use crate::product::{Catalog, ProductRecord};

    fn engine_of(ids: &[&str]) -> Engine {
        let records = ids
            .iter()
            .map(|id| ProductRecord::new(*id, format!("item {}", id), "", ""))
            .collect();
        Engine::build(Catalog::from_records(records).unwrap()).unwrap()
    }

    #[test]
    fn test_swap_keeps_old_snapshot_valid() {
        let handle = EngineHandle::new(engine_of(&["a", "b"]));
        let before = handle.current();

        let previous = handle.swap(engine_of(&["x", "y", "z"]));
        assert_eq!(previous.len(), 2);
        assert_eq!(handle.current().len(), 3);

        // in-flight reader still sees the old catalog
        assert_eq!(before.recommend("a", 5).unwrap(), vec!["b"]);
    }

    #[test]
    fn test_rebuild_from_source() {
        let handle = EngineHandle::new(engine_of(&["a"]));
        let source = MemorySource::new(vec![
            ProductRecord::new("p", "desk lamp", "", ""),
            ProductRecord::new("q", "floor lamp", "", ""),
        ]);
        let engine = handle.rebuild_from(&source).unwrap();
        assert_eq!(engine.len(), 2);
        assert!(handle.current().product("p").is_some());
    }

    #[test]
    fn test_failed_rebuild_keeps_engine() {
        let handle = EngineHandle::new(engine_of(&["a", "b"]));

        let empty = MemorySource::new(Vec::new());
        assert!(matches!(
            handle.rebuild_from(&empty),
            Err(EngineError::EmptyCatalog)
        ));

        let duplicate = MemorySource::new(vec![
            ProductRecord::new("d", "x", "", ""),
            ProductRecord::new("d", "y", "", ""),
        ]);
        assert!(matches!(
            handle.rebuild_from(&duplicate),
            Err(EngineError::Load(_))
        ));

        assert_eq!(handle.current().len(), 2);
    }

    #[test]
    fn test_concurrent_readers() {
        let handle = Arc::new(EngineHandle::new(engine_of(&["a", "b", "c"])));
        let threads: Vec<_> = (0..4)
            .map(|_| {
                let handle = handle.clone();
                std::thread::spawn(move || handle.current().recommend("a", 2).unwrap())
            })
            .collect();
        for t in threads {
            assert_eq!(t.join().unwrap(), vec!["b", "c"]);
        }
    }
}
