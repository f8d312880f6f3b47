//! Load-once model cache keyed by artifact path.

use crate::model::{ArtifactError, Pipeline, Predictor};
use parking_lot::RwLock;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

type Loader = dyn Fn(&Path) -> Result<Arc<dyn Predictor>, ArtifactError> + Send + Sync;

pub struct ModelStore {
    loaded: RwLock<HashMap<PathBuf, Arc<dyn Predictor>>>,
    loader: Box<Loader>,
}

impl ModelStore {
    /// Store reading JSON pipeline artifacts from disk.
    pub fn new() -> Self {
        Self::with_loader(|path| Ok(Arc::new(Pipeline::load(path)?) as Arc<dyn Predictor>))
    }

    pub fn with_loader<F>(loader: F) -> Self
    where
        F: Fn(&Path) -> Result<Arc<dyn Predictor>, ArtifactError> + Send + Sync + 'static,
    {
        Self {
            loaded: RwLock::new(HashMap::new()),
            loader: Box::new(loader),
        }
    }

    /// Cached predictor for `path`, loading it on first use. Failed loads are
    /// not cached, so a fixed file is picked up on the next request.
    pub fn get(&self, path: &Path) -> Result<Arc<dyn Predictor>, ArtifactError> {
        if let Some(p) = self.loaded.read().get(path) {
            tracing::debug!("model cache hit {}", path.display());
            return Ok(Arc::clone(p));
        }

        let predictor = (self.loader)(path)?;
        tracing::info!("loaded model '{}' from {}", predictor.name(), path.display());

        // two racing first loads keep whichever landed first
        let mut loaded = self.loaded.write();
        let entry = loaded.entry(path.to_path_buf()).or_insert(predictor);
        Ok(Arc::clone(entry))
    }

    /// Pre-inserts an already built predictor.
    pub fn insert(&self, path: impl Into<PathBuf>, predictor: Arc<dyn Predictor>) {
        self.loaded.write().insert(path.into(), predictor);
    }

    pub fn is_loaded(&self, path: &Path) -> bool {
        self.loaded.read().contains_key(path)
    }

    /// Loads every path, returning the failures instead of stopping at the
    /// first one.
    pub fn preload<'a, I>(&self, paths: I) -> Vec<(PathBuf, ArtifactError)>
    where
        I: IntoIterator<Item = &'a Path>,
    {
        paths
            .into_iter()
            .filter_map(|p| self.get(p).err().map(|e| (p.to_path_buf(), e)))
            .collect()
    }
}

impl Default for ModelStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PredictError;
    use crate::types::{Prediction, Record};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed;

    impl Predictor for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn predict(&self, rows: &[Record]) -> Result<Vec<Prediction>, PredictError> {
            Ok(rows.iter().map(|_| Prediction::Value(1.0)).collect())
        }
    }

    #[test]
    fn loads_once_per_path() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let store = ModelStore::with_loader(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(Fixed) as Arc<dyn Predictor>)
        });

        let a = Path::new("a.json");
        store.get(a).unwrap();
        store.get(a).unwrap();
        store.get(Path::new("b.json")).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(store.is_loaded(a));
    }

    #[test]
    fn failed_loads_are_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let store = ModelStore::with_loader(move |path| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(ArtifactError::Invalid {
                    name: path.display().to_string(),
                    reason: "not yet".into(),
                });
            }
            Ok(Arc::new(Fixed) as Arc<dyn Predictor>)
        });

        let p = Path::new("late.json");
        assert!(store.get(p).is_err());
        assert!(!store.is_loaded(p));
        assert!(store.get(p).is_ok());
    }

    #[test]
    fn preload_collects_failures() {
        let store = ModelStore::new();
        let failures = store.preload([Path::new("missing/one.json"), Path::new("missing/two.json")]);
        assert_eq!(failures.len(), 2);
        assert!(matches!(failures[0].1, ArtifactError::Io { .. }));
    }
}
