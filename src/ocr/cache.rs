//! Process-wide store of constructed recognition engines.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Instant;

use tracing::{debug, info};

use super::backend::{EngineFactory, OcrError, RecognitionEngine};
use super::languages::LanguageSet;

type EngineKey = BTreeSet<&'static str>;

/// Engines keyed by language set.
///
/// Entries are built on first request and kept for the lifetime of the
/// cache. Lookups of built entries only take a read lock; construction is
/// serialized behind a separate mutex so each language set is built at most
/// once even when several requests miss at the same time.
pub struct EngineCache {
    factory: Arc<dyn EngineFactory>,
    engines: RwLock<HashMap<EngineKey, Arc<dyn RecognitionEngine>>>,
    build_lock: Mutex<()>,
}

impl EngineCache {
    pub fn new(factory: Arc<dyn EngineFactory>) -> Self {
        Self {
            factory,
            engines: RwLock::new(HashMap::new()),
            build_lock: Mutex::new(()),
        }
    }

    /// Name of the backend the cache builds engines with.
    pub fn backend_name(&self) -> &'static str {
        self.factory.name()
    }

    /// Return the engine for `languages`, constructing it on first use.
    pub fn get(&self, languages: &LanguageSet) -> Result<Arc<dyn RecognitionEngine>, OcrError> {
        if languages.is_empty() {
            return Err(OcrError::Configuration(
                "at least one language must be selected".to_string(),
            ));
        }

        let key = languages.key();
        if let Some(engine) = self.lookup(&key) {
            debug!("Engine cache hit for [{}]", languages);
            return Ok(engine);
        }

        let _guard = self
            .build_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // Another request may have finished building while we waited.
        if let Some(engine) = self.lookup(&key) {
            debug!("Engine for [{}] built by a concurrent request", languages);
            return Ok(engine);
        }

        let start = Instant::now();
        let engine = self.factory.construct(languages)?;
        info!(
            "Constructed {} engine for [{}] in {}ms",
            self.factory.name(),
            languages,
            start.elapsed().as_millis()
        );

        self.engines
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, engine.clone());

        Ok(engine)
    }

    /// Number of engines built so far.
    pub fn len(&self) -> usize {
        self.engines
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, key: &EngineKey) -> Option<Arc<dyn RecognitionEngine>> {
        self.engines
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}
