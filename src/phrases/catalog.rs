use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use super::{strip_blank, Explanations, PhraseError, PhraseRecord};

const EMBEDDED_CATALOG: &str = include_str!("../../data/phrases.json");
const EMBEDDED_EXPLANATIONS: &str = include_str!("../../data/explanations.json");

static EMBEDDED: OnceLock<Arc<PhraseStore>> = OnceLock::new();

/// Fixed, non-empty, ordered list of phrases.
#[derive(Debug, Clone)]
pub struct PhraseCatalog {
    records: Vec<PhraseRecord>,
}

impl PhraseCatalog {
    pub fn new(records: Vec<PhraseRecord>) -> Result<Self, PhraseError> {
        if records.is_empty() {
            return Err(PhraseError::EmptyCatalog);
        }
        Ok(Self { records })
    }

    pub fn from_json(raw: &str) -> Result<Self, PhraseError> {
        let values: Vec<serde_json::Value> = serde_json::from_str(raw)?;
        let mut records = Vec::with_capacity(values.len());
        for (position, value) in values.into_iter().enumerate() {
            let record = serde_json::from_value::<PhraseRecord>(value).map_err(|err| {
                PhraseError::InvalidRecord {
                    position,
                    reason: err.to_string(),
                }
            })?;
            records.push(record);
        }
        Self::new(records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Never true for a constructed catalog.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&PhraseRecord, PhraseError> {
        self.records.get(index).ok_or(PhraseError::IndexOutOfRange {
            index,
            len: self.records.len(),
        })
    }

    pub fn position(&self, phrase: &str) -> Option<usize> {
        self.records.iter().position(|record| record.phrase == phrase)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PhraseRecord> {
        self.records.iter()
    }
}

/// Pre-written explanations keyed by exact phrase text.
#[derive(Debug, Clone, Default)]
pub struct ExplanationCache {
    entries: HashMap<String, Explanations>,
}

impl ExplanationCache {
    pub fn new(entries: HashMap<String, Explanations>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(phrase, texts)| (phrase, strip_blank(texts)))
            .filter(|(_, texts)| !texts.is_empty())
            .collect();
        Self { entries }
    }

    pub fn from_json(raw: &str) -> Result<Self, PhraseError> {
        let entries: HashMap<String, Explanations> = serde_json::from_str(raw)?;
        Ok(Self::new(entries))
    }

    pub fn get(&self, phrase: &str) -> Option<&Explanations> {
        self.entries.get(phrase)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Read-only phrase data shared by every resolver in the process.
#[derive(Debug, Clone)]
pub struct PhraseStore {
    catalog: PhraseCatalog,
    cache: ExplanationCache,
}

impl PhraseStore {
    pub fn new(catalog: PhraseCatalog, cache: ExplanationCache) -> Self {
        Self { catalog, cache }
    }

    pub fn from_json(catalog: &str, explanations: &str) -> Result<Self, PhraseError> {
        Ok(Self::new(
            PhraseCatalog::from_json(catalog)?,
            ExplanationCache::from_json(explanations)?,
        ))
    }

    /// The data compiled into the binary, parsed once per process.
    pub fn embedded() -> Result<Arc<Self>, PhraseError> {
        if let Some(store) = EMBEDDED.get() {
            return Ok(Arc::clone(store));
        }
        let store = Arc::new(Self::from_json(EMBEDDED_CATALOG, EMBEDDED_EXPLANATIONS)?);
        Ok(Arc::clone(EMBEDDED.get_or_init(|| store)))
    }

    /// Loads the catalog and cache from files, falling back to the embedded
    /// copy for whichever path is not given.
    pub fn load(
        catalog_path: Option<&Path>,
        explanations_path: Option<&Path>,
    ) -> Result<Arc<Self>, PhraseError> {
        if catalog_path.is_none() && explanations_path.is_none() {
            return Self::embedded();
        }

        let catalog = match catalog_path {
            Some(path) => PhraseCatalog::from_json(&read_file(path)?)?,
            None => PhraseCatalog::from_json(EMBEDDED_CATALOG)?,
        };
        let cache = match explanations_path {
            Some(path) => ExplanationCache::from_json(&read_file(path)?)?,
            None => ExplanationCache::from_json(EMBEDDED_EXPLANATIONS)?,
        };

        tracing::info!(
            phrases = catalog.len(),
            cached_explanations = cache.len(),
            "phrase data loaded from files"
        );
        Ok(Arc::new(Self::new(catalog, cache)))
    }

    pub fn catalog(&self) -> &PhraseCatalog {
        &self.catalog
    }

    pub fn cache(&self) -> &ExplanationCache {
        &self.cache
    }
}

fn read_file(path: &Path) -> Result<String, PhraseError> {
    std::fs::read_to_string(path).map_err(|source| PhraseError::Io {
        path: path.display().to_string(),
        source,
    })
}
