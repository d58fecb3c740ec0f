pub mod catalog;
pub mod date;
pub mod resolver;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use catalog::{ExplanationCache, PhraseCatalog, PhraseStore};
pub use date::{day_of_year, day_of_year_at, Clock, FixedClock, SystemClock};
pub use resolver::PhraseResolver;

/// Per-language explanation texts.
pub type Explanations = BTreeMap<Lang, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    En,
    Vi,
    De,
}

impl Lang {
    pub fn code(self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::Vi => "vi",
            Lang::De => "de",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Lang::En => "English",
            Lang::Vi => "Vietnamese",
            Lang::De => "German",
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Lang {
    type Err = PhraseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Lang::En),
            "vi" => Ok(Lang::Vi),
            "de" => Ok(Lang::De),
            _ => Err(PhraseError::UnsupportedLanguage(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum PhraseError {
    #[error("phrase catalog is empty")]
    EmptyCatalog,
    #[error("catalog index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("invalid catalog record at {position}: {reason}")]
    InvalidRecord { position: usize, reason: String },
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),
    #[error("no calendar date at offset {0} days")]
    DateOutOfRange(i64),
    #[error("failed to parse phrase data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl PhraseError {
    /// Errors that mean the shipped data itself is broken.
    pub fn is_data_integrity(&self) -> bool {
        matches!(
            self,
            PhraseError::EmptyCatalog
                | PhraseError::IndexOutOfRange { .. }
                | PhraseError::InvalidRecord { .. }
                | PhraseError::Json(_)
                | PhraseError::Io { .. }
        )
    }
}

/// One catalog entry. Translations are flattened onto language keys in JSON
/// (`{"phrase": .., "en": .., "vi": ..}`), the way the static data ships them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPhrase")]
pub struct PhraseRecord {
    pub phrase: String,
    pub meaning: String,
    #[serde(flatten)]
    pub translations: BTreeMap<Lang, String>,
    pub example: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<Explanations>,
}

impl PhraseRecord {
    pub fn translation(&self, lang: Lang) -> Option<&str> {
        self.translations.get(&lang).map(String::as_str)
    }

    pub fn explanation_for(&self, lang: Lang) -> Option<&str> {
        self.explanation
            .as_ref()
            .and_then(|map| map.get(&lang))
            .map(String::as_str)
    }

    pub fn has_explanation(&self, lang: Lang) -> bool {
        self.explanation_for(lang).is_some_and(|text| !text.trim().is_empty())
    }

    /// Overlays `layer` onto the record; entries in `layer` win.
    pub(crate) fn merge_explanations(&mut self, layer: &Explanations) {
        if layer.is_empty() {
            return;
        }
        let target = self.explanation.get_or_insert_with(Explanations::new);
        for (lang, text) in layer {
            target.insert(*lang, text.clone());
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawPhrase {
    phrase: String,
    meaning: String,
    en: Option<String>,
    vi: Option<String>,
    de: Option<String>,
    example: String,
    #[serde(default)]
    explanation: Option<Explanations>,
}

impl TryFrom<RawPhrase> for PhraseRecord {
    type Error = String;

    fn try_from(raw: RawPhrase) -> Result<Self, Self::Error> {
        if raw.phrase.trim().is_empty() {
            return Err("phrase must not be empty".to_string());
        }

        let mut translations = BTreeMap::new();
        for (lang, value) in [(Lang::En, raw.en), (Lang::Vi, raw.vi), (Lang::De, raw.de)] {
            if let Some(text) = value.filter(|v| !v.trim().is_empty()) {
                translations.insert(lang, text);
            }
        }
        for required in [Lang::En, Lang::Vi] {
            if !translations.contains_key(&required) {
                return Err(format!("\"{}\" is missing the {required} translation", raw.phrase));
            }
        }

        let explanation = raw
            .explanation
            .map(strip_blank)
            .filter(|map| !map.is_empty());

        Ok(Self {
            phrase: raw.phrase,
            meaning: raw.meaning,
            translations,
            example: raw.example,
            explanation,
        })
    }
}

pub(crate) fn strip_blank(mut map: Explanations) -> Explanations {
    map.retain(|_, text| !text.trim().is_empty());
    map
}
