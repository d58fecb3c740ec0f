use std::sync::Arc;

use chrono::{Days, NaiveDate};

use super::date::{day_of_year, Clock, SystemClock};
use super::{Explanations, PhraseError, PhraseRecord, PhraseStore};

/// Maps calendar dates to catalog entries with explanations merged in.
///
/// Every call returns a fresh `PhraseRecord`; the catalog is never handed
/// out by reference, so callers are free to attach session data to it.
#[derive(Clone)]
pub struct PhraseResolver {
    store: Arc<PhraseStore>,
    clock: Arc<dyn Clock>,
}

impl PhraseResolver {
    pub fn new(store: Arc<PhraseStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn with_system_clock(store: Arc<PhraseStore>) -> Self {
        Self::new(store, Arc::new(SystemClock))
    }

    pub fn store(&self) -> &PhraseStore {
        &self.store
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn index_for(&self, date: NaiveDate) -> usize {
        day_of_year(date) as usize % self.store.catalog().len()
    }

    pub fn resolve_phrase(&self, date: NaiveDate) -> Result<PhraseRecord, PhraseError> {
        self.resolve_phrase_with(date, None)
    }

    /// Resolves `date`, then overlays explanations fetched during the
    /// current session. Cache entries win over the shipped record and
    /// session entries win over the cache.
    pub fn resolve_phrase_with(
        &self,
        date: NaiveDate,
        runtime: Option<&Explanations>,
    ) -> Result<PhraseRecord, PhraseError> {
        let index = self.index_for(date);
        let mut record = self.store.catalog().get(index)?.clone();
        self.attach_cached(&mut record);
        if let Some(runtime) = runtime {
            record.merge_explanations(runtime);
        }
        Ok(record)
    }

    pub fn resolve_today(&self) -> Result<PhraseRecord, PhraseError> {
        self.resolve_phrase(self.today())
    }

    pub fn resolve_for_offset(&self, offset_days: i64) -> Result<PhraseRecord, PhraseError> {
        self.resolve_phrase(self.date_for_offset(offset_days)?)
    }

    pub fn date_for_offset(&self, offset_days: i64) -> Result<NaiveDate, PhraseError> {
        let today = self.today();
        let days = Days::new(offset_days.unsigned_abs());
        let shifted = if offset_days >= 0 {
            today.checked_add_days(days)
        } else {
            today.checked_sub_days(days)
        };
        shifted.ok_or(PhraseError::DateOutOfRange(offset_days))
    }

    /// Looks a record up by its exact phrase text.
    pub fn find(&self, phrase: &str) -> Option<PhraseRecord> {
        let index = self.store.catalog().position(phrase)?;
        let mut record = self.store.catalog().get(index).ok()?.clone();
        self.attach_cached(&mut record);
        Some(record)
    }

    fn attach_cached(&self, record: &mut PhraseRecord) {
        if let Some(cached) = self.store.cache().get(&record.phrase) {
            record.merge_explanations(cached);
        }
    }
}
