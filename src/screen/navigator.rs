use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::phrases::{Explanations, Lang, PhraseError, PhraseRecord, PhraseResolver};
use crate::services::explanation_client::{ExplainRequest, FetchError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationCommand {
    Previous,
    Next,
    Today,
}

/// Issued by `request_explanation`; hand it back with the fetch result.
#[derive(Debug, Clone)]
pub struct ExplanationTicket {
    generation: u64,
    request: ExplainRequest,
}

impl ExplanationTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn request(&self) -> &ExplainRequest {
        &self.request
    }
}

#[derive(Debug)]
pub enum ExplanationOutcome {
    /// Merged into the displayed record.
    Applied,
    /// The screen moved on since the request was issued; result dropped.
    Stale,
    Failed(FetchError),
}

/// Everything the display layer needs to draw the screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenView {
    pub record: PhraseRecord,
    pub offset_days: i64,
    pub date: NaiveDate,
    pub target_lang: Lang,
    pub loading: bool,
    pub collapsed: bool,
    pub can_go_next: bool,
    pub notice: Option<String>,
}

/// Day-by-day phrase navigation with on-demand explanations.
///
/// `offset_days` never goes above zero. Every change of the displayed
/// record bumps `generation`; fetch results carrying an older generation
/// are discarded so a slow response for one phrase can never land on
/// another.
pub struct PhraseNavigator {
    resolver: PhraseResolver,
    offset_days: i64,
    date: NaiveDate,
    record: PhraseRecord,
    target_lang: Lang,
    collapsed: bool,
    generation: u64,
    runtime: Explanations,
    in_flight: HashMap<(String, Lang), u64>,
    notice: Option<String>,
}

impl PhraseNavigator {
    pub fn new(resolver: PhraseResolver, target_lang: Lang) -> Result<Self, PhraseError> {
        let date = resolver.date_for_offset(0)?;
        let record = resolver.resolve_phrase(date)?;
        Ok(Self {
            collapsed: !record.has_explanation(target_lang),
            resolver,
            offset_days: 0,
            date,
            record,
            target_lang,
            generation: 0,
            runtime: Explanations::new(),
            in_flight: HashMap::new(),
            notice: None,
        })
    }

    pub fn offset_days(&self) -> i64 {
        self.offset_days
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn record(&self) -> &PhraseRecord {
        &self.record
    }

    pub fn target_lang(&self) -> Lang {
        self.target_lang
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// True while a fetch for the displayed phrase in the active language
    /// is pending.
    pub fn is_loading(&self) -> bool {
        self.in_flight
            .contains_key(&(self.record.phrase.clone(), self.target_lang))
    }

    pub fn can_go_next(&self) -> bool {
        self.offset_days < 0
    }

    /// Applies `command`; returns whether the displayed day changed.
    pub fn navigate(&mut self, command: NavigationCommand) -> Result<bool, PhraseError> {
        match command {
            NavigationCommand::Previous => self.go_previous(),
            NavigationCommand::Next => self.go_next(),
            NavigationCommand::Today => self.go_today(),
        }
    }

    pub fn go_previous(&mut self) -> Result<bool, PhraseError> {
        let target = self
            .offset_days
            .checked_sub(1)
            .ok_or(PhraseError::DateOutOfRange(self.offset_days))?;
        self.move_to(target)
    }

    pub fn go_next(&mut self) -> Result<bool, PhraseError> {
        if !self.can_go_next() {
            return Ok(false);
        }
        self.move_to(self.offset_days + 1)
    }

    pub fn go_today(&mut self) -> Result<bool, PhraseError> {
        if self.offset_days == 0 {
            return Ok(false);
        }
        self.move_to(0)
    }

    /// Re-resolves the current offset, e.g. after the clock passed midnight.
    /// Explanations fetched this session survive only while the calendar
    /// date is unchanged; a new date starts from the cache alone, even when
    /// it rotates onto the same phrase. Returns whether the record was
    /// replaced.
    pub fn refresh(&mut self) -> Result<bool, PhraseError> {
        let date = self.resolver.date_for_offset(self.offset_days)?;
        if date == self.date {
            let record = self.resolver.resolve_phrase_with(date, Some(&self.runtime))?;
            if record.phrase == self.record.phrase {
                self.record = record;
                return Ok(false);
            }
        }

        let record = self.resolver.resolve_phrase(date)?;
        self.date = date;
        self.replace_record(record);
        Ok(true)
    }

    pub fn set_target_lang(&mut self, lang: Lang) {
        if lang == self.target_lang {
            return;
        }
        self.target_lang = lang;
        self.notice = None;
        if !self.record.has_explanation(lang) {
            self.collapsed = true;
        }
    }

    pub fn toggle_collapsed(&mut self) {
        self.collapsed = !self.collapsed;
    }

    /// Starts an explanation fetch for the displayed phrase in the active
    /// language. Returns `None` when one is already present or pending.
    pub fn request_explanation(&mut self) -> Option<ExplanationTicket> {
        let lang = self.target_lang;
        if self.record.has_explanation(lang) {
            tracing::debug!(phrase = %self.record.phrase, %lang, "explanation already present");
            return None;
        }

        let key = (self.record.phrase.clone(), lang);
        if self.in_flight.contains_key(&key) {
            tracing::debug!(phrase = %self.record.phrase, %lang, "explanation fetch already pending");
            return None;
        }
        self.in_flight.insert(key, self.generation);
        self.notice = None;

        Some(ExplanationTicket {
            generation: self.generation,
            request: ExplainRequest {
                phrase: self.record.phrase.clone(),
                meaning: self.record.meaning.clone(),
                example: self.record.example.clone(),
                target_lang: lang,
            },
        })
    }

    /// Commits a finished fetch if it still belongs to the displayed record.
    pub fn complete_explanation(
        &mut self,
        ticket: ExplanationTicket,
        result: Result<String, FetchError>,
    ) -> ExplanationOutcome {
        let ExplanationTicket { generation, request } = ticket;
        let lang = request.target_lang;
        let key = (request.phrase, lang);
        if self.in_flight.get(&key) == Some(&generation) {
            self.in_flight.remove(&key);
        }

        if generation != self.generation {
            tracing::debug!(
                phrase = %key.0,
                %lang,
                ticket_generation = generation,
                current_generation = self.generation,
                "discarding stale explanation"
            );
            return ExplanationOutcome::Stale;
        }

        match result {
            Ok(text) => {
                self.runtime.insert(lang, text.clone());
                self.record.merge_explanations(&Explanations::from([(lang, text)]));
                if lang == self.target_lang {
                    self.collapsed = false;
                }
                self.notice = None;
                ExplanationOutcome::Applied
            }
            Err(err) => {
                tracing::warn!(phrase = %key.0, %lang, error = %err, "explanation fetch failed");
                self.notice = Some(err.user_notice().to_string());
                ExplanationOutcome::Failed(err)
            }
        }
    }

    pub fn view(&self) -> ScreenView {
        ScreenView {
            record: self.record.clone(),
            offset_days: self.offset_days,
            date: self.date,
            target_lang: self.target_lang,
            loading: self.is_loading(),
            collapsed: self.collapsed,
            can_go_next: self.can_go_next(),
            notice: self.notice.clone(),
        }
    }

    fn move_to(&mut self, offset_days: i64) -> Result<bool, PhraseError> {
        let date = self.resolver.date_for_offset(offset_days)?;
        let record = self.resolver.resolve_phrase(date)?;
        self.offset_days = offset_days;
        self.date = date;
        self.replace_record(record);
        Ok(true)
    }

    fn replace_record(&mut self, record: PhraseRecord) {
        self.generation += 1;
        self.runtime.clear();
        self.notice = None;
        self.collapsed = !record.has_explanation(self.target_lang);
        self.record = record;
    }
}
