// src/transcript.rs
//
// Running transcript for one dictation session.
// The recognizer delivers results in batches; final segments are committed to
// the transcript, interim ones are only displayed. Every commit refreshes the
// pending correction suggestions and the list of glossary terms seen so far.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::EngineSettings;
use crate::error::GlossaryError;
use crate::fuzzy_matcher::FuzzyIndex;
use crate::glossary::{Glossary, GlossaryEntry};
use crate::suggestion::{InlineSuggestion, SuggestedReplacement, SuggestionEngine};
use crate::term_scanner::{dedup_by_korean, HighlightSegment, TermScanner};
use crate::text_mutator::replace_word_in_text;

/// One segment of a recognizer callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub transcript: String,
    pub is_final: bool,
}

impl RecognitionResult {
    pub fn interim(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: false,
        }
    }

    pub fn final_text(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: true,
        }
    }
}

/// Everything built from the glossary at startup, shared by all sessions
#[derive(Debug)]
pub struct DictationEngine {
    glossary: Arc<Glossary>,
    scanner: TermScanner,
    suggestions: SuggestionEngine,
    settings: EngineSettings,
}

impl DictationEngine {
    pub fn new(glossary: Arc<Glossary>, settings: EngineSettings) -> Self {
        let index = FuzzyIndex::new(Arc::clone(&glossary), settings.search.clone());
        let suggestions = SuggestionEngine::new(index, settings.suggestions.clone());
        let scanner = TermScanner::new(Arc::clone(&glossary), settings.highlight.clone());

        info!(
            "[DictationEngine] Ready with {} terms in {} categories",
            glossary.len(),
            glossary.categories().len()
        );

        Self {
            glossary,
            scanner,
            suggestions,
            settings,
        }
    }

    /// Engine over the bundled automotive glossary
    pub fn builtin(settings: EngineSettings) -> Result<Self, GlossaryError> {
        let glossary = Glossary::builtin()?;
        Ok(Self::new(Arc::new(glossary), settings))
    }

    pub fn glossary(&self) -> &Glossary {
        &self.glossary
    }

    pub fn scanner(&self) -> &TermScanner {
        &self.scanner
    }

    pub fn suggestions(&self) -> &SuggestionEngine {
        &self.suggestions
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }
}

#[derive(Debug)]
pub struct TranscriptSession {
    engine: Arc<DictationEngine>,
    committed: String,
    interim: String,
    suggestions: Vec<SuggestedReplacement>,
    found_terms: Vec<GlossaryEntry>,
}

impl TranscriptSession {
    pub fn new(engine: Arc<DictationEngine>) -> Self {
        Self {
            engine,
            committed: String::new(),
            interim: String::new(),
            suggestions: Vec::new(),
            found_terms: Vec::new(),
        }
    }

    /// Handle a recognizer callback. Results before `result_index` were
    /// already delivered and are ignored. Final text is committed followed by
    /// a space; interim text replaces whatever interim text was shown.
    pub fn on_recognition_results(&mut self, result_index: usize, results: &[RecognitionResult]) {
        let mut interim = String::new();
        let mut final_text = String::new();

        for result in results.iter().skip(result_index) {
            if result.is_final {
                final_text.push_str(&result.transcript);
            } else {
                interim.push_str(&result.transcript);
            }
        }

        self.interim = interim;
        if !final_text.is_empty() {
            self.commit(&final_text);
        }
    }

    pub fn push_interim(&mut self, text: &str) {
        self.interim = text.to_string();
    }

    pub fn push_final(&mut self, text: &str) {
        self.interim.clear();
        if !text.is_empty() {
            self.commit(text);
        }
    }

    fn commit(&mut self, final_text: &str) {
        debug!("[TranscriptSession] Committing '{}'", final_text);
        self.committed.push_str(final_text);
        self.committed.push(' ');
        self.refresh();
    }

    fn refresh(&mut self) {
        self.suggestions = self
            .engine
            .suggestions()
            .find_potential_replacements(&self.committed);
        self.rescan_terms();
        debug!(
            "[TranscriptSession] {} suggestions, {} terms",
            self.suggestions.len(),
            self.found_terms.len()
        );
    }

    fn rescan_terms(&mut self) {
        let found = self.engine.scanner().find_terms_in(&self.committed);
        self.found_terms = dedup_by_korean(found).into_iter().cloned().collect();
    }

    /// Replace `original` in the committed transcript and drop every pending
    /// suggestion for it
    pub fn apply_replacement(&mut self, original: &str, replacement: &str, all: bool) {
        self.committed = replace_word_in_text(&self.committed, original, replacement, all);
        self.suggestions.retain(|s| s.original != original);
        self.rescan_terms();
        info!(
            "[TranscriptSession] Applied '{}' -> '{}' (all: {})",
            original, replacement, all
        );
    }

    pub fn dismiss_suggestion(&mut self, original: &str) {
        self.suggestions.retain(|s| s.original != original);
    }

    /// Apply every confident suggestion to the committed transcript.
    /// Returns the replacements that were made.
    pub fn auto_correct(&mut self) -> Vec<SuggestedReplacement> {
        let result = self.engine.suggestions().auto_replace_text(&self.committed);
        if !result.replacements.is_empty() {
            info!(
                "[TranscriptSession] Auto-corrected {} words",
                result.replacements.len()
            );
            self.committed = result.text;
            self.refresh();
        }
        result.replacements
    }

    pub fn clear(&mut self) {
        self.committed.clear();
        self.interim.clear();
        self.suggestions.clear();
        self.found_terms.clear();
    }

    pub fn committed_text(&self) -> &str {
        &self.committed
    }

    pub fn interim_text(&self) -> &str {
        &self.interim
    }

    /// Committed text followed by the interim text, as shown and copied
    pub fn display_text(&self) -> String {
        format!("{}{}", self.committed, self.interim)
    }

    pub fn suggestions(&self) -> &[SuggestedReplacement] {
        &self.suggestions
    }

    pub fn found_terms(&self) -> &[GlossaryEntry] {
        &self.found_terms
    }

    pub fn highlight(&self) -> Vec<HighlightSegment<'_, '_>> {
        self.engine.scanner().highlight(&self.committed)
    }

    pub fn inline_suggestions(&self) -> Vec<InlineSuggestion> {
        self.engine.suggestions().inline_suggestions(&self.committed)
    }

    /// Committed text with `word(또는 suggestion)` annotations
    pub fn annotated_text(&self) -> String {
        self.engine.suggestions().add_suggestions_to_text(&self.committed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glossary::Category;

    fn entry(korean: &str, english: &str, category: Category) -> GlossaryEntry {
        GlossaryEntry {
            korean: korean.to_string(),
            english: english.to_string(),
            category,
            description: String::new(),
        }
    }

    fn session() -> TranscriptSession {
        let glossary = Glossary::from_entries(vec![
            entry("브레이크", "brake", Category::Brakes),
            entry("캘리퍼", "caliper", Category::Brakes),
            entry("엔진", "engine", Category::Engine),
            entry("오일", "oil", Category::Lubrication),
        ])
        .unwrap();
        let engine = DictationEngine::new(Arc::new(glossary), EngineSettings::default());
        TranscriptSession::new(Arc::new(engine))
    }

    fn koreans(terms: &[GlossaryEntry]) -> Vec<&str> {
        terms.iter().map(|t| t.korean.as_str()).collect()
    }

    #[test]
    fn test_final_results_are_committed_with_space() {
        let mut session = session();
        session.on_recognition_results(0, &[RecognitionResult::final_text("블레이크가 이상해요")]);

        assert_eq!(session.committed_text(), "블레이크가 이상해요 ");
        assert_eq!(session.suggestions().len(), 1);
        assert_eq!(session.suggestions()[0].original, "블레이크");
        assert_eq!(session.suggestions()[0].replacement, "브레이크");
        assert!(session.found_terms().is_empty());
    }

    #[test]
    fn test_interim_is_displayed_not_committed() {
        let mut session = session();
        session.push_final("엔진 소리가");
        session.on_recognition_results(0, &[RecognitionResult::interim("오일")]);

        assert_eq!(session.committed_text(), "엔진 소리가 ");
        assert_eq!(session.display_text(), "엔진 소리가 오일");
        assert_eq!(koreans(session.found_terms()), vec!["엔진"]);

        // The next callback replaces the interim text
        session.on_recognition_results(0, &[RecognitionResult::interim("오일도")]);
        assert_eq!(session.interim_text(), "오일도");
    }

    #[test]
    fn test_result_index_skips_delivered_results() {
        let mut session = session();
        let results = vec![
            RecognitionResult::final_text("이미 받은 문장"),
            RecognitionResult::final_text("엔진 "),
            RecognitionResult::final_text("점검"),
            RecognitionResult::interim("오일"),
        ];
        session.on_recognition_results(1, &results);

        assert_eq!(session.committed_text(), "엔진 점검 ");
        assert_eq!(session.interim_text(), "오일");
    }

    #[test]
    fn test_apply_replacement_drops_suggestion_and_rescans() {
        let mut session = session();
        session.push_final("블레이크가 이상해요");
        session.apply_replacement("블레이크", "브레이크", false);

        assert_eq!(session.committed_text(), "브레이크가 이상해요 ");
        assert!(session.suggestions().is_empty());
        assert_eq!(koreans(session.found_terms()), vec!["브레이크"]);
    }

    #[test]
    fn test_dismiss_suggestion() {
        let mut session = session();
        session.push_final("블레이크가 이상해요");
        session.dismiss_suggestion("없는 단어");
        assert_eq!(session.suggestions().len(), 1);
        session.dismiss_suggestion("블레이크");
        assert!(session.suggestions().is_empty());
        assert_eq!(session.committed_text(), "블레이크가 이상해요 ");
    }

    #[test]
    fn test_auto_correct() {
        let mut session = session();
        session.push_final("블레이크가 너무 캘리포");
        let applied = session.auto_correct();

        assert_eq!(applied.len(), 2);
        assert_eq!(session.committed_text(), "브레이크가 너무 캘리퍼 ");
        assert!(session.suggestions().is_empty());
        assert_eq!(koreans(session.found_terms()), vec!["브레이크", "캘리퍼"]);

        // Nothing left to correct
        assert!(session.auto_correct().is_empty());
    }

    #[test]
    fn test_highlight_committed_text() {
        let mut session = session();
        session.push_final("엔진 오일을 교체했어요");
        session.push_interim("브레이크");

        let marked: Vec<&str> = session
            .highlight()
            .iter()
            .filter(|s| s.is_match())
            .map(|s| s.text)
            .collect();
        assert_eq!(marked, vec!["엔진", "오일"]);
    }

    #[test]
    fn test_annotated_text() {
        let mut session = session();
        session.push_final("캘리포");
        assert_eq!(session.annotated_text(), "캘리포(또는 캘리퍼) ");
    }

    #[test]
    fn test_clear() {
        let mut session = session();
        session.push_final("블레이크 엔진");
        session.push_interim("오일");
        session.clear();

        assert_eq!(session.display_text(), "");
        assert!(session.suggestions().is_empty());
        assert!(session.found_terms().is_empty());
    }
}
