// src/suggestion.rs
//
// Turns free transcript text into correction candidates.
// Every word token is looked up in the fuzzy index. A token that already is
// a glossary term is not a replacement. Hangul tokens carrying a trailing
// particle ("블레이크가") are also tried without it, and the bare noun wins
// when it scores strictly better.

use log::debug;
use serde::Serialize;

use crate::config::SuggestionSettings;
use crate::fuzzy_matcher::{FuzzyIndex, MatchResult, MatchedField};
use crate::glossary::GlossaryEntry;
use crate::text_mutator::apply_replacements;
use crate::tokenizer::{tokenize, Span, Token};

/// A proposed correction for one token of a text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestedReplacement {
    pub original: String,
    pub replacement: String,
    /// Byte span of `original` in the text the suggestion was built from
    pub position: Span,
    pub score: f32,
    pub entry: GlossaryEntry,
    pub field: MatchedField,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutoReplaceResult {
    pub text: String,
    /// Applied replacements, left to right, with spans in the input text
    pub replacements: Vec<SuggestedReplacement>,
}

/// The single best alternative shown next to a token
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineSuggestion {
    pub word: String,
    pub position: Span,
    pub suggestion: String,
    pub score: f32,
}

/// Default inline annotation: `word(또는 suggestion)`
pub fn default_annotation(word: &str, suggestion: &str) -> String {
    format!("{}(또는 {})", word, suggestion)
}

#[derive(Debug)]
pub struct SuggestionEngine {
    index: FuzzyIndex,
    settings: SuggestionSettings,
}

impl SuggestionEngine {
    pub fn new(index: FuzzyIndex, settings: SuggestionSettings) -> Self {
        Self { index, settings }
    }

    pub fn index(&self) -> &FuzzyIndex {
        &self.index
    }

    pub fn settings(&self) -> &SuggestionSettings {
        &self.settings
    }

    fn particle_stem<'t>(&self, token: &Token<'t>) -> Option<Token<'t>> {
        if self.settings.strip_particles {
            token.stem(self.settings.min_token_chars)
        } else {
            None
        }
    }

    /// Pick the token or its particle stem, whichever matches the glossary better.
    /// The particle is never rewritten, even when the new noun takes another form of it.
    fn resolve<'t>(&self, token: Token<'t>) -> Option<(Token<'t>, MatchResult<'_>)> {
        let full = self.index.search(token.text);
        let stem = self
            .particle_stem(&token)
            .and_then(|stem| self.index.search(stem.text).map(|m| (stem, m)));

        match (full, stem) {
            (Some(full_match), Some((stem, stem_match))) if stem_match.score < full_match.score => {
                Some((stem, stem_match))
            }
            (Some(full_match), _) => Some((token, full_match)),
            (None, stem) => stem,
        }
    }

    fn qualifying_tokens<'t>(&self, text: &'t str) -> Vec<Token<'t>> {
        let min_chars = self.settings.min_token_chars;
        tokenize(text)
            .into_iter()
            .filter(|token| token.char_len() >= min_chars)
            .collect()
    }

    /// Correction candidates for `text`, left to right, at most one per token
    pub fn find_potential_replacements(&self, text: &str) -> Vec<SuggestedReplacement> {
        let mut replacements = Vec::new();

        for token in self.qualifying_tokens(text) {
            let Some((target, found)) = self.resolve(token) else {
                continue;
            };
            if found.entry.korean == target.text {
                continue;
            }

            debug!(
                "[SuggestionEngine] '{}' -> '{}' (score: {:.3}, via {:?})",
                target.text, found.entry.korean, found.score, found.field
            );
            replacements.push(SuggestedReplacement {
                original: target.text.to_string(),
                replacement: found.entry.korean.clone(),
                position: target.span,
                score: found.score,
                entry: found.entry.clone(),
                field: found.field,
            });
        }

        replacements
    }

    /// Apply every candidate at or below the configured auto-replace threshold
    pub fn auto_replace_text(&self, text: &str) -> AutoReplaceResult {
        self.auto_replace_text_with_threshold(text, self.settings.auto_replace_threshold)
    }

    pub fn auto_replace_text_with_threshold(&self, text: &str, threshold: f32) -> AutoReplaceResult {
        let confident: Vec<SuggestedReplacement> = self
            .find_potential_replacements(text)
            .into_iter()
            .filter(|r| r.score <= threshold)
            .collect();

        let (text, replacements) = apply_replacements(text, &confident);
        AutoReplaceResult { text, replacements }
    }

    /// Candidates for one word, for a detail view
    pub fn word_suggestions(&self, word: &str) -> Vec<MatchResult<'_>> {
        self.index
            .ranked_search(word, self.settings.word_suggestion_limit)
    }

    /// For each token, its best alternative other than itself below the inline threshold
    pub fn inline_suggestions(&self, text: &str) -> Vec<InlineSuggestion> {
        let mut suggestions = Vec::new();

        for token in self.qualifying_tokens(text) {
            let target = self
                .resolve(token)
                .map(|(target, _)| target)
                .unwrap_or(token);

            let best = self
                .index
                .ranked_search(target.text, self.settings.inline_candidates)
                .into_iter()
                .find(|m| m.entry.korean != target.text && m.score < self.settings.inline_threshold);

            if let Some(best) = best {
                suggestions.push(InlineSuggestion {
                    word: target.text.to_string(),
                    position: target.span,
                    suggestion: best.entry.korean.clone(),
                    score: best.score,
                });
            }
        }

        suggestions
    }

    /// `text` with the default annotation inserted for every inline suggestion
    pub fn add_suggestions_to_text(&self, text: &str) -> String {
        self.add_suggestions_to_text_with(text, default_annotation)
    }

    /// `text` with each suggested word replaced by `annotate(word, suggestion)`
    pub fn add_suggestions_to_text_with<F>(&self, text: &str, annotate: F) -> String
    where
        F: Fn(&str, &str) -> String,
    {
        let mut result = text.to_string();
        // Growth of `result` so far relative to `text`
        let mut offset: isize = 0;

        for inline in self.inline_suggestions(text) {
            let annotated = annotate(&inline.word, &inline.suggestion);
            let start = (inline.position.start as isize + offset) as usize;
            let end = (inline.position.end as isize + offset) as usize;
            result.replace_range(start..end, &annotated);
            offset += annotated.len() as isize - inline.word.len() as isize;
        }

        result
    }
}
