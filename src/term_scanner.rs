// src/term_scanner.rs
//
// Exact glossary term detection for highlighting.
// Matching is substring based, not word-boundary based: "오일" is found
// inside "엔진오일을". Highlighting returns segments; rendering them is up
// to the caller.

use log::{debug, warn};
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;
use std::sync::Arc;

use crate::config::HighlightSettings;
use crate::fuzzy_matcher::MatchedField;
use crate::glossary::{Glossary, GlossaryEntry};
use crate::tokenizer::Span;

/// One occurrence of a glossary term in a text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TermOccurrence<'g> {
    pub entry: &'g GlossaryEntry,
    pub span: Span,
    pub field: MatchedField,
}

/// A piece of highlighted text. `entry` is set when the piece is a term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightSegment<'t, 'g> {
    pub text: &'t str,
    pub span: Span,
    pub entry: Option<&'g GlossaryEntry>,
}

impl HighlightSegment<'_, '_> {
    pub fn is_match(&self) -> bool {
        self.entry.is_some()
    }
}

/// Strings wrapped around highlighted terms by [`TermScanner::render_marked`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker<'m> {
    pub open: &'m str,
    pub close: &'m str,
}

#[derive(Debug)]
struct TermPatterns {
    korean: Option<Regex>,
    english: Option<Regex>,
    english_lower: String,
}

fn case_insensitive(literal: &str) -> Option<Regex> {
    match RegexBuilder::new(&regex::escape(literal))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => Some(re),
        Err(e) => {
            warn!("[TermScanner] Skipping pattern for '{}': {}", literal, e);
            None
        }
    }
}

#[derive(Debug)]
pub struct TermScanner {
    glossary: Arc<Glossary>,
    patterns: Vec<TermPatterns>,
    settings: HighlightSettings,
}

impl TermScanner {
    pub fn new(glossary: Arc<Glossary>, settings: HighlightSettings) -> Self {
        let patterns = glossary
            .all_entries()
            .iter()
            .map(|entry| TermPatterns {
                korean: case_insensitive(&entry.korean),
                english: case_insensitive(&entry.english),
                english_lower: entry.english.to_lowercase(),
            })
            .collect();

        Self {
            glossary,
            patterns,
            settings,
        }
    }

    fn entries_with_patterns(&self) -> impl Iterator<Item = (&GlossaryEntry, &TermPatterns)> {
        self.glossary.all_entries().iter().zip(self.patterns.iter())
    }

    /// Terms present in `text` paired with their compiled patterns, glossary order
    fn matching_terms(&self, text: &str) -> Vec<(&GlossaryEntry, &TermPatterns)> {
        if text.is_empty() {
            return Vec::new();
        }
        let lower = text.to_lowercase();
        let found: Vec<(&GlossaryEntry, &TermPatterns)> = self
            .entries_with_patterns()
            .filter(|(entry, patterns)| {
                text.contains(entry.korean.as_str()) || lower.contains(patterns.english_lower.as_str())
            })
            .collect();

        debug!("[TermScanner] Found {} terms in {} chars", found.len(), text.chars().count());
        found
    }

    /// Every term whose korean form occurs verbatim in `text`, or whose
    /// english form occurs ignoring case. Glossary order, one item per term.
    pub fn find_terms_in(&self, text: &str) -> Vec<&GlossaryEntry> {
        self.matching_terms(text)
            .into_iter()
            .map(|(entry, _)| entry)
            .collect()
    }

    /// Every occurrence of every term, ordered by position. One term can
    /// appear many times, and korean and english hits are both reported.
    pub fn find_occurrences(&self, text: &str) -> Vec<TermOccurrence<'_>> {
        let mut occurrences = Vec::new();
        for (entry, patterns) in self.entries_with_patterns() {
            let fields = [
                (patterns.korean.as_ref(), MatchedField::Korean),
                (patterns.english.as_ref(), MatchedField::English),
            ];
            for (pattern, field) in fields {
                let Some(re) = pattern else { continue };
                occurrences.extend(re.find_iter(text).map(|m| TermOccurrence {
                    entry,
                    span: Span::new(m.start(), m.end()),
                    field,
                }));
            }
        }
        occurrences.sort_by(|a, b| {
            a.span
                .start
                .cmp(&b.span.start)
                .then_with(|| b.span.len().cmp(&a.span.len()))
        });
        occurrences
    }

    /// Split `text` into plain and highlighted segments.
    ///
    /// Each distinct matched term has every occurrence of its korean form
    /// (ignoring case) marked. Overlapping occurrences are never both marked:
    /// the one claimed first wins, and with `longest_first` longer terms claim
    /// before shorter ones.
    pub fn highlight<'t>(&self, text: &'t str) -> Vec<HighlightSegment<'t, '_>> {
        let mut seen = HashSet::new();
        let mut terms: Vec<(&GlossaryEntry, &TermPatterns)> = self
            .matching_terms(text)
            .into_iter()
            .filter(|&(entry, _)| seen.insert(entry.korean.as_str()))
            .collect();
        if self.settings.longest_first {
            terms.sort_by(|(a, _), (b, _)| b.korean.chars().count().cmp(&a.korean.chars().count()));
        }

        let mut claimed: Vec<(Span, &GlossaryEntry)> = Vec::new();
        for (entry, patterns) in terms {
            let Some(re) = patterns.korean.as_ref() else { continue };
            for m in re.find_iter(text) {
                let span = Span::new(m.start(), m.end());
                if !claimed.iter().any(|(taken, _)| taken.overlaps(&span)) {
                    claimed.push((span, entry));
                }
            }
        }
        claimed.sort_by_key(|(span, _)| span.start);

        let mut segments = Vec::with_capacity(claimed.len() * 2 + 1);
        let mut cursor = 0;
        for (span, entry) in claimed {
            if span.start > cursor {
                segments.push(HighlightSegment {
                    text: &text[cursor..span.start],
                    span: Span::new(cursor, span.start),
                    entry: None,
                });
            }
            segments.push(HighlightSegment {
                text: &text[span.range()],
                span,
                entry: Some(entry),
            });
            cursor = span.end;
        }
        if cursor < text.len() {
            segments.push(HighlightSegment {
                text: &text[cursor..],
                span: Span::new(cursor, text.len()),
                entry: None,
            });
        }
        segments
    }

    /// Highlight `text` by wrapping terms in `marker`. Regions already wrapped
    /// in the marker are copied through untouched, so rendering twice gives
    /// the same result as rendering once.
    pub fn render_marked(&self, text: &str, marker: &Marker<'_>) -> String {
        let mut out = String::with_capacity(text.len());
        if marker.open.is_empty() || marker.close.is_empty() {
            self.push_marked(&mut out, text, marker);
            return out;
        }

        let mut rest = text;
        while let Some(open_at) = rest.find(marker.open) {
            self.push_marked(&mut out, &rest[..open_at], marker);
            let inner_start = open_at + marker.open.len();
            match rest[inner_start..].find(marker.close) {
                Some(close_at) => {
                    let region_end = inner_start + close_at + marker.close.len();
                    out.push_str(&rest[open_at..region_end]);
                    rest = &rest[region_end..];
                }
                None => {
                    // Unterminated marker: leave the remainder alone
                    out.push_str(&rest[open_at..]);
                    return out;
                }
            }
        }
        self.push_marked(&mut out, rest, marker);
        out
    }

    fn push_marked(&self, out: &mut String, plain: &str, marker: &Marker<'_>) {
        for segment in self.highlight(plain) {
            if segment.is_match() {
                out.push_str(marker.open);
                out.push_str(segment.text);
                out.push_str(marker.close);
            } else {
                out.push_str(segment.text);
            }
        }
    }
}

/// Drop repeated terms, keeping the first occurrence of each korean form
pub fn dedup_by_korean<'g>(terms: Vec<&'g GlossaryEntry>) -> Vec<&'g GlossaryEntry> {
    let mut seen = HashSet::new();
    terms
        .into_iter()
        .filter(|&entry| seen.insert(entry.korean.as_str()))
        .collect()
}
