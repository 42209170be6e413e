// src/fuzzy_matcher.rs
//
// Approximate glossary lookup for single tokens.
// Scores are in [0, 1], lower is closer, 0 is an exact match. A query is
// aligned against the best-matching stretch of each indexed field (korean
// form and english form), so where in the field the query lands does not
// matter. The score starts from the edit ratio of that alignment and adds a
// penalty for how much of the field the alignment leaves uncovered, so it
// never drops below the edit ratio itself.

use log::{debug, info};
use serde::Serialize;
use std::sync::Arc;

use crate::config::SearchSettings;
use crate::glossary::{Glossary, GlossaryEntry};

const COVERAGE_WEIGHT: f32 = 0.25;

/// Which form of the entry produced the match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchedField {
    Korean,
    English,
}

#[derive(Debug, Clone, Copy)]
pub struct MatchResult<'g> {
    pub entry: &'g GlossaryEntry,
    pub score: f32,
    pub field: MatchedField,
}

#[derive(Debug)]
struct IndexedField {
    chars: Vec<char>,
    field: MatchedField,
}

#[derive(Debug)]
struct IndexedTerm {
    position: usize,
    fields: Vec<IndexedField>,
}

/// Lowercased character sequences of every glossary field long enough to search.
/// Built once and shared by every lookup.
#[derive(Debug)]
pub struct FuzzyIndex {
    glossary: Arc<Glossary>,
    terms: Vec<IndexedTerm>,
    settings: SearchSettings,
}

impl FuzzyIndex {
    pub fn new(glossary: Arc<Glossary>, settings: SearchSettings) -> Self {
        let min_len = settings.min_match_char_length;
        let mut field_count = 0;

        let terms: Vec<IndexedTerm> = glossary
            .all_entries()
            .iter()
            .enumerate()
            .filter_map(|(position, entry)| {
                let fields: Vec<IndexedField> = [
                    (entry.korean.as_str(), MatchedField::Korean),
                    (entry.english.as_str(), MatchedField::English),
                ]
                .into_iter()
                .map(|(text, field)| IndexedField {
                    chars: text.to_lowercase().chars().collect(),
                    field,
                })
                .filter(|f| f.chars.len() >= min_len)
                .collect();

                if fields.is_empty() {
                    None
                } else {
                    field_count += fields.len();
                    Some(IndexedTerm { position, fields })
                }
            })
            .collect();

        info!(
            "[FuzzyIndex] Indexed {} fields across {} of {} terms",
            field_count,
            terms.len(),
            glossary.len()
        );

        Self {
            glossary,
            terms,
            settings,
        }
    }

    pub fn glossary(&self) -> &Glossary {
        &self.glossary
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Every entry scoring below the index threshold, best first.
    /// Ties go to the field closest in length to the query, then to glossary order.
    pub fn candidates(&self, query: &str) -> Vec<MatchResult<'_>> {
        let query_chars: Vec<char> = query.to_lowercase().chars().collect();
        if query_chars.len() < self.settings.min_match_char_length || self.terms.is_empty() {
            return Vec::new();
        }

        let entries = self.glossary.all_entries();
        let mut scored: Vec<(MatchResult<'_>, usize)> = Vec::new();

        for term in &self.terms {
            let mut best: Option<(f32, usize, MatchedField)> = None;
            for field in &term.fields {
                // Deleting the query's surplus characters is unavoidable
                if score_floor(query_chars.len(), field.chars.len()) >= self.settings.threshold {
                    continue;
                }
                let score = similarity_score(&query_chars, &field.chars);
                let gap = query_chars.len().abs_diff(field.chars.len());
                let better = match best {
                    None => true,
                    Some((best_score, best_gap, _)) => {
                        score < best_score || (score == best_score && gap < best_gap)
                    }
                };
                if better {
                    best = Some((score, gap, field.field));
                }
            }

            if let Some((score, gap, field)) = best {
                if score < self.settings.threshold {
                    scored.push((
                        MatchResult {
                            entry: &entries[term.position],
                            score,
                            field,
                        },
                        gap,
                    ));
                }
            }
        }

        scored.sort_by(|(a, a_gap), (b, b_gap)| {
            a.score
                .total_cmp(&b.score)
                .then_with(|| a_gap.cmp(b_gap))
        });

        debug!("[FuzzyIndex] '{}' -> {} candidates", query, scored.len());
        scored.into_iter().map(|(result, _)| result).collect()
    }

    /// Best match below the index threshold
    pub fn search(&self, query: &str) -> Option<MatchResult<'_>> {
        self.candidates(query).into_iter().next()
    }

    /// Up to `limit` matches, best first, below the ranked threshold
    pub fn ranked_search(&self, query: &str, limit: usize) -> Vec<MatchResult<'_>> {
        self.candidates(query)
            .into_iter()
            .take(limit)
            .filter(|m| m.score < self.settings.ranked_threshold)
            .collect()
    }
}

/// Lowest score a field of `field_len` characters can give a `query_len` query
fn score_floor(query_len: usize, field_len: usize) -> f32 {
    let surplus = query_len.saturating_sub(field_len);
    surplus as f32 / query_len as f32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Alignment {
    errors: usize,
    span: usize,
}

/// Fewest edits turning `pattern` into some stretch of `text`, preferring the
/// widest stretch among equally good ones
fn best_alignment(pattern: &[char], text: &[char]) -> Alignment {
    // (cost, start of the aligned stretch in text)
    let mut prev: Vec<(usize, usize)> = (0..=text.len()).map(|j| (0, j)).collect();
    let mut cur: Vec<(usize, usize)> = vec![(0, 0); text.len() + 1];

    for i in 1..=pattern.len() {
        cur[0] = (i, 0);
        for j in 1..=text.len() {
            let substitution_cost = if pattern[i - 1] == text[j - 1] { 0 } else { 1 };
            let diagonal = (prev[j - 1].0 + substitution_cost, prev[j - 1].1);
            let skip_pattern = (prev[j].0 + 1, prev[j].1);
            let skip_text = (cur[j - 1].0 + 1, cur[j - 1].1);

            let mut best = diagonal;
            for candidate in [skip_pattern, skip_text] {
                if candidate.0 < best.0 || (candidate.0 == best.0 && candidate.1 < best.1) {
                    best = candidate;
                }
            }
            cur[j] = best;
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    (0..=text.len())
        .map(|j| Alignment {
            errors: prev[j].0,
            span: j - prev[j].1,
        })
        .min_by(|a, b| a.errors.cmp(&b.errors).then_with(|| b.span.cmp(&a.span)))
        .unwrap_or(Alignment {
            errors: pattern.len(),
            span: 0,
        })
}

/// Distance between a query and one field, in [0, 1]
pub fn similarity_score(query: &[char], field: &[char]) -> f32 {
    if query.is_empty() || field.is_empty() {
        return 1.0;
    }
    let alignment = best_alignment(query, field);
    let error_ratio = (alignment.errors as f32 / query.len() as f32).min(1.0);
    let coverage = alignment.span.min(field.len()) as f32 / field.len() as f32;
    let uncovered = 1.0 - coverage;
    (error_ratio + COVERAGE_WEIGHT * uncovered * (1.0 - error_ratio)).clamp(0.0, 1.0)
}

/// Convenience form of [`similarity_score`] for string slices
pub fn score_str(query: &str, field: &str) -> f32 {
    let query: Vec<char> = query.to_lowercase().chars().collect();
    let field: Vec<char> = field.to_lowercase().chars().collect();
    similarity_score(&query, &field)
}
