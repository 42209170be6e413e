// src/tokenizer.rs
//
// Word extraction for transcript text. A token is a maximal run of Hangul
// syllables, ASCII letters or ASCII digits. Spans are byte offsets into the
// text the token was taken from, so `&text[span.start..span.end]` is the token.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;

static WORD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[가-힣a-zA-Z0-9]+").expect("word pattern is a valid regex")
});

/// Postpositional particles that attach to nouns, longest first
const PARTICLES: &[&str] = &[
    "에서는", "으로는", "이라는", "에서", "으로", "까지", "부터", "에게", "한테", "이랑",
    "처럼", "보다", "하고", "이나", "이", "가", "을", "를", "은", "는", "에", "의", "도",
    "로", "와", "과", "만", "랑", "나",
];

/// Half-open byte range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub span: Span,
}

impl<'a> Token<'a> {
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// The token with a trailing particle removed, if it ends in one and at
    /// least `min_chars` characters remain
    pub fn stem(&self, min_chars: usize) -> Option<Token<'a>> {
        if !self.text.chars().last().map_or(false, is_hangul_syllable) {
            return None;
        }
        PARTICLES.iter().find_map(|particle| {
            let stem = self.text.strip_suffix(particle)?;
            if stem.chars().count() < min_chars {
                return None;
            }
            Some(Token {
                text: stem,
                span: Span::new(self.span.start, self.span.start + stem.len()),
            })
        })
    }
}

pub fn is_hangul_syllable(c: char) -> bool {
    ('가'..='힣').contains(&c)
}

/// Every word token in `text`, left to right
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    WORD_PATTERN
        .find_iter(text)
        .map(|m| Token {
            text: m.as_str(),
            span: Span::new(m.start(), m.end()),
        })
        .collect()
}
