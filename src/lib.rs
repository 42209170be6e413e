// src/lib.rs

pub mod config;
pub mod error;
pub mod fuzzy_matcher;
pub mod glossary;
pub mod suggestion;
pub mod term_scanner;
pub mod text_mutator;
pub mod tokenizer;
pub mod transcript;

pub use crate::config::EngineSettings;
pub use crate::error::{ConfigError, GlossaryError};
pub use crate::fuzzy_matcher::{FuzzyIndex, MatchResult, MatchedField};
pub use crate::glossary::{Category, Glossary, GlossaryEntry};
pub use crate::suggestion::{SuggestedReplacement, SuggestionEngine};
pub use crate::term_scanner::{HighlightSegment, Marker, TermScanner};
pub use crate::transcript::{DictationEngine, RecognitionResult, TranscriptSession};
