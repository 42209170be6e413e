// src/text_mutator.rs
//
// Applying accepted corrections to transcript text.
// Nothing here fails: a replacement whose original text is gone is skipped
// and the input comes back unchanged.

use log::warn;

use crate::suggestion::SuggestedReplacement;

/// Replace `original` with `replacement`, either the first occurrence or all of them.
/// `original` is matched literally.
pub fn replace_word_in_text(text: &str, original: &str, replacement: &str, all: bool) -> String {
    if original.is_empty() {
        return text.to_string();
    }
    if all {
        text.replace(original, replacement)
    } else {
        text.replacen(original, replacement, 1)
    }
}

/// Rewrite exactly the span a suggestion was computed for.
/// Returns `None` when the span no longer holds the suggestion's original text.
pub fn apply_replacement(text: &str, suggestion: &SuggestedReplacement) -> Option<String> {
    let range = suggestion.position.range();
    if text.get(range.clone())? != suggestion.original {
        return None;
    }
    let mut result = String::with_capacity(text.len() + suggestion.replacement.len());
    result.push_str(&text[..range.start]);
    result.push_str(&suggestion.replacement);
    result.push_str(&text[range.end..]);
    Some(result)
}

/// Apply several span-addressed replacements against the text they were
/// computed from. Work runs back to front so earlier spans stay valid.
/// Stale or overlapping replacements are skipped. The applied ones are
/// returned in left-to-right order.
pub fn apply_replacements(
    text: &str,
    replacements: &[SuggestedReplacement],
) -> (String, Vec<SuggestedReplacement>) {
    let mut ordered: Vec<&SuggestedReplacement> = replacements.iter().collect();
    ordered.sort_by(|a, b| {
        b.position
            .start
            .cmp(&a.position.start)
            .then_with(|| b.position.end.cmp(&a.position.end))
    });

    let mut result = text.to_string();
    let mut applied = Vec::new();
    let mut boundary = text.len();

    for replacement in ordered {
        let range = replacement.position.range();
        if range.end > boundary {
            warn!(
                "[TextMutator] Skipping overlapping replacement '{}' at {}..{}",
                replacement.original, range.start, range.end
            );
            continue;
        }
        if text.get(range.clone()) != Some(replacement.original.as_str()) {
            warn!(
                "[TextMutator] Skipping stale replacement '{}' at {}..{}",
                replacement.original, range.start, range.end
            );
            continue;
        }
        result.replace_range(range.clone(), &replacement.replacement);
        boundary = range.start;
        applied.push(replacement.clone());
    }

    applied.reverse();
    (result, applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fuzzy_matcher::MatchedField;
    use crate::glossary::{Category, GlossaryEntry};
    use crate::tokenizer::Span;

    fn suggestion(original: &str, replacement: &str, start: usize) -> SuggestedReplacement {
        SuggestedReplacement {
            original: original.to_string(),
            replacement: replacement.to_string(),
            position: Span::new(start, start + original.len()),
            score: 0.2,
            entry: GlossaryEntry {
                korean: replacement.to_string(),
                english: "term".to_string(),
                category: Category::Brakes,
                description: String::new(),
            },
            field: MatchedField::Korean,
        }
    }

    #[test]
    fn test_replace_first_only() {
        let text = "블레이크가 이상해요 블레이크";
        assert_eq!(
            replace_word_in_text(text, "블레이크", "브레이크", false),
            "브레이크가 이상해요 블레이크"
        );
    }

    #[test]
    fn test_replace_all() {
        let text = "블레이크가 이상해요 블레이크";
        assert_eq!(
            replace_word_in_text(text, "블레이크", "브레이크", true),
            "브레이크가 이상해요 브레이크"
        );
    }

    #[test]
    fn test_pattern_characters_are_literal() {
        assert_eq!(replace_word_in_text("a.c abc", "a.c", "X", true), "X abc");
        assert_eq!(replace_word_in_text("(1+1) 2", "(1+1)", "2", false), "2 2");
    }

    #[test]
    fn test_missing_original_is_noop() {
        let text = "엔진 소음";
        assert_eq!(replace_word_in_text(text, "브레이크", "x", true), text);
        assert_eq!(replace_word_in_text(text, "", "x", false), text);
    }

    #[test]
    fn test_apply_replacement_checks_span() {
        let text = "엔진 블레이크";
        let s = suggestion("블레이크", "브레이크", "엔진 ".len());
        assert_eq!(apply_replacement(text, &s).unwrap(), "엔진 브레이크");

        // Text changed underneath the suggestion
        assert!(apply_replacement("엔진오일 블레이크", &s).is_none());
        // Span past the end
        assert!(apply_replacement("엔진", &s).is_none());
    }

    #[test]
    fn test_apply_replacements_back_to_front() {
        let text = "블레이크 그리고 캘리포";
        let first = suggestion("블레이크", "브레이크", 0);
        let second = suggestion("캘리포", "캘리퍼", text.find("캘리포").unwrap());

        let (result, applied) = apply_replacements(text, &[first.clone(), second.clone()]);
        assert_eq!(result, "브레이크 그리고 캘리퍼");
        assert_eq!(applied, vec![first, second]);
    }

    #[test]
    fn test_apply_replacements_skips_overlap_and_stale() {
        let text = "블레이크패드";
        let whole = suggestion("블레이크패드", "브레이크패드", 0);
        let inner = suggestion("블레이크", "브레이크", 0);
        let stale = suggestion("없음", "엔진", 0);

        let (result, applied) = apply_replacements(text, &[inner, whole.clone(), stale]);
        assert_eq!(applied.len(), 1);
        assert_eq!(result, "브레이크패드");
        assert_eq!(applied[0].original, whole.original);
    }
}
