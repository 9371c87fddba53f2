//! 模型名称建议：大小写不敏感的匹配打分、排序，以及下拉框状态机。
//!
//! # Model Suggestions
//!
//! Ranks a candidate list (typically model ids from
//! [`fetch_models`](crate::models::fetch_models)) against free text and drives
//! a headless dropdown.
//!
//! Scores, compared case-insensitively:
//!
//! | Score | Meaning |
//! |-------|---------|
//! | 3 | exact match |
//! | 2 | candidate starts with the query |
//! | 1 | candidate contains the query |
//! | 0 | no match, or empty query |
//!
//! ```rust
//! use provider_probe::suggest::{rank, EnUsCollator};
//!
//! let candidates = vec!["b".to_string(), "a".to_string(), "ab".to_string()];
//! let ranked = rank(&candidates, "a", &EnUsCollator);
//! let order: Vec<_> = ranked.iter().map(|c| c.value.as_str()).collect();
//! assert_eq!(order, vec!["a", "ab", "b"]);
//! ```

pub mod collate;
pub mod dropdown;

pub use collate::{Collator, EnUsCollator, OrdinalCollator};
pub use dropdown::{
    DropdownState, Effect, Key, Listener, ModelSuggest, SuggestEvent, SuggestItem, SuggestView,
};

use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredCandidate {
    pub value: String,
    pub score: u8,
}

impl ScoredCandidate {
    /// Non-matching candidates are still listed, just de-emphasized.
    pub fn is_muted(&self) -> bool {
        self.score == 0
    }
}

pub fn score(candidate: &str, query: &str) -> u8 {
    if query.is_empty() {
        return 0;
    }
    let c = candidate.to_lowercase();
    let q = query.to_lowercase();
    if c == q {
        3
    } else if c.starts_with(&q) {
        2
    } else if c.contains(&q) {
        1
    } else {
        0
    }
}

/// Score every candidate; order by score descending, then by collation.
pub fn rank(candidates: &[String], query: &str, collator: &dyn Collator) -> Vec<ScoredCandidate> {
    let mut scored: Vec<ScoredCandidate> = candidates
        .iter()
        .map(|c| ScoredCandidate {
            value: c.clone(),
            score: score(c, query),
        })
        .collect();
    scored.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| collator.compare(&a.value, &b.value))
    });
    scored
}

/// Byte range of the first case-insensitive occurrence of `query` in `text`.
///
/// Folds both sides with `str::to_lowercase`, the same folding [`score`]
/// uses, so a scored match is also highlighted. The range always lands on
/// char boundaries of `text`; `None` for an empty query.
pub fn highlight(text: &str, query: &str) -> Option<Range<usize>> {
    if query.is_empty() {
        return None;
    }
    let folded = text.to_lowercase();
    let needle = query.to_lowercase();

    // (offset in `folded`, offset in `text`) at every char boundary of `text`.
    let mut bounds = Vec::with_capacity(text.len() + 1);
    let mut folded_len = 0;
    for (start, c) in text.char_indices() {
        bounds.push((folded_len, start));
        folded_len += c.to_lowercase().map(char::len_utf8).sum::<usize>();
    }
    bounds.push((folded_len, text.len()));
    if folded_len != folded.len() {
        return None;
    }
    let original = |at: usize| {
        bounds
            .binary_search_by_key(&at, |&(f, _)| f)
            .ok()
            .map(|i| bounds[i].1)
    };

    let mut from = 0;
    while let Some(pos) = folded[from..].find(&needle) {
        let begin = from + pos;
        if let (Some(start), Some(end)) = (original(begin), original(begin + needle.len())) {
            return Some(start..end);
        }
        // Match starts or ends inside one char's expansion; keep looking.
        from = begin + folded[begin..].chars().next().map_or(1, char::len_utf8);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_table() {
        assert_eq!(score("anything", ""), 0);
        assert_eq!(score("GPT-4", "gpt-4"), 3);
        assert_eq!(score("gpt-4-turbo", "gpt-4"), 2);
        assert_eq!(score("my-gpt-4-clone", "gpt-4"), 1);
        assert_eq!(score("claude", "gpt-4"), 0);
    }

    #[test]
    fn test_rank_orders_by_score() {
        let candidates: Vec<String> = ["b", "a", "ab"].iter().map(|s| s.to_string()).collect();
        let ranked = rank(&candidates, "a", &EnUsCollator);
        let pairs: Vec<_> = ranked.iter().map(|c| (c.value.as_str(), c.score)).collect();
        assert_eq!(pairs, vec![("a", 3), ("ab", 2), ("b", 0)]);
    }

    #[test]
    fn test_rank_ties_use_collation_not_input_order() {
        let candidates: Vec<String> = ["gpt-4o", "claude-3", "Gemini", "deepseek"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let ranked = rank(&candidates, "", &EnUsCollator);
        let order: Vec<_> = ranked.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(order, vec!["claude-3", "deepseek", "Gemini", "gpt-4o"]);
        assert!(ranked.iter().all(ScoredCandidate::is_muted));

        let ranked = rank(&candidates, "", &OrdinalCollator);
        assert_eq!(ranked[0].value, "Gemini");
    }

    #[test]
    fn test_rank_empty() {
        assert!(rank(&[], "gpt", &EnUsCollator).is_empty());
    }

    #[test]
    fn test_highlight_first_occurrence() {
        assert_eq!(highlight("my-GPT-4-gpt", "gpt"), Some(3..6));
        assert_eq!(highlight("claude", "gpt"), None);
        assert_eq!(highlight("claude", ""), None);
        assert_eq!(highlight("GPT", "gpt"), Some(0..3));
    }

    #[test]
    fn test_highlight_respects_char_boundaries() {
        let text = "模型-Qwen";
        let range = highlight(text, "qwen").unwrap();
        assert_eq!(&text[range], "Qwen");
    }

    #[test]
    fn test_highlight_agrees_with_score_on_final_sigma() {
        assert_eq!(score("ΟΔΟΣ", "οδος"), 3);
        assert_eq!(highlight("ΟΔΟΣ", "οδος"), Some(0.."ΟΔΟΣ".len()));

        let text = "Model-ΟΔΟΣ";
        assert_eq!(score(text, "οδος"), 1);
        let range = highlight(text, "οδος").unwrap();
        assert_eq!(&text[range], "ΟΔΟΣ");
    }
}
