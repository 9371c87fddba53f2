//! Tie-break collation for ranked candidates.
//!
//! Ranking must not depend on the host's default locale, so the comparison is
//! an explicit strategy.

use std::cmp::Ordering;

pub trait Collator: Send + Sync {
    fn compare(&self, a: &str, b: &str) -> Ordering;
}

/// Plain code-point order.
#[derive(Debug, Default, Clone, Copy)]
pub struct OrdinalCollator;

impl Collator for OrdinalCollator {
    fn compare(&self, a: &str, b: &str) -> Ordering {
        a.cmp(b)
    }
}

/// Approximation of `en-US` collation for identifier-like strings.
///
/// - primary: punctuation and spaces < digits < letters, letters compared
///   case-folded
/// - tertiary: at the first case difference, lowercase sorts first
/// - last resort: code-point order, so the ordering is total
#[derive(Debug, Default, Clone, Copy)]
pub struct EnUsCollator;

impl Collator for EnUsCollator {
    fn compare(&self, a: &str, b: &str) -> Ordering {
        primary_keys(a)
            .cmp(primary_keys(b))
            .then_with(|| tertiary(a, b))
            .then_with(|| a.cmp(b))
    }
}

fn primary_keys(s: &str) -> impl Iterator<Item = (u8, char)> + '_ {
    s.chars().map(|c| {
        let class = if c.is_alphabetic() {
            2
        } else if c.is_numeric() {
            1
        } else {
            0
        };
        (class, c.to_lowercase().next().unwrap_or(c))
    })
}

fn tertiary(a: &str, b: &str) -> Ordering {
    for (ca, cb) in a.chars().zip(b.chars()) {
        match (ca.is_uppercase(), cb.is_uppercase()) {
            (false, true) => return Ordering::Less,
            (true, false) => return Ordering::Greater,
            _ => {}
        }
    }
    Ordering::Equal
}
