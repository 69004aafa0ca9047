//! Lightweight NLU helpers
//!
//! This module normalizes raw intent payloads into ranked slot-candidate
//! lists, extracts numbers from those candidates, and provides a small
//! fuzzy matcher used to identify a spoken wake word against a known
//! vocabulary. It is not a general NLU engine.

use crate::protocol::IntentRequest;
use serde_json::Value;
use std::collections::BTreeMap;

/// An intent normalized for game logic.
#[derive(Debug, Clone)]
pub struct ParsedIntent {
    pub name: String,

    /// Per-slot candidate values, ordered by descending confidence:
    /// the literal recognized value first, then every authority candidate
    /// in platform-supplied order. May be empty, never absent.
    pub slots: BTreeMap<String, Vec<String>>,

    /// The raw request, for anyone who needs the unparsed form
    pub request: Value,
}

/// Flatten a raw intent request into ranked candidate lists.
///
/// Candidates are deliberately not deduplicated; downstream matching tries
/// them in order and stops at the first success.
pub fn resolve_intent(request: &IntentRequest, raw: Value) -> ParsedIntent {
    let mut slots = BTreeMap::new();

    for (name, slot) in &request.intent.slots {
        let mut candidates = Vec::new();

        if let Some(value) = &slot.value {
            candidates.push(value.clone());
        }

        if let Some(resolutions) = &slot.resolutions {
            for authority in &resolutions.resolutions_per_authority {
                for value in &authority.values {
                    candidates.push(value.value.name.clone());
                }
            }
        }

        slots.insert(name.clone(), candidates);
    }

    ParsedIntent {
        name: request.intent.name.clone(),
        slots,
        request: raw,
    }
}

/// A slot argument in any of the shapes game code passes around.
#[derive(Debug, Clone)]
pub enum SlotInput<'a> {
    /// Already a number (spoofed intents, tests)
    Number(i64),
    /// A single recognized value
    Text(&'a str),
    /// The ranked candidate list from [`resolve_intent`]
    Candidates(&'a [String]),
}

impl<'a> From<i64> for SlotInput<'a> {
    fn from(n: i64) -> Self {
        SlotInput::Number(n)
    }
}

impl<'a> From<&'a str> for SlotInput<'a> {
    fn from(s: &'a str) -> Self {
        SlotInput::Text(s)
    }
}

impl<'a> From<&'a [String]> for SlotInput<'a> {
    fn from(c: &'a [String]) -> Self {
        SlotInput::Candidates(c)
    }
}

impl<'a> From<&'a Vec<String>> for SlotInput<'a> {
    fn from(c: &'a Vec<String>) -> Self {
        SlotInput::Candidates(c)
    }
}

/// Extract a number from a slot argument.
///
/// For candidate lists this returns the first entry that parses, so
/// lower-confidence hypotheses only apply when better ones don't.
/// Unparseable candidates are skipped, never an error.
pub fn number_from_slot<'a>(input: impl Into<SlotInput<'a>>) -> Option<i64> {
    match input.into() {
        SlotInput::Number(n) => Some(n),
        SlotInput::Text(s) => parse_leading_int(s),
        SlotInput::Candidates(candidates) => {
            candidates.iter().find_map(|c| parse_leading_int(c))
        }
    }
}

/// Parse the leading integer of a string, `parseInt`-style: skip leading
/// whitespace, accept an optional sign, then consume digits. "3rd" is 3.
pub fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, rest) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };

    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }

    digits.parse::<i64>().ok().map(|n| sign * n)
}

/// Classic Levenshtein edit distance between two strings.
///
/// Zero when the strings match; when they share nothing, the length of the
/// longer one.
pub fn levenshtein(s: &str, t: &str) -> usize {
    let s: Vec<char> = s.chars().collect();
    let t: Vec<char> = t.chars().collect();

    if s.is_empty() {
        return t.len();
    }
    if t.is_empty() {
        return s.len();
    }

    // cost matrix, row by row; only the previous row is needed
    let mut prev: Vec<usize> = (0..=t.len()).collect();
    let mut current = vec![0usize; t.len() + 1];

    for i in 1..=s.len() {
        current[0] = i;
        for j in 1..=t.len() {
            let substitution = if s[i - 1] == t[j - 1] { 0 } else { 1 };
            current[j] = (prev[j] + 1)
                .min(current[j - 1] + 1)
                .min(prev[j - 1] + substitution);
        }
        std::mem::swap(&mut prev, &mut current);
    }

    prev[t.len()]
}

/// Length-normalized Levenshtein distance: raw distance over the shorter
/// string's length.
///
/// Strings differing mainly in extra trailing content score more similar
/// than the raw distance implies:
///
/// ```text
///  lev("apple",    "appleton") = 3      lev("appleham", "appleton") = 3
/// nlev("apple",    "appleton") = 0.6   nlev("appleham", "appleton") = 0.375
/// ```
pub fn normalized_levenshtein(s: &str, t: &str) -> f64 {
    let distance = levenshtein(s, t);
    let shorter = s.chars().count().min(t.chars().count());

    if shorter == 0 {
        if distance == 0 {
            return 0.0;
        }
        return f64::INFINITY;
    }

    distance as f64 / shorter as f64
}

/// Fuzzily pick the closest vocabulary entry to a spoken word.
///
/// Returns `None` when nothing scores under `threshold`, so callers keep
/// their current default instead of adopting a bad match.
pub fn closest_match<'a>(spoken: &str, vocabulary: &[&'a str], threshold: f64) -> Option<&'a str> {
    let spoken = spoken.to_lowercase();

    vocabulary
        .iter()
        .map(|word| (normalized_levenshtein(&spoken, &word.to_lowercase()), *word))
        .filter(|(score, _)| *score < threshold)
        .min_by(|(a, _), (b, _)| a.total_cmp(b))
        .map(|(_, word)| word)
}
