//! Similarity scoring between dates, names and whole records.
//!
//! Every score is a percentage in `0.0..=100.0`. Comparing anything against a
//! missing value scores 0. The [`Matcher`] borrows the two documents the
//! compared records come from, so that a family can be matched through its
//! spouses.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::date::DateValue;
use crate::interface::ProgressSink;
use crate::record::{Record, RecordType};
use crate::structure::{event_date, PersonalName};
use crate::tag::TagNode;
use crate::tree::Document;

pub const NO_MATCH: f32 = 0.0;
pub const FULL_MATCH: f32 = 100.0;
const DAYS_PER_YEAR: f64 = 365.25;

// ------------- MatchParams -------------
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchParams {
    /// Minimum similarity ratio (0..=1) for two names to count as the same.
    pub names_indistinct_threshold: f32,
    pub dates_check: bool,
    /// How many years two dates may be apart and still match.
    pub years_inaccuracy: i32,
}

impl Default for MatchParams {
    fn default() -> Self {
        Self {
            names_indistinct_threshold: 0.9,
            dates_check: true,
            years_inaccuracy: 3,
        }
    }
}

// ------------- Free functions -------------

/// Edit distance over characters.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            current[j + 1] = (previous[j] + cost).min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

/// `1 - distance / longest length`, compared without letter case.
/// Two empty strings are indistinct.
pub fn indistinct_ratio(a: &str, b: &str) -> f32 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(&a, &b) as f32 / longest as f32
}

pub fn match_dates(a: Option<&DateValue>, b: Option<&DateValue>, params: &MatchParams) -> f32 {
    let (Some(a), Some(b)) = (a, b) else {
        return NO_MATCH;
    };
    if a.is_empty() || b.is_empty() {
        return NO_MATCH;
    }
    if !params.dates_check {
        return FULL_MATCH;
    }
    match a.udn().days_between(&b.udn()) {
        Some(days) if (days.abs() as f64) / DAYS_PER_YEAR <= params.years_inaccuracy as f64 => FULL_MATCH,
        _ => NO_MATCH,
    }
}

/// Events match when they have the same tag and their dates match.
pub fn match_events(a: Option<&TagNode>, b: Option<&TagNode>, params: &MatchParams) -> f32 {
    let (Some(a), Some(b)) = (a, b) else {
        return NO_MATCH;
    };
    if a.name() != b.name() {
        return NO_MATCH;
    }
    match_dates(Some(&event_date(a)), Some(&event_date(b)), params)
}

/// Scores two personal names on their given part and surname.
///
/// A surname mismatch weighs heavier than a given-name mismatch: identical
/// names score 100, a differing surname 12.5 and a differing given name 50.
/// With `only_first_part` only the first word of the given part is compared.
pub fn match_names(a: Option<&PersonalName>, b: Option<&PersonalName>, only_first_part: bool, threshold: f32) -> f32 {
    let (Some(a), Some(b)) = (a, b) else {
        return NO_MATCH;
    };
    if a.is_empty() && b.is_empty() {
        return NO_MATCH;
    }
    let given = |name: &PersonalName| -> String {
        let first = name.first_part.trim();
        if only_first_part {
            first.split_whitespace().next().unwrap_or("").to_string()
        } else {
            first.to_string()
        }
    };
    let g = indicator(indistinct_ratio(&given(a), &given(b)) >= threshold);
    let s = indicator(indistinct_ratio(a.surname.trim(), b.surname.trim()) >= threshold);
    FULL_MATCH * (0.5 * g + 0.5 * s) * (0.25 + 0.75 * s)
}

fn indicator(on: bool) -> f32 {
    if on { 1.0 } else { 0.0 }
}

// two untitled sources count as the same source
fn same_title(a: &str, b: &str) -> f32 {
    if a.trim().to_lowercase() == b.trim().to_lowercase() {
        FULL_MATCH
    } else {
        NO_MATCH
    }
}

fn same_text(a: &str, b: &str) -> f32 {
    let (a, b) = (a.trim(), b.trim());
    if !a.is_empty() && a.to_lowercase() == b.to_lowercase() {
        FULL_MATCH
    } else {
        NO_MATCH
    }
}

// ------------- Matcher -------------

/// Compares records of one document against records of another (or the same).
pub struct Matcher<'a> {
    left: &'a Document,
    right: &'a Document,
    params: &'a MatchParams,
}

impl<'a> Matcher<'a> {
    pub fn new(left: &'a Document, right: &'a Document, params: &'a MatchParams) -> Self {
        Self { left, right, params }
    }
    /// A matcher comparing records within one document.
    pub fn within(document: &'a Document, params: &'a MatchParams) -> Self {
        Self::new(document, document, params)
    }
    pub fn params(&self) -> &MatchParams {
        self.params
    }
    /// `a` is taken from the left document and `b` from the right one.
    pub fn match_records(&self, a: Option<&Record>, b: Option<&Record>) -> f32 {
        let (Some(a), Some(b)) = (a, b) else {
            return NO_MATCH;
        };
        if a.record_type() != b.record_type() {
            return NO_MATCH;
        }
        match a.record_type() {
            RecordType::Individual => self.match_individuals(a, b),
            RecordType::Family => self.match_families(a, b),
            RecordType::Source => same_title(&a.principal_name(), &b.principal_name()),
            RecordType::Note => {
                if a.text().is_empty() {
                    NO_MATCH
                } else if a.text() == b.text() {
                    FULL_MATCH
                } else {
                    NO_MATCH
                }
            }
            _ => same_text(&a.principal_name(), &b.principal_name()),
        }
    }
    fn match_individuals(&self, a: &Record, b: &Record) -> f32 {
        if a.sex() != b.sex() {
            return NO_MATCH;
        }
        let ratio = indistinct_ratio(&a.primary_name().full_name(), &b.primary_name().full_name());
        if ratio < self.params.names_indistinct_threshold {
            return NO_MATCH;
        }
        if self.params.dates_check {
            let (birth_a, birth_b) = (a.birth_date(), b.birth_date());
            if !birth_a.is_empty()
                && !birth_b.is_empty()
                && match_dates(Some(&birth_a), Some(&birth_b), self.params) < FULL_MATCH
            {
                return NO_MATCH;
            }
        }
        FULL_MATCH
    }
    fn match_families(&self, a: &Record, b: &Record) -> f32 {
        let mut components = Vec::with_capacity(3);
        for (left, right) in [(a.husband(), b.husband()), (a.wife(), b.wife())] {
            if let (Some(left), Some(right)) = (left, right) {
                components.push(self.match_records(self.left.find_by_xref(&left), self.right.find_by_xref(&right)));
            }
        }
        let (marriage_a, marriage_b) = (a.marriage_date(), b.marriage_date());
        if self.params.dates_check && !marriage_a.is_empty() && !marriage_b.is_empty() {
            components.push(match_dates(Some(&marriage_a), Some(&marriage_b), self.params));
        }
        if components.is_empty() {
            return FULL_MATCH;
        }
        components.iter().sum::<f32>() / components.len() as f32
    }

    /// Scans every unordered pair of `record_type` records of the left
    /// document and returns those scoring at least `min_score`.
    pub fn find_duplicates(
        &self,
        record_type: RecordType,
        min_score: f32,
        progress: &mut dyn ProgressSink,
    ) -> Vec<(String, String, f32)> {
        let records: Vec<&Record> = self.left.records_of(record_type).collect();
        let mut found = Vec::new();
        progress.init(&format!("Searching duplicate {} records", record_type), records.len());
        for (i, a) in records.iter().enumerate() {
            for b in &records[i + 1..] {
                let score = self.match_records(Some(*a), Some(*b));
                if score >= min_score {
                    found.push((a.xref().to_string(), b.xref().to_string(), score));
                }
            }
            progress.step();
        }
        progress.done();
        debug!(kind = %record_type, candidates = records.len(), found = found.len(), "duplicate scan complete");
        found
    }
}
