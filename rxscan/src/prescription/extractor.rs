//! Medicine extraction from recognized prescription text.
//!
//! The grammar is scanned left to right. A mention is anchored by a
//! capitalized name followed by a dose; frequency, duration and instructions
//! may trail it in that order:
//!
//! ```text
//! mention      = name ws+ dose ws* [frequency] sep* [duration] sep* [instructions]
//! name         = UPPER (ALPHA | "-")+
//! dose         = DIGIT+ ws* ("mg" | "mcg" | "g" | "ml" | "tablet" | "tab" | "cap" | "capsule") ["s"]
//! frequency    = DIGIT+ ws* ("times" | "x" | "/") ws* ("daily" | "day" | "d" | "week" | "wk" | "hour" | "hr")
//! duration     = DIGIT+ ws* ("days" | "day" | "d" | "weeks" | "wk" | "months" | "mon" | "m")
//! instructions = ("before" | "after" | "with") ws* ["food" | "meal" | "breakfast" | "lunch" | "dinner" | "bedtime"]
//! sep          = ws | "," | "-"
//! ```
//!
//! Keywords compare ASCII-case-insensitively and the longest matching keyword
//! wins. The name's first letter must be uppercase. Matches never overlap and
//! text between them is ignored.

use super::models::MedicineRecord;

const DOSE_UNITS: &[&str] = &["mg", "mcg", "g", "ml", "tablet", "tab", "cap", "capsule"];
const MULTIPLIERS: &[&str] = &["times", "x", "/"];
const PERIODS: &[&str] = &["daily", "day", "d", "week", "wk", "hour", "hr"];
const DURATION_UNITS: &[&str] = &["days", "day", "d", "weeks", "wk", "months", "mon", "m"];
const TIMINGS: &[&str] = &["before", "after", "with"];
const MEALS: &[&str] = &["food", "meal", "breakfast", "lunch", "dinner", "bedtime"];

fn char_at(text: &str, pos: usize) -> Option<char> {
    text.get(pos..)?.chars().next()
}

fn skip_while(text: &str, start: usize, pred: impl Fn(char) -> bool) -> usize {
    let rest = &text[start..];
    start
        + rest
            .char_indices()
            .find(|&(_, c)| !pred(c))
            .map_or(rest.len(), |(i, _)| i)
}

fn skip_whitespace(text: &str, start: usize) -> usize {
    skip_while(text, start, char::is_whitespace)
}

fn skip_separators(text: &str, start: usize) -> usize {
    skip_while(text, start, |c| c.is_whitespace() || c == ',' || c == '-')
}

/// One or more ASCII digits.
fn match_number(text: &str, start: usize) -> Option<usize> {
    let end = skip_while(text, start, |c| c.is_ascii_digit());
    (end > start).then_some(end)
}

/// Longest keyword that prefixes `text[start..]`, ignoring ASCII case.
fn match_keyword(text: &str, start: usize, keywords: &[&str]) -> Option<usize> {
    let rest = text[start..].as_bytes();
    keywords
        .iter()
        .filter(|kw| rest.len() >= kw.len() && rest[..kw.len()].eq_ignore_ascii_case(kw.as_bytes()))
        .map(|kw| start + kw.len())
        .max()
}

/// Capitalized token of ASCII letters and hyphens, at least two characters.
pub fn match_name(text: &str, start: usize) -> Option<usize> {
    let first = char_at(text, start)?;
    if !first.is_ascii_uppercase() {
        return None;
    }
    let body_start = start + first.len_utf8();
    let end = skip_while(text, body_start, |c| c.is_ascii_alphabetic() || c == '-');
    (end > body_start).then_some(end)
}

pub fn match_dose(text: &str, start: usize) -> Option<usize> {
    let pos = match_number(text, start)?;
    let pos = skip_whitespace(text, pos);
    let pos = match_keyword(text, pos, DOSE_UNITS)?;
    match char_at(text, pos) {
        Some('s' | 'S') => Some(pos + 1),
        _ => Some(pos),
    }
}

pub fn match_frequency(text: &str, start: usize) -> Option<usize> {
    let pos = match_number(text, start)?;
    let pos = skip_whitespace(text, pos);
    let pos = match_keyword(text, pos, MULTIPLIERS)?;
    let pos = skip_whitespace(text, pos);
    match_keyword(text, pos, PERIODS)
}

pub fn match_duration(text: &str, start: usize) -> Option<usize> {
    let pos = match_number(text, start)?;
    let pos = skip_whitespace(text, pos);
    match_keyword(text, pos, DURATION_UNITS)
}

/// Timing word with an optional meal word. A bare timing word ends right
/// after itself; whitespace is only consumed when a meal word follows.
pub fn match_instructions(text: &str, start: usize) -> Option<usize> {
    let timing_end = match_keyword(text, start, TIMINGS)?;
    let meal_start = skip_whitespace(text, timing_end);
    Some(match_keyword(text, meal_start, MEALS).unwrap_or(timing_end))
}

/// A medicine mention located in the source text. Fields borrow from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention<'a> {
    pub name: &'a str,
    pub dose: &'a str,
    pub frequency: Option<&'a str>,
    pub duration: Option<&'a str>,
    pub instructions: Option<&'a str>,
    pub start: usize,
    pub end: usize,
}

impl Mention<'_> {
    pub fn to_record(&self) -> MedicineRecord {
        MedicineRecord::with_defaults(
            self.name,
            Some(self.dose),
            self.frequency,
            self.duration,
            self.instructions,
        )
    }
}

/// Apply an optional trailing clause at `*pos`; on success advance both the
/// cursor and the mention end past it.
fn optional_clause<'a>(
    text: &'a str,
    pos: &mut usize,
    end: &mut usize,
    clause: fn(&str, usize) -> Option<usize>,
) -> Option<&'a str> {
    let clause_start = *pos;
    let clause_end = clause(text, clause_start)?;
    *pos = clause_end;
    *end = clause_end;
    Some(&text[clause_start..clause_end])
}

/// Try to read a full mention starting exactly at `start`.
pub fn match_mention(text: &str, start: usize) -> Option<Mention<'_>> {
    let name_end = match_name(text, start)?;
    let dose_start = skip_whitespace(text, name_end);
    if dose_start == name_end {
        return None;
    }
    let dose_end = match_dose(text, dose_start)?;
    let mut pos = skip_whitespace(text, dose_end);
    let mut end = dose_end;

    let frequency = optional_clause(text, &mut pos, &mut end, match_frequency);
    pos = skip_separators(text, pos);
    let duration = optional_clause(text, &mut pos, &mut end, match_duration);
    pos = skip_separators(text, pos);
    let instructions = optional_clause(text, &mut pos, &mut end, match_instructions);

    Some(Mention {
        name: &text[start..name_end],
        dose: &text[dose_start..dose_end],
        frequency,
        duration,
        instructions,
        start,
        end,
    })
}

/// Iterator over non-overlapping mentions, leftmost first.
pub struct Mentions<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Iterator for Mentions<'a> {
    type Item = Mention<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.text.len() {
            if let Some(mention) = match_mention(self.text, self.pos) {
                self.pos = mention.end;
                return Some(mention);
            }
            self.pos += char_at(self.text, self.pos).map_or(1, char::len_utf8);
        }
        None
    }
}

pub fn scan_mentions(text: &str) -> Mentions<'_> {
    Mentions { text, pos: 0 }
}

/// Extract medicine records from OCR text.
///
/// Never returns an empty list: when nothing matches, the result is the
/// single "No medicines detected" record.
pub fn extract_medicines(text: &str) -> Vec<MedicineRecord> {
    let records: Vec<MedicineRecord> = scan_mentions(text).map(|m| m.to_record()).collect();
    tracing::debug!(count = records.len(), "Extracted medicine mentions");

    if records.is_empty() {
        vec![MedicineRecord::sentinel()]
    } else {
        records
    }
}
