//! Response parsing at the agent boundary.
//!
//! Turns raw model text into the typed results the orchestration core works
//! with. The core never inspects free text; whatever fails here is reported
//! as a malformed response.
//!
//! | Function | Result | Format |
//! |----------|--------|--------|
//! | [`parse_solution`] | solution text | `{"solution": ...}` or plain text |
//! | [`parse_critique`] | [`Critique`] | JSON, keyword fallback for plain text |
//! | [`parse_argument`] | [`Argument`] | JSON only |
//! | [`parse_score`] | [`EvaluationScore`] | JSON only |

use crate::core::role::AgentRole;
use crate::debate::Argument;
use crate::evaluation::{Criterion, EvaluationScore};
use crate::solution::{Critique, Issue, Provenance, Solution, SolutionOrigin};
use serde_json::Value;
use thiserror::Error;

/// Words and phrases that mark a plain-text review as requesting changes
const ISSUE_KEYWORDS: &[&str] = &[
    "issue",
    "issues",
    "problem",
    "problems",
    "error",
    "errors",
    "vulnerability",
    "vulnerabilities",
    "bug",
    "bugs",
    "incorrect",
    "missing",
    "needs revision",
    "major concerns",
];

/// Phrases that mark a plain-text review as approving
const APPROVAL_PHRASES: &[&str] = &[
    "lgtm",
    "approve",
    "approved",
    "no issues",
    "no blocking issues",
    "no problems",
];

/// Words that reject outright
const REJECTION_WORDS: &[&str] = &["disapprove", "disapproved", "reject", "rejected"];

/// Words that negate a phrase when they appear shortly before it
const NEGATORS: &[&str] = &[
    "not", "cannot", "can't", "don't", "won't", "wouldn't", "shouldn't", "never", "no",
    "without",
];

/// How many words before a phrase a negator still applies to
const NEGATION_WINDOW: usize = 3;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("empty response")]
    Empty,

    #[error("no JSON object in response")]
    NoJson,

    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("missing or invalid field: {0}")]
    MissingField(&'static str),

    #[error("field {field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

/// Extract the outermost JSON object from a response.
///
/// Handles fenced code blocks and prose around the object.
pub fn extract_json(response: &str) -> Result<Value, ParseError> {
    let start = response.find('{').ok_or(ParseError::NoJson)?;
    let end = response.rfind('}').ok_or(ParseError::NoJson)?;
    if end < start {
        return Err(ParseError::NoJson);
    }
    let value: Value = serde_json::from_str(&response[start..=end])
        .map_err(|e| ParseError::InvalidJson(e.to_string()))?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(ParseError::NoJson)
    }
}

fn non_empty_str<'a>(json: &'a Value, field: &'static str) -> Result<&'a str, ParseError> {
    json.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ParseError::MissingField(field))
}

fn string_list(json: &Value, field: &str) -> Vec<String> {
    json.get(field)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

fn unit_interval(json: &Value, field: &'static str) -> Result<f64, ParseError> {
    let value = json
        .get(field)
        .and_then(Value::as_f64)
        .ok_or(ParseError::MissingField(field))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(ParseError::OutOfRange { field, value });
    }
    Ok(value)
}

/// Solution text from a `{"solution": ...}` object, or the whole response
/// when it carries no such object
pub fn parse_solution(response: &str) -> Result<String, ParseError> {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    if let Ok(json) = extract_json(trimmed)
        && json.get("solution").is_some()
    {
        return non_empty_str(&json, "solution").map(String::from);
    }

    Ok(trimmed.to_string())
}

/// Parse a review of `solution` written by `reviewer`.
///
/// A response without any JSON object is classified by whole-word keywords.
/// An explicit or negated approval ("disapprove", "cannot be approved") is
/// one blocking issue. Otherwise an approval wins, and any issue keyword not
/// preceded by a negator ("no issues") makes it one blocking issue.
pub fn parse_critique(
    response: &str,
    solution: &Solution,
    reviewer: AgentRole,
) -> Result<Critique, ParseError> {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    let json = match extract_json(trimmed) {
        Ok(json) => json,
        Err(ParseError::NoJson) => return Ok(classify_plain_critique(trimmed, solution, reviewer)),
        // Prose quoting code with braces
        Err(ParseError::InvalidJson(_)) if !trimmed.starts_with('{') => {
            return Ok(classify_plain_critique(trimmed, solution, reviewer));
        }
        Err(e) => return Err(e),
    };

    let summary = json
        .get("summary")
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim()
        .to_string();
    let mut critique = Critique::new(solution, reviewer, summary);

    let issues = match json.get("issues") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(_) => return Err(ParseError::MissingField("issues")),
    };
    for item in &issues {
        let description = non_empty_str(item, "description")?;
        let issue = match item.get("severity").and_then(Value::as_str) {
            Some(s) if s.eq_ignore_ascii_case("blocking") => Issue::blocking(description),
            Some(s) if s.eq_ignore_ascii_case("advisory") => Issue::advisory(description),
            _ => return Err(ParseError::MissingField("severity")),
        };
        critique = critique.with_issue(issue);
    }

    if let Some(alternative) = json.get("alternative").and_then(Value::as_str)
        && !alternative.trim().is_empty()
    {
        critique = critique.with_alternative(Solution::new(
            alternative.trim(),
            Provenance {
                author: reviewer,
                iteration: solution.provenance().iteration,
                origin: SolutionOrigin::Alternative,
            },
        ));
    }

    Ok(critique)
}

fn classify_plain_critique(text: &str, solution: &Solution, reviewer: AgentRole) -> Critique {
    let lower = text.to_lowercase();
    // Negation never crosses sentence or clause punctuation
    let clauses: Vec<Vec<&str>> = lower
        .split(['.', ',', ';', ':', '!', '?', '\n'])
        .map(|clause| {
            clause
                .split(|c: char| !(c.is_alphanumeric() || c == '\''))
                .filter(|w| !w.is_empty())
                .collect()
        })
        .collect();

    let mut rejected = false;
    let mut approved = false;
    let mut flagged = false;
    for words in &clauses {
        rejected |= words.iter().any(|w| REJECTION_WORDS.contains(w));
        for phrase in APPROVAL_PHRASES {
            for at in phrase_positions(words, phrase) {
                if negated(words, at) {
                    rejected = true;
                } else {
                    approved = true;
                }
            }
        }
        flagged |= ISSUE_KEYWORDS
            .iter()
            .any(|k| phrase_positions(words, k).any(|at| !negated(words, at)));
    }

    let critique = Critique::new(solution, reviewer, text);
    if rejected || (flagged && !approved) {
        critique.with_issue(Issue::blocking(text))
    } else {
        critique
    }
}

/// Word offsets at which `phrase` occurs as a whole-word sequence
fn phrase_positions<'a>(
    words: &'a [&'a str],
    phrase: &'a str,
) -> impl Iterator<Item = usize> + 'a {
    let needle: Vec<&str> = phrase.split(' ').collect();
    (0..words.len()).filter(move |&at| {
        words.len() - at >= needle.len() && words[at..at + needle.len()] == needle[..]
    })
}

fn negated(words: &[&str], at: usize) -> bool {
    words[at.saturating_sub(NEGATION_WINDOW)..at]
        .iter()
        .any(|w| NEGATORS.contains(w))
}

/// Parse a debate argument. All of claim and confidence are required.
pub fn parse_argument(response: &str) -> Result<Argument, ParseError> {
    if response.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    let json = extract_json(response)?;
    let claim = non_empty_str(&json, "claim")?;
    let confidence = unit_interval(&json, "confidence")?;
    let reasoning = json
        .get("reasoning")
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim();
    Ok(Argument::new(
        claim,
        string_list(&json, "evidence"),
        reasoning,
        confidence,
    ))
}

/// Parse a score for `criterion`
pub fn parse_score(response: &str, criterion: Criterion) -> Result<EvaluationScore, ParseError> {
    if response.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    let json = extract_json(response)?;
    let score = unit_interval(&json, "score")?;
    let reasoning = json
        .get("reasoning")
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim();
    Ok(EvaluationScore::new(
        criterion,
        score,
        reasoning,
        string_list(&json, "evidence"),
    ))
}
