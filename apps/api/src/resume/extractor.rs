//! Resume extraction behind a pluggable trait.
//!
//! `AppState` holds an `Arc<dyn ResumeExtractor>`: `LlmResumeExtractor` when an
//! API key is configured, `DisabledExtractor` otherwise.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use thiserror::Error;

use crate::llm_client::{LlmClient, LlmError};
use crate::resume::prompts::{build_prompt, RESUME_PARSE_SYSTEM};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedResume {
    pub skills: Vec<String>,
    pub experience: Vec<ExperienceEntry>,
    pub education: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub role: String,
    pub company: String,
    pub years: Option<Number>,
    pub description: String,
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("resume extraction is not configured")]
    NotConfigured,

    #[error("upstream model call failed: {0}")]
    Upstream(#[from] LlmError),

    #[error("could not parse model reply: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait ResumeExtractor: Send + Sync {
    async fn extract(&self, raw_text: &str, filename: &str)
        -> Result<ParsedResume, ExtractionError>;
}

pub struct LlmResumeExtractor {
    llm: LlmClient,
}

impl LlmResumeExtractor {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ResumeExtractor for LlmResumeExtractor {
    async fn extract(
        &self,
        raw_text: &str,
        filename: &str,
    ) -> Result<ParsedResume, ExtractionError> {
        let prompt = build_prompt(raw_text, filename);
        let reply = self.llm.complete_json(RESUME_PARSE_SYSTEM, &prompt).await?;
        parse_reply(&reply)
    }
}

/// Stand-in used when no API key is configured.
pub struct DisabledExtractor;

#[async_trait]
impl ResumeExtractor for DisabledExtractor {
    async fn extract(&self, _: &str, _: &str) -> Result<ParsedResume, ExtractionError> {
        Err(ExtractionError::NotConfigured)
    }
}

/// Parses the model's reply. A reply that is not pure JSON is searched for the
/// first balanced JSON object, which tolerates surrounding prose or code fences.
pub fn parse_reply(text: &str) -> Result<ParsedResume, ExtractionError> {
    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(text.trim()) {
        return Ok(normalize(&value));
    }

    first_json_object(text)
        .map(|value| normalize(&value))
        .ok_or_else(|| ExtractionError::Malformed("no JSON object in reply".to_string()))
}

/// Shape-check only: wrong-typed fields fall back to empty values, nothing is invented.
pub fn normalize(value: &Value) -> ParsedResume {
    let skills = value
        .get("skills")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let experience = value
        .get("experience")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(experience_entry).collect())
        .unwrap_or_default();

    let education = value
        .get("education")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    ParsedResume {
        skills,
        experience,
        education,
    }
}

fn experience_entry(item: &Value) -> Option<ExperienceEntry> {
    let obj = item.as_object()?;
    let text = |key: &str| {
        obj.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let years = match obj.get("years") {
        Some(Value::Number(n)) => Some(n.clone()),
        Some(Value::String(s)) => parse_number(s.trim()),
        _ => None,
    };

    Some(ExperienceEntry {
        role: text("role"),
        company: text("company"),
        years,
        description: text("description"),
    })
}

fn parse_number(s: &str) -> Option<Number> {
    if let Ok(n) = s.parse::<u64>() {
        return Some(Number::from(n));
    }
    s.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Tries each `{` in turn and returns the first balanced span that parses as an object.
fn first_json_object(text: &str) -> Option<Value> {
    text.char_indices()
        .filter(|(_, c)| *c == '{')
        .find_map(|(start, _)| {
            let end = balanced_end(&text[start..])?;
            match serde_json::from_str::<Value>(&text[start..start + end]) {
                Ok(value @ Value::Object(_)) => Some(value),
                _ => None,
            }
        })
}

/// Byte length of the brace-balanced span starting at `s[0] == '{'`, honouring
/// string literals and escapes.
fn balanced_end(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}
