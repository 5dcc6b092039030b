use std::sync::OnceLock;

use chrono::DateTime;
use regex::Regex;
use reqwest::Url;
use serde_json::Value;

/// Format constraint applied to a single top-level field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rule {
    Text,
    NonEmpty,
    Email,
    Url,
    Bool,
    TextList,
    Object,
    TextOrObject,
    OneOf(&'static [&'static str]),
    Timestamp,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub rule: Rule,
    pub required: bool,
}

pub const fn required(field: &'static str, rule: Rule) -> FieldRule {
    FieldRule {
        field,
        rule,
        required: true,
    }
}

pub const fn optional(field: &'static str, rule: Rule) -> FieldRule {
    FieldRule {
        field,
        rule,
        required: false,
    }
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"))
}

impl Rule {
    /// Checks a present, non-null value. Returns the failure message on mismatch.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match self {
            Rule::Text => value
                .as_str()
                .map(|_| ())
                .ok_or_else(|| "must be a string".to_string()),
            Rule::NonEmpty => match value.as_str() {
                Some(s) if !s.trim().is_empty() => Ok(()),
                Some(_) => Err("must not be empty".to_string()),
                None => Err("must be a string".to_string()),
            },
            Rule::Email => match value.as_str() {
                Some(s) if email_pattern().is_match(s) => Ok(()),
                Some(_) => Err("must be a valid email address".to_string()),
                None => Err("must be a string".to_string()),
            },
            Rule::Url => match value.as_str() {
                Some(s) if Url::parse(s).is_ok() => Ok(()),
                Some(_) => Err("must be a valid URL".to_string()),
                None => Err("must be a string".to_string()),
            },
            Rule::Bool => value
                .as_bool()
                .map(|_| ())
                .ok_or_else(|| "must be a boolean".to_string()),
            Rule::TextList => match value.as_array() {
                Some(items) if items.iter().all(Value::is_string) => Ok(()),
                Some(_) => Err("must contain only strings".to_string()),
                None => Err("must be an array of strings".to_string()),
            },
            Rule::Object => value
                .as_object()
                .map(|_| ())
                .ok_or_else(|| "must be an object".to_string()),
            Rule::TextOrObject => {
                if value.is_string() || value.is_object() {
                    Ok(())
                } else {
                    Err("must be a string or an object".to_string())
                }
            }
            Rule::OneOf(allowed) => match value.as_str() {
                Some(s) if allowed.contains(&s) => Ok(()),
                _ => Err(format!("must be one of: {}", allowed.join(", "))),
            },
            Rule::Timestamp => match value.as_str() {
                Some(s) if DateTime::parse_from_rfc3339(s).is_ok() => Ok(()),
                _ => Err("must be an RFC 3339 timestamp".to_string()),
            },
        }
    }
}
