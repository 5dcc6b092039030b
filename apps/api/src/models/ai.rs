use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema::{EntityKind, Record};

#[derive(Debug, Clone, Deserialize)]
pub struct JobMatchingRequest {
    pub profile: Map<String, Value>,
    #[serde(default)]
    pub preferences: Option<Value>,
}

impl Record for JobMatchingRequest {
    const KIND: EntityKind = EntityKind::JobMatchingRequest;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobMatch {
    pub title: String,
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Either structured matches or the model's unparsed text.
/// Serialized untagged: `{"matches": [...], "note"?}` or `{"raw": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobMatchingResponse {
    Matches {
        matches: Vec<JobMatch>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
    Raw {
        raw: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvOptimizerRequest {
    pub resume: String,
    pub target_role: String,
}

impl Record for CvOptimizerRequest {
    const KIND: EntityKind = EntityKind::CvOptimizerRequest;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CvSuggestions {
    List(Vec<String>),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvOptimizerResponse {
    pub suggestions: CvSuggestions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InterviewPrepRequest {
    pub role: String,
    pub transcript: String,
}

impl Record for InterviewPrepRequest {
    const KIND: EntityKind = EntityKind::InterviewPrepRequest;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewPrepResponse {
    pub reply: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillGapRequest {
    /// Free text or a structured profile object.
    pub profile: Value,
    pub target_role: String,
}

impl Record for SkillGapRequest {
    const KIND: EntityKind = EntityKind::SkillGapRequest;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SkillGapResponse {
    Plan {
        plan: String,
    },
    Gaps {
        gaps: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
}
