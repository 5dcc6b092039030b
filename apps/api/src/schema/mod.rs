//! Payload validation shared by the data services and the HTTP boundary.
//!
//! Each entity declares its field rules once in [`EntityKind::rules`].
//! [`validate`] checks an untyped JSON payload against those rules and
//! reports every offending field; [`parse`] validates and then deserializes
//! into the typed record.

pub mod rules;

use std::fmt;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::models::application::ApplicationStatus;
use rules::{optional, required, FieldRule, Rule};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// One or more fields failed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        Self {
            fields: vec![FieldError {
                field: field.to_string(),
                message: message.into(),
            }],
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.field.as_str()).collect()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|e| format!("{} {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    User,
    UserProfile,
    Cv,
    Job,
    SavedJob,
    Application,
    InterviewSession,
    SkillGapAnalysis,
    JobMatchingRequest,
    CvOptimizerRequest,
    InterviewPrepRequest,
    SkillGapRequest,
    Credentials,
    FederatedCredential,
}

const USER_RULES: &[FieldRule] = &[
    required("uid", Rule::NonEmpty),
    optional("email", Rule::Email),
    optional("displayName", Rule::Text),
    optional("photoURL", Rule::Url),
    optional("createdAt", Rule::Timestamp),
];

const PROFILE_RULES: &[FieldRule] = &[
    required("uid", Rule::NonEmpty),
    optional("summary", Rule::Text),
    optional("skills", Rule::TextList),
    optional("location", Rule::Text),
    optional("preferences", Rule::Object),
    optional("updatedAt", Rule::Timestamp),
];

const CV_RULES: &[FieldRule] = &[
    required("uid", Rule::NonEmpty),
    required("content", Rule::NonEmpty),
    optional("version", Rule::Text),
    optional("updatedAt", Rule::Timestamp),
];

const JOB_RULES: &[FieldRule] = &[
    required("title", Rule::NonEmpty),
    required("company", Rule::NonEmpty),
    optional("location", Rule::Text),
    optional("remote", Rule::Bool),
    optional("salary", Rule::Text),
    optional("link", Rule::Url),
    optional("postedAt", Rule::Timestamp),
    optional("tags", Rule::TextList),
    optional("source", Rule::Text),
];

const SAVED_JOB_RULES: &[FieldRule] = &[
    required("uid", Rule::NonEmpty),
    required("jobId", Rule::NonEmpty),
    optional("notes", Rule::Text),
    optional("savedAt", Rule::Timestamp),
];

const APPLICATION_RULES: &[FieldRule] = &[
    required("uid", Rule::NonEmpty),
    required("title", Rule::NonEmpty),
    required("company", Rule::NonEmpty),
    optional("url", Rule::Url),
    optional("status", Rule::OneOf(ApplicationStatus::NAMES)),
    optional("stage", Rule::Text),
    optional("appliedAt", Rule::Timestamp),
    optional("nextStepDate", Rule::Timestamp),
    optional("createdAt", Rule::Timestamp),
];

const INTERVIEW_SESSION_RULES: &[FieldRule] = &[
    required("uid", Rule::NonEmpty),
    optional("role", Rule::Text),
    optional("question", Rule::Text),
    optional("answer", Rule::Text),
    optional("feedback", Rule::Text),
    optional("createdAt", Rule::Timestamp),
];

const SKILL_GAP_ANALYSIS_RULES: &[FieldRule] = &[
    required("uid", Rule::NonEmpty),
    required("targetRole", Rule::NonEmpty),
    optional("gaps", Rule::TextList),
    optional("plan", Rule::Text),
    optional("createdAt", Rule::Timestamp),
];

const JOB_MATCHING_RULES: &[FieldRule] = &[
    required("profile", Rule::Object),
    optional("preferences", Rule::TextOrObject),
];

const CV_OPTIMIZER_RULES: &[FieldRule] = &[
    required("resume", Rule::NonEmpty),
    required("targetRole", Rule::NonEmpty),
];

const INTERVIEW_PREP_RULES: &[FieldRule] = &[
    required("role", Rule::NonEmpty),
    required("transcript", Rule::NonEmpty),
];

const SKILL_GAP_REQUEST_RULES: &[FieldRule] = &[
    required("profile", Rule::TextOrObject),
    required("targetRole", Rule::NonEmpty),
];

const CREDENTIALS_RULES: &[FieldRule] = &[
    required("email", Rule::Email),
    required("password", Rule::NonEmpty),
];

const FEDERATED_RULES: &[FieldRule] = &[
    required("providerId", Rule::NonEmpty),
    optional("idToken", Rule::NonEmpty),
    optional("accessToken", Rule::NonEmpty),
];

impl EntityKind {
    pub fn rules(self) -> &'static [FieldRule] {
        match self {
            EntityKind::User => USER_RULES,
            EntityKind::UserProfile => PROFILE_RULES,
            EntityKind::Cv => CV_RULES,
            EntityKind::Job => JOB_RULES,
            EntityKind::SavedJob => SAVED_JOB_RULES,
            EntityKind::Application => APPLICATION_RULES,
            EntityKind::InterviewSession => INTERVIEW_SESSION_RULES,
            EntityKind::SkillGapAnalysis => SKILL_GAP_ANALYSIS_RULES,
            EntityKind::JobMatchingRequest => JOB_MATCHING_RULES,
            EntityKind::CvOptimizerRequest => CV_OPTIMIZER_RULES,
            EntityKind::InterviewPrepRequest => INTERVIEW_PREP_RULES,
            EntityKind::SkillGapRequest => SKILL_GAP_REQUEST_RULES,
            EntityKind::Credentials => CREDENTIALS_RULES,
            EntityKind::FederatedCredential => FEDERATED_RULES,
        }
    }
}

/// A typed record backed by one [`EntityKind`]'s rules.
pub trait Record: DeserializeOwned {
    const KIND: EntityKind;
}

/// Checks every declared rule, collecting all failures. JSON `null` counts as absent.
pub fn validate(kind: EntityKind, payload: &Value) -> Result<(), ValidationError> {
    let Some(object) = payload.as_object() else {
        return Err(ValidationError::single("$", "must be a JSON object"));
    };

    let mut fields = Vec::new();
    for rule in kind.rules() {
        match object.get(rule.field) {
            None | Some(Value::Null) => {
                if rule.required {
                    fields.push(FieldError {
                        field: rule.field.to_string(),
                        message: "is required".to_string(),
                    });
                }
            }
            Some(value) => {
                if let Err(message) = rule.rule.check(value) {
                    fields.push(FieldError {
                        field: rule.field.to_string(),
                        message,
                    });
                }
            }
        }
    }

    if fields.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { fields })
    }
}

/// Validates a partial update. Only declared fields may appear, required
/// fields may be omitted but not cleared, and `uid`/`id` are immutable.
pub fn validate_patch(kind: EntityKind, patch: &Value) -> Result<(), ValidationError> {
    let Some(object) = patch.as_object() else {
        return Err(ValidationError::single("$", "must be a JSON object"));
    };

    let rules = kind.rules();
    let mut fields = Vec::new();
    for (key, value) in object {
        if key == "uid" || key == "id" {
            fields.push(FieldError {
                field: key.clone(),
                message: "cannot be changed".to_string(),
            });
            continue;
        }
        let Some(rule) = rules.iter().find(|r| r.field == key) else {
            fields.push(FieldError {
                field: key.clone(),
                message: "is not a known field".to_string(),
            });
            continue;
        };
        if value.is_null() {
            if rule.required {
                fields.push(FieldError {
                    field: key.clone(),
                    message: "cannot be cleared".to_string(),
                });
            }
            continue;
        }
        if let Err(message) = rule.rule.check(value) {
            fields.push(FieldError {
                field: key.clone(),
                message,
            });
        }
    }

    if fields.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { fields })
    }
}

/// Validates `payload` against `T`'s rules and deserializes it.
pub fn parse<T: Record>(payload: Value) -> Result<T, ValidationError> {
    validate(T::KIND, &payload)?;
    serde_json::from_value(payload).map_err(|e| ValidationError::single("$", e.to_string()))
}
