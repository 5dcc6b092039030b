use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::{EntityKind, Record};

/// Resume text for one owner, keyed by `uid` in the `cvs` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvData {
    pub uid: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record for CvData {
    const KIND: EntityKind = EntityKind::Cv;
}
