// AI gateway prompt templates. One goal + one prompt builder per task.

use serde_json::{Map, Value};

pub const JOB_MATCHING_GOAL: &str = "Recommend roles based on skills and experience";
pub const CV_OPTIMIZER_GOAL: &str = "Optimize resumes for ATS and impact";
pub const INTERVIEW_PREP_GOAL: &str = "Be a pragmatic interview coach";
pub const SKILL_GAP_GOAL: &str = "Identify gaps and propose training plan";

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

pub fn job_matching_prompt(profile: &Map<String, Value>, preferences: Option<&Value>) -> String {
    format!(
        "Candidate profile: {}. Preferences: {}. Recommend 5 matching roles as JSON array \
         with fields title, company, matchReason, link.",
        to_json(profile),
        to_json(&preferences)
    )
}

pub fn cv_optimizer_prompt(resume: &str, target_role: &str) -> String {
    format!(
        "Resume: {resume}\nTarget role: {target_role}. Provide bullet suggestions to optimize."
    )
}

pub fn interview_prep_prompt(role: &str, transcript: &str) -> String {
    format!(
        "Role: {role}. Candidate answer: {transcript}. Give coaching feedback and a stronger \
         sample answer."
    )
}

pub fn skill_gap_prompt(profile: &Value, target_role: &str) -> String {
    format!(
        "Profile: {} Target role: {target_role}. List top skill gaps and learning plan.",
        to_json(profile)
    )
}
