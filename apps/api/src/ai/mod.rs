//! AI gateway: one operation per coaching task.
//!
//! Each task builds a prompt, calls the configured [`TextGenerator`] and maps
//! the text into a typed response. Without a generator (no model credential)
//! every task returns a fixed placeholder of the same shape.

pub mod handlers;
pub mod prompts;

use std::sync::Arc;

use tracing::{debug, info};

use crate::llm_client::prompts::system_prompt;
use crate::llm_client::{strip_json_fences, LlmError, TextGenerator};
use crate::models::ai::{
    CvOptimizerRequest, CvOptimizerResponse, CvSuggestions, InterviewPrepRequest,
    InterviewPrepResponse, JobMatch, JobMatchingRequest, JobMatchingResponse, SkillGapRequest,
    SkillGapResponse,
};

#[derive(Clone)]
pub struct AiGateway {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl AiGateway {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { generator }
    }

    pub fn is_configured(&self) -> bool {
        self.generator.is_some()
    }

    pub async fn match_jobs(
        &self,
        req: &JobMatchingRequest,
    ) -> Result<JobMatchingResponse, LlmError> {
        let Some(generator) = &self.generator else {
            debug!("No model credential, returning placeholder job matches");
            return Ok(placeholder_job_matches());
        };
        let text = generator
            .complete(
                &system_prompt(prompts::JOB_MATCHING_GOAL),
                &prompts::job_matching_prompt(&req.profile, req.preferences.as_ref()),
            )
            .await?;
        Ok(parse_job_matches(text))
    }

    pub async fn optimize_cv(
        &self,
        req: &CvOptimizerRequest,
    ) -> Result<CvOptimizerResponse, LlmError> {
        let Some(generator) = &self.generator else {
            debug!("No model credential, returning placeholder CV suggestions");
            return Ok(placeholder_cv_suggestions());
        };
        let text = generator
            .complete(
                &system_prompt(prompts::CV_OPTIMIZER_GOAL),
                &prompts::cv_optimizer_prompt(&req.resume, &req.target_role),
            )
            .await?;
        Ok(CvOptimizerResponse {
            suggestions: CvSuggestions::Text(text),
            note: None,
        })
    }

    pub async fn interview_prep(
        &self,
        req: &InterviewPrepRequest,
    ) -> Result<InterviewPrepResponse, LlmError> {
        let Some(generator) = &self.generator else {
            debug!("No model credential, returning placeholder coaching reply");
            return Ok(placeholder_interview_reply());
        };
        let reply = generator
            .complete(
                &system_prompt(prompts::INTERVIEW_PREP_GOAL),
                &prompts::interview_prep_prompt(&req.role, &req.transcript),
            )
            .await?;
        Ok(InterviewPrepResponse { reply })
    }

    pub async fn analyze_skill_gaps(
        &self,
        req: &SkillGapRequest,
    ) -> Result<SkillGapResponse, LlmError> {
        let Some(generator) = &self.generator else {
            debug!("No model credential, returning placeholder skill gaps");
            return Ok(placeholder_skill_gaps());
        };
        let plan = generator
            .complete(
                &system_prompt(prompts::SKILL_GAP_GOAL),
                &prompts::skill_gap_prompt(&req.profile, &req.target_role),
            )
            .await?;
        Ok(SkillGapResponse::Plan { plan })
    }
}

/// Structured matches when the text is a JSON array of matches, otherwise the
/// untouched text.
fn parse_job_matches(text: String) -> JobMatchingResponse {
    match serde_json::from_str::<Vec<JobMatch>>(strip_json_fences(&text)) {
        Ok(matches) => JobMatchingResponse::Matches {
            matches,
            note: None,
        },
        Err(e) => {
            info!("Job matches were not a JSON array ({e}), returning raw text");
            JobMatchingResponse::Raw { raw: text }
        }
    }
}

pub fn placeholder_job_matches() -> JobMatchingResponse {
    JobMatchingResponse::Matches {
        matches: vec![JobMatch {
            title: "Frontend Engineer".to_string(),
            company: "Example Co".to_string(),
            match_reason: Some("Strong React/Next.js skills".to_string()),
            link: Some("https://jobs.example.com/frontend".to_string()),
        }],
        note: Some("Set OPENAI_API_KEY to enable AI-powered matching.".to_string()),
    }
}

pub fn placeholder_cv_suggestions() -> CvOptimizerResponse {
    CvOptimizerResponse {
        suggestions: CvSuggestions::List(vec![
            "Add quantifiable achievements".to_string(),
            "Tailor keywords to target role".to_string(),
            "Highlight impact over responsibilities".to_string(),
        ]),
        note: Some("Set OPENAI_API_KEY for AI optimization.".to_string()),
    }
}

pub fn placeholder_interview_reply() -> InterviewPrepResponse {
    InterviewPrepResponse {
        reply: "Provide role and your answer. Set OPENAI_API_KEY for interactive coaching."
            .to_string(),
    }
}

pub fn placeholder_skill_gaps() -> SkillGapResponse {
    SkillGapResponse::Gaps {
        gaps: vec!["System design".to_string(), "Cloud security".to_string()],
        note: Some("Set OPENAI_API_KEY for detailed analysis.".to_string()),
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedGenerator;
    use super::*;
    use serde_json::{json, Map};

    fn gateway(generator: ScriptedGenerator) -> (AiGateway, Arc<ScriptedGenerator>) {
        let generator = Arc::new(generator);
        let shared: Arc<dyn TextGenerator> = generator.clone();
        (AiGateway::new(Some(shared)), generator)
    }

    fn matching_request() -> JobMatchingRequest {
        JobMatchingRequest {
            profile: json!({"skills": "Rust"}).as_object().cloned().unwrap(),
            preferences: None,
        }
    }

    #[tokio::test]
    async fn test_unconfigured_returns_placeholder_matches() {
        let gateway = AiGateway::new(None);
        assert!(!gateway.is_configured());
        match gateway.match_jobs(&matching_request()).await.unwrap() {
            JobMatchingResponse::Matches { matches, note } => {
                assert_eq!(matches[0].company, "Example Co");
                assert!(note.is_some());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_json_array_becomes_matches() {
        let (gateway, _) = gateway(ScriptedGenerator::replying(
            "```json\n[{\"title\":\"SRE\",\"company\":\"Acme\",\"matchReason\":\"Kubernetes\"}]\n```",
        ));
        let response = gateway.match_jobs(&matching_request()).await.unwrap();
        assert_eq!(
            response,
            JobMatchingResponse::Matches {
                matches: vec![JobMatch {
                    title: "SRE".to_string(),
                    company: "Acme".to_string(),
                    match_reason: Some("Kubernetes".to_string()),
                    link: None,
                }],
                note: None,
            }
        );
    }

    #[tokio::test]
    async fn test_non_json_becomes_raw() {
        let text = "1. SRE at Acme\n2. Platform Engineer at Initech";
        let (gateway, _) = gateway(ScriptedGenerator::replying(text));
        let response = gateway.match_jobs(&matching_request()).await.unwrap();
        assert_eq!(
            response,
            JobMatchingResponse::Raw {
                raw: text.to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_json_object_is_not_a_match_list() {
        let text = r#"{"title":"SRE"}"#;
        let (gateway, _) = gateway(ScriptedGenerator::replying(text));
        let response = gateway.match_jobs(&matching_request()).await.unwrap();
        assert!(matches!(response, JobMatchingResponse::Raw { raw } if raw == text));
    }

    #[tokio::test]
    async fn test_prompts_use_task_goal() {
        let (gateway, generator) = gateway(ScriptedGenerator::replying("Tighten the STAR story."));
        let reply = gateway
            .interview_prep(&InterviewPrepRequest {
                role: "SRE".to_string(),
                transcript: "I fixed prod".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(reply.reply, "Tighten the STAR story.");

        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[0].0.contains(prompts::INTERVIEW_PREP_GOAL));
        assert!(prompts[0].1.contains("Candidate answer: I fixed prod"));
    }

    #[tokio::test]
    async fn test_configured_cv_and_skill_gap_return_text() {
        let (gateway, _) = gateway(ScriptedGenerator::replying("- do X"));
        let cv = gateway
            .optimize_cv(&CvOptimizerRequest {
                resume: "Ops".to_string(),
                target_role: "SRE".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(cv.suggestions, CvSuggestions::Text("- do X".to_string()));

        let gaps = gateway
            .analyze_skill_gaps(&SkillGapRequest {
                profile: serde_json::Value::Object(Map::new()),
                target_role: "SRE".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(
            gaps,
            SkillGapResponse::Plan {
                plan: "- do X".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_upstream_failure_is_surfaced() {
        let (gateway, _) = gateway(ScriptedGenerator::failing());
        let err = gateway.match_jobs(&matching_request()).await.unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_unconfigured_interview_reply_text() {
        let reply = AiGateway::new(None)
            .interview_prep(&InterviewPrepRequest {
                role: "SRE".to_string(),
                transcript: "I kept prod up".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(
            reply.reply,
            "Provide role and your answer. Set OPENAI_API_KEY for interactive coaching."
        );
    }

    #[tokio::test]
    async fn test_unconfigured_placeholders_keep_shape() {
        let gateway = AiGateway::new(None);
        let cv = gateway
            .optimize_cv(&CvOptimizerRequest {
                resume: "x".to_string(),
                target_role: "y".to_string(),
            })
            .await
            .unwrap();
        assert!(matches!(cv.suggestions, CvSuggestions::List(ref items) if items.len() == 3));
        let gaps = gateway
            .analyze_skill_gaps(&SkillGapRequest {
                profile: json!("x"),
                target_role: "y".to_string(),
            })
            .await
            .unwrap();
        assert!(matches!(gaps, SkillGapResponse::Gaps { .. }));
    }
}
