use serde::Deserialize;
use tracing::debug;
use triage_core::{
    AdvisoryUnavailable, DateAdvisor, DateClass, FeedbackSummary, Task, WeightAdvisor,
    WeightProposal, WeightSet,
};

use crate::extract::parse_reply;
use crate::llm::LlmClient;
use crate::prompts::{classify_prompt, weights_prompt, CLASSIFY_SYSTEM, WEIGHTS_SYSTEM};

const CLASSIFY_MAX_TOKENS: u32 = 100;
const WEIGHTS_MAX_TOKENS: u32 = 400;

/// LLM-backed date and weight advisory. Any failure maps to `AdvisoryUnavailable`.
#[derive(Debug, Clone)]
pub struct LlmAdvisor {
    client: LlmClient,
}

impl LlmAdvisor {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }

    fn ask(&self, system: &str, user: &str, max_tokens: u32) -> Result<String, AdvisoryUnavailable> {
        let cfg = self.client.config();
        debug!(provider = ?cfg.provider, model = %cfg.model, "advisory request");
        self.client
            .complete(system, user, max_tokens)
            .map_err(|e| AdvisoryUnavailable::new(format!("{e:#}")))
    }
}

#[derive(Debug, Deserialize)]
struct ClassifyReply {
    is_corporate: bool,
    #[serde(default)]
    is_urgent: bool,
}

#[derive(Debug, Deserialize)]
struct WeightsReply {
    urgency: f64,
    importance: f64,
    effort: f64,
    blocking: f64,
    #[serde(default, alias = "rationale")]
    reasoning: String,
}

pub fn parse_classification(reply: &str) -> Result<DateClass, AdvisoryUnavailable> {
    let r: ClassifyReply = parse_reply(reply).map_err(AdvisoryUnavailable::new)?;
    Ok(DateClass {
        is_corporate: r.is_corporate,
        is_urgent: r.is_urgent,
    })
}

/// Parse only; the learner validates the sum before accepting.
pub fn parse_proposal(reply: &str) -> Result<WeightProposal, AdvisoryUnavailable> {
    let r: WeightsReply = parse_reply(reply).map_err(AdvisoryUnavailable::new)?;
    let rationale = if r.reasoning.trim().is_empty() {
        "Weights proposed by the advisory.".to_string()
    } else {
        r.reasoning.trim().to_string()
    };
    Ok(WeightProposal {
        weights: WeightSet::custom(r.urgency, r.importance, r.effort, r.blocking),
        rationale,
    })
}

impl DateAdvisor for LlmAdvisor {
    fn classify(&self, task: &Task) -> Result<DateClass, AdvisoryUnavailable> {
        let reply = self.ask(CLASSIFY_SYSTEM, &classify_prompt(task), CLASSIFY_MAX_TOKENS)?;
        parse_classification(&reply)
    }
}

impl WeightAdvisor for LlmAdvisor {
    fn propose_weights(
        &self,
        current: &WeightSet,
        summary: &FeedbackSummary,
    ) -> Result<WeightProposal, AdvisoryUnavailable> {
        let reply = self.ask(WEIGHTS_SYSTEM, &weights_prompt(current, summary), WEIGHTS_MAX_TOKENS)?;
        parse_proposal(&reply)
    }
}
