use std::time::Duration;
use tracing::{info, warn};
use triage_advisor::{LlmAdvisor, LlmClient, LlmConfig, Provider};
use triage_core::{
    AdvisoryUnavailable, DateAdvisor, DateClass, FeedbackSummary, KeywordDateAdvisor, Task,
    WeightAdvisor, WeightProposal, WeightSet,
};

use crate::config::AdvisorSection;

/// Which advisory backs this run.
#[derive(Debug, Clone)]
pub enum Advisors {
    Llm(LlmAdvisor),
    /// No LLM: keyword date classification, heuristic-only learning.
    Offline,
}

impl Advisors {
    /// Use the LLM when enabled and a key is present; otherwise run offline.
    pub fn from_config(section: &AdvisorSection, offline: bool) -> Self {
        if offline || !section.enabled {
            return Advisors::Offline;
        }
        match llm_config(section, |name| std::env::var(name).ok()) {
            Ok(cfg) => match LlmClient::new(cfg) {
                Ok(client) => {
                    info!(provider = %section.provider, model = %section.model, "using LLM advisory");
                    Advisors::Llm(LlmAdvisor::new(client))
                }
                Err(e) => {
                    warn!(error = %e, "could not build LLM client; running offline");
                    Advisors::Offline
                }
            },
            Err(reason) => {
                info!(%reason, "LLM advisory not configured; running offline");
                Advisors::Offline
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Advisors::Llm(_) => "llm",
            Advisors::Offline => "offline",
        }
    }
}

pub fn llm_config(
    section: &AdvisorSection,
    env: impl Fn(&str) -> Option<String>,
) -> Result<LlmConfig, String> {
    let provider: Provider = section.provider.parse().map_err(|e| format!("{e}"))?;
    let key_env = if section.api_key_env.trim().is_empty() {
        provider.key_env()
    } else {
        section.api_key_env.trim()
    };
    let api_key = env(key_env)
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .ok_or_else(|| format!("{key_env} is not set"))?;
    let base_url = if section.base_url.trim().is_empty() {
        provider.default_base_url().to_string()
    } else {
        section.base_url.trim().to_string()
    };

    Ok(LlmConfig {
        provider,
        model: section.model.clone(),
        base_url,
        api_key,
        temperature: section.temperature,
        timeout: Duration::from_secs(section.timeout_secs.max(1)),
    })
}

impl DateAdvisor for Advisors {
    fn classify(&self, task: &Task) -> Result<DateClass, AdvisoryUnavailable> {
        match self {
            Advisors::Llm(a) => a.classify(task),
            Advisors::Offline => KeywordDateAdvisor.classify(task),
        }
    }
}

impl WeightAdvisor for Advisors {
    fn propose_weights(
        &self,
        current: &WeightSet,
        summary: &FeedbackSummary,
    ) -> Result<WeightProposal, AdvisoryUnavailable> {
        match self {
            Advisors::Llm(a) => a.propose_weights(current, summary),
            Advisors::Offline => Err(AdvisoryUnavailable::new("offline")),
        }
    }
}
