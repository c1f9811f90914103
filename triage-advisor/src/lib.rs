//! triage-advisor: LLM-backed date classification and weight proposals.

pub mod advisor;
pub mod extract;
pub mod llm;
pub mod prompts;

pub use advisor::{parse_classification, parse_proposal, LlmAdvisor};
pub use extract::extract_json;
pub use llm::{LlmClient, LlmConfig, Provider};
