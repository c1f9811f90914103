//! Pull a JSON object out of a free-form model reply.

use regex::Regex;
use serde::de::DeserializeOwned;

const FENCED: &str = r"(?s)```(?:json)?\s*(?P<body>.*?)```";

/// The JSON text inside a reply: a fenced block if present, otherwise the
/// outermost `{ ... }` span.
pub fn extract_json(reply: &str) -> Option<&str> {
    let fenced = Regex::new(FENCED).ok();
    if let Some(caps) = fenced.as_ref().and_then(|re| re.captures(reply)) {
        let body = caps.name("body")?.as_str().trim();
        if !body.is_empty() {
            return Some(body);
        }
    }

    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (end > start).then(|| &reply[start..=end])
}

/// Extract and deserialize, with a reason string on failure.
pub fn parse_reply<T: DeserializeOwned>(reply: &str) -> Result<T, String> {
    let json = extract_json(reply).ok_or_else(|| "reply contains no JSON object".to_string())?;
    serde_json::from_str(json).map_err(|e| format!("reply JSON did not match: {e}"))
}
