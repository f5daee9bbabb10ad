//! A deterministic model for offline runs and tests.
//!
//! Intent prompts are answered by restating the query, so keyword
//! classification sees the user's own words. Answer prompts are answered by
//! citing every tool block in the context.

use async_trait::async_trait;

use ordo_contracts::{agent::ChatMessage, error::OrdoResult, permission::Surface};
use ordo_core::traits::LanguageModel;

#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineModel;

impl OfflineModel {
    fn intent(prompt: &str) -> String {
        let query = prompt
            .lines()
            .find_map(|line| line.strip_prefix("Query: "))
            .unwrap_or(prompt)
            .trim();
        format!("User intent: {}", query)
    }

    fn answer(prompt: &str) -> String {
        let cited: Vec<String> = prompt
            .lines()
            .filter_map(|line| {
                let rest = line.strip_prefix('[')?;
                let (tool, data) = rest.split_once("]: ")?;
                let surface = Surface::from_tool(tool).as_str().to_lowercase();
                Some(format!("- {} [{}:{}]", data.trim(), surface, tool))
            })
            .collect();

        if cited.is_empty() {
            "I could not find any data to answer that.".to_string()
        } else {
            format!("Here is what I found:\n{}", cited.join("\n"))
        }
    }
}

#[async_trait]
impl LanguageModel for OfflineModel {
    async fn send(&self, _system_prompt: &str, messages: &[ChatMessage]) -> OrdoResult<String> {
        let prompt = messages.last().map(|m| m.content.as_str()).unwrap_or_default();
        if prompt.starts_with("Analyze this query") {
            Ok(Self::intent(prompt))
        } else {
            Ok(Self::answer(prompt))
        }
    }
}
