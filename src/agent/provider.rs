//! Process-wide agent provider.
//!
//! Built once at startup and shared by reference with every session. The
//! agent itself is constructed on first use and then reused for the life of
//! the process.

use std::sync::{Arc, OnceLock};

use thiserror::Error;

use crate::config::Config;
use crate::llm::{GroqClient, LlmClient};
use crate::tools::{ToolRegistry, WeatherLookup};

use super::Agent;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("The agent is unavailable: GROQ_API_KEY is not set.")]
pub struct AgentUnavailable;

pub struct AgentProvider {
    config: Config,
    llm: Option<Arc<dyn LlmClient>>,
    agent: OnceLock<Arc<Agent>>,
}

impl AgentProvider {
    /// Provider whose agent talks to Groq.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            llm: None,
            agent: OnceLock::new(),
        }
    }

    /// Provider whose agent uses the given LLM client instead of Groq.
    pub fn with_llm(config: Config, llm: Arc<dyn LlmClient>) -> Self {
        Self {
            config,
            llm: Some(llm),
            agent: OnceLock::new(),
        }
    }

    /// Return the shared agent, building it on the first call.
    pub fn get(&self) -> Result<Arc<Agent>, AgentUnavailable> {
        let api_key = self.config.groq_api_key.as_ref().ok_or(AgentUnavailable)?;

        let agent = self.agent.get_or_init(|| {
            let llm = self.llm.clone().unwrap_or_else(|| -> Arc<dyn LlmClient> {
                Arc::new(GroqClient::new(api_key.clone(), &self.config.llm_base_url))
            });
            let tools = ToolRegistry::weather(WeatherLookup::new(
                self.config.openweather_api_key.clone(),
                &self.config.weather_url,
            ));
            tracing::info!(
                model = %self.config.agent.model,
                temperature = self.config.agent.temperature,
                tools = tools.len(),
                "Constructed agent"
            );
            Arc::new(Agent::new(self.config.agent.clone(), llm, tools))
        });

        Ok(agent.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedLlm;

    fn keys() -> Config {
        Config::new(Some("gsk".to_string()), Some("owm".to_string()))
    }

    #[test]
    fn returns_the_same_instance_every_time() {
        let provider = AgentProvider::new(keys());
        let first = provider.get().unwrap();
        let second = provider.get().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn unavailable_without_llm_key() {
        let provider = AgentProvider::with_llm(
            Config::new(None, Some("owm".to_string())),
            Arc::new(ScriptedLlm::default()),
        );
        assert_eq!(provider.get().err(), Some(AgentUnavailable));
    }

    #[test]
    fn binds_only_the_weather_tool_with_fixed_settings() {
        let provider = AgentProvider::new(keys());
        let agent = provider.get().unwrap();
        let names: Vec<_> = agent.tools().list_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["get_weather".to_string()]);
        assert_eq!(agent.settings().model, "llama-3.1-8b-instant");
        assert_eq!(agent.settings().temperature, 0.1);
    }

    #[test]
    fn shared_across_threads() {
        let provider = Arc::new(AgentProvider::new(keys()));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let provider = provider.clone();
                std::thread::spawn(move || provider.get().unwrap())
            })
            .collect();
        let agents: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(agents.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }
}
