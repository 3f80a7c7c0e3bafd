use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use super::prompt::{CleaningPlan, QuoteInput, build_prompt, parse_plan};

/// Errors from the plan-generation upstream.
#[derive(Debug)]
pub enum PlanError {
    /// Client misconfiguration (missing key)
    Config(String),

    /// Transport-level failure
    Http(reqwest::Error),

    /// Upstream answered with a non-success status
    Upstream(String),

    /// Upstream answered, but not in the labeled format we asked for
    Malformed,
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::Config(msg) => write!(f, "Configuration error: {}", msg),
            PlanError::Http(e) => write!(f, "Request failed: {}", e),
            PlanError::Upstream(msg) => write!(f, "Upstream error: {}", msg),
            PlanError::Malformed => write!(f, "Upstream reply was not in the expected format"),
        }
    }
}

impl std::error::Error for PlanError {}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatResponseMessage>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Client for the chat-completion service that turns quote-form input
/// into a cleaning plan.
pub struct PlanClient {
    api_key: String,
    client: Client,
    base_url: String,
    model: String,
}

impl PlanClient {
    pub fn new(api_key: String, base_url: String, model: String) -> Result<Self, PlanError> {
        if api_key.is_empty() {
            return Err(PlanError::Config(
                "Planner API key is required".to_string(),
            ));
        }

        Ok(Self {
            api_key,
            client: Client::new(),
            base_url,
            model,
        })
    }

    /// One-shot completion call: build the labeled prompt, send it,
    /// parse the three sections back out. No retries.
    pub async fn generate(&self, input: &QuoteInput) -> Result<CleaningPlan, PlanError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: build_prompt(input),
            }],
        };

        debug!("Requesting cleaning plan from {}", self.base_url);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(PlanError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlanError::Upstream(format!(
                "status {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let body: ChatResponse = response.json().await.map_err(PlanError::Http)?;
        let content = body
            .choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .map(|message| message.content.clone())
            .ok_or(PlanError::Malformed)?;

        parse_plan(&content).ok_or(PlanError::Malformed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote() -> QuoteInput {
        QuoteInput {
            property_size: "small apartment".to_string(),
            cleaning_type: "standard cleaning".to_string(),
            frequency: "weekly".to_string(),
            budget: "budget-friendly".to_string(),
            specific_requirements: None,
        }
    }

    fn client_for(server: &mockito::ServerGuard) -> PlanClient {
        PlanClient::new(
            "test-key".to_string(),
            server.url(),
            "test-model".to_string(),
        )
        .unwrap()
    }

    #[test]
    fn empty_api_key_is_a_config_error() {
        let result = PlanClient::new(String::new(), "http://x".to_string(), "m".to_string());
        assert!(matches!(result, Err(PlanError::Config(_))));
    }

    #[tokio::test]
    async fn labeled_completion_is_parsed() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "choices": [{
                        "message": {
                            "content": "Cleaning Plan: Dust, vacuum, mop.\n\
                                        Estimated Cost: $90\n\
                                        Estimated Duration: 2 hours"
                        }
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let plan = client_for(&server).generate(&quote()).await.unwrap();
        assert_eq!(plan.estimated_cost, "$90");
        assert_eq!(plan.estimated_duration, "2 hours");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn upstream_failure_is_reported() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let result = client_for(&server).generate(&quote()).await;
        assert!(matches!(result, Err(PlanError::Upstream(_))));
    }

    #[tokio::test]
    async fn unlabeled_reply_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "choices": [{ "message": { "content": "Sure, happy to help!" } }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let result = client_for(&server).generate(&quote()).await;
        assert!(matches!(result, Err(PlanError::Malformed)));
    }
}
