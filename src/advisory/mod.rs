//! Advisory analysis through an external language-model collaborator.
//!
//! The collaborator receives the project's SDK-related code together with
//! the technology's documentation and answers in free text. The answer is
//! segmented by [`NarrativeResponseParser`]. Every failure of the exchange
//! is folded into a critical finding; [`advise`] never returns an error.

mod narrative;
mod prompt;

pub use narrative::{
    is_sentinel, CategorizedFindings, NarrativeResponseParser, ALL_METHODS_IMPLEMENTED,
    NO_CRITICAL_ISSUES, NO_IMPROVEMENTS, NO_SECURITY_CONCERNS, PARSING_ERROR,
};
pub use prompt::{documentation_context, AdvisoryRequest};

use std::time::Duration;

use futures::future::BoxFuture;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::AdvisoryConfig;
use crate::rules::TechnologyRuleSet;

pub const NO_IMPLEMENTATION_FOUND: &str = "No Mapp SDK implementation found in the project";
pub const EMPTY_RESPONSE: &str = "AI analysis failed to provide results";

/// Errors that can occur during an advisory exchange.
#[derive(Error, Debug)]
pub enum AdvisoryError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("request timed out")]
    Timeout,
    #[error("endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("environment variable {0} is not set")]
    MissingApiKey(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Anything that can answer an advisory request with free text.
pub trait AdvisoryCollaborator: Send + Sync {
    fn consult<'a>(
        &'a self,
        request: &'a AdvisoryRequest,
    ) -> BoxFuture<'a, Result<String, AdvisoryError>>;
}

/// Client for an OpenAI-compatible chat-completions endpoint.
pub struct ChatCompletionsClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    timeout: Duration,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionsClient {
    /// Create a client; the bearer key is read from `config.api_key_env`.
    pub fn new(config: &AdvisoryConfig) -> Result<Self, AdvisoryError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AdvisoryError::MissingApiKey(config.api_key_env.clone()))?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("mappcheck/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
            timeout: Duration::from_millis(config.timeout_ms),
        })
    }

    async fn complete(&self, request: &AdvisoryRequest) -> Result<String, AdvisoryError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system_prompt },
                { "role": "user", "content": request.user_prompt },
            ],
        });

        debug!(endpoint = %self.endpoint, model = %self.model, "sending advisory request");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AdvisoryError::Timeout
                } else {
                    AdvisoryError::Network(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdvisoryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AdvisoryError::Malformed(e.to_string()))?;

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}

impl AdvisoryCollaborator for ChatCompletionsClient {
    fn consult<'a>(
        &'a self,
        request: &'a AdvisoryRequest,
    ) -> BoxFuture<'a, Result<String, AdvisoryError>> {
        Box::pin(self.complete(request))
    }
}

/// Run one advisory exchange over the aggregated project code.
pub async fn advise(
    collaborator: &dyn AdvisoryCollaborator,
    rules: &TechnologyRuleSet,
    project_code: &str,
) -> CategorizedFindings {
    if project_code.trim().is_empty() {
        return CategorizedFindings::critical(NO_IMPLEMENTATION_FOUND);
    }

    let request = AdvisoryRequest::build(rules, project_code);
    match collaborator.consult(&request).await {
        Ok(text) if text.trim().is_empty() => {
            warn!("advisory collaborator returned an empty response");
            CategorizedFindings::critical(EMPTY_RESPONSE)
        }
        Ok(text) => NarrativeResponseParser::for_rules(rules).parse(&text),
        Err(e) => {
            warn!(error = %e, "advisory analysis failed");
            CategorizedFindings::critical(format!("Analysis failed: {}", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{lookup, Technology};
    use futures::executor::block_on;
    use std::sync::Mutex;

    struct Canned {
        reply: Result<String, ()>,
        seen: Mutex<Vec<AdvisoryRequest>>,
    }

    impl Canned {
        fn ok(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl AdvisoryCollaborator for Canned {
        fn consult<'a>(
            &'a self,
            request: &'a AdvisoryRequest,
        ) -> BoxFuture<'a, Result<String, AdvisoryError>> {
            self.seen.lock().unwrap().push(request.clone());
            let reply = match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(()) => Err(AdvisoryError::Timeout),
            };
            Box::pin(async move { reply })
        }
    }

    #[test]
    fn test_empty_project_skips_exchange() {
        let collaborator = Canned::ok("Critical Issues:\n- never used");
        let findings = block_on(advise(&collaborator, lookup(Technology::Flutter), "  \n"));
        assert_eq!(findings.critical_issues, vec![NO_IMPLEMENTATION_FOUND.to_string()]);
        assert!(collaborator.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_empty_response() {
        let collaborator = Canned::ok("   ");
        let findings = block_on(advise(&collaborator, lookup(Technology::Flutter), "code"));
        assert_eq!(findings.critical_issues, vec![EMPTY_RESPONSE.to_string()]);
        assert_eq!(findings.security_concerns, vec![NO_SECURITY_CONCERNS.to_string()]);
    }

    #[test]
    fn test_failure_is_folded_into_findings() {
        let collaborator = Canned::failing();
        let findings = block_on(advise(&collaborator, lookup(Technology::Flutter), "code"));
        assert_eq!(
            findings.critical_issues,
            vec!["Analysis failed: request timed out".to_string()]
        );
        assert_eq!(
            findings.missing_implementations,
            vec![ALL_METHODS_IMPLEMENTED.to_string()]
        );
    }

    #[test]
    fn test_response_is_parsed_with_technology_initializer() {
        let collaborator = Canned::ok(
            "Missing Implementations:\n- [MISSING] MappSdk.shared.engage()\n\nImprovements Needed:\n- Call isReady first",
        );
        let rules = lookup(Technology::IosSwift);
        let findings = block_on(advise(&collaborator, rules, "// File: a.swift\nlet x = 1"));
        assert_eq!(
            findings.critical_issues,
            vec![format!(
                "Missing SDK initialization: {}() not found",
                rules.qualified_initializer()
            )]
        );
        assert_eq!(findings.improvements, vec!["Call isReady first".to_string()]);

        let seen = collaborator.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].user_prompt.contains("let x = 1"));
    }

    #[test]
    fn test_client_requires_api_key() {
        let config = AdvisoryConfig {
            api_key_env: "MAPPCHECK_TEST_KEY_THAT_IS_NOT_SET".to_string(),
            ..AdvisoryConfig::default()
        };
        match ChatCompletionsClient::new(&config) {
            Err(AdvisoryError::MissingApiKey(var)) => {
                assert_eq!(var, "MAPPCHECK_TEST_KEY_THAT_IS_NOT_SET")
            }
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("expected missing key error"),
        }
    }
}
