//! Psychological analysis of a sandbox caption
//!
//! [`TemplateAnalyst`] renders a canned report locally. [`RemoteAnalyst`]
//! asks an external text-generation endpoint. [`FallbackAnalyst`] wraps a
//! primary analyst and answers with the template whenever the primary fails.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use emo_common::config::AnalysisConfig;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

const USER_AGENT: &str = concat!("emo-sandbox/", env!("CARGO_PKG_VERSION"));

/// Analysis errors
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid analysis configuration: {0}")]
    Config(String),
}

/// Optional context supplied with an upload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisHint {
    pub user_id: Option<String>,
    /// Free-text focus requested by the caller
    pub prompt: Option<String>,
}

#[async_trait]
pub trait Analyst: Send + Sync {
    /// Identifier used in logs
    fn name(&self) -> &'static str;

    async fn analyze(&self, caption: &str, hint: &AnalysisHint) -> Result<String, AnalysisError>;
}

/// Canned reports with a few randomized phrases
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateAnalyst;

impl TemplateAnalyst {
    /// Render one report synchronously
    pub fn render(&self, caption: &str, hint: &AnalysisHint) -> String {
        let mut rng = rand::thread_rng();
        let mut pick = |options: &[&'static str]| -> &'static str {
            options.choose(&mut rng).copied().unwrap_or_default()
        };

        let templates: [String; 3] = [
            format!(
                "Scene: {caption}\n\n\
                 Layout: the main elements sit near the centre of the tray, which is typical \
                 for this developmental stage.\n\
                 Emotional expression: the {mood} arrangement may express a wish for {theme}.\n\
                 Suggestions: invite the child to talk about the scene while building it, and \
                 note which figures are chosen first.",
                mood = pick(&["warm", "harmonious", "exploratory", "protective"]),
                theme = pick(&["family", "friendship", "security", "adventure"]),
            ),
            format!(
                "Scene: {caption}\n\n\
                 Symbolism: {element} appear to carry the theme of {theme}, reflecting the \
                 child's current {focus}.\n\
                 Development: the scene shows {ability}.\n\
                 Suggestions: repeat sandbox sessions regularly and watch for elements that \
                 keep coming back.",
                element = pick(&["natural elements", "buildings", "animal figures", "human figures"]),
                theme = pick(&["growth", "protection", "exploration", "connection"]),
                focus = pick(&["emotional state", "social needs", "sense of security"]),
                ability = pick(&["creativity", "logical thinking", "emotional expression", "spatial reasoning"]),
            ),
            format!(
                "Scene: {caption}\n\n\
                 The {layout} layout suggests a {feeling} state of mind with strong attention \
                 to {topic}. The coping style looks {style}.\n\
                 Suggestions: stay patient, avoid interpreting the work for the child, and keep \
                 a record of how the scenes change over time.",
                layout = pick(&["harmonious", "dynamic", "calm", "complex"]),
                feeling = pick(&["happy", "curious", "worried", "excited"]),
                topic = pick(&["family relationships", "friendship", "learning", "play"]),
                style = pick(&["positive", "cautious", "open", "protective"]),
            ),
        ];

        let mut report = templates
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_default();

        if let Some(prompt) = hint.prompt.as_deref().filter(|p| !p.trim().is_empty()) {
            report.push_str(&format!("\n\nRequested focus: {}", prompt.trim()));
        }
        report.push_str(
            "\n\nThis is a single observation and should be read together with the \
             child's background and longer-term observation.",
        );
        report
    }
}

#[async_trait]
impl Analyst for TemplateAnalyst {
    fn name(&self) -> &'static str {
        "template"
    }

    async fn analyze(&self, caption: &str, hint: &AnalysisHint) -> Result<String, AnalysisError> {
        Ok(self.render(caption, hint))
    }
}

#[derive(Debug, Serialize)]
struct RemoteRequest<'a> {
    caption: &'a str,
    prompt: Option<&'a str>,
    user_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct RemoteResponse {
    analysis: String,
}

/// Analyst backed by an HTTP text-generation endpoint
///
/// Sends `{caption, prompt, user_id}` as JSON and expects `{"analysis": "..."}`.
pub struct RemoteAnalyst {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl RemoteAnalyst {
    pub fn new(endpoint: String, api_key: Option<String>, timeout: Duration) -> Result<Self, AnalysisError> {
        if endpoint.trim().is_empty() {
            return Err(AnalysisError::Config("endpoint is empty".to_string()));
        }

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| AnalysisError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl Analyst for RemoteAnalyst {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn analyze(&self, caption: &str, hint: &AnalysisHint) -> Result<String, AnalysisError> {
        let body = RemoteRequest {
            caption,
            prompt: hint.prompt.as_deref(),
            user_id: hint.user_id.as_deref(),
        };

        debug!(endpoint = %self.endpoint, "Requesting remote analysis");

        let mut request = self.http_client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AnalysisError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Api(status.as_u16(), text));
        }

        let parsed: RemoteResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::Parse(e.to_string()))?;

        if parsed.analysis.trim().is_empty() {
            return Err(AnalysisError::Parse("empty analysis".to_string()));
        }
        Ok(parsed.analysis)
    }
}

/// Uses the template whenever the primary analyst fails
pub struct FallbackAnalyst {
    primary: Box<dyn Analyst>,
    fallback: TemplateAnalyst,
}

impl FallbackAnalyst {
    pub fn new(primary: Box<dyn Analyst>) -> Self {
        Self {
            primary,
            fallback: TemplateAnalyst,
        }
    }
}

#[async_trait]
impl Analyst for FallbackAnalyst {
    fn name(&self) -> &'static str {
        self.primary.name()
    }

    async fn analyze(&self, caption: &str, hint: &AnalysisHint) -> Result<String, AnalysisError> {
        match self.primary.analyze(caption, hint).await {
            Ok(analysis) => Ok(analysis),
            Err(e) => {
                warn!(
                    "{} analysis failed, using template analysis: {}",
                    self.primary.name(),
                    e
                );
                Ok(self.fallback.render(caption, hint))
            }
        }
    }
}

/// Build the analyst described by the config
///
/// A configured endpoint gives a remote analyst with template fallback;
/// otherwise the template analyst is used directly.
pub fn build_analyst(config: &AnalysisConfig) -> Result<Arc<dyn Analyst>, AnalysisError> {
    match config.endpoint.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
        Some(endpoint) => {
            let remote = RemoteAnalyst::new(
                endpoint.to_string(),
                config.api_key.clone(),
                Duration::from_secs(config.timeout_secs),
            )?;
            info!("Remote analysis endpoint: {}", endpoint);
            Ok(Arc::new(FallbackAnalyst::new(Box::new(remote))))
        }
        None => {
            info!("No analysis endpoint configured, using template analysis");
            Ok(Arc::new(TemplateAnalyst))
        }
    }
}
