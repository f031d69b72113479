//! Translation fallback chain
//!
//! Providers are tried in order. A failing provider is logged and recorded;
//! only when every provider has failed does translation fail, carrying each
//! recorded failure. The winning text is cleaned up (see `cleanup`).

use super::cleanup::clean_translation;
use crate::error::PipelineError;
use crate::types::{ProviderError, TranslationProvider};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Translated text and where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    pub text: String,
    /// `None` when no translation was needed
    pub provider: Option<String>,
    pub degraded: bool,
}

/// One provider's failure inside the chain
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderFailure {
    pub provider: String,
    pub error: String,
}

pub struct TranslationChain {
    providers: Vec<Arc<dyn TranslationProvider>>,
}

impl TranslationChain {
    pub fn new(providers: Vec<Arc<dyn TranslationProvider>>) -> Self {
        Self { providers }
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Translate and clean up; identical languages and blank text are
    /// returned untouched
    pub async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<Translation, PipelineError> {
        if source.eq_ignore_ascii_case(target) || text.trim().is_empty() {
            debug!(source, target, "Nothing to translate");
            return Ok(Translation {
                text: text.to_string(),
                provider: None,
                degraded: false,
            });
        }

        match self.try_each(text, source, target).await {
            Ok((provider, raw)) => {
                info!(provider = provider.name(), source, target, "Translation succeeded");
                Ok(Translation {
                    text: clean_translation(&raw),
                    provider: Some(provider.name().to_string()),
                    degraded: provider.is_degraded(),
                })
            }
            Err(failures) => {
                let summary = if failures.is_empty() {
                    "no translation providers configured".to_string()
                } else {
                    failures
                        .iter()
                        .map(|f| format!("{}: {}", f.provider, f.error))
                        .collect::<Vec<_>>()
                        .join("; ")
                };
                Err(PipelineError::TranslationFailed(summary))
            }
        }
    }

    /// First provider that succeeds, or every recorded failure
    pub async fn try_each(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<(&Arc<dyn TranslationProvider>, String), Vec<ProviderFailure>> {
        let mut failures = Vec::new();

        for provider in &self.providers {
            match provider.translate(text, source, target).await {
                Ok(translated) => return Ok((provider, translated)),
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, "Translation provider failed");
                    failures.push(ProviderFailure {
                        provider: provider.name().to_string(),
                        error: describe(&e),
                    });
                }
            }
        }

        Err(failures)
    }
}

fn describe(error: &ProviderError) -> String {
    match error {
        ProviderError::Service(msg) if msg.contains("AccessDenied") => {
            format!("access denied ({})", msg)
        }
        other => other.to_string(),
    }
}
