//! Credential resolution for the backend LLM service
//!
//! A complete configuration is the triple (provider, model, api key). Each
//! field lives independently in the secret store and is re-read on every
//! resolution, so a partially-configured store is a normal intermediate
//! state. The resolver polls the store with a bounded retry (a just-invoked
//! setup command may not have finished its write yet), falls back to the
//! interactive setup action for the missing field, and fails with
//! `IncompleteConfiguration` when a field is still absent afterwards.

use crate::interaction::Interaction;
use crate::secrets::{api_key_key, SecretStore, MODEL_KEY, PROVIDER_KEY};
use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Providers the backend supports.
pub const KNOWN_PROVIDERS: &[&str] = &["google", "ollama"];

/// Fixed model list offered for a provider, `None` for unknown providers.
pub fn models_for(provider: &str) -> Option<&'static [&'static str]> {
    match provider.to_lowercase().as_str() {
        "google" => Some(&["gemini-2.0-flash", "gemini-1.5-pro", "gemini-1.5-flash"]),
        "ollama" => Some(&["llama3.2", "codellama", "mistral"]),
        _ => None,
    }
}

/// Fully-resolved backend credentials.
///
/// All three fields are non-empty; only the resolver constructs this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LlmConfiguration {
    pub provider: String,
    pub model: String,
    pub api_key: String,
}

/// Credential resolution failures
#[derive(Debug, Error)]
pub enum CredentialError {
    /// A field is still unset after interactive fallback. The name of the
    /// missing field is embedded; already-stored fields are left untouched.
    #[error("Incomplete configuration: no {field} is set. Run the matching setup command.")]
    IncompleteConfiguration { field: &'static str },

    /// Secret store failure (wraps infrastructure errors)
    #[error("{0}")]
    Store(#[from] anyhow::Error),
}

/// Interactive setup capabilities the resolver can delegate to.
///
/// Implementations own all writes to the secret store; the resolver itself
/// never writes.
#[async_trait]
pub trait SetupActions: Send + Sync {
    async fn set_provider(&self) -> Result<()>;
    async fn set_model(&self) -> Result<()>;
    async fn set_api_key(&self) -> Result<()>;
    async fn reset(&self) -> Result<()>;
}

/// Default interactive setup flow backed by prompts.
pub struct SetupFlow {
    store: Arc<dyn SecretStore>,
    interaction: Arc<dyn Interaction>,
}

impl SetupFlow {
    pub fn new(store: Arc<dyn SecretStore>, interaction: Arc<dyn Interaction>) -> Self {
        Self { store, interaction }
    }

    async fn stored_provider(&self) -> Result<Option<String>> {
        Ok(self
            .store
            .get(PROVIDER_KEY)
            .await?
            .filter(|p| !p.trim().is_empty()))
    }
}

#[async_trait]
impl SetupActions for SetupFlow {
    async fn set_provider(&self) -> Result<()> {
        let items: Vec<String> = KNOWN_PROVIDERS.iter().map(|p| p.to_string()).collect();
        let Some(choice) = self
            .interaction
            .quick_pick("Select an LLM provider", &items)
            .await?
        else {
            // Cancelled: leave the store untouched
            return Ok(());
        };

        self.store.set(PROVIDER_KEY, &choice).await?;
        self.interaction
            .info(&format!("Provider set to '{}'", choice));
        Ok(())
    }

    async fn set_model(&self) -> Result<()> {
        // Model choice depends on the provider; trigger provider setup first
        // when it is missing.
        let provider = match self.stored_provider().await? {
            Some(p) => p,
            None => {
                self.set_provider().await?;
                match self.stored_provider().await? {
                    Some(p) => p,
                    None => {
                        self.interaction
                            .warning("No provider selected; model was not set.");
                        return Ok(());
                    }
                }
            }
        };

        let Some(models) = models_for(&provider) else {
            self.interaction.error(&format!(
                "Unknown provider '{}'; cannot offer a model list.",
                provider
            ));
            return Ok(());
        };

        let items: Vec<String> = models.iter().map(|m| m.to_string()).collect();
        let Some(choice) = self
            .interaction
            .quick_pick(&format!("Select a {} model", provider), &items)
            .await?
        else {
            return Ok(());
        };

        self.store.set(MODEL_KEY, &choice).await?;
        self.interaction.info(&format!("Model set to '{}'", choice));
        Ok(())
    }

    async fn set_api_key(&self) -> Result<()> {
        let Some(provider) = self.stored_provider().await? else {
            self.interaction
                .error("Set a provider before storing an API key.");
            return Ok(());
        };

        let Some(key) = self
            .interaction
            .masked_input(&format!("Enter your {} API key", provider))
            .await?
        else {
            self.interaction
                .error("Empty API key; nothing was saved.");
            return Ok(());
        };

        self.store.set(&api_key_key(&provider), &key).await?;
        self.interaction
            .info(&format!("API key stored for '{}'", provider));
        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        let confirmed = self
            .interaction
            .confirm("Delete the stored provider, model and all API keys?")
            .await?;
        if confirmed != Some(true) {
            // Declined or cancelled: silent return, nothing deleted
            return Ok(());
        }

        // Delete every known key unconditionally, including api-key slots of
        // providers that were never populated.
        self.store.delete(PROVIDER_KEY).await?;
        self.store.delete(MODEL_KEY).await?;
        for provider in KNOWN_PROVIDERS {
            self.store.delete(&api_key_key(provider)).await?;
        }

        self.interaction.info("Wingman configuration cleared.");
        Ok(())
    }
}

/// Resolves a complete `LlmConfiguration`, prompting for missing pieces.
pub struct CredentialResolver {
    store: Arc<dyn SecretStore>,
    setup: Arc<dyn SetupActions>,
    attempts: u32,
    retry_delay: Duration,
}

impl CredentialResolver {
    pub fn new(
        store: Arc<dyn SecretStore>,
        setup: Arc<dyn SetupActions>,
        attempts: u32,
        retry_delay: Duration,
    ) -> Self {
        Self {
            store,
            setup,
            attempts: attempts.max(1),
            retry_delay,
        }
    }

    /// Resolve the full configuration.
    ///
    /// Field order is provider, model, api key; the api-key storage key is
    /// parameterized by the resolved provider, so later steps never run with
    /// a stale or empty provider name.
    pub async fn resolve(&self) -> Result<LlmConfiguration, CredentialError> {
        let provider = self
            .resolve_field(PROVIDER_KEY, "provider")
            .await?;
        let model = self.resolve_field(MODEL_KEY, "model").await?;
        let api_key = self
            .resolve_field(&api_key_key(&provider), "API key")
            .await?;

        Ok(LlmConfiguration {
            provider,
            model,
            api_key,
        })
    }

    async fn resolve_field(
        &self,
        key: &str,
        field: &'static str,
    ) -> Result<String, CredentialError> {
        if let Some(value) = self.read_with_retry(key).await? {
            return Ok(value);
        }

        tracing::info!("No {} stored; starting interactive setup", field);
        self.run_setup(field).await.map_err(CredentialError::Store)?;

        self.read_with_retry(key)
            .await?
            .ok_or(CredentialError::IncompleteConfiguration { field })
    }

    async fn run_setup(&self, field: &'static str) -> Result<()> {
        match field {
            "provider" => self.setup.set_provider().await,
            "model" => self.setup.set_model().await,
            "API key" => self.setup.set_api_key().await,
            other => anyhow::bail!("No setup action for field '{}'", other),
        }
    }

    /// Bounded-retry read: absorbs the race where a just-invoked setup
    /// command has not yet completed its write. Blank values count as
    /// absent.
    async fn read_with_retry(&self, key: &str) -> Result<Option<String>, CredentialError> {
        for attempt in 0..self.attempts {
            if attempt > 0 {
                tokio::time::sleep(self.retry_delay).await;
            }
            match self.store.get(key).await? {
                Some(value) if !value.trim().is_empty() => return Ok(Some(value)),
                _ => {
                    tracing::trace!("secret '{}' absent (attempt {})", key, attempt + 1);
                }
            }
        }
        Ok(None)
    }
}
