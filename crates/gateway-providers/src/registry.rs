//! Model catalog and lazily populated adapter cache.

use crate::anthropic::{AnthropicProvider, ANTHROPIC_MODELS};
use crate::deepseek::{DeepSeekProvider, DEEPSEEK_MODELS};
use crate::google::{GoogleProvider, GOOGLE_MODELS};
use crate::grok::{GrokProvider, GROK_MODELS};
use crate::openai::{OpenAIProvider, OPENAI_MODELS};
use crate::settings::{CredentialSource, ProviderSettings};
use dashmap::DashMap;
use gateway_core::{CodeProvider, GatewayError, ProviderDescriptor, ProviderId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Every routable model, grouped by the provider that serves it
pub const MODEL_CATALOG: [ProviderDescriptor; 5] = [
    ProviderDescriptor {
        provider_id: ProviderId::Google,
        supported_models: GOOGLE_MODELS,
    },
    ProviderDescriptor {
        provider_id: ProviderId::DeepSeek,
        supported_models: DEEPSEEK_MODELS,
    },
    ProviderDescriptor {
        provider_id: ProviderId::Anthropic,
        supported_models: ANTHROPIC_MODELS,
    },
    ProviderDescriptor {
        provider_id: ProviderId::Grok,
        supported_models: GROK_MODELS,
    },
    ProviderDescriptor {
        provider_id: ProviderId::OpenAI,
        supported_models: OPENAI_MODELS,
    },
];

/// Provider serving `model`, if the model is routable
#[must_use]
pub fn provider_for_model(model: &str) -> Option<ProviderId> {
    MODEL_CATALOG
        .iter()
        .find(|descriptor| descriptor.supported_models.contains(&model))
        .map(|descriptor| descriptor.provider_id)
}

/// Endpoint override applied when an adapter is built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointOverride {
    /// Replacement base URL
    pub base_url: Option<String>,
    /// HTTP client timeout
    pub timeout: Duration,
}

/// Resolves model ids to shared adapter instances.
///
/// Adapters are built on first use, which is also when their credential is
/// read. A provider whose credential is missing fails every resolution until
/// the credential appears; nothing is cached for it.
pub struct ProviderRegistry {
    credentials: CredentialSource,
    endpoints: HashMap<ProviderId, EndpointOverride>,
    adapters: DashMap<ProviderId, Arc<dyn CodeProvider>>,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new(CredentialSource::Environment)
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cached: Vec<ProviderId> = self.adapters.iter().map(|entry| *entry.key()).collect();
        f.debug_struct("ProviderRegistry")
            .field("credentials", &self.credentials)
            .field("endpoints", &self.endpoints)
            .field("cached", &cached)
            .finish()
    }
}

impl ProviderRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new(credentials: CredentialSource) -> Self {
        Self {
            credentials,
            endpoints: HashMap::new(),
            adapters: DashMap::new(),
        }
    }

    /// Override where a provider's adapter connects
    #[must_use]
    pub fn with_endpoint(mut self, provider: ProviderId, endpoint: EndpointOverride) -> Self {
        self.endpoints.insert(provider, endpoint);
        self
    }

    /// Install a prebuilt adapter, bypassing credential lookup
    #[must_use]
    pub fn with_adapter(self, adapter: Arc<dyn CodeProvider>) -> Self {
        self.adapters.insert(adapter.provider_id(), adapter);
        self
    }

    /// Adapter for a model.
    ///
    /// # Errors
    /// `UnsupportedModel` if the model is not in the catalog, or
    /// `MissingCredential` if its provider has no secret configured
    pub fn resolve(&self, model: &str) -> Result<Arc<dyn CodeProvider>, GatewayError> {
        let provider =
            provider_for_model(model).ok_or_else(|| GatewayError::unsupported_model(model))?;
        self.adapter(provider)
    }

    /// Adapter for a provider, building it on first use
    ///
    /// # Errors
    /// Returns `MissingCredential` if the provider has no secret configured
    pub fn adapter(&self, provider: ProviderId) -> Result<Arc<dyn CodeProvider>, GatewayError> {
        if let Some(adapter) = self.adapters.get(&provider) {
            return Ok(Arc::clone(adapter.value()));
        }

        let adapter = self
            .adapters
            .entry(provider)
            .or_try_insert_with(|| self.build(provider))?;
        Ok(Arc::clone(adapter.value()))
    }

    /// Whether an adapter for `provider` has been built
    #[must_use]
    pub fn is_cached(&self, provider: ProviderId) -> bool {
        self.adapters.contains_key(&provider)
    }

    /// Routable models with their owning provider
    #[must_use]
    pub fn models(&self) -> Vec<(&'static str, ProviderId)> {
        MODEL_CATALOG
            .iter()
            .flat_map(|descriptor| {
                descriptor
                    .supported_models
                    .iter()
                    .map(move |model| (*model, descriptor.provider_id))
            })
            .collect()
    }

    fn build(&self, provider: ProviderId) -> Result<Arc<dyn CodeProvider>, GatewayError> {
        let mut settings = ProviderSettings::new(self.credentials.credential(provider)?);
        if let Some(endpoint) = self.endpoints.get(&provider) {
            if let Some(base_url) = &endpoint.base_url {
                settings = settings.with_base_url(base_url.clone());
            }
            settings = settings.with_timeout(endpoint.timeout);
        }

        info!(provider = %provider, "Creating provider adapter");

        let adapter: Arc<dyn CodeProvider> = match provider {
            ProviderId::OpenAI => Arc::new(OpenAIProvider::new(settings)?),
            ProviderId::Anthropic => Arc::new(AnthropicProvider::new(settings)?),
            ProviderId::Google => Arc::new(GoogleProvider::new(settings)?),
            ProviderId::DeepSeek => Arc::new(DeepSeekProvider::new(settings)?),
            ProviderId::Grok => Arc::new(GrokProvider::new(settings)?),
        };
        Ok(adapter)
    }
}
