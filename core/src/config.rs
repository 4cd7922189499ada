//! Client configuration.
//!
//! # Design
//! A `ClientConfig` is built once and then shared read-only by every
//! operation of the clients created from it. Nothing on it changes after
//! construction, so concurrent calls can never observe each other's
//! parameters.

use url::Url;

/// Endpoint of the public-cloud resource manager.
pub const DEFAULT_BASE_URI: &str = "https://management.azure.com";

pub const ENV_SUBSCRIPTION_ID: &str = "AZURE_SUBSCRIPTION_ID";
pub const ENV_TENANT_ID: &str = "AZURE_TENANT_ID";
pub const ENV_BASE_URI: &str = "AZURE_BASE_URI";

/// Errors raised while assembling a `ClientConfig`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    MissingVariable(&'static str),

    #[error("invalid base uri {uri:?}: {reason}")]
    InvalidBaseUri { uri: String, reason: String },
}

/// Immutable settings shared by every operation on a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_uri: String,
    api_version: String,
    subscription_id: String,
    tenant_id: Option<String>,
    user_agent: String,
}

impl ClientConfig {
    /// Creates a configuration against the default endpoint.
    pub fn new(subscription_id: impl Into<String>, api_version: impl Into<String>) -> Self {
        Self {
            base_uri: DEFAULT_BASE_URI.to_string(),
            api_version: api_version.into(),
            subscription_id: subscription_id.into(),
            tenant_id: None,
            user_agent: default_user_agent(),
        }
    }

    /// Reads the subscription, tenant and endpoint from the process
    /// environment.
    pub fn from_env(api_version: impl Into<String>) -> Result<Self, ConfigError> {
        Self::from_lookup(api_version, |key| std::env::var(key).ok())
    }

    /// Same as `from_env` with an arbitrary variable source.
    pub fn from_lookup<F>(api_version: impl Into<String>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let subscription_id =
            non_empty(ENV_SUBSCRIPTION_ID).ok_or(ConfigError::MissingVariable(ENV_SUBSCRIPTION_ID))?;
        let mut config = Self::new(subscription_id, api_version);
        if let Some(tenant) = non_empty(ENV_TENANT_ID) {
            config = config.with_tenant_id(tenant);
        }
        if let Some(base) = non_empty(ENV_BASE_URI) {
            config = config.with_base_uri(&base)?;
        }
        tracing::debug!(base_uri = %config.base_uri, "loaded client configuration from environment");
        Ok(config)
    }

    /// Points the client at another endpoint. Trailing slashes are dropped.
    pub fn with_base_uri(mut self, uri: &str) -> Result<Self, ConfigError> {
        let parsed = Url::parse(uri).map_err(|e| ConfigError::InvalidBaseUri {
            uri: uri.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUri {
                uri: uri.to_string(),
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }
        self.base_uri = uri.trim_end_matches('/').to_string();
        Ok(self)
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

fn default_user_agent() -> String {
    format!("arm-core/{}", env!("CARGO_PKG_VERSION"))
}
