use std::collections::HashMap;

use thiserror::Error;

use crate::cache::token_file::{CacheWriteError, LocalTokenCache};
use crate::config::application_info::ApplicationInfo;
use crate::config::properties::{Environment, PropertySource};
use crate::observability::deferred_log::DeferredLog;
use crate::observability::metrics::get_metrics;
use crate::sources::provisioning::{AccountInfo, ProvisionAccount};
use crate::utils::constants::{
    API_TOKEN_PROPERTY, DEFAULT_CLUSTER_URI, PROXY_SCHEME, URI_PROPERTY, WAVEFRONT_SOURCE,
};

/// What the resolver did about the api token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// An api token is configured explicitly
    AlreadyConfigured,
    /// Metrics go through a Wavefront proxy
    ProxyTransport,
    /// Token read from the local token file
    Cached { token: String },
    Provisioned { cluster_uri: String, account: AccountInfo },
    /// Provisioning failed, nothing was injected
    Failed { cluster_uri: String, error: String },
}

impl Resolution {
    fn label(&self) -> &'static str {
        match self {
            Resolution::AlreadyConfigured => "configured",
            Resolution::ProxyTransport => "proxy",
            Resolution::Cached { .. } => "cached",
            Resolution::Provisioned { .. } => "provisioned",
            Resolution::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    /// The token is injected and usable for this run, it just won't survive a restart.
    #[error("wavefront api token provisioned from {cluster_uri} could not be saved: {source}")]
    CacheWrite {
        cluster_uri: String,
        account: AccountInfo,
        #[source]
        source: CacheWriteError,
    },
}

/// Finds an api token: explicit configuration, then the local token file, then provisioning.
pub struct CredentialResolver<'a, P> {
    cache: &'a LocalTokenCache,
    provisioner: &'a P,
}

impl<'a, P: ProvisionAccount> CredentialResolver<'a, P> {
    pub fn new(cache: &'a LocalTokenCache, provisioner: &'a P) -> Self {
        Self { cache, provisioner }
    }

    pub async fn resolve(
        &self,
        environment: &mut Environment,
        log: &mut DeferredLog,
    ) -> Result<Resolution, ResolveError> {
        let metrics = get_metrics().await;
        let result = self.resolve_inner(environment, log).await;
        let label = match &result {
            Ok(resolution) => resolution.label(),
            Err(ResolveError::CacheWrite { .. }) => "unsaved",
        };
        metrics.token_resolutions.with_label_values(&[label]).inc();
        result
    }

    async fn resolve_inner(
        &self,
        environment: &mut Environment,
        log: &mut DeferredLog,
    ) -> Result<Resolution, ResolveError> {
        if environment.has_text(API_TOKEN_PROPERTY) {
            log.debug("Wavefront api token already set, no need to negotiate one");
            return Ok(Resolution::AlreadyConfigured);
        }
        if is_proxy_transport(environment) {
            log.debug("Pushing to a Wavefront proxy does not require an api token.");
            return Ok(Resolution::ProxyTransport);
        }

        if let Some(token) = self.cache.read(log).await {
            get_metrics().await.cache_hits.inc();
            log.debug(format!("Existing Wavefront api token found from {}", self.cache.describe()));
            register_api_token(environment, &token);
            return Ok(Resolution::Cached { token });
        }

        let cluster_uri = configured_cluster_uri(environment)
            .unwrap_or(DEFAULT_CLUSTER_URI)
            .to_owned();
        let application_info = ApplicationInfo::from_environment(environment);

        match self.provisioner.provision_account(&cluster_uri, &application_info, log).await {
            Ok(account) => {
                register_api_token(environment, &account.api_token);
                if let Err(source) = self.cache.write(&account.api_token, log).await {
                    return Err(ResolveError::CacheWrite { cluster_uri, account, source });
                }
                Ok(Resolution::Provisioned { cluster_uri, account })
            }
            Err(err) => {
                log.debug(format!("Failed to provision a Wavefront account: {}", err));
                Ok(Resolution::Failed { cluster_uri, error: err.to_string() })
            }
        }
    }
}

fn configured_cluster_uri(environment: &Environment) -> Option<&str> {
    environment
        .get_property(URI_PROPERTY)
        .map(str::trim)
        .filter(|uri| !uri.is_empty())
}

/// Cluster address uses the `proxy` scheme, with or without an authority.
pub fn is_proxy_transport(environment: &Environment) -> bool {
    configured_cluster_uri(environment)
        .and_then(uri_scheme)
        .filter(|scheme| scheme.eq_ignore_ascii_case(PROXY_SCHEME))
        .is_some()
}

/// Scheme of an absolute URI, `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )` before the first `:`.
pub fn uri_scheme(uri: &str) -> Option<&str> {
    let (scheme, _) = uri.split_once(':')?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    chars
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        .then_some(scheme)
}

/// Append the lowest priority `wavefront` layer with the token and,
/// when no cluster address is configured, the default one.
pub fn register_api_token(environment: &mut Environment, api_token: &str) {
    let mut wavefront_settings = HashMap::new();
    wavefront_settings.insert(API_TOKEN_PROPERTY.to_owned(), api_token.to_owned());
    if configured_cluster_uri(environment).is_none() {
        wavefront_settings.insert(URI_PROPERTY.to_owned(), DEFAULT_CLUSTER_URI.to_owned());
    }
    environment.add_last(PropertySource::new(WAVEFRONT_SOURCE, wavefront_settings));
}
