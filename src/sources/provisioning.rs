//! Provisioning source
//!
//! One POST against the Wavefront cluster that mints a trial account and returns its api token.

use http::header::ACCEPT;
use http::StatusCode;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use crate::config::application_info::ApplicationInfo;
use crate::observability::deferred_log::DeferredLog;
use crate::observability::metrics::get_metrics;
use crate::utils::constants::PROVISIONING_PATH;

#[derive(Debug, Error)]
pub enum ProvisioningError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected status {status} from {url}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },
    #[error("malformed provisioning response: {0}")]
    Malformed(String),
}

impl ProvisioningError {
    /// Short label used for the failure metric
    pub fn reason(&self) -> &'static str {
        match self {
            ProvisioningError::Transport { .. } => "transport",
            ProvisioningError::Status { .. } => "status",
            ProvisioningError::Malformed(_) => "malformed",
        }
    }
}

/// Account created by the provisioning service.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    #[serde(alias = "token")]
    pub api_token: String,
    /// Account identifier, or a login path when it starts with `/`
    #[serde(alias = "url")]
    pub account_id: String,
}

impl AccountInfo {
    /// One-time login link to the account dashboard.
    pub fn login_url(&self, cluster_uri: &str) -> String {
        let cluster_uri = cluster_uri.trim_end_matches('/');
        if self.account_id.starts_with('/') {
            format!("{}{}", cluster_uri, self.account_id)
        } else {
            format!("{}/us/{}", cluster_uri, self.account_id)
        }
    }
}

/// Creates an account on a cluster. Runs before logging is up, so anything worth
/// logging goes to `log`.
pub trait ProvisionAccount {
    fn provision_account(
        &self,
        cluster_uri: &str,
        application_info: &ApplicationInfo,
        log: &mut DeferredLog,
    ) -> impl std::future::Future<Output = Result<AccountInfo, ProvisioningError>> + Send;
}

#[derive(Debug, Clone)]
pub struct ProvisioningClient {
    client: Client,
}

impl ProvisioningClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl ProvisionAccount for ProvisioningClient {
    async fn provision_account(
        &self,
        cluster_uri: &str,
        application_info: &ApplicationInfo,
        log: &mut DeferredLog,
    ) -> Result<AccountInfo, ProvisioningError> {
        let metrics = get_metrics().await;
        let timer = metrics.provisioning_duration.start_timer();
        metrics.provisioning_requests.inc();

        let url = format!("{}{}", cluster_uri.trim_end_matches('/'), PROVISIONING_PATH);
        log.debug(format!("Provisioning a Wavefront account at {}", url));

        let result = self.send(&url, application_info).await;
        timer.observe_duration();
        if let Err(err) = &result {
            metrics.provisioning_failures.with_label_values(&[err.reason()]).inc();
        }
        result
    }
}

impl ProvisioningClient {
    async fn send(&self, url: &str, application_info: &ApplicationInfo) -> Result<AccountInfo, ProvisioningError> {
        let transport = |source| ProvisioningError::Transport { url: url.to_owned(), source };

        let response = self
            .client
            .post(url)
            .query(&application_info.query_params())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let body = response.text().await.map_err(transport)?;
        if !status.is_success() {
            return Err(ProvisioningError::Status { url: url.to_owned(), status, body });
        }

        let account: AccountInfo = serde_json::from_str(&body)
            .map_err(|err| ProvisioningError::Malformed(err.to_string()))?;
        if account.api_token.trim().is_empty() {
            return Err(ProvisioningError::Malformed("api token is empty".to_owned()));
        }
        Ok(account)
    }
}
