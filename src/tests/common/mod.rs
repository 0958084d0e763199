// tests/common/mod.rs
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use reqwest::Client;
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

use crate::account::lifecycle::AccountProvisioning;
use crate::cache::token_file::LocalTokenCache;
use crate::config::application_info::ApplicationInfo;
use crate::config::properties::{Environment, PropertySource};
use crate::observability::deferred_log::DeferredLog;
use crate::sources::provisioning::{AccountInfo, ProvisionAccount, ProvisioningError};
use crate::utils::constants::{APPLICATION_CONFIG_SOURCE, TOKEN_FILE_NAME};

/// Provisioner returning a canned answer and remembering every cluster it was asked.
pub struct StubProvisioner {
    account: Option<AccountInfo>,
    calls: Mutex<Vec<(String, ApplicationInfo)>>,
}

impl StubProvisioner {
    pub fn succeeding(api_token: &str, account_id: &str) -> Self {
        Self {
            account: Some(AccountInfo { api_token: api_token.to_owned(), account_id: account_id.to_owned() }),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self { account: None, calls: Mutex::new(Vec::new()) }
    }

    pub fn calls(&self) -> Vec<(String, ApplicationInfo)> {
        self.calls.lock().unwrap().clone()
    }
}

impl ProvisionAccount for StubProvisioner {
    async fn provision_account(
        &self,
        cluster_uri: &str,
        application_info: &ApplicationInfo,
        _log: &mut DeferredLog,
    ) -> Result<AccountInfo, ProvisioningError> {
        self.calls
            .lock()
            .unwrap()
            .push((cluster_uri.to_owned(), application_info.clone()));
        self.account
            .clone()
            .ok_or_else(|| ProvisioningError::Malformed("stub failure".to_owned()))
    }
}

/// Token file inside a fresh temp dir; keep the dir alive for the test.
pub fn token_file() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join(TOKEN_FILE_NAME);
    (dir, path)
}

/// Listener printing into a buffer instead of stdout.
pub fn listener(cache: LocalTokenCache) -> AccountProvisioning<Vec<u8>> {
    AccountProvisioning::with_output(cache, Vec::new())
}

pub fn printed(listener: &AccountProvisioning<Vec<u8>>) -> String {
    String::from_utf8(listener.output().clone()).expect("utf-8 output")
}

/// Environment with one explicit `applicationConfig` layer.
pub fn environment(pairs: &[(&str, &str)]) -> Environment {
    let values: HashMap<String, String> = pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    let mut environment = Environment::new();
    environment.add_last(PropertySource::new(APPLICATION_CONFIG_SOURCE, values));
    environment
}

pub fn build_reqwest_client(timeout: std::time::Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .expect("reqwest client")
}

/// Everything a fmt subscriber writes, shared with the test.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Subscriber for `tracing::subscriber::set_default`, debug and up for this crate.
    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync {
        let writer = self.clone();
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("wavefront_provisioner=debug"))
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
