//! Hooks the credential resolver into the host application's startup.
//!
//! The host runs [`AccountProvisioning::post_process_environment`] while it is
//! still assembling its configuration, then forwards [`LifecycleEvent`]s. Log
//! records are replayed on `ApplicationPrepared`; the outcome message is printed
//! on the first `Started` or `Failed`.

use std::io::{self, Stdout, Write};

use crate::account::outcome::{provisioning_failure, provisioning_success, DeferredReport};
use crate::account::resolver::{CredentialResolver, Resolution, ResolveError};
use crate::cache::token_file::LocalTokenCache;
use crate::config::properties::Environment;
use crate::observability::deferred_log::DeferredLog;
use crate::sources::provisioning::ProvisionAccount;

/// Startup phases of the host, in the order they happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    EnvironmentPrepared,
    /// Logging is initialized from here on
    ApplicationPrepared,
    Started,
    Failed,
}

pub trait LifecycleListener {
    fn on_event(&mut self, event: LifecycleEvent);
}

pub struct AccountProvisioning<W: Write = Stdout> {
    cache: LocalTokenCache,
    log: DeferredLog,
    report: DeferredReport,
    out: W,
}

impl AccountProvisioning<Stdout> {
    pub fn new(cache: LocalTokenCache) -> Self {
        Self::with_output(cache, io::stdout())
    }
}

impl<W: Write> AccountProvisioning<W> {
    pub fn with_output(cache: LocalTokenCache, out: W) -> Self {
        Self {
            cache,
            log: DeferredLog::new(),
            report: DeferredReport::new(),
            out,
        }
    }

    /// Resolve the api token into `environment` and record the outcome for later.
    ///
    /// Provisioning failures never surface here; only a failed write of the local
    /// token file does, after the provisioned token was already injected.
    pub async fn post_process_environment<P: ProvisionAccount>(
        &mut self,
        environment: &mut Environment,
        provisioner: &P,
    ) -> Result<Resolution, ResolveError> {
        let resolver = CredentialResolver::new(&self.cache, provisioner);
        match resolver.resolve(environment, &mut self.log).await {
            Ok(resolution) => {
                match &resolution {
                    Resolution::Provisioned { cluster_uri, account } => {
                        self.report.record(provisioning_success(cluster_uri, account));
                    }
                    Resolution::Failed { cluster_uri, error } => {
                        self.report.record(provisioning_failure(cluster_uri, error));
                    }
                    _ => {}
                }
                Ok(resolution)
            }
            Err(err) => {
                let ResolveError::CacheWrite { cluster_uri, .. } = &err;
                self.report.record(provisioning_failure(cluster_uri, &err.to_string()));
                Err(err)
            }
        }
    }

    pub fn deferred_log(&self) -> &DeferredLog {
        &self.log
    }

    pub fn pending_report(&self) -> Option<&str> {
        self.report.pending()
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    fn print_report(&mut self) {
        if let Some(message) = self.report.take() {
            if let Err(err) = writeln!(self.out, "{}", message).and_then(|_| self.out.flush()) {
                self.log.error(format!("Failed to print Wavefront account provisioning outcome: {}", err));
            }
        }
    }
}

impl<W: Write> LifecycleListener for AccountProvisioning<W> {
    fn on_event(&mut self, event: LifecycleEvent) {
        match event {
            LifecycleEvent::EnvironmentPrepared => {}
            LifecycleEvent::ApplicationPrepared => {
                self.log.replay();
            }
            LifecycleEvent::Started | LifecycleEvent::Failed => {
                // a host that fails before preparing still gets its records
                self.log.replay();
                self.print_report();
            }
        }
    }
}
