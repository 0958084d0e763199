use crate::sources::provisioning::AccountInfo;
use crate::utils::constants::API_TOKEN_PROPERTY;

/// Human readable outcome of a provisioning attempt, printed once the application is up.
///
/// Recorded during environment preparation and taken at most once afterwards.
#[derive(Debug, Default)]
pub struct DeferredReport {
    message: Option<String>,
    flushed: bool,
}

impl DeferredReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any earlier message; ignored once flushed.
    pub fn record(&mut self, message: String) {
        if !self.flushed {
            self.message = Some(message);
        }
    }

    pub fn pending(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn take(&mut self) -> Option<String> {
        if self.flushed {
            return None;
        }
        self.flushed = true;
        self.message.take()
    }
}

pub fn provisioning_success(cluster_uri: &str, account: &AccountInfo) -> String {
    let mut message = String::from(
        "\nA Wavefront account has been provisioned successfully and the API token has been saved to disk.\n\n",
    );
    message.push_str(
        "To configure your application to use this account moving forward, add the following to your configuration:\n\n",
    );
    message.push_str(&format!("\t{}={}\n\n", API_TOKEN_PROPERTY, account.api_token));
    message.push_str(&format!(
        "Connect to your Wavefront dashboard using this one-time use link:\n{}\n",
        account.login_url(cluster_uri)
    ));
    message
}

pub fn provisioning_failure(cluster_uri: &str, error: &str) -> String {
    let mut message = format!("\nFailed to auto-negotiate a Wavefront api token from {}.", cluster_uri);
    if !error.trim().is_empty() {
        message.push_str(&format!(" The error was:\n\n{}\n\n", error));
    }
    message
}
