use anyhow::{anyhow, Result};
use clap::arg;
use clap::command;
use clap::Parser;
use reqwest::Client;
use tracing::{error, info, warn};
use wavefront_provisioner::account::lifecycle::{AccountProvisioning, LifecycleEvent, LifecycleListener};
use wavefront_provisioner::account::resolver::{is_proxy_transport, uri_scheme};
use wavefront_provisioner::cache::token_file::LocalTokenCache;
use wavefront_provisioner::config::properties::{parse_command_line_properties, Environment};
use wavefront_provisioner::config::settings::ServiceConfig;
use wavefront_provisioner::observability::metrics::get_metrics;
use wavefront_provisioner::sources::provisioning::ProvisioningClient;
use wavefront_provisioner::utils::config_loader;
use wavefront_provisioner::utils::constants::{API_TOKEN_PROPERTY, URI_PROPERTY};
use wavefront_provisioner::utils::logging;
use wavefront_provisioner::utils::logging::LogLevel;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "wavefront-provisioner.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL" , value_enum)]
    log_level: Option<LogLevel>,
    /// Token file, defaults to ~/.wavefront_token
    #[arg(long, env = "WAVEFRONT_TOKEN_FILE")]
    cache_path: Option<String>,
    /// Highest priority property, as key=value
    #[arg(short = 'D', long = "property")]
    property: Vec<String>,
    /// Print Prometheus metrics before exiting
    #[arg(long)]
    metrics: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config and build the property environment
    // -------------------------------

    let args = Args::parse();
    let service_config = config_loader::run(&args.config).await?;
    let command_line = parse_command_line_properties(&args.property)?;
    let env_vars = std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)));
    let mut environment = Environment::from_layers(command_line, env_vars, &service_config);

    // -------------------------------
    // 2. Resolve the api token, logging is not initialized yet
    // -------------------------------

    let cache = args
        .cache_path
        .to_owned()
        .or(service_config.settings.cache_path.to_owned())
        .map(LocalTokenCache::at)
        .unwrap_or_else(LocalTokenCache::in_home_dir);
    let mut provisioning = AccountProvisioning::new(cache);
    let provisioner = ProvisioningClient::new(Client::new());
    let resolution = provisioning
        .post_process_environment(&mut environment, &provisioner)
        .await;
    provisioning.on_event(LifecycleEvent::EnvironmentPrepared);

    // -------------------------------
    // 3. Start the application
    // -------------------------------

    if let Err(err) = start(&service_config, args.log_level, &environment).await {
        provisioning.on_event(LifecycleEvent::Failed);
        return Err(err);
    }
    provisioning.on_event(LifecycleEvent::ApplicationPrepared);

    // best-effort: the token is in the environment even if it could not be saved
    if let Err(err) = &resolution {
        error!("{}", err);
    }
    provisioning.on_event(LifecycleEvent::Started);

    if args.metrics {
        println!("{}", get_metrics().await.encode_text()?);
    }
    Ok(())
}

async fn start(service_config: &ServiceConfig, log_level: Option<LogLevel>, environment: &Environment) -> Result<()> {
    logging::run(service_config, log_level).await?;

    let cluster_uri = environment.get_property(URI_PROPERTY);
    if let Some(uri) = cluster_uri.filter(|uri| !uri.trim().is_empty()) {
        uri_scheme(uri.trim()).ok_or_else(|| anyhow!("invalid {} '{}': no URI scheme", URI_PROPERTY, uri))?;
    }

    if !is_proxy_transport(environment) && !environment.has_text(API_TOKEN_PROPERTY) {
        warn!("no Wavefront api token available, metrics export is not configured");
    }
    let api_token = if environment.has_text(API_TOKEN_PROPERTY) { "<redacted>" } else { "<unset>" };
    info!(
        cluster = cluster_uri.unwrap_or("<unset>"),
        api_token,
        "Wavefront export configured"
    );
    Ok(())
}
