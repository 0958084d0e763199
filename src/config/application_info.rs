use crate::config::properties::Environment;

const APPLICATION_NAME_PROPERTY: &str = "wavefront.application.name";
const SERVICE_NAME_PROPERTY: &str = "wavefront.application.service";
const SPRING_APPLICATION_NAME_PROPERTY: &str = "spring.application.name";
const CLUSTER_PROPERTY: &str = "wavefront.application.cluster";
const SHARD_PROPERTY: &str = "wavefront.application.shard";

const DEFAULT_APPLICATION_NAME: &str = "unnamed_application";
const DEFAULT_SERVICE_NAME: &str = "unnamed_service";

/// Labels sent along with a provisioning request so the new account can be named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationInfo {
    pub application: String,
    pub service: String,
    pub cluster: Option<String>,
    pub shard: Option<String>,
}

impl ApplicationInfo {
    pub fn from_environment(environment: &Environment) -> Self {
        let service = non_blank(environment, SERVICE_NAME_PROPERTY)
            .or_else(|| non_blank(environment, SPRING_APPLICATION_NAME_PROPERTY))
            .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_owned());

        Self {
            application: non_blank(environment, APPLICATION_NAME_PROPERTY)
                .unwrap_or_else(|| DEFAULT_APPLICATION_NAME.to_owned()),
            service,
            cluster: non_blank(environment, CLUSTER_PROPERTY),
            shard: non_blank(environment, SHARD_PROPERTY),
        }
    }

    /// Query parameters in request order; unset cluster and shard are left out.
    pub fn query_params(&self) -> Vec<(&'static str, &str)> {
        let mut params = vec![
            ("application", self.application.as_str()),
            ("service", self.service.as_str()),
        ];
        if let Some(cluster) = &self.cluster {
            params.push(("cluster", cluster.as_str()));
        }
        if let Some(shard) = &self.shard {
            params.push(("shard", shard.as_str()));
        }
        params
    }
}

fn non_blank(environment: &Environment, key: &str) -> Option<String> {
    environment
        .get_property(key)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}
