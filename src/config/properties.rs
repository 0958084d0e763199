//! Layered property environment.
//!
//! An [`Environment`] is an ordered list of named [`PropertySource`]s. Lookups walk
//! the layers from highest to lowest priority and return the first hit, so a layer
//! appended with [`Environment::add_last`] never shadows a value that is already set.

use std::collections::HashMap;

use anyhow::{anyhow, Result};

use crate::config::settings::ServiceConfig;
use crate::utils::constants::{
    APPLICATION_CONFIG_SOURCE, COMMAND_LINE_SOURCE, SYSTEM_ENVIRONMENT_SOURCE,
};

#[derive(Debug, Clone, PartialEq)]
pub struct PropertySource {
    pub name: String,
    values: HashMap<String, String>,
    /// match `a.b-c` against `a_b-c`, `A_BC` and `A_B_C` names
    relaxed: bool,
}

impl PropertySource {
    pub fn new(name: &str, values: HashMap<String, String>) -> Self {
        Self { name: name.to_owned(), values, relaxed: false }
    }

    /// Source backed by environment variables, matched with relaxed names.
    pub fn system_environment<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            name: SYSTEM_ENVIRONMENT_SOURCE.to_owned(),
            values: vars.into_iter().collect(),
            relaxed: true,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        if let Some(value) = self.values.get(key) {
            return Some(value.as_str());
        }
        if !self.relaxed {
            return None;
        }
        relaxed_names(key)
            .iter()
            .find_map(|candidate| self.values.get(candidate))
            .map(|value| value.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Parse `key=value` pairs given on the command line.
pub fn parse_command_line_properties(pairs: &[String]) -> Result<HashMap<String, String>> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(key, value)| (key.trim().to_owned(), value.to_owned()))
                .filter(|(key, _)| !key.is_empty())
                .ok_or_else(|| anyhow!("invalid property '{}', expected key=value", pair))
        })
        .collect()
}

/// Environment variable spellings of a property key.
fn relaxed_names(key: &str) -> Vec<String> {
    let underscored = key.replace('.', "_");
    let mut names = vec![
        underscored.clone(),
        underscored.replace('-', "").to_uppercase(),
        underscored.replace('-', "_").to_uppercase(),
    ];
    names.dedup();
    names
}

#[derive(Debug, Clone, Default)]
pub struct Environment {
    sources: Vec<PropertySource>,
}

impl Environment {
    pub fn new() -> Self {
        Self { sources: Vec::new() }
    }

    /// Command line properties, process environment, then the config file properties.
    pub fn from_layers<I>(
        command_line: HashMap<String, String>,
        env_vars: I,
        service_config: &ServiceConfig,
    ) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let application_config = service_config
            .properties
            .iter()
            .map(|(key, value)| (key.to_owned(), value.as_string()))
            .collect();

        let mut environment = Self::new();
        environment.add_last(PropertySource::new(COMMAND_LINE_SOURCE, command_line));
        environment.add_last(PropertySource::system_environment(env_vars));
        environment.add_last(PropertySource::new(APPLICATION_CONFIG_SOURCE, application_config));
        environment
    }

    pub fn get_property(&self, key: &str) -> Option<&str> {
        self.sources.iter().find_map(|source| source.get(key))
    }

    pub fn get_property_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get_property(key).unwrap_or(default)
    }

    /// Property is set to something other than whitespace
    pub fn has_text(&self, key: &str) -> bool {
        self.get_property(key)
            .filter(|value| !value.trim().is_empty())
            .is_some()
    }

    /// Add a source with the highest priority.
    pub fn add_first(&mut self, source: PropertySource) {
        self.sources.insert(0, source);
    }

    /// Add a source with the lowest priority.
    pub fn add_last(&mut self, source: PropertySource) {
        self.sources.push(source);
    }

    pub fn source(&self, name: &str) -> Option<&PropertySource> {
        self.sources.iter().find(|source| source.name == name)
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|source| source.name.as_str()).collect()
    }
}
