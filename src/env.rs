//! Shared expansion environment

use std::rc::Rc;

use tracing::debug;

use crate::config::ParserConfig;
use crate::error::Error;
use crate::template::{resolve_title, ApiFetcher, TemplateRegistry, TEMPLATE_NAMESPACE};

/// Configuration and template registry shared by every pipeline of a parse
#[derive(Debug)]
pub struct Environment {
    config: ParserConfig,
    registry: TemplateRegistry,
}

impl Environment {
    /// Build an environment from configuration
    ///
    /// Fetching goes through the wiki's action API when enabled. Templates
    /// listed in the configuration are preloaded under their resolved title.
    pub fn new(config: ParserConfig) -> Result<Self, Error> {
        let registry = if config.fetch_templates {
            TemplateRegistry::new(Rc::new(ApiFetcher::new(&config)?))
        } else {
            TemplateRegistry::offline()
        };
        let registry = registry.with_templates(
            config
                .templates
                .iter()
                .map(|(title, source)| (resolve_title(title, TEMPLATE_NAMESPACE), source.clone())),
        );
        debug!(
            api = %config.api_url(),
            fetch = config.fetch_templates,
            preloaded = registry.len(),
            "environment ready"
        );
        Ok(Self::with_registry(config, registry))
    }

    /// Build an environment around an existing registry
    ///
    /// Templates listed in `config` are not loaded into `registry`.
    pub fn with_registry(config: ParserConfig, registry: TemplateRegistry) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }
}
