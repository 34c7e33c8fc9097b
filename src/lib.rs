//! Wiki Expander - wikitext template transclusion engine
//!
//! This library tokenizes wikitext and expands `{{template}}` invocations and
//! `{{{argument}}}` references. Template source comes from a preloaded cache
//! or is fetched from a MediaWiki action API.
//!
//! Expansion completes immediately when every template is already cached and
//! is deferred otherwise; both modes share the [`Completion`] type.
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use wiki_expander::{render_text, Environment, ParserConfig, TemplateRegistry, WikiParser};
//!
//! let registry = TemplateRegistry::offline()
//!     .with_templates([("Template:Greet", "Hello {{{1}}}!")]);
//! let env = Environment::with_registry(ParserConfig::default(), registry);
//! let parser = WikiParser::new(Rc::new(env));
//!
//! let tokens = parser.parse("{{Greet|world}}").into_done().unwrap();
//! assert_eq!(render_text(&tokens), "Hello world!");
//! ```

pub mod completion;
pub mod config;
pub mod env;
pub mod error;
pub mod parser;
pub mod pipeline;
pub mod renderer;
pub mod template;

use std::rc::Rc;

use tracing::debug;

pub use completion::{Completion, Deferred};
pub use config::{ConfigError, ParserConfig};
pub use env::Environment;
pub use error::Error;
pub use parser::{tokenize, Attribute, Token, TokenKind};
pub use pipeline::{Pipeline, Scope, TokenSink, TokenTransform, TransformManager};
pub use renderer::{render_html, render_text};
pub use template::{FetchError, TemplateFetcher, TemplateHandler, TemplateRegistry};

/// Entry point for expanding whole documents
///
/// Holds the environment and the transform chain with the template handler
/// registered.
pub struct WikiParser {
    env: Rc<Environment>,
    manager: Rc<TransformManager>,
}

impl WikiParser {
    pub fn new(env: Rc<Environment>) -> Self {
        let mut manager = TransformManager::new();
        TemplateHandler::register(&mut manager);
        Self::with_manager(env, manager)
    }

    /// Create a parser with a custom transform chain
    pub fn with_manager(env: Rc<Environment>, manager: TransformManager) -> Self {
        Self {
            env,
            manager: Rc::new(manager),
        }
    }

    /// Build a parser from configuration alone
    pub fn from_config(config: ParserConfig) -> Result<Self, Error> {
        Ok(Self::new(Rc::new(Environment::new(config)?)))
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Expand a document
    ///
    /// The result is immediate when no template needed fetching. The end
    /// marker of the document is not part of the result.
    pub fn parse(&self, input: &str) -> Completion<Vec<Token>> {
        let scope = Scope::root(self.env.clone(), self.manager.clone());
        let output = Pipeline::new(scope)
            .process(input)
            .collect_into(Vec::<Token>::new())
            .map(|mut tokens: Vec<Token>| {
                tokens.retain(|token| !token.is_end());
                parser::merge_text(tokens)
            });
        debug!(deferred = output.is_pending(), "document parsed");
        output
    }

    /// Expand a document, waiting for any fetches
    pub async fn expand(&self, input: &str) -> Vec<Token> {
        self.parse(input).resolve().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn offline(templates: &[(&str, &str)]) -> WikiParser {
        let registry = TemplateRegistry::offline().with_templates(templates.iter().copied());
        WikiParser::new(Rc::new(Environment::with_registry(
            ParserConfig::default(),
            registry,
        )))
    }

    #[test]
    fn test_plain_text_passes_through() {
        let parser = offline(&[]);
        let tokens = parser.parse("just text").into_done().unwrap();
        assert_eq!(tokens, vec![Token::text("just text")]);
    }

    #[test]
    fn test_adjacent_text_is_merged() {
        let parser = offline(&[("Template:X", "x")]);
        let tokens = parser.parse("a{{X}}b").into_done().unwrap();
        assert_eq!(tokens, vec![Token::text("axb")]);
    }

    #[test]
    fn test_end_marker_is_stripped() {
        let parser = offline(&[]);
        let tokens = parser.parse("").into_done().unwrap();
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_from_config_preloads() {
        let config = ParserConfig::new()
            .with_fetch_templates(false)
            .with_template("Greet", "hi {{{1}}}");
        let parser = WikiParser::from_config(config).unwrap();
        let tokens = parser.parse("{{greet|there}}").into_done().unwrap();
        assert_eq!(render_text(&tokens), "hi there");
    }
}
