//! Remote template source retrieval

use std::collections::HashMap;

use futures::future::{FutureExt, LocalBoxFuture};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ParserConfig;

/// Ways obtaining template source can fail
///
/// The display text of each variant is the diagnostic rendered in place of
/// the template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Fetching is turned off and the cache has no entry
    #[error("Page/template fetching disabled, and no cache for {title}")]
    Disabled { title: String },

    /// The request could not be completed
    #[error("Page/template fetch failure for title {title}")]
    Transport { title: String, message: String },

    /// The server answered with a non-success status
    #[error("Page/template fetch failure for title {title}")]
    Status { title: String, status: u16 },

    /// The response body was not valid JSON
    #[error("Page/template response for {title} could not be parsed")]
    Malformed { title: String, message: String },

    /// A shared in-flight fetch went away without a result
    #[error("Page/template fetch for {title} was abandoned")]
    Abandoned { title: String },
}

/// Source of template wikitext
pub trait TemplateFetcher {
    /// Fetch the source of a fully qualified title
    fn fetch(&self, title: &str) -> LocalBoxFuture<'static, Result<String, FetchError>>;
}

#[derive(Deserialize)]
struct ApiResponse {
    query: Option<ApiQuery>,
}

#[derive(Deserialize)]
struct ApiQuery {
    #[serde(default)]
    pages: HashMap<String, ApiPage>,
}

#[derive(Deserialize)]
struct ApiPage {
    #[serde(default)]
    revisions: Vec<ApiRevision>,
}

#[derive(Deserialize)]
struct ApiRevision {
    #[serde(rename = "*")]
    content: Option<String>,
}

/// Extract template source from a `prop=revisions` query response
///
/// Only a body that is not JSON at all is an error. A well-formed response
/// without revisions, or with an unexpected shape, yields empty source.
pub fn parse_api_response(body: &str) -> Result<String, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    let response: ApiResponse = match serde_json::from_value(value) {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "unexpected API response shape, using empty source");
            return Ok(String::new());
        }
    };

    let source = response
        .query
        .into_iter()
        .flat_map(|query| query.pages.into_values())
        .find_map(|page| page.revisions.into_iter().next())
        .and_then(|revision| revision.content)
        .unwrap_or_default();
    Ok(source)
}

/// Fetches template source from a MediaWiki action API
pub struct ApiFetcher {
    client: reqwest::Client,
    endpoint: String,
}

impl ApiFetcher {
    pub fn new(config: &ParserConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.fetch_timeout())
            .build()?;
        Ok(Self {
            client,
            endpoint: config.api_url(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl TemplateFetcher for ApiFetcher {
    fn fetch(&self, title: &str) -> LocalBoxFuture<'static, Result<String, FetchError>> {
        let request = self.client.get(&self.endpoint).query(&[
            ("format", "json"),
            ("action", "query"),
            ("prop", "revisions"),
            ("rvprop", "content"),
            ("titles", title),
        ]);
        let title = title.to_string();

        async move {
            debug!(%title, "fetching template source");
            let response = request.send().await.map_err(|e| FetchError::Transport {
                title: title.clone(),
                message: e.to_string(),
            })?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    title,
                    status: status.as_u16(),
                });
            }

            let body = response.text().await.map_err(|e| FetchError::Transport {
                title: title.clone(),
                message: e.to_string(),
            })?;

            parse_api_response(&body).map_err(|e| {
                warn!(%title, error = %e, "could not parse API response");
                FetchError::Malformed {
                    title,
                    message: e.to_string(),
                }
            })
        }
        .boxed_local()
    }
}
