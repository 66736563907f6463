//! A generic adapter for sources that serve records as JSON.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use metasift_core::{Identifier, MovieInfo};
use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::source::SourceAdapter;

/// Endpoint definition as written in the `[sources.<name>]` config tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEndpoint {
    /// URL template. `{id}`, `{dvdid}` and `{cid}` are substituted.
    pub endpoint: String,
    #[serde(default)]
    pub self_retrying: bool,
    /// Extra request headers, e.g. an API token.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// Fetches `MovieInfo` JSON from a templated URL.
pub struct JsonEndpointSource {
    name: String,
    config: SourceEndpoint,
    http: reqwest::Client,
}

impl JsonEndpointSource {
    pub fn new(
        name: impl Into<String>,
        config: SourceEndpoint,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("metasift/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            name: name.into(),
            config,
            http,
        })
    }

    /// The request URL for `id`.
    pub fn url_for(&self, id: &Identifier) -> String {
        let dvdid = id.dvdid().unwrap_or_default();
        let cid = id.content_id().unwrap_or_default();
        self.config
            .endpoint
            .replace("{id}", id.num())
            .replace("{dvdid}", dvdid)
            .replace("{cid}", cid)
    }
}

#[async_trait]
impl SourceAdapter for JsonEndpointSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn self_retrying(&self) -> bool {
        self.config.self_retrying
    }

    async fn fetch(&self, id: &Identifier) -> Result<MovieInfo, FetchError> {
        let url = self.url_for(id);
        log::debug!("{}: GET {}", self.name, url);

        let mut req = self.http.get(&url);
        for (key, value) in &self.config.headers {
            req = req.header(key, value);
        }
        let resp = req.send().await?;
        if let Some(err) = FetchError::from_status(resp.status()) {
            return Err(err);
        }

        let text = resp.text().await?;
        let mut info: MovieInfo = serde_json::from_str(&text).map_err(|e| {
            FetchError::structure(format!(
                "{e}. Response: {}",
                text.chars().take(200).collect::<String>()
            ))
        })?;
        if !info.has_title() && info.cover.is_none() {
            return Err(FetchError::structure("response carries no title or cover"));
        }
        if info.url.is_none() {
            info.url = Some(url);
        }
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(endpoint: &str) -> JsonEndpointSource {
        let config = SourceEndpoint {
            endpoint: endpoint.to_string(),
            self_retrying: false,
            headers: BTreeMap::new(),
        };
        JsonEndpointSource::new("local", config, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn url_placeholders() {
        let s = source("http://localhost/m/{id}?cid={cid}&d={dvdid}");
        assert_eq!(
            s.url_for(&Identifier::normal("ABC-123")),
            "http://localhost/m/ABC-123?cid=&d=ABC-123"
        );
        assert_eq!(
            s.url_for(&Identifier::cid("118abp00123")),
            "http://localhost/m/ABP-123?cid=118abp00123&d=ABP-123"
        );
    }

    #[test]
    fn endpoint_config_defaults() {
        let cfg: SourceEndpoint =
            serde_json::from_str(r#"{"endpoint": "http://x/{id}"}"#).unwrap();
        assert!(!cfg.self_retrying);
        assert!(cfg.headers.is_empty());
    }
}
