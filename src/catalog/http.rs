use super::{Catalog, PerksPayload};
use crate::config::CatalogConfig;
use crate::matching::CatalogQuery;
use crate::model::PerkRecord;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

/// Remote perks endpoint: `GET {base_url}{perks_path}?name=..&merchant=..`
#[derive(Clone)]
pub struct HttpCatalog {
    base_url: String,
    perks_path: String,
    client: reqwest::Client,
}

impl HttpCatalog {
    pub fn new(base_url: &str, perks_path: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            perks_path: normalize_path(perks_path),
            client,
        })
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        Self::new(
            &config.base_url,
            &config.perks_path,
            Duration::from_millis(config.timeout_ms),
        )
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, self.perks_path)
    }
}

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

/// Turn a catalog response into records. Non-2xx is an error, never an empty list.
fn decode_response(status: StatusCode, body: &str) -> Result<Vec<PerkRecord>> {
    if !status.is_success() {
        return Err(anyhow!("Catalog error {}: {}", status, body.trim()));
    }

    let payload: PerksPayload =
        serde_json::from_str(body).context("Catalog returned an unexpected payload")?;
    Ok(payload.into_records())
}

#[async_trait]
impl Catalog for HttpCatalog {
    async fn query(&self, query: &CatalogQuery) -> Result<Vec<PerkRecord>> {
        let url = self.endpoint();
        debug!(target: "catalog", "GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read response from {}", url))?;

        let records = decode_response(status, &body)?;
        debug!(target: "catalog", "{} records from {}", records.len(), url);
        Ok(records)
    }

    fn describe(&self) -> String {
        self.endpoint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_base_and_path() {
        let catalog =
            HttpCatalog::new("http://localhost:4000/", "api/perks/all", Duration::from_secs(1))
                .unwrap();
        assert_eq!(catalog.endpoint(), "http://localhost:4000/api/perks/all");
    }

    #[test]
    fn test_from_config_uses_defaults() {
        let catalog = HttpCatalog::from_config(&CatalogConfig::default()).unwrap();
        assert_eq!(catalog.describe(), "http://localhost:4000/api/perks/all");
    }

    #[test]
    fn test_non_success_status_is_an_error() {
        let err = decode_response(StatusCode::BAD_GATEWAY, "upstream down\n").unwrap_err();
        assert_eq!(err.to_string(), "Catalog error 502 Bad Gateway: upstream down");

        // Even a body that parses as perks is not trusted on a 5xx
        assert!(decode_response(StatusCode::INTERNAL_SERVER_ERROR, "[]").is_err());
    }

    #[test]
    fn test_decodes_bare_and_wrapped_bodies() {
        let bare = r#"[{"title":"Coffee Pass","merchant":"cafeA"}]"#;
        assert_eq!(
            decode_response(StatusCode::OK, bare).unwrap(),
            vec![PerkRecord::new("Coffee Pass", "cafeA")]
        );

        let wrapped = r#"{"perks":[{"_id":"p1","title":"Gym Day","merchant":"gymX"},
                                    {"title":"coffee mug","merchant":"cafeB"}]}"#;
        let records = decode_response(StatusCode::OK, wrapped).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id.as_deref(), Some("p1"));
        assert_eq!(records[1].title, "coffee mug");

        assert!(decode_response(StatusCode::OK, r#"{"perks":[]}"#).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_body_is_an_error() {
        let err = decode_response(StatusCode::OK, "<html>oops</html>").unwrap_err();
        assert!(err.to_string().contains("unexpected payload"));
        assert!(decode_response(StatusCode::OK, r#"{"items":[]}"#).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_catalog_is_an_error_not_empty() {
        // Port 9 (discard) on loopback is closed on test machines
        let catalog =
            HttpCatalog::new("http://127.0.0.1:9", "/perks", Duration::from_millis(500)).unwrap();
        assert!(catalog.query(&CatalogQuery::default()).await.is_err());
    }
}
