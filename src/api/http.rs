//! HTTP client for the property search, hostname and shield map endpoints.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

use super::{HostnameResolver, Predicate, PropertySearch};
use crate::config::ApiConfig;
use crate::error::{ResolveError, SearchError};
use crate::model::PropertyRecord;

const MAX_RETRIES: u32 = 3;
const RETRY_DELAY_MS: u64 = 1000;

const SEARCH_PATH: &str = "/papi/v1/bulk/rules-search-requests-synchronous";
const SHIELD_MAPS_PATH: &str = "/siteshield/v1/maps";

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<PropertyRecord>,
}

#[derive(Deserialize)]
struct HostnamesResponse {
    hostnames: HostnameItems,
}

#[derive(Deserialize)]
struct HostnameItems {
    #[serde(default)]
    items: Vec<HostnameItem>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HostnameItem {
    cname_from: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShieldMapsResponse {
    #[serde(default)]
    site_shield_maps: Vec<ShieldMapItem>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShieldMapItem {
    rule_name: String,
}

/// Failure of a single HTTP exchange, before it is mapped to a caller error.
#[derive(Debug)]
enum HttpFailure {
    Transport(String),
    Status(u16, String),
    Decode(String),
}

impl From<HttpFailure> for SearchError {
    fn from(f: HttpFailure) -> Self {
        match f {
            HttpFailure::Transport(msg) => SearchError::Network(msg),
            HttpFailure::Status(status, body) => SearchError::Http { status, body },
            HttpFailure::Decode(msg) => SearchError::Parse(msg),
        }
    }
}

/// API client implementing both collaborator traits
pub struct HttpApi {
    client: Client,
    base_url: String,
    account_switch_key: Option<String>,
}

impl HttpApi {
    /// Create a client from the API configuration
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        use anyhow::Context;
        use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};

        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .with_context(|| format!("Invalid header name: {}", name))?;
            let value = HeaderValue::from_str(value)
                .with_context(|| format!("Invalid header value for {}", name))?;
            headers.insert(name, value);
        }

        if let Some(auth) = config.resolve_token().authorization() {
            let mut value = HeaderValue::from_str(&auth).context("Invalid API token")?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(format!("shieldaudit/{}", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            account_switch_key: config.account_switch_key.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_account(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.account_switch_key {
            Some(key) => request.query(&[("accountSwitchKey", key.as_str())]),
            None => request,
        }
    }

    /// Send a request with retry logic and decode the JSON body
    async fn send_json<T, F>(&self, build: F) -> Result<T, HttpFailure>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = RETRY_DELAY_MS * (1 << (attempt - 1));
                debug!("Retry {} after {}ms", attempt, delay);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            match self.with_account(build()).send().await {
                Ok(response) if response.status().is_success() => {
                    return decode(response).await;
                }
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    let failure = HttpFailure::Status(status.as_u16(), body);
                    // Client errors other than throttling will not improve on retry
                    if status.is_client_error() && status.as_u16() != 429 {
                        return Err(failure);
                    }
                    last_error = Some(failure);
                }
                Err(e) => {
                    last_error = Some(HttpFailure::Transport(e.to_string()));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| HttpFailure::Transport("Unknown error".to_string())))
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, HttpFailure> {
    let body = response
        .text()
        .await
        .map_err(|e| HttpFailure::Transport(e.to_string()))?;
    serde_json::from_str(&body).map_err(|e| HttpFailure::Decode(e.to_string()))
}

#[async_trait]
impl PropertySearch for HttpApi {
    async fn search(&self, predicate: &Predicate) -> Result<Vec<PropertyRecord>, SearchError> {
        debug!("Searching properties: {}", predicate);
        let body = json!({
            "bulkSearchQuery": {
                "syntax": "JSONPATH",
                "match": predicate.to_jsonpath(),
            }
        });
        let url = self.url(SEARCH_PATH);
        let response: SearchResponse = self
            .send_json(|| self.client.post(&url).json(&body))
            .await?;
        info!("{} - {} property versions", predicate, response.results.len());
        Ok(response.results)
    }

    async fn shield_map_names(&self) -> Result<Vec<String>, SearchError> {
        let url = self.url(SHIELD_MAPS_PATH);
        let response: ShieldMapsResponse = self.send_json(|| self.client.get(&url)).await?;
        Ok(response
            .site_shield_maps
            .into_iter()
            .map(|m| m.rule_name)
            .collect())
    }
}

#[async_trait]
impl HostnameResolver for HttpApi {
    async fn resolve(&self, record: &PropertyRecord) -> Result<Vec<String>, ResolveError> {
        let contract_id = record
            .contract_id
            .as_deref()
            .ok_or_else(|| ResolveError::MissingField {
                property: record.label(),
                field: "contractId",
            })?;
        let group_id = record
            .group_id
            .as_deref()
            .ok_or_else(|| ResolveError::MissingField {
                property: record.label(),
                field: "groupId",
            })?;

        let url = self.url(&hostnames_path(record));
        let response: HostnamesResponse = self
            .send_json(|| {
                self.client
                    .get(&url)
                    .query(&[("contractId", contract_id), ("groupId", group_id)])
            })
            .await
            .map_err(|f| match f {
                HttpFailure::Transport(msg) => ResolveError::Network(msg),
                HttpFailure::Status(status, _) => ResolveError::Http {
                    property: record.label(),
                    status,
                },
                HttpFailure::Decode(msg) => ResolveError::Parse(msg),
            })?;

        Ok(response
            .hostnames
            .items
            .into_iter()
            .map(|h| h.cname_from)
            .collect())
    }
}

fn hostnames_path(record: &PropertyRecord) -> String {
    format!(
        "/papi/v1/properties/{}/versions/{}/hostnames",
        record.property_id, record.property_version
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ActivationStatus;

    fn api_config() -> ApiConfig {
        ApiConfig {
            base_url: "https://api.example.net/".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let api = HttpApi::new(&api_config()).unwrap();
        assert_eq!(api.url(SHIELD_MAPS_PATH), "https://api.example.net/siteshield/v1/maps");
    }

    #[test]
    fn test_new_rejects_bad_header_value() {
        let mut config = api_config();
        config
            .headers
            .insert("X-Test".to_string(), "bad\u{7f}value".to_string());
        assert!(HttpApi::new(&config).is_err());
    }

    #[test]
    fn test_hostnames_path() {
        let record = PropertyRecord {
            property_id: "prp_42".into(),
            property_version: 7,
            property_name: "www".into(),
            production_status: ActivationStatus::Active,
            staging_status: ActivationStatus::Inactive,
            contract_id: Some("ctr_1".into()),
            group_id: Some("grp_1".into()),
        };
        assert_eq!(
            hostnames_path(&record),
            "/papi/v1/properties/prp_42/versions/7/hostnames"
        );
    }

    #[test]
    fn test_parse_search_response() {
        let body = r#"{
            "bulkSearchId": 5,
            "results": [
                {"propertyId": "prp_1", "propertyVersion": 3, "propertyName": "www.example.com",
                 "productionStatus": "ACTIVE", "stagingStatus": "INACTIVE",
                 "contractId": "ctr_1", "groupId": "grp_2", "isLatest": true,
                 "matchLocations": ["/rules/behaviors/0"]}
            ]
        }"#;
        let parsed: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.results.len(), 1);
        assert_eq!(parsed.results[0].property_version, 3);
        assert_eq!(parsed.results[0].group_id.as_deref(), Some("grp_2"));
    }

    #[test]
    fn test_parse_hostnames_response() {
        let body = r#"{"hostnames": {"items": [
            {"cnameFrom": "www.example.com", "cnameTo": "www.example.com.edgekey.net"},
            {"cnameFrom": "example.com", "cnameTo": "www.example.com.edgekey.net"}
        ]}}"#;
        let parsed: HostnamesResponse = serde_json::from_str(body).unwrap();
        let names: Vec<_> = parsed.hostnames.items.into_iter().map(|h| h.cname_from).collect();
        assert_eq!(names, vec!["www.example.com", "example.com"]);
    }

    #[test]
    fn test_parse_shield_maps_response() {
        let body = r#"{"siteShieldMaps": [
            {"id": 1, "ruleName": "s1.akamaiedge.net"},
            {"id": 2, "ruleName": "s2.akamaiedge.net"}
        ]}"#;
        let parsed: ShieldMapsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.site_shield_maps.len(), 2);
        assert_eq!(parsed.site_shield_maps[1].rule_name, "s2.akamaiedge.net");
    }

    #[tokio::test]
    async fn test_resolve_requires_contract_and_group() {
        let api = HttpApi::new(&api_config()).unwrap();
        let record = PropertyRecord {
            property_id: "prp_1".into(),
            property_version: 1,
            property_name: "www".into(),
            production_status: ActivationStatus::Active,
            staging_status: ActivationStatus::Inactive,
            contract_id: None,
            group_id: None,
        };
        let err = api.resolve(&record).await.unwrap_err();
        assert!(matches!(
            err,
            ResolveError::MissingField {
                field: "contractId",
                ..
            }
        ));
    }
}
