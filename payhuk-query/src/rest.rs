//! PostgREST table source.
//!
//! Translates a [`TableQuery`] into `GET {base}/rest/v1/{table}` with the
//! PostgREST filter syntax (`select=`, `{field}=eq.{value}`, `limit=`,
//! `order={field}.asc|desc`).

use async_trait::async_trait;
use payhuk_core::{ConfigError, QueryError, QueryResult, TableQuery};
use reqwest::header::ACCEPT;
use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::source::TableSource;

/// Connection settings for a PostgREST endpoint.
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub base_url: String,
    /// Public API key sent as `apikey`.
    pub api_key: SecretString,
    /// User session token. Falls back to `api_key` when absent.
    pub access_token: Option<SecretString>,
}

impl RestConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: SecretString::new(api_key.into().into()),
            access_token: None,
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(SecretString::new(token.into().into()));
        self
    }

    /// Create RestConfig from `SUPABASE_URL` and `SUPABASE_ANON_KEY`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |field: &str| {
            lookup(field)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingRequired {
                    field: field.to_string(),
                })
        };

        let base_url = required("SUPABASE_URL")?;
        let api_key = required("SUPABASE_ANON_KEY")?;

        Url::parse(&base_url).map_err(|e| ConfigError::InvalidValue {
            field: "SUPABASE_URL".to_string(),
            value: base_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self::new(base_url, api_key))
    }
}

/// [`TableSource`] backed by a PostgREST HTTP API.
#[derive(Debug, Clone)]
pub struct RestTableSource {
    client: reqwest::Client,
    config: RestConfig,
}

impl RestTableSource {
    pub fn new(config: RestConfig) -> QueryResult<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| QueryError::upstream(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// Use an existing client, sharing its connection pool.
    pub fn with_client(client: reqwest::Client, config: RestConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &RestConfig {
        &self.config
    }

    /// Build the URL for `query` without sending anything.
    pub fn table_url(&self, query: &TableQuery) -> QueryResult<Url> {
        if query.table.trim().is_empty() {
            return Err(QueryError::invalid_argument("table", "table name is empty"));
        }

        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| QueryError::invalid_argument("base_url", e.to_string()))?;

        url.path_segments_mut()
            .map_err(|_| QueryError::invalid_argument("base_url", "URL cannot be a base"))?
            .pop_if_empty()
            .extend(["rest", "v1", query.table.as_str()]);

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("select", query.columns());
            if let Some(eq) = &query.eq {
                let value = match &eq.value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                pairs.append_pair(&eq.field, &format!("eq.{}", value));
            }
            if let Some(limit) = query.limit {
                pairs.append_pair("limit", &limit.to_string());
            }
            if let Some(order) = &query.order {
                let direction = if order.ascending { "asc" } else { "desc" };
                pairs.append_pair("order", &format!("{}.{}", order.field, direction));
            }
        }

        Ok(url)
    }

    /// Build the full request, headers included.
    pub fn build_request(&self, query: &TableQuery) -> QueryResult<reqwest::Request> {
        let url = self.table_url(query)?;
        let bearer = self
            .config
            .access_token
            .as_ref()
            .unwrap_or(&self.config.api_key);

        self.client
            .get(url)
            .header("apikey", self.config.api_key.expose_secret())
            .bearer_auth(bearer.expose_secret())
            .header(ACCEPT, "application/json")
            .build()
            .map_err(|e| QueryError::invalid_argument("request", e.to_string()))
    }
}

#[async_trait]
impl TableSource for RestTableSource {
    async fn select(&self, query: &TableQuery) -> QueryResult<Value> {
        let request = self.build_request(query)?;

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| QueryError::upstream(format!("Request to {} failed: {}", query.table, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                table = %query.table,
                status = status.as_u16(),
                "Table read rejected by backend"
            );
            return Err(QueryError::upstream_status(status.as_u16(), body));
        }

        response.json::<Value>().await.map_err(|e| QueryError::Decode {
            reason: format!("Invalid JSON from {}: {}", query.table, e),
        })
    }
}
