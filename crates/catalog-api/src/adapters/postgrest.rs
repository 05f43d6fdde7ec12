//! PostgREST store client.
//!
//! Speaks the REST dialect served by Supabase projects under `/rest/v1`:
//! table reads are `GET /{table}?select=..&col=eq.value`, procedures are
//! `POST /rpc/{name}` with the arguments as a JSON object.

use crate::domain::config::{ConfigError, StoreConfig};
use crate::domain::{CountDelta, Group, ItemSummary, RecordId, StoreError, StoreResult};
use crate::ports::CatalogStore;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

/// Table holding groups
pub const GROUP_TABLE: &str = "catalog_group";
/// Table holding items
pub const ITEM_TABLE: &str = "catalog";
/// Procedure applying `count = count + delta` and returning the updated row
pub const COUNT_PROCEDURE: &str = "update_catalog_count";

/// SQLSTATE `no_data_found`, raised by the procedure when the id is unknown
const SQLSTATE_NO_DATA_FOUND: &str = "P0002";
/// Exception text raised by the procedure when the id is unknown
const NOT_FOUND_MESSAGE: &str = "not_found";

/// Error payload returned by PostgREST on non-2xx responses.
#[derive(Debug, Default, Deserialize)]
struct PostgrestErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

/// `CatalogStore` backed by a PostgREST endpoint.
pub struct PostgrestStore {
    client: Client,
    rest_url: String,
}

impl PostgrestStore {
    /// Build the HTTP client for a store.
    ///
    /// The key is attached to every request as `apikey` and as a bearer
    /// token.
    pub fn new(config: &StoreConfig) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(&config.key)
            .map_err(|e| ConfigError::InvalidStoreKey(e.to_string()))?;
        key.set_sensitive(true);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.key))
            .map_err(|e| ConfigError::InvalidStoreKey(e.to_string()))?;
        bearer.set_sensitive(true);
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        Ok(Self {
            client,
            rest_url: config.rest_url(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.rest_url, table)
    }

    fn rpc_url(&self, procedure: &str) -> String {
        format!("{}/rpc/{}", self.rest_url, procedure)
    }

    /// Read rows of a table with PostgREST query parameters.
    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> StoreResult<Vec<T>> {
        let response = self
            .client
            .get(self.table_url(table))
            .query(query)
            .send()
            .await?;

        let response = check_status(response).await?;
        let rows: Vec<T> = response.json().await?;
        debug!(table, rows = rows.len(), "select completed");
        Ok(rows)
    }
}

#[async_trait]
impl CatalogStore for PostgrestStore {
    async fn list_groups(&self) -> StoreResult<Vec<Group>> {
        self.select(GROUP_TABLE, &[("select", "id,name".to_string())])
            .await
    }

    async fn list_active_items(&self, group_id: &str) -> StoreResult<Vec<ItemSummary>> {
        self.select(
            ITEM_TABLE,
            &[
                ("select", "id,name".to_string()),
                ("catalog_group_id", format!("eq.{}", group_id)),
                ("is_active", "eq.true".to_string()),
            ],
        )
        .await
    }

    async fn apply_count_delta(
        &self,
        id: &RecordId,
        delta: CountDelta,
    ) -> StoreResult<serde_json::Value> {
        let args = serde_json::json!({
            "var_catalog_id": id,
            "delta": delta.value(),
        });

        let response = self
            .client
            .post(self.rpc_url(COUNT_PROCEDURE))
            .json(&args)
            .send()
            .await?;

        let response = check_status(response).await?;
        let result = parse_procedure_body(&response.text().await?)?;

        if matches_no_row(&result) {
            return Err(StoreError::NotFound);
        }
        Ok(result)
    }

    async fn ping(&self) -> StoreResult<()> {
        let response = self
            .client
            .get(self.table_url(GROUP_TABLE))
            .query(&[("select", "id"), ("limit", "1")])
            .send()
            .await?;
        check_status(response).await.map(|_| ())
    }
}

/// Pass 2xx responses through, turn anything else into a typed error.
async fn check_status(response: Response) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(classify_error(status.as_u16(), &body))
}

/// Map a PostgREST error response to a `StoreError`.
///
/// The count procedure signals an unknown id either by raising the
/// `not_found` exception text or with SQLSTATE `P0002`.
pub(crate) fn classify_error(status: u16, body: &str) -> StoreError {
    let parsed: PostgrestErrorBody = serde_json::from_str(body).unwrap_or_default();

    let is_not_found = parsed
        .message
        .as_deref()
        .is_some_and(|m| m.trim().eq_ignore_ascii_case(NOT_FOUND_MESSAGE))
        || parsed.code.as_deref() == Some(SQLSTATE_NO_DATA_FOUND);
    if is_not_found {
        return StoreError::NotFound;
    }

    warn!(
        status,
        code = parsed.code.as_deref().unwrap_or(""),
        details = parsed.details.as_deref().unwrap_or(""),
        hint = parsed.hint.as_deref().unwrap_or(""),
        "store rejected request"
    );

    let message = parsed
        .message
        .filter(|m| !m.is_empty())
        .or_else(|| Some(body.trim().to_string()).filter(|b| !b.is_empty()))
        .unwrap_or_else(|| format!("store returned HTTP {}", status));

    StoreError::Rejected {
        status,
        code: parsed.code,
        message,
    }
}

/// Body of a successful procedure call. An empty body (204 from a procedure
/// declared `void`) carries no row and reads as `null`.
fn parse_procedure_body(body: &str) -> StoreResult<serde_json::Value> {
    if body.trim().is_empty() {
        return Ok(serde_json::Value::Null);
    }
    serde_json::from_str(body).map_err(|e| StoreError::Decode(e.to_string()))
}

/// A procedure that matched nothing returns `[]` (set-returning) or `null`
/// (single row).
fn matches_no_row(result: &serde_json::Value) -> bool {
    match result {
        serde_json::Value::Null => true,
        serde_json::Value::Array(rows) => rows.is_empty(),
        _ => false,
    }
}
