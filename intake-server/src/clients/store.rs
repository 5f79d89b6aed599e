//! Record store client
//!
//! Create/read/update/delete against the remote relational store's REST
//! surface. Row-level security and query semantics belong to the store;
//! this client only shapes requests and surfaces failures. No retries.

use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;

use crate::utils::{AppError, AppResult};

/// Filter/sort/pagination parameters for a select
#[derive(Debug, Clone, Default)]
pub struct SelectQuery {
    filters: Vec<(String, String)>,
    order: Option<String>,
    limit: Option<u32>,
    offset: Option<u32>,
    count: bool,
}

impl SelectQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Equality filter on a column
    pub fn eq(mut self, column: &str, value: impl Into<String>) -> Self {
        self.filters
            .push((column.to_string(), format!("eq.{}", value.into())));
        self
    }

    /// Sort descending by a column
    pub fn order_desc(mut self, column: &str) -> Self {
        self.order = Some(format!("{}.desc", column));
        self
    }

    /// Sort ascending by a column
    pub fn order_asc(mut self, column: &str) -> Self {
        self.order = Some(format!("{}.asc", column));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Request an exact total row count alongside the page
    pub fn with_count(mut self) -> Self {
        self.count = true;
        self
    }

    fn to_params(&self) -> Vec<(String, String)> {
        let mut params = self.filters.clone();
        if let Some(order) = &self.order {
            params.push(("order".to_string(), order.clone()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(offset) = self.offset {
            params.push(("offset".to_string(), offset.to_string()));
        }
        params
    }
}

/// Client for the remote relational store
#[derive(Clone)]
pub struct RecordStoreClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl RecordStoreClient {
    pub fn new(http: Client, base_url: String, api_key: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authed(&self, rb: RequestBuilder) -> RequestBuilder {
        rb.header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn checked(&self, table: &str, resp: Response) -> AppResult<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        tracing::error!(table = %table, status = %status, body = %body, "Record store call failed");
        Err(AppError::store(format!(
            "Store returned {} for {}",
            status, table
        )))
    }

    /// Insert a row, returning the created representation (including the
    /// store-generated id)
    pub async fn insert(&self, table: &str, row: &Value) -> AppResult<Value> {
        let resp = self
            .authed(self.http.post(self.table_url(table)))
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await
            .map_err(|e| AppError::store(format!("Store unreachable: {}", e)))?;

        let resp = self.checked(table, resp).await?;
        let mut rows: Vec<Value> = resp
            .json()
            .await
            .map_err(|e| AppError::store(format!("Invalid store response: {}", e)))?;
        if rows.is_empty() {
            return Err(AppError::store(format!("Insert into {} returned no row", table)));
        }
        Ok(rows.remove(0))
    }

    /// Select rows; the second tuple element carries the exact total when
    /// the query asked for one
    pub async fn select(
        &self,
        table: &str,
        query: SelectQuery,
    ) -> AppResult<(Vec<Value>, Option<u64>)> {
        let mut rb = self
            .authed(self.http.get(self.table_url(table)))
            .query(&query.to_params());
        if query.count {
            rb = rb.header("Prefer", "count=exact");
        }
        let resp = rb
            .send()
            .await
            .map_err(|e| AppError::store(format!("Store unreachable: {}", e)))?;

        let resp = self.checked(table, resp).await?;
        let total = parse_content_range_total(
            resp.headers()
                .get("content-range")
                .and_then(|v| v.to_str().ok()),
        );
        let rows: Vec<Value> = resp
            .json()
            .await
            .map_err(|e| AppError::store(format!("Invalid store response: {}", e)))?;
        Ok((rows, total))
    }

    /// Fetch a single row by id
    pub async fn find_by_id(&self, table: &str, id: &str) -> AppResult<Option<Value>> {
        let (rows, _) = self
            .select(table, SelectQuery::new().eq("id", id).limit(1))
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Patch a row by id, returning the updated representations (empty
    /// when no row matched)
    pub async fn update(&self, table: &str, id: &str, patch: &Value) -> AppResult<Vec<Value>> {
        let resp = self
            .authed(self.http.patch(self.table_url(table)))
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(patch)
            .send()
            .await
            .map_err(|e| AppError::store(format!("Store unreachable: {}", e)))?;

        let resp = self.checked(table, resp).await?;
        resp.json()
            .await
            .map_err(|e| AppError::store(format!("Invalid store response: {}", e)))
    }

    /// Insert-or-merge on a conflict column; the webhook consumer relies
    /// on this being idempotent
    pub async fn upsert(&self, table: &str, on_conflict: &str, row: &Value) -> AppResult<Value> {
        let resp = self
            .authed(self.http.post(self.table_url(table)))
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(row)
            .send()
            .await
            .map_err(|e| AppError::store(format!("Store unreachable: {}", e)))?;

        let resp = self.checked(table, resp).await?;
        let mut rows: Vec<Value> = resp
            .json()
            .await
            .map_err(|e| AppError::store(format!("Invalid store response: {}", e)))?;
        if rows.is_empty() {
            return Err(AppError::store(format!("Upsert into {} returned no row", table)));
        }
        Ok(rows.remove(0))
    }

    /// Delete a row by id
    pub async fn delete(&self, table: &str, id: &str) -> AppResult<()> {
        self.delete_where(table, "id", id).await
    }

    /// Delete all rows matching an equality filter
    pub async fn delete_where(&self, table: &str, column: &str, value: &str) -> AppResult<()> {
        let resp = self
            .authed(self.http.delete(self.table_url(table)))
            .query(&[(column, format!("eq.{}", value))])
            .send()
            .await
            .map_err(|e| AppError::store(format!("Store unreachable: {}", e)))?;

        self.checked(table, resp).await?;
        Ok(())
    }
}

/// Parse the total out of a `content-range` header ("0-9/42" or "*/42")
fn parse_content_range_total(header: Option<&str>) -> Option<u64> {
    header?.rsplit('/').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_query_params() {
        let q = SelectQuery::new()
            .eq("order_id", "ord_1")
            .order_desc("sent_at")
            .limit(25)
            .offset(50);
        let params = q.to_params();
        assert!(params.contains(&("order_id".to_string(), "eq.ord_1".to_string())));
        assert!(params.contains(&("order".to_string(), "sent_at.desc".to_string())));
        assert!(params.contains(&("limit".to_string(), "25".to_string())));
        assert!(params.contains(&("offset".to_string(), "50".to_string())));
    }

    #[test]
    fn test_parse_content_range_total() {
        assert_eq!(parse_content_range_total(Some("0-9/42")), Some(42));
        assert_eq!(parse_content_range_total(Some("*/7")), Some(7));
        assert_eq!(parse_content_range_total(Some("0-9/*")), None);
        assert_eq!(parse_content_range_total(None), None);
    }
}
