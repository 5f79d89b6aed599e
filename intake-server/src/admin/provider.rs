//! Data provider over the record store
//!
//! One adapter implements list/getOne/create/update/delete for every
//! back-office resource, taking filter/sort/pagination parameters and
//! returning `{data, total?}`. Order deletion cascades through the
//! workflow's compensating delete so storage objects and dependent rows
//! go with the row.

use std::collections::HashMap;

use serde_json::Value;
use shared::models::OrderType;

use crate::clients::SelectQuery;
use crate::core::ServerState;
use crate::utils::{AppError, AppResult};
use crate::workflow::cascade_delete_order;

/// Resources the back office may touch
pub const RESOURCES: &[&str] = &[
    "living_orders",
    "memoriam_orders",
    "order_mediums",
    "living_details",
    "order_images",
    "order_emails",
    "invoices",
];

/// Default page size when the client does not paginate
const DEFAULT_PAGE_SIZE: u32 = 50;

/// List parameters, `_sort`/`_order`/`_start`/`_end` plus column filters
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub filter: HashMap<String, String>,
    pub sort: Option<String>,
    pub descending: bool,
    pub start: Option<u32>,
    pub end: Option<u32>,
}

impl ListParams {
    /// Split a raw query-string map into list parameters
    pub fn from_query(mut query: HashMap<String, String>) -> Self {
        let sort = query.remove("_sort");
        let descending = query
            .remove("_order")
            .map(|o| o.eq_ignore_ascii_case("desc"))
            .unwrap_or(false);
        let start = query.remove("_start").and_then(|v| v.parse().ok());
        let end = query.remove("_end").and_then(|v| v.parse().ok());
        Self {
            filter: query,
            sort,
            descending,
            start,
            end,
        }
    }
}

/// Page of rows plus the exact total
#[derive(Debug)]
pub struct DataPage {
    pub data: Vec<Value>,
    pub total: Option<u64>,
}

/// The adapter; stateless over the injected clients
pub struct DataProvider<'a> {
    state: &'a ServerState,
}

impl<'a> DataProvider<'a> {
    pub fn new(state: &'a ServerState) -> Self {
        Self { state }
    }

    fn check_resource(resource: &str) -> AppResult<()> {
        if RESOURCES.contains(&resource) {
            return Ok(());
        }
        Err(AppError::not_found(format!("Resource '{}'", resource)))
    }

    pub async fn list(&self, resource: &str, params: ListParams) -> AppResult<DataPage> {
        Self::check_resource(resource)?;

        let mut query = SelectQuery::new().with_count();
        for (column, value) in &params.filter {
            query = query.eq(column, value.clone());
        }
        if let Some(sort) = &params.sort {
            query = if params.descending {
                query.order_desc(sort)
            } else {
                query.order_asc(sort)
            };
        }
        let start = params.start.unwrap_or(0);
        let end = params.end.unwrap_or(start + DEFAULT_PAGE_SIZE);
        query = query.offset(start).limit(end.saturating_sub(start).max(1));

        let (data, total) = self.state.store.select(resource, query).await?;
        Ok(DataPage { data, total })
    }

    pub async fn get_one(&self, resource: &str, id: &str) -> AppResult<Value> {
        Self::check_resource(resource)?;
        self.state
            .store
            .find_by_id(resource, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("{} {}", resource, id)))
    }

    pub async fn create(&self, resource: &str, body: Value) -> AppResult<Value> {
        Self::check_resource(resource)?;
        self.state.store.insert(resource, &body).await
    }

    pub async fn update(&self, resource: &str, id: &str, body: Value) -> AppResult<Value> {
        Self::check_resource(resource)?;
        let mut updated = self.state.store.update(resource, id, &body).await?;
        if updated.is_empty() {
            return Err(AppError::not_found(format!("{} {}", resource, id)));
        }
        Ok(updated.remove(0))
    }

    /// Delete a row. Orders cascade to their storage objects and
    /// dependent rows; everything else is a plain row delete.
    pub async fn delete(&self, resource: &str, id: &str) -> AppResult<()> {
        Self::check_resource(resource)?;
        match resource {
            "living_orders" => cascade_delete_order(self.state, OrderType::Living, id).await,
            "memoriam_orders" => cascade_delete_order(self.state, OrderType::Memoriam, id).await,
            _ => self.state.store.delete(resource, id).await,
        }
    }
}
