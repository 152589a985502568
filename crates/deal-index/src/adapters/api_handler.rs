//! # Method Dispatch Handler
//!
//! Name-based query dispatch over [`DealLookupApi`], for transports that
//! carry a method name plus JSON params (admin tooling, RPC bridges).
//!
//! ```text
//! caller → handle_api_query("list_complexes", {"row_id": 42}) → ApiHandler → DealLookupApi
//! ```
//!
//! The HTTP gateway shares [`DealView`] with this module so both surfaces
//! render records identically.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{LookupError, LookupErrorPayload, Record, RowId, RowSlice};
use crate::ports::DealLookupApi;

/// Error from API query handling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiQueryError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<LookupErrorPayload>,
}

impl ApiQueryError {
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const NOT_FOUND: i32 = -32001;

    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: Self::METHOD_NOT_FOUND,
            message: format!("Method not found: {}", method),
            data: None,
        }
    }

    pub fn invalid_params(msg: &str) -> Self {
        Self {
            code: Self::INVALID_PARAMS,
            message: msg.to_string(),
            data: None,
        }
    }
}

impl From<LookupError> for ApiQueryError {
    fn from(err: LookupError) -> Self {
        Self {
            code: Self::NOT_FOUND,
            message: err.to_string(),
            data: Some(LookupErrorPayload::from(&err)),
        }
    }
}

impl std::fmt::Display for ApiQueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiQueryError {}

/// A record together with its row id.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DealView<'a> {
    pub id: RowId,
    #[serde(flatten)]
    pub record: &'a Record,
}

impl<'a> DealView<'a> {
    /// One view per row of `slice`, in row order.
    pub fn from_slice(slice: &RowSlice<'a>) -> Vec<Self> {
        slice
            .iter()
            .map(|(id, record)| DealView { id, record })
            .collect()
    }
}

/// Method handler over any lookup implementation.
pub struct ApiHandler<S> {
    service: S,
}

impl<S: DealLookupApi> ApiHandler<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Handle ping request (health check).
    pub fn handle_ping(&self) -> Value {
        serde_json::json!({
            "status": "ok",
            "records": self.service.stats().records,
        })
    }

    pub fn handle_stats(&self) -> Value {
        serde_json::to_value(self.service.stats()).unwrap_or_default()
    }

    pub fn handle_list_regions(&self) -> Value {
        serde_json::to_value(self.service.list_regions()).unwrap_or_default()
    }

    pub fn handle_list_sub_regions(&self, row_id: RowId) -> Result<Value, ApiQueryError> {
        let sub_regions = self.service.list_sub_regions(row_id)?;
        Ok(serde_json::to_value(sub_regions).unwrap_or_default())
    }

    pub fn handle_list_complexes(&self, row_id: RowId) -> Result<Value, ApiQueryError> {
        let listing = self.service.list_complexes(row_id)?;
        Ok(serde_json::to_value(listing).unwrap_or_default())
    }

    pub fn handle_resolve_complex_rows(&self, row_id: RowId) -> Result<Value, ApiQueryError> {
        let slice = self.service.resolve_complex_rows(row_id)?;
        Ok(serde_json::to_value(DealView::from_slice(&slice)).unwrap_or_default())
    }

    pub fn handle_resolve_sub_region_rows(&self, row_id: RowId) -> Result<Value, ApiQueryError> {
        let slice = self.service.resolve_sub_region_rows(row_id)?;
        Ok(serde_json::to_value(DealView::from_slice(&slice)).unwrap_or_default())
    }

    pub fn handle_get_record(&self, row_id: RowId) -> Result<Value, ApiQueryError> {
        let record = self.service.get_record(row_id)?;
        Ok(serde_json::to_value(DealView { id: row_id, record }).unwrap_or_default())
    }
}

/// Dispatch a query by method name.
///
/// ## Supported Methods
///
/// - `ping`: Health check
/// - `stats`: Record and group counts
/// - `list_regions`: Region names with representative rows
/// - `list_sub_regions`, `list_complexes`, `resolve_complex_rows`,
///   `resolve_sub_region_rows`, `get_record`: take a `row_id` param
pub fn handle_api_query<S: DealLookupApi>(
    handler: &ApiHandler<S>,
    method: &str,
    params: &Value,
) -> Result<Value, ApiQueryError> {
    match method {
        "ping" => Ok(handler.handle_ping()),
        "stats" => Ok(handler.handle_stats()),
        "list_regions" => Ok(handler.handle_list_regions()),
        "list_sub_regions" => handler.handle_list_sub_regions(parse_row_id_param(params, "row_id")?),
        "list_complexes" => handler.handle_list_complexes(parse_row_id_param(params, "row_id")?),
        "resolve_complex_rows" => {
            handler.handle_resolve_complex_rows(parse_row_id_param(params, "row_id")?)
        }
        "resolve_sub_region_rows" => {
            handler.handle_resolve_sub_region_rows(parse_row_id_param(params, "row_id")?)
        }
        "get_record" => handler.handle_get_record(parse_row_id_param(params, "row_id")?),
        _ => Err(ApiQueryError::method_not_found(method)),
    }
}

/// Parse a row id parameter, accepting a JSON number or a decimal string.
fn parse_row_id_param(params: &Value, name: &str) -> Result<RowId, ApiQueryError> {
    let value = params
        .get(name)
        .ok_or_else(|| ApiQueryError::invalid_params(&format!("Missing {} parameter", name)))?;

    let parsed = match value {
        Value::Number(n) => n.as_u64().and_then(|n| RowId::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<RowId>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        ApiQueryError::invalid_params(&format!("{} must be a non-negative integer", name))
    })
}
