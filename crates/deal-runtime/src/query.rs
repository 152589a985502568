//! One-shot method queries.
//!
//! `deal-runtime deals.csv --query list_complexes --params '{"row_id": 42}'`
//! builds the index, prints one JSON result to stdout and exits instead of
//! serving HTTP.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use deal_index::{handle_api_query, ApiHandler, ApiQueryError, DealLookupService, DealSnapshot};

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("invalid query params: {0}")]
    Params(#[from] serde_json::Error),

    #[error("query failed: {0}")]
    Api(#[from] ApiQueryError),
}

/// Parse the raw `--params` value. No params means JSON `null`.
pub fn parse_params(raw: Option<&str>) -> Result<Value, QueryError> {
    match raw {
        Some(raw) => Ok(serde_json::from_str(raw)?),
        None => Ok(Value::Null),
    }
}

/// Dispatch `method` against `snapshot`.
pub fn run_query(
    snapshot: Arc<DealSnapshot>,
    method: &str,
    params: &Value,
) -> Result<Value, QueryError> {
    debug!(method, "Running one-shot query");
    let handler = ApiHandler::new(DealLookupService::new(snapshot));
    Ok(handle_api_query(&handler, method, params)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use deal_index::{IndexConfig, Record};
    use serde_json::json;

    fn snapshot() -> Arc<DealSnapshot> {
        let records = vec![
            Record::keyed("A", "1", "X"),
            Record::keyed("A", "1", "Y"),
            Record::keyed("A", "2", "Z"),
        ];
        Arc::new(DealSnapshot::build(records, IndexConfig::default()).unwrap())
    }

    #[test]
    fn test_parse_params() {
        assert_eq!(parse_params(None).unwrap(), Value::Null);
        assert_eq!(
            parse_params(Some(r#"{"row_id": 2}"#)).unwrap(),
            json!({ "row_id": 2 })
        );
        assert!(matches!(
            parse_params(Some("{row_id")),
            Err(QueryError::Params(_))
        ));
    }

    #[test]
    fn test_run_query_dispatches_by_method() {
        let regions = run_query(snapshot(), "list_regions", &Value::Null).unwrap();
        assert_eq!(regions, json!({ "A": 0 }));

        let listing = run_query(snapshot(), "list_complexes", &json!({ "row_id": 1 })).unwrap();
        assert_eq!(listing["complexes"], json!({ "X": 0, "Y": 1 }));
    }

    #[test]
    fn test_run_query_reports_api_errors() {
        let err = run_query(snapshot(), "get_record", &json!({ "row_id": 7 })).unwrap_err();
        assert!(matches!(
            err,
            QueryError::Api(ApiQueryError {
                code: ApiQueryError::NOT_FOUND,
                ..
            })
        ));

        let err = run_query(snapshot(), "drop_index", &Value::Null).unwrap_err();
        assert!(matches!(
            err,
            QueryError::Api(ApiQueryError {
                code: ApiQueryError::METHOD_NOT_FOUND,
                ..
            })
        ));
    }
}
