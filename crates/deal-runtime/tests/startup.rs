//! Startup path: config file + CSV export on disk → index → HTTP router.

use std::io::Write;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use deal_gateway::build_router;
use deal_index::{
    ingest_csv, verify_snapshot, DealLookupApi, DealLookupService, IngestError, IndexError,
};
use deal_runtime::{query, Args};

const HEADER: &str = "□ 국토교통부 실거래가 공개시스템\n조회기간 : 202001 ~ 202012\n";

fn row(location: &str, complex: &str, ym: &str, price: &str) -> String {
    format!(
        r#""{}","1","1","0","{}","84.9","{}","10","{}","7","2010","도로명 1""#,
        location, complex, ym, price
    )
}

fn export(rows: &[String]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", HEADER).unwrap();
    for line in rows {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

fn config_file(body: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", body).unwrap();
    file
}

fn args(data: &tempfile::NamedTempFile, config: &tempfile::NamedTempFile) -> Args {
    Args {
        data_file: data.path().to_path_buf(),
        config: Some(config.path().to_path_buf()),
        host: None,
        port: None,
        header_lines: None,
        strict_order: false,
        verify: false,
        log_json: false,
        query: None,
        params: None,
    }
}

#[tokio::test]
async fn export_is_served_over_http() {
    let data = export(&[
        row("서울특별시 강남구 개포동", "개포자이", "202001", "150,000"),
        row("서울특별시 강남구 개포동", "개포자이", "202003", "155,500"),
        row("서울특별시 강남구 대치동", "은마", "202002", "210,000"),
        row("서울특별시 서초구 반포동", "반포자이", "202005", "300,000"),
    ]);
    let config = config_file("[ingest]\nheader_lines = 2\nverify_after_build = true\n");

    let config = args(&data, &config).resolve_config(|_| None).unwrap();
    assert!(config.ingest.verify_after_build);

    let snapshot = ingest_csv(data.path(), &config.ingest.csv(), config.ingest.index()).unwrap();
    verify_snapshot(&snapshot).unwrap();
    assert_eq!(snapshot.stats().records, 4);

    let api: Arc<dyn DealLookupApi> = Arc::new(DealLookupService::new(Arc::new(snapshot)));
    let response = build_router(api, &config.gateway)
        .oneshot(Request::builder().uri("/deals/1").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), 1 << 20).await.unwrap();
    let deals: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let deals = deals.as_array().unwrap();
    assert_eq!(deals.len(), 2);
    assert_eq!(deals[1]["price"], 155_500);
    assert_eq!(deals[1]["month"], 3);
    assert_eq!(deals[1]["dong"], "개포동");
}

#[test]
fn one_shot_query_answers_from_export() {
    let data = export(&[
        row("서울특별시 강남구 개포동", "개포자이", "202001", "150,000"),
        row("서울특별시 강남구 대치동", "은마", "202002", "210,000"),
    ]);
    let config = config_file("[ingest]\nheader_lines = 2\n");
    let mut args = args(&data, &config);
    args.query = Some("get_record".to_string());
    args.params = Some(r#"{"row_id": 1}"#.to_string());

    let config = args.resolve_config(|_| None).unwrap();
    let params = query::parse_params(args.params.as_deref()).unwrap();
    let snapshot = ingest_csv(data.path(), &config.ingest.csv(), config.ingest.index()).unwrap();

    let method = args.query.as_deref().unwrap();
    let result = query::run_query(Arc::new(snapshot), method, &params).unwrap();
    assert_eq!(result["id"], 1);
    assert_eq!(result["complex"], "은마");
    assert_eq!(result["price"], 210_000);
}

#[test]
fn strict_order_rejects_reappearing_complex() {
    let data = export(&[
        row("서울특별시 강남구 개포동", "개포자이", "202001", "150,000"),
        row("서울특별시 강남구 대치동", "은마", "202002", "210,000"),
        row("서울특별시 강남구 개포동", "개포자이", "202003", "155,500"),
    ]);
    let config = config_file("[ingest]\nheader_lines = 2\n");
    let mut args = args(&data, &config);
    args.strict_order = true;

    let config = args.resolve_config(|_| None).unwrap();
    let err = ingest_csv(data.path(), &config.ingest.csv(), config.ingest.index()).unwrap_err();
    assert!(matches!(
        err,
        IngestError::Index(IndexError::OutOfOrder { row_id: 2, .. })
    ));
}

#[test]
fn malformed_row_reports_physical_line() {
    let data = export(&[
        row("서울특별시 강남구 개포동", "개포자이", "202001", "150,000"),
        "\"broken\"".to_string(),
    ]);
    let config = config_file("[ingest]\nheader_lines = 2\n");

    let config = args(&data, &config).resolve_config(|_| None).unwrap();
    let err = ingest_csv(data.path(), &config.ingest.csv(), config.ingest.index()).unwrap_err();
    assert!(matches!(err, IngestError::Malformed { line: 4, .. }));
}

#[test]
fn missing_export_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ingest_csv(
        &dir.path().join("absent.csv"),
        &Default::default(),
        Default::default(),
    )
    .unwrap_err();
    assert!(matches!(err, IngestError::Io(_)));
}
