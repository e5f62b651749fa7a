//! Offline unit tests for curio-db pool configuration and row types.
//! These tests do not require a live database connection.

use curio_core::{AppConfig, Environment};
use curio_db::{PoolConfig, ProcessingRunItemRow, ProcessingRunRow};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        raindrop_token: "token".to_string(),
        raindrop_base_url: "https://api.raindrop.io/rest/v1".to_string(),
        keyword_engine_url: "http://localhost:8100".to_string(),
        summary_engine_url: "http://localhost:8200".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        request_timeout_secs: 30,
        user_agent: "ua".to_string(),
        max_concurrent_items: 4,
        max_tags_per_item: 5,
        max_content_chars: 20_000,
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`ProcessingRunRow`] has all
/// expected fields with the correct types. No database required.
#[test]
fn processing_run_row_has_expected_fields() {
    use chrono::Utc;
    use uuid::Uuid;

    let row = ProcessingRunRow {
        run_id: Uuid::new_v4(),
        started_at: Utc::now(),
        requested_ids: vec!["1".to_string(), "2".to_string()],
        elapsed_ms: 1200_i64,
    };

    assert_eq!(row.requested_ids.len(), 2);
    assert_eq!(row.elapsed_ms, 1200);
}

/// Compile-time smoke test: confirm that [`ProcessingRunItemRow`] has all
/// expected fields with the correct types. No database required.
#[test]
fn processing_run_item_row_has_expected_fields() {
    use uuid::Uuid;

    let row = ProcessingRunItemRow {
        run_id: Uuid::new_v4(),
        position: 0_i32,
        bookmark_id: "9001".to_string(),
        status: "succeeded".to_string(),
        failure_kind: None,
        failure_reason: None,
        new_tags: vec!["rust".to_string()],
        new_summary: Some("a summary".to_string()),
    };

    assert_eq!(row.position, 0);
    assert_eq!(row.bookmark_id, "9001");
    assert_eq!(row.status, "succeeded");
    assert!(row.failure_kind.is_none());
    assert_eq!(row.new_tags, vec!["rust".to_string()]);
}
