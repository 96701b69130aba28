//! Behaviour when nothing is listening at the configured endpoint.

use lakeprobe_store::*;

// Port 1 on loopback is never served, so connects are refused immediately.
fn dead_endpoint_config() -> StoreConfig {
    StoreConfig {
        endpoint: "http://127.0.0.1:1".to_string(),
        connect_timeout_seconds: 2,
        ..StoreConfig::default()
    }
}

#[tokio::test]
async fn test_put_object_fails_with_connection_error() {
    let client = StoreClient::new(dead_endpoint_config());

    let err = client
        .put_object("demo-bucket", "test-folder/hello.txt", b"Hello from MinIO!".to_vec())
        .await
        .expect_err("upload must fail");

    assert!(err.is_unreachable(), "expected unreachable, got: {err}");
    assert_eq!(err.op(), Some(StoreOp::PutObject));
    assert!(err.to_string().contains("127.0.0.1:1"));
}

#[tokio::test]
async fn test_smoke_stops_at_first_failure() {
    let smoke = StoreSmoke::new(StoreClient::new(dead_endpoint_config()));
    let mut out = Vec::new();

    let err = smoke.run(&mut out).await.expect_err("run must fail");

    assert!(err.is_unreachable());
    assert_eq!(err.op(), Some(StoreOp::ListBuckets));

    // Nothing after the failing step was attempted or printed.
    let printed = String::from_utf8(out).unwrap();
    assert!(!printed.contains("Uploaded"));
    assert!(!printed.contains("File content"));
    assert!(!printed.contains("Objects in bucket"));
}

#[tokio::test]
async fn test_get_and_list_fail_with_their_own_op() {
    let client = StoreClient::new(dead_endpoint_config());

    let err = client
        .get_object_string("demo-bucket", "test-folder/hello.txt")
        .await
        .expect_err("download must fail");
    assert_eq!(err.op(), Some(StoreOp::GetObject));

    let err = client
        .list_objects("demo-bucket")
        .await
        .expect_err("listing must fail");
    assert_eq!(err.op(), Some(StoreOp::ListObjects));
}
