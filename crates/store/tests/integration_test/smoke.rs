//! Smoke sequence against the in-process S3 endpoint.

use lakeprobe_store::*;

use crate::mock::MockS3;

#[tokio::test]
async fn test_smoke_prints_each_step() {
    let mock = MockS3::start(&["demo-bucket"]).await;
    let smoke = StoreSmoke::new(StoreClient::new(mock.config()));
    let mut out = Vec::new();

    smoke.run(&mut out).await.expect("smoke run");

    let printed = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = printed.lines().collect();
    assert_eq!(
        lines,
        vec![
            r#"Buckets: ["demo-bucket"]"#,
            "Uploaded 'test-folder/hello.txt' to bucket 'demo-bucket'.",
            "File content: Hello from MinIO!",
            "Objects in bucket:",
            " - test-folder/hello.txt",
        ]
    );
    assert_eq!(
        mock.log(),
        vec![
            "ListBuckets",
            "PutObject demo-bucket/test-folder/hello.txt",
            "GetObject demo-bucket/test-folder/hello.txt",
            "ListObjectsV2 demo-bucket",
        ]
    );
}

#[tokio::test]
async fn test_smoke_round_trips_payload() {
    let mock = MockS3::start(&["demo-bucket", "warehouse"]).await;
    let config = mock.config();
    let payload = config.payload.clone();
    let smoke = StoreSmoke::new(StoreClient::new(config));

    let report = smoke.run(&mut Vec::new()).await.expect("smoke run");

    assert_eq!(report.buckets, vec!["demo-bucket", "warehouse"]);
    assert!(report.round_trip_ok(&payload));
    assert!(report.listed_uploaded_key());
    assert_eq!(
        mock.stored("demo-bucket", "test-folder/hello.txt"),
        Some(payload)
    );
}

#[tokio::test]
async fn test_client_round_trip_keeps_bytes() {
    let mock = MockS3::start(&["demo-bucket"]).await;
    let client = StoreClient::new(mock.config());
    let body = vec![0u8, 159, 146, 150, 255];

    client
        .put_object("demo-bucket", "bin/blob", body.clone())
        .await
        .expect("upload");
    let fetched = client.get_object("demo-bucket", "bin/blob").await.expect("download");
    assert_eq!(fetched, body);

    // Not text, so the string variant refuses it.
    let err = client
        .get_object_string("demo-bucket", "bin/blob")
        .await
        .expect_err("invalid utf-8");
    assert!(matches!(err, StoreError::InvalidUtf8 { ref key } if key == "bin/blob"));
}

#[tokio::test]
async fn test_smoke_omits_header_for_empty_listing() {
    let mock = MockS3::start(&["demo-bucket"]).await;
    mock.hide_listing();
    let smoke = StoreSmoke::new(StoreClient::new(mock.config()));
    let mut out = Vec::new();

    let report = smoke.run(&mut out).await.expect("smoke run");

    assert!(report.objects.is_empty());
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.ends_with("File content: Hello from MinIO!\n"));
    assert!(!printed.contains("Objects in bucket"));
}

#[tokio::test]
async fn test_smoke_stops_when_upload_is_denied() {
    let mock = MockS3::start(&["demo-bucket"]).await;
    mock.deny_put();
    let smoke = StoreSmoke::new(StoreClient::new(mock.config()));
    let mut out = Vec::new();

    let err = smoke.run(&mut out).await.expect_err("upload must fail");

    assert!(!err.is_unreachable(), "store answered, got: {err}");
    assert_eq!(err.op(), Some(StoreOp::PutObject));
    assert!(err.to_string().contains("AccessDenied"), "got: {err}");

    let printed = String::from_utf8(out).unwrap();
    assert_eq!(printed, "Buckets: [\"demo-bucket\"]\n");
    assert_eq!(
        mock.log(),
        vec!["ListBuckets", "PutObject demo-bucket/test-folder/hello.txt"]
    );
}

#[tokio::test]
async fn test_get_missing_key_is_store_error() {
    let mock = MockS3::start(&["demo-bucket"]).await;
    let client = StoreClient::new(mock.config());

    let err = client
        .get_object("demo-bucket", "nope.txt")
        .await
        .expect_err("missing key");

    assert!(!err.is_unreachable());
    assert_eq!(err.op(), Some(StoreOp::GetObject));
}
