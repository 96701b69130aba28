//! Minimal Trino coordinator stand-in built on axum.
//!
//! Statements are recognised by their text. Each query first answers with a
//! QUEUED page pointing at `/v1/statement/executing/{id}/1`, like a real
//! coordinator does.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use lakeprobe_trino::TrinoConfig;

/// Headers seen on a statement submission.
#[derive(Debug, Clone, Default)]
pub struct SessionHeaders {
    pub user: String,
    pub catalog: String,
    pub schema: String,
    pub source: String,
}

#[derive(Clone)]
struct MockState {
    base: Arc<String>,
    log: Arc<Mutex<Vec<String>>>,
    headers: Arc<Mutex<Option<SessionHeaders>>>,
    busy_remaining: Arc<AtomicUsize>,
}

pub struct MockTrino {
    pub addr: SocketAddr,
    state: MockState,
}

impl MockTrino {
    pub async fn start() -> Self {
        Self::start_busy(0).await
    }

    /// Start with `busy` 503 answers queued up for the "flaky" query.
    pub async fn start_busy(busy: usize) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let state = MockState {
            base: Arc::new(format!("http://{}", addr)),
            log: Arc::new(Mutex::new(Vec::new())),
            headers: Arc::new(Mutex::new(None)),
            busy_remaining: Arc::new(AtomicUsize::new(busy)),
        };

        let app = Router::new()
            .route("/v1/statement", post(submit))
            .route(
                "/v1/statement/executing/{id}/{token}",
                get(next_page).delete(cancel),
            )
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    /// Connection settings pointing at this stub with the stock session.
    pub fn config(&self) -> TrinoConfig {
        TrinoConfig {
            host: self.addr.ip().to_string(),
            port: self.addr.port(),
            request_timeout_seconds: 5,
            ..TrinoConfig::default()
        }
    }

    /// Requests received so far, e.g. `POST SELECT 1`, `GET one/1`.
    pub fn log(&self) -> Vec<String> {
        self.state.log.lock().unwrap().clone()
    }

    pub fn last_headers(&self) -> Option<SessionHeaders> {
        self.state.headers.lock().unwrap().clone()
    }
}

fn header(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn queued(base: &str, id: &str) -> Value {
    json!({
        "id": id,
        "infoUri": format!("{}/ui/query.html?{}", base, id),
        "nextUri": format!("{}/v1/statement/executing/{}/1", base, id),
        "stats": {"state": "QUEUED"},
    })
}

fn failed(id: &str, name: &str, message: &str) -> Value {
    json!({
        "id": id,
        "stats": {"state": "FAILED"},
        "error": {
            "message": message,
            "errorCode": 1,
            "errorName": name,
            "errorType": "USER_ERROR",
        },
    })
}

fn finished(id: &str, columns: Value, data: Value) -> Value {
    json!({
        "id": id,
        "columns": columns,
        "data": data,
        "stats": {"state": "FINISHED", "processedRows": 1, "elapsedTimeMillis": 7},
    })
}

async fn submit(State(s): State<MockState>, headers: HeaderMap, body: String) -> Response {
    let sql = body.trim().to_string();
    s.log.lock().unwrap().push(format!("POST {}", sql));

    let session = SessionHeaders {
        user: header(&headers, "X-Trino-User"),
        catalog: header(&headers, "X-Trino-Catalog"),
        schema: header(&headers, "X-Trino-Schema"),
        source: header(&headers, "X-Trino-Source"),
    };
    *s.headers.lock().unwrap() = Some(session.clone());

    if session.user == "intruder" {
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }
    if session.catalog != "hive" {
        let msg = format!("Catalog '{}' not found", session.catalog);
        return Json(failed("rejected", "CATALOG_NOT_FOUND", &msg)).into_response();
    }

    let id = match sql.as_str() {
        "SHOW CATALOGS" => "catalogs",
        "SHOW SCHEMAS IN hive" => "schemas",
        "SELECT 1" => "one",
        "SELECT flaky" => "flaky",
        "SELECT many" => "many",
        "SELECT pending" => "pending",
        "SELECT * FROM missing" => "missing",
        _ => {
            return Json(failed("syntax", "SYNTAX_ERROR", "mismatched input")).into_response();
        }
    };
    Json(queued(&s.base, id)).into_response()
}

async fn next_page(
    State(s): State<MockState>,
    Path((id, token)): Path<(String, u32)>,
) -> Response {
    s.log.lock().unwrap().push(format!("GET {}/{}", id, token));

    let page = match id.as_str() {
        "catalogs" => finished(
            &id,
            json!([{"name": "Catalog", "type": "varchar(6)"}]),
            json!([["hive"], ["system"], ["tpch"]]),
        ),
        "schemas" => finished(
            &id,
            json!([{"name": "Schema", "type": "varchar(18)"}]),
            json!([["default"], ["information_schema"]]),
        ),
        "one" => finished(&id, json!([{"name": "_col0", "type": "integer"}]), json!([[1]])),
        "flaky" => {
            let busy = s
                .busy_remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if busy {
                return (StatusCode::SERVICE_UNAVAILABLE, "busy").into_response();
            }
            finished(&id, json!([{"name": "_col0", "type": "integer"}]), json!([[42]]))
        }
        "many" if token == 1 => json!({
            "id": id,
            "nextUri": format!("{}/v1/statement/executing/many/2", s.base),
            "columns": [{"name": "n", "type": "integer"}],
            "data": [[1], [2]],
            "stats": {"state": "RUNNING"},
        }),
        "many" => json!({
            "id": id,
            "data": [[3]],
            "stats": {"state": "FINISHED", "processedRows": 3},
        }),
        "pending" if token < 3 => json!({
            "id": id,
            "nextUri": format!("{}/v1/statement/executing/pending/{}", s.base, token + 1),
            "stats": {"state": "RUNNING"},
        }),
        "pending" => {
            return (StatusCode::INTERNAL_SERVER_ERROR, "worker lost").into_response();
        }
        "missing" => failed(&id, "TABLE_NOT_FOUND", "Table 'hive.default.missing' does not exist"),
        _ => return StatusCode::NOT_FOUND.into_response(),
    };
    Json(page).into_response()
}

async fn cancel(
    State(s): State<MockState>,
    Path((id, token)): Path<(String, u32)>,
) -> StatusCode {
    s.log.lock().unwrap().push(format!("DELETE {}/{}", id, token));
    StatusCode::NO_CONTENT
}
