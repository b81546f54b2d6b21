#![allow(dead_code)]

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Form, Json, Router,
};
use gcupload::{Endpoints, GarminApi};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const USERNAME: &str = "runner@example.com";
pub const PASSWORD: &str = "correct-horse";
pub const TICKET: &str = "ST-0123456-aBCDefgh1iJkLmN5opQ9R-cas";

/// How the fake Garmin Connect answers
#[derive(Clone)]
pub struct MockConfig {
    pub signin_status: u16,
    /// Replaces the page carrying the ticket URL
    pub signin_body: Option<String>,
    pub ticket_status: u16,
    pub ticket_body: String,
    /// Served in order, the last one repeats
    pub upload_responses: VecDeque<(u16, Value)>,
    pub update_status: u16,
    pub update_body: String,
    pub activity_types: Value,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            signin_status: 200,
            signin_body: None,
            ticket_status: 200,
            ticket_body: "<html>welcome</html>".to_string(),
            upload_responses: VecDeque::from([(201, success_body(json!(42)))]),
            update_status: 204,
            update_body: String::new(),
            activity_types: json!([
                {"typeId": 1, "typeKey": "running", "parentTypeId": 17, "isHidden": false},
                {"typeId": 2, "typeKey": "cycling", "parentTypeId": 17, "isHidden": false},
                {"typeId": 9, "typeKey": "walking", "parentTypeId": 17, "isHidden": false}
            ]),
        }
    }
}

impl MockConfig {
    pub fn with_upload(mut self, status: u16, body: Value) -> Self {
        self.upload_responses = VecDeque::from([(status, body)]);
        self
    }
}

pub fn success_body(id: Value) -> Value {
    json!({"detailedImportResult": {
        "uploadId": 1,
        "successes": [{"internalId": id, "messages": []}],
        "failures": []
    }})
}

pub fn failure_body(id: Value, code: i64, content: &str) -> Value {
    json!({"detailedImportResult": {
        "uploadId": 1,
        "successes": [],
        "failures": [{"internalId": id, "messages": [{"code": code, "content": content}]}]
    }})
}

#[derive(Clone, Debug)]
pub struct SigninRecord {
    pub form: HashMap<String, String>,
    pub service: Option<String>,
    pub origin: Option<String>,
}

#[derive(Clone, Debug)]
pub struct UploadRecord {
    pub extension: String,
    pub field_name: Option<String>,
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
    pub nk: Option<String>,
    pub authenticated: bool,
}

#[derive(Clone, Debug)]
pub struct UpdateRecord {
    pub id: String,
    pub content_type: Option<String>,
    pub body: Value,
    pub authenticated: bool,
}

#[derive(Default, Debug)]
pub struct Recorded {
    pub signins: Vec<SigninRecord>,
    pub ticket_claims: Vec<(Option<String>, bool)>,
    pub uploads: Vec<UploadRecord>,
    pub updates: Vec<UpdateRecord>,
    pub type_fetches: usize,
}

#[derive(Clone)]
struct MockState {
    base: String,
    config: Arc<Mutex<MockConfig>>,
    recorded: Arc<Mutex<Recorded>>,
}

pub struct MockGarmin {
    pub base: String,
    recorded: Arc<Mutex<Recorded>>,
}

impl MockGarmin {
    pub async fn start(config: MockConfig) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server");
        let base = format!("http://{}", listener.local_addr().unwrap());

        let state = MockState {
            base: base.clone(),
            config: Arc::new(Mutex::new(config)),
            recorded: Arc::new(Mutex::new(Recorded::default())),
        };
        let recorded = state.recorded.clone();

        let app = Router::new()
            .route("/sso/signin", post(signin))
            .route("/modern", get(claim_ticket))
            .route("/modern/proxy/upload-service/upload/:ext", post(upload))
            .route(
                "/modern/proxy/activity-service/activity/activityTypes",
                get(activity_types),
            )
            .route("/modern/proxy/activity-service/activity/:id", put(update))
            .with_state(state);

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock server");
        });

        Self { base, recorded }
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints::from_roots(&self.base, &self.base)
    }

    pub fn api(&self, staging: &TempDir) -> GarminApi {
        GarminApi::new(self.endpoints()).with_temp_dir(staging.path())
    }

    pub fn recorded(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap()
    }
}

pub fn credentials() -> gcupload::Credentials {
    gcupload::Credentials::new(USERNAME, PASSWORD)
}

/// Activity file with some content in its own temp dir
pub fn activity_file(dir: &TempDir, name: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, format!("<gpx>{name}</gpx>")).unwrap();
    path
}

pub fn dir_is_empty(dir: &TempDir) -> bool {
    std::fs::read_dir(dir.path()).unwrap().next().is_none()
}

fn has_cookie(headers: &HeaderMap, cookie: &str) -> bool {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.split(';').any(|c| c.trim() == cookie))
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap()
}

async fn signin(
    State(state): State<MockState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    state.recorded.lock().unwrap().signins.push(SigninRecord {
        form: form.clone(),
        service: query.get("service").cloned(),
        origin: header_value(&headers, "origin"),
    });

    let config = state.config.lock().unwrap().clone();
    if config.signin_status != 200 {
        return (status(config.signin_status), "Invalid sign in").into_response();
    }

    let valid = form.get("username").map(String::as_str) == Some(USERNAME)
        && form.get("password").map(String::as_str) == Some(PASSWORD);

    let body = match config.signin_body {
        Some(body) => body,
        None if valid => {
            let ticket_url = format!("{}/modern?ticket={}", state.base, TICKET).replace('/', "\\/");
            format!(
                "<html><script type=\"text/javascript\">\n\
                 var response_url                 = \"{ticket_url}\";\n\
                 </script></html>"
            )
        }
        None => "<html>Invalid sign in</html>".to_string(),
    };

    (
        StatusCode::OK,
        [(header::SET_COOKIE, "CASTGC=TGT-1; Path=/")],
        body,
    )
        .into_response()
}

async fn claim_ticket(
    State(state): State<MockState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let sso_cookie = has_cookie(&headers, "CASTGC=TGT-1");
    state
        .recorded
        .lock()
        .unwrap()
        .ticket_claims
        .push((query.get("ticket").cloned(), sso_cookie));

    let config = state.config.lock().unwrap().clone();
    if config.ticket_status != 200 || !sso_cookie {
        return (status(config.ticket_status), config.ticket_body).into_response();
    }

    (
        StatusCode::OK,
        [(header::SET_COOKIE, "SESSIONID=session-1; Path=/")],
        config.ticket_body,
    )
        .into_response()
}

async fn upload(
    State(state): State<MockState>,
    Path(ext): Path<String>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let mut record = UploadRecord {
        extension: ext,
        field_name: None,
        file_name: None,
        bytes: Vec::new(),
        nk: header_value(&headers, "nk"),
        authenticated: has_cookie(&headers, "SESSIONID=session-1"),
    };

    while let Ok(Some(field)) = multipart.next_field().await {
        record.field_name = field.name().map(str::to_string);
        record.file_name = field.file_name().map(str::to_string);
        record.bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
    }
    state.recorded.lock().unwrap().uploads.push(record);

    let (code, body) = {
        let mut config = state.config.lock().unwrap();
        if config.upload_responses.len() > 1 {
            config.upload_responses.pop_front().unwrap()
        } else {
            config.upload_responses.front().cloned().unwrap()
        }
    };
    (status(code), Json(body)).into_response()
}

async fn update(
    State(state): State<MockState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: String,
) -> Response {
    state.recorded.lock().unwrap().updates.push(UpdateRecord {
        id,
        content_type: header_value(&headers, "content-type"),
        body: serde_json::from_str(&body).unwrap_or(Value::Null),
        authenticated: has_cookie(&headers, "SESSIONID=session-1"),
    });

    let config = state.config.lock().unwrap().clone();
    (status(config.update_status), config.update_body).into_response()
}

async fn activity_types(State(state): State<MockState>, headers: HeaderMap) -> Response {
    state.recorded.lock().unwrap().type_fetches += 1;
    if !has_cookie(&headers, "SESSIONID=session-1") {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let types = state.config.lock().unwrap().activity_types.clone();
    Json(types).into_response()
}
