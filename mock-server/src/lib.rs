use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Multipart, Path, Request, State},
    http::{header, HeaderName, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};

/// Header listing the applied directive names, in application order.
pub const APPLIED_EDITS_HEADER: &str = "x-applied-edits";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Command {
    pub name: String,
    pub parameters: Vec<Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Edit {
    pub name: String,
    #[serde(default)]
    pub parameters: Value,
}

#[derive(Debug, Deserialize)]
pub struct EditList {
    pub edits: Vec<Edit>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct UserStats {
    pub edits: u64,
    pub bytes_processed: u64,
}

/// Failure injection for client tests.
#[derive(Clone, Debug, Default)]
pub struct Behavior {
    /// Every route answers 429 with a non-JSON body.
    pub rate_limited: bool,
    /// `GET /v1/commands` answers `{}`.
    pub omit_commands_field: bool,
}

pub struct AppState {
    behavior: Behavior,
    commands: Vec<Command>,
    stats: RwLock<UserStats>,
}

pub type Db = Arc<AppState>;

pub fn default_commands() -> Vec<Command> {
    let param = |name: &str, kind: &str| json!({"name": name, "type": kind});
    vec![
        Command {
            name: "crop".to_string(),
            parameters: vec![param("x", "int"), param("y", "int")],
        },
        Command {
            name: "caption".to_string(),
            parameters: vec![param("text", "str")],
        },
        Command {
            name: "rotate".to_string(),
            parameters: vec![param("degrees", "int")],
        },
        Command {
            name: "invert".to_string(),
            parameters: Vec::new(),
        },
    ]
}

pub fn app() -> Router {
    app_with(Behavior::default())
}

pub fn app_with(behavior: Behavior) -> Router {
    let state: Db = Arc::new(AppState {
        behavior,
        commands: default_commands(),
        stats: RwLock::new(UserStats::default()),
    });
    Router::new()
        .route("/v1/edit", post(edit))
        .route("/v1/user", get(user))
        .route("/v1/commands", get(list_commands))
        .route("/v1/commands/{name}", get(get_command))
        .layer(middleware::from_fn_with_state(state.clone(), throttle))
        .with_state(state)
}

pub async fn run_with(listener: TcpListener, behavior: Behavior) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(behavior)).await
}

async fn throttle(State(db): State<Db>, request: Request, next: Next) -> Response {
    if db.behavior.rate_limited {
        debug!(uri = %request.uri(), "rejecting request with 429");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, "1")],
            "<html><body>slow down</body></html>",
        )
            .into_response();
    }
    next.run(request).await
}

fn bad_request(message: impl Into<String>) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({"error": message.into()}))).into_response()
}

async fn edit(State(db): State<Db>, mut multipart: Multipart) -> Result<Response, Response> {
    let mut media: Option<(Option<String>, Bytes)> = None;
    let mut edits: Option<EditList> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(e.body_text()))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("Media") => {
                // None when the part's content type is not a valid MIME type.
                let content_type = field.content_type().map(str::to_owned);
                let data = field.bytes().await.map_err(|e| bad_request(e.body_text()))?;
                media = Some((content_type, data));
            }
            Some("Edits") => {
                let data = field.bytes().await.map_err(|e| bad_request(e.body_text()))?;
                let list = serde_json::from_slice(&data).map_err(|e| bad_request(e.to_string()))?;
                edits = Some(list);
            }
            _ => {}
        }
    }

    let (content_type, data) = media.ok_or_else(|| bad_request("missing Media part"))?;
    let edits = edits.ok_or_else(|| bad_request("missing Edits part"))?;

    let Some(content_type) = content_type else {
        return Err((StatusCode::UNSUPPORTED_MEDIA_TYPE, "unsupported media type").into_response());
    };
    if let Some(unknown) = edits
        .edits
        .iter()
        .find(|edit| !db.commands.iter().any(|c| c.name == edit.name))
    {
        return Err(bad_request(format!("unknown command: {}", unknown.name)));
    }

    let applied = edits
        .edits
        .iter()
        .map(|edit| edit.name.as_str())
        .collect::<Vec<_>>()
        .join(",");
    info!(%content_type, %applied, bytes = data.len(), "edit applied");

    {
        let mut stats = db.stats.write().await;
        stats.edits += 1;
        stats.bytes_processed += data.len() as u64;
    }

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (HeaderName::from_static(APPLIED_EDITS_HEADER), applied),
        ],
        data,
    )
        .into_response())
}

async fn user(State(db): State<Db>) -> Json<UserStats> {
    Json(db.stats.read().await.clone())
}

async fn list_commands(State(db): State<Db>) -> Json<Value> {
    if db.behavior.omit_commands_field {
        return Json(json!({}));
    }
    Json(json!({"commands": db.commands}))
}

async fn get_command(State(db): State<Db>, Path(name): Path<String>) -> Result<Json<Command>, StatusCode> {
    db.commands
        .iter()
        .find(|command| command.name == name)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}
