use std::collections::BTreeMap;

use axum::{
    extract::Path,
    http::{HeaderMap, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// What the server saw of a request, returned as the JSON body.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

pub const TEXT_BODY: &str = "hello from echo-server";

pub fn app() -> Router {
    Router::new()
        .route("/get", get(echo_get))
        .route("/post", post(echo_post))
        .route("/status/{code}", get(status))
        .route("/text", get(text))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo_get(method: Method, headers: HeaderMap) -> Json<Echo> {
    Json(Echo {
        method: method.to_string(),
        headers: header_map(&headers),
        body: None,
    })
}

async fn echo_post(method: Method, headers: HeaderMap, body: String) -> Json<Echo> {
    Json(Echo {
        method: method.to_string(),
        headers: header_map(&headers),
        body: Some(body),
    })
}

async fn status(Path(code): Path<u16>) -> Result<impl IntoResponse, StatusCode> {
    let code = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((code, format!("status {}", code.as_u16())))
}

async fn text() -> &'static str {
    TEXT_BODY
}

/// Header names are lowercased by the http crate; repeated names keep the last value.
fn header_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| Some((name.as_str().to_string(), value.to_str().ok()?.to_string())))
        .collect()
}
