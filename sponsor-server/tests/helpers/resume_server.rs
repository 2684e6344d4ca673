//! Local HTTP server serving resume files

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Router,
};

type Files = Arc<HashMap<String, Vec<u8>>>;

async fn serve_file(State(files): State<Files>, Path(name): Path<String>) -> Result<Vec<u8>, StatusCode> {
    files.get(&name).cloned().ok_or(StatusCode::NOT_FOUND)
}

async fn serve_slow() -> Vec<u8> {
    tokio::time::sleep(Duration::from_secs(30)).await;
    b"too late".to_vec()
}

/// Serve `files` at `/files/<name>` and a never-finishing `/slow`.
///
/// Returns the base URL, e.g. `http://127.0.0.1:41234`.
pub async fn spawn_resume_server(files: Vec<(&str, &[u8])>) -> String {
    let files: Files = Arc::new(
        files
            .into_iter()
            .map(|(name, bytes)| (name.to_string(), bytes.to_vec()))
            .collect(),
    );

    let app = Router::new()
        .route("/files/:name", get(serve_file))
        .route("/slow", get(serve_slow))
        .with_state(files);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Should bind resume server");
    let addr = listener.local_addr().expect("Should have local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Resume server failed");
    });

    format!("http://{}", addr)
}
