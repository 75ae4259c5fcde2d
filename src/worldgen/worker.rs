//! Off-thread elevation generation
//!
//! The worker owns a request channel and answers each request with exactly one
//! response. Generation runs on the blocking pool so the caller's runtime
//! stays responsive; failures come back as `{"error": ...}` values, never as
//! dropped requests.

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::noise::{generate_elevation, MapCell, NoiseParams};
use super::GenerationError;

const QUEUE_DEPTH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerCommand {
    Generate,
}

/// `{"command": "generate", "seed": 42, "width": 4, "height": 4}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerRequest {
    pub command: WorkerCommand,
    pub seed: i64,
    pub width: u32,
    pub height: u32,
}

impl WorkerRequest {
    pub fn generate(seed: i64, width: u32, height: u32) -> Self {
        Self {
            command: WorkerCommand::Generate,
            seed,
            width,
            height,
        }
    }
}

/// `{"mapData": [...]}` or `{"error": "..."}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WorkerResponse {
    MapData {
        #[serde(rename = "mapData")]
        map_data: Vec<MapCell>,
    },
    Error {
        error: String,
    },
}

impl WorkerResponse {
    pub fn error(message: impl Into<String>) -> Self {
        WorkerResponse::Error { error: message.into() }
    }

    pub fn into_result(self) -> Result<Vec<MapCell>, GenerationError> {
        match self {
            WorkerResponse::MapData { map_data } => Ok(map_data),
            WorkerResponse::Error { error } => Err(GenerationError::WorkerFailed(error)),
        }
    }
}

/// Answer one request synchronously
pub fn handle_request(request: &WorkerRequest, params: &NoiseParams) -> WorkerResponse {
    match request.command {
        WorkerCommand::Generate => {
            match generate_elevation(request.seed, request.width, request.height, params) {
                Ok(map_data) => WorkerResponse::MapData { map_data },
                Err(e) => WorkerResponse::error(e.to_string()),
            }
        }
    }
}

struct Job {
    request: WorkerRequest,
    reply: oneshot::Sender<WorkerResponse>,
}

/// Handle to a running generator task
pub struct WorldWorker {
    tx: mpsc::Sender<Job>,
    handle: JoinHandle<()>,
}

impl WorldWorker {
    /// Start the worker on the current tokio runtime
    pub fn spawn(params: NoiseParams) -> Self {
        let (tx, mut rx) = mpsc::channel::<Job>(QUEUE_DEPTH);

        let handle = tokio::spawn(async move {
            while let Some(Job { request, reply }) = rx.recv().await {
                tracing::debug!(
                    seed = request.seed,
                    width = request.width,
                    height = request.height,
                    "worker request"
                );
                let params = params.clone();
                let response = match tokio::task::spawn_blocking(move || handle_request(&request, &params)).await {
                    Ok(response) => response,
                    Err(e) => {
                        tracing::warn!(error = %e, "generation task failed");
                        WorkerResponse::error(GenerationError::WorkerFailed(e.to_string()).to_string())
                    }
                };
                // The requester may have stopped waiting; nothing to do then.
                let _ = reply.send(response);
            }
            tracing::debug!("worker channel closed");
        });

        Self { tx, handle }
    }

    /// Send a request and wait for its response
    pub async fn request(&self, request: WorkerRequest) -> WorkerResponse {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(Job { request, reply }).await.is_err() {
            return WorkerResponse::error(GenerationError::WorkerClosed.to_string());
        }
        rx.await
            .unwrap_or_else(|_| WorkerResponse::error(GenerationError::WorkerClosed.to_string()))
    }

    pub async fn generate(&self, seed: i64, width: u32, height: u32) -> Result<Vec<MapCell>, GenerationError> {
        self.request(WorkerRequest::generate(seed, width, height))
            .await
            .into_result()
    }

    /// Close the request channel and wait for in-flight work to drain
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.handle.await {
            tracing::warn!(error = %e, "worker task ended abnormally");
        }
    }
}

/// Stdio adapter: one JSON request line in, one JSON response line out
pub async fn handle_json_line(worker: &WorldWorker, line: &str) -> String {
    let response = match serde_json::from_str::<WorkerRequest>(line) {
        Ok(request) => worker.request(request).await,
        Err(e) => WorkerResponse::error(format!("invalid request: {}", e)),
    };
    serde_json::to_string(&response)
        .unwrap_or_else(|e| format!("{{\"error\":\"failed to encode response: {}\"}}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_format() {
        let request: WorkerRequest =
            serde_json::from_str(r#"{"command":"generate","seed":42,"width":4,"height":4}"#).unwrap();
        assert_eq!(request, WorkerRequest::generate(42, 4, 4));
    }

    #[test]
    fn test_response_wire_format() {
        let ok = WorkerResponse::MapData { map_data: vec![] };
        assert_eq!(serde_json::to_string(&ok).unwrap(), r#"{"mapData":[]}"#);
        let err = WorkerResponse::error("boom");
        assert_eq!(serde_json::to_string(&err).unwrap(), r#"{"error":"boom"}"#);
    }

    #[test]
    fn test_handle_request_reports_too_large() {
        let params = NoiseParams { max_cells: 10, ..NoiseParams::default() };
        let response = handle_request(&WorkerRequest::generate(1, 5, 5), &params);
        assert!(matches!(response, WorkerResponse::Error { .. }));
    }

    #[tokio::test]
    async fn test_worker_generates() {
        let worker = WorldWorker::spawn(NoiseParams::default());
        let cells = worker.generate(42, 4, 4).await.unwrap();
        assert_eq!(cells.len(), 16);
        worker.shutdown().await;
    }

    #[tokio::test]
    async fn test_json_line_rejects_unknown_command() {
        let worker = WorldWorker::spawn(NoiseParams::default());
        let out = handle_json_line(&worker, r#"{"command":"explode","seed":1,"width":2,"height":2}"#).await;
        let response: WorkerResponse = serde_json::from_str(&out).unwrap();
        assert!(matches!(response, WorkerResponse::Error { .. }));
        worker.shutdown().await;
    }
}
