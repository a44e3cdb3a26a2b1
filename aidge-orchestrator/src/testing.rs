//! Fake remote API for orchestrator tests

use aidge_client::{
    ApiConfig, ClientError, HttpRequest, HttpResponse, Payload, PollPolicy, TaskClient, Transport,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::repository::BatchStore;
use crate::service::BatchOrchestrator;

type Handler = Box<dyn Fn(&str, Option<&str>) -> Option<String> + Send + Sync>;

/// Answers by endpoint and task id; `None` means a transport error
pub(crate) struct FakeApi {
    handler: Handler,
    latency: Duration,
    calls: AtomicUsize,
    queries: AtomicUsize,
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl FakeApi {
    pub(crate) fn new<F>(latency: Duration, handler: F) -> Arc<Self>
    where
        F: Fn(&str, Option<&str>) -> Option<String> + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            latency,
            calls: AtomicUsize::new(0),
            queries: AtomicUsize::new(0),
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Calls that carried a task id, i.e. status queries
    pub(crate) fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub(crate) fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for FakeApi {
    async fn send(&self, request: HttpRequest) -> aidge_client::Result<HttpResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let endpoint = endpoint_of(&request.url);
        let task_id = task_id_of(&request.payload);
        if task_id.is_some() {
            self.queries.fetch_add(1, Ordering::SeqCst);
        }

        let reply = (self.handler)(endpoint, task_id.as_deref());
        self.current.fetch_sub(1, Ordering::SeqCst);

        reply
            .map(HttpResponse::ok)
            .ok_or_else(|| ClientError::Transport("connection refused".to_string()))
    }
}

/// Endpoint name between `/rest` and the query string
fn endpoint_of(url: &str) -> &str {
    let path = url.split('?').next().unwrap_or_default();
    path.split_once("/rest").map(|(_, e)| e).unwrap_or(path)
}

fn task_id_of(payload: &Payload) -> Option<String> {
    match payload {
        Payload::Query(params) => params
            .iter()
            .find(|(k, _)| k == "taskId")
            .map(|(_, v)| v.clone()),
        Payload::Json(body) => serde_json::from_str::<serde_json::Value>(body)
            .ok()?
            .get("task_id")?
            .as_str()
            .map(str::to_string),
        Payload::Empty => None,
    }
}

pub(crate) fn orchestrator(api: Arc<FakeApi>, max_concurrent: usize) -> BatchOrchestrator {
    let client = TaskClient::with_transport(
        ApiConfig::new("test-key", "test-secret", "api.example.com"),
        api,
    )
    .unwrap()
    .with_limit(max_concurrent);

    BatchOrchestrator::new(client, PollPolicy::default(), BatchStore::new())
}

pub(crate) fn submitted(task_id: &str) -> Option<String> {
    Some(format!(r#"{{"data":{{"result":{{"taskId":"{}"}}}}}}"#, task_id))
}

pub(crate) fn status(task_status: &str) -> Option<String> {
    Some(format!(r#"{{"data":{{"taskStatus":"{}"}}}}"#, task_status))
}
