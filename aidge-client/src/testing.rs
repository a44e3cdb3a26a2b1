//! Scripted transport for unit tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

use crate::config::ApiConfig;
use crate::error::{ClientError, Result};
use crate::transport::{HttpRequest, HttpResponse, Transport};

pub(crate) type Reply = std::result::Result<HttpResponse, &'static str>;

type Handler = Box<dyn Fn(&HttpRequest, usize) -> Reply + Send + Sync>;

/// Answers requests from a closure and records what it saw
pub(crate) struct ScriptedTransport {
    handler: Handler,
    latency: Duration,
    calls: AtomicUsize,
    current: AtomicUsize,
    peak: AtomicUsize,
    requests: Mutex<Vec<(Instant, HttpRequest)>>,
}

impl ScriptedTransport {
    pub(crate) fn new<F>(latency: Duration, handler: F) -> Arc<Self>
    where
        F: Fn(&HttpRequest, usize) -> Reply + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            latency,
            calls: AtomicUsize::new(0),
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Same reply for every call
    pub(crate) fn always(reply: Reply) -> Arc<Self> {
        Self::new(Duration::ZERO, move |_, _| reply.clone())
    }

    /// Replies in order, repeating the last one
    pub(crate) fn sequence(replies: Vec<Reply>) -> Arc<Self> {
        Self::new(Duration::ZERO, move |_, call| {
            replies[call.min(replies.len() - 1)].clone()
        })
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(_, r)| r.clone())
            .collect()
    }

    pub(crate) fn request_times(&self) -> Vec<Instant> {
        self.requests.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        self.requests
            .lock()
            .unwrap()
            .push((Instant::now(), request.clone()));

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let reply = (self.handler)(&request, call);
        self.current.fetch_sub(1, Ordering::SeqCst);
        reply.map_err(|e| ClientError::Transport(e.to_string()))
    }
}

pub(crate) fn test_config() -> ApiConfig {
    ApiConfig::new("test-key", "test-secret", "api.example.com")
}

pub(crate) fn ok(body: &str) -> Reply {
    Ok(HttpResponse::ok(body))
}
