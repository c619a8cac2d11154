//! In-process transport for unit tests.

use super::transport::{Transport, TransportError};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Reply = Result<Value, TransportError>;

/// Routes requests by endpoint path. Scripted replies are consumed first, in
/// order; after that the path's standing reply is used; an unknown path
/// answers 404.
#[derive(Default)]
pub(crate) struct FakeTransport {
    scripted: Mutex<HashMap<String, VecDeque<Reply>>>,
    standing: Mutex<HashMap<String, Value>>,
    calls: Arc<AtomicUsize>,
    queries: Arc<Mutex<Vec<Vec<(String, String)>>>>,
    delay: Option<Duration>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(self, path: &str, value: Value) -> Self {
        self.standing
            .lock()
            .unwrap()
            .insert(path.to_string(), value);
        self
    }

    pub(crate) fn script(self, path: &str, replies: Vec<Reply>) -> Self {
        self.scripted
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .extend(replies);
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    pub(crate) fn query_log(&self) -> Arc<Mutex<Vec<Vec<(String, String)>>>> {
        Arc::clone(&self.queries)
    }

    fn reply_for(&self, url: &str) -> Reply {
        let matches = |path: &String| url.ends_with(&format!("/{path}"));

        let mut scripted = self.scripted.lock().unwrap();
        if let Some(queue) = scripted
            .iter_mut()
            .find(|(path, _)| matches(path))
            .map(|(_, q)| q)
        {
            if let Some(reply) = queue.pop_front() {
                return reply;
            }
        }
        drop(scripted);

        self.standing
            .lock()
            .unwrap()
            .iter()
            .find(|(path, _)| matches(path))
            .map(|(_, v)| Ok(v.clone()))
            .unwrap_or_else(|| {
                Err(TransportError::Status {
                    status: 404,
                    body: format!("no route for {url}"),
                })
            })
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get_json(
        &self,
        url: &str,
        query: &[(String, String)],
        _headers: &HeaderMap,
    ) -> Result<Value, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.to_vec());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply_for(url)
    }
}
