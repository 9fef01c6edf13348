//! An in-memory content store.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use memlane_contracts::error::{MemlaneError, MemlaneResult};
use memlane_core::traits::ContentStore;

#[derive(Default)]
struct ContentState {
    documents: HashMap<String, Result<String, String>>,
    fetches: Vec<String>,
}

/// Unknown ids fail with `ContentFetch` ("HTTP 404").
#[derive(Default)]
pub struct MockContent {
    state: Mutex<ContentState>,
}

impl MockContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: &str, body: &str) {
        self.state
            .lock()
            .unwrap()
            .documents
            .insert(id.to_string(), Ok(body.to_string()));
    }

    pub fn insert_failure(&self, id: &str, reason: &str) {
        self.state
            .lock()
            .unwrap()
            .documents
            .insert(id.to_string(), Err(reason.to_string()));
    }

    pub fn fetches(&self) -> Vec<String> {
        self.state.lock().unwrap().fetches.clone()
    }
}

#[async_trait]
impl ContentStore for MockContent {
    async fn fetch(&self, content_id: &str) -> MemlaneResult<String> {
        let mut state = self.state.lock().unwrap();
        state.fetches.push(content_id.to_string());
        match state.documents.get(content_id) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(reason)) => Err(MemlaneError::ContentFetch {
                reason: reason.clone(),
            }),
            None => Err(MemlaneError::ContentFetch {
                reason: "HTTP 404".into(),
            }),
        }
    }
}
