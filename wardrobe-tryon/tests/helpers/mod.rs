//! Shared fakes for integration tests
//!
//! `FakeStorage` and `FakeProvider` count every call and answer from scripts,
//! so tests can assert both results and the absence of outbound traffic.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use wardrobe_tryon::AppState;
use wardrobe_tryon::services::provider::{TaskStatusOutput, TaskResultItem};
use wardrobe_tryon::services::{
    FacadeSettings, ImagingProvider, InMemorySessionStore, ObjectStorage, ProviderError,
    StorageError, SubmitReceipt, TaskStatusResponse, TryOnFacade, TryOnJobRequest,
};

/// Object storage that "publishes" to `https://oss.test/<key>`
#[derive(Default)]
pub struct FakeStorage {
    pub publishes: AtomicUsize,
    pub published_paths: Mutex<Vec<PathBuf>>,
    pub fail_with: Mutex<Option<StorageError>>,
    pub delay: Option<Duration>,
    pub configured: bool,
}

impl FakeStorage {
    pub fn new() -> Self {
        Self {
            configured: true,
            ..Default::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new()
        }
    }

    pub fn unconfigured() -> Self {
        Self::default()
    }

    pub fn publish_count(&self) -> usize {
        self.publishes.load(Ordering::SeqCst)
    }

    pub async fn fail_next(&self, err: StorageError) {
        *self.fail_with.lock().await = Some(err);
    }
}

#[async_trait]
impl ObjectStorage for FakeStorage {
    async fn publish(
        &self,
        file_path: &Path,
        key: &str,
        _content_type: Option<&str>,
    ) -> Result<String, StorageError> {
        self.publishes.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.fail_with.lock().await.take() {
            return Err(err);
        }
        if !self.configured {
            return Err(StorageError::NotConfigured("bucket".to_string()));
        }
        self.published_paths.lock().await.push(file_path.to_path_buf());
        Ok(format!("https://oss.test/{}", key))
    }

    fn is_configured(&self) -> bool {
        self.configured
    }
}

/// Imaging provider answering from scripted receipts and status bodies
pub struct FakeProvider {
    pub submits: AtomicUsize,
    pub polls: AtomicUsize,
    pub requests: Mutex<Vec<TryOnJobRequest>>,
    pub receipts: Mutex<VecDeque<Result<SubmitReceipt, ProviderError>>>,
    pub statuses: Mutex<VecDeque<Result<TaskStatusResponse, ProviderError>>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self {
            submits: AtomicUsize::new(0),
            polls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            receipts: Mutex::new(VecDeque::new()),
            statuses: Mutex::new(VecDeque::new()),
        }
    }

    pub fn submit_count(&self) -> usize {
        self.submits.load(Ordering::SeqCst)
    }

    pub fn poll_count(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    pub async fn accept_with(&self, task_id: &str) {
        let body = format!(r#"{{"output":{{"task_id":"{}","task_status":"PENDING"}}}}"#, task_id);
        self.receipts.lock().await.push_back(Ok(SubmitReceipt {
            status: 200,
            body,
            task_id: Some(task_id.to_string()),
        }));
    }

    pub async fn push_receipt(&self, receipt: Result<SubmitReceipt, ProviderError>) {
        self.receipts.lock().await.push_back(receipt);
    }

    pub async fn push_status(&self, output: TaskStatusOutput) {
        self.statuses.lock().await.push_back(Ok(TaskStatusResponse {
            request_id: Some("req-1".to_string()),
            output,
        }));
    }

    pub async fn push_status_error(&self, err: ProviderError) {
        self.statuses.lock().await.push_back(Err(err));
    }

    pub async fn last_request(&self) -> Option<TryOnJobRequest> {
        self.requests.lock().await.last().cloned()
    }
}

#[async_trait]
impl ImagingProvider for FakeProvider {
    async fn submit_job(&self, request: &TryOnJobRequest) -> Result<SubmitReceipt, ProviderError> {
        self.submits.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().await.push(request.clone());
        self.receipts
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::Transport("no scripted receipt".to_string())))
    }

    async fn job_status(&self, _task_id: &str) -> Result<TaskStatusResponse, ProviderError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        self.statuses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::Transport("no scripted status".to_string())))
    }
}

/// Status body with only `task_status` set
pub fn status(task_status: &str) -> TaskStatusOutput {
    TaskStatusOutput {
        task_status: Some(task_status.to_string()),
        ..Default::default()
    }
}

pub fn results_list(urls: &[&str]) -> Option<Vec<TaskResultItem>> {
    Some(
        urls.iter()
            .map(|u| TaskResultItem {
                url: Some(u.to_string()),
            })
            .collect(),
    )
}

/// Facade wired to fresh fakes
pub struct Harness {
    pub storage: Arc<FakeStorage>,
    pub provider: Arc<FakeProvider>,
    pub sessions: Arc<InMemorySessionStore>,
    pub facade: TryOnFacade,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_storage(FakeStorage::new())
    }

    pub fn with_storage(storage: FakeStorage) -> Self {
        Self::with_settings(storage, &FacadeSettings::default())
    }

    pub fn with_settings(storage: FakeStorage, settings: &FacadeSettings) -> Self {
        let storage = Arc::new(storage);
        let provider = Arc::new(FakeProvider::new());
        let sessions = Arc::new(InMemorySessionStore::new());
        let facade = TryOnFacade::assemble(
            storage.clone(),
            provider.clone(),
            sessions.clone(),
            settings,
        );
        Self {
            storage,
            provider,
            sessions,
            facade,
        }
    }
}

/// Router state over fresh fakes, serving and confining uploads to `upload_folder`
pub struct TestApp {
    pub storage: Arc<FakeStorage>,
    pub provider: Arc<FakeProvider>,
    pub state: AppState,
}

impl TestApp {
    pub fn new(upload_folder: &Path) -> Self {
        Self::with_storage(upload_folder, FakeStorage::new())
    }

    pub fn with_storage(upload_folder: &Path, storage: FakeStorage) -> Self {
        let settings = FacadeSettings {
            upload_root: Some(upload_folder.to_path_buf()),
            ..FacadeSettings::default()
        };
        let h = Harness::with_settings(storage, &settings);
        let state = AppState::new(Arc::new(h.facade), upload_folder.to_path_buf());
        Self {
            storage: h.storage,
            provider: h.provider,
            state,
        }
    }
}

/// Write a small file and return its path
pub fn write_image(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]).unwrap();
    path
}
