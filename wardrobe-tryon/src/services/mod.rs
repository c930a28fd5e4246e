//! Try-on orchestration services
//!
//! Leaves first:
//! - `storage` / `oss_client`: object storage seam and OSS implementation
//! - `provider` / `dashscope_client`: imaging provider seam and DashScope implementation
//! - `session_store`: session key/value seam and in-memory implementation
//! - `resolver`: image reference → public URL, publishing local files once
//! - `model_cache`: per-session person photo memo
//! - `submitter`: intent validation and job submission
//! - `status_tracker`: status normalization and result extraction
//! - `facade`: the entry point used by the HTTP layer

pub mod dashscope_client;
pub mod errors;
pub mod facade;
pub mod model_cache;
pub mod oss_client;
pub mod provider;
pub mod resolver;
pub mod session_store;
pub mod status_tracker;
pub mod storage;
pub mod submitter;

pub use dashscope_client::DashScopeClient;
pub use errors::TryOnError;
pub use facade::{FacadeSettings, TryOnFacade, SYNC_RESULT_TASK_ID};
pub use model_cache::ModelCache;
pub use oss_client::OssStorage;
pub use provider::{ImagingProvider, ProviderError, SubmitReceipt, TaskStatusResponse, TryOnJobRequest};
pub use resolver::ResourceResolver;
pub use session_store::{InMemorySessionStore, SessionStore, SessionStoreError};
pub use status_tracker::StatusTracker;
pub use storage::{ObjectStorage, StorageError};
pub use submitter::{GarmentRefs, TaskSubmitter};
