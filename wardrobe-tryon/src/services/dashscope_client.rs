//! DashScope (Aliyun Model Studio) try-on client
//!
//! Submission is asynchronous (`X-DashScope-Async: enable`): the provider
//! answers with a task id immediately and the job runs remotely. Status is a
//! plain `GET /tasks/{task_id}`.

use async_trait::async_trait;
use std::time::Duration;

use super::provider::{
    ImagingProvider, ProviderError, SubmitReceipt, SubmitResponse, TaskStatusResponse,
    TryOnJobRequest,
};
use crate::config::DashScopeSettings;

const USER_AGENT: &str = concat!("wardrobe-tryon/", env!("CARGO_PKG_VERSION"));
const SYNTHESIS_PATH: &str = "/services/aigc/image2image/image-synthesis/";

/// DashScope-backed [`ImagingProvider`]
pub struct DashScopeClient {
    http_client: reqwest::Client,
    settings: DashScopeSettings,
    submit_timeout: Duration,
    poll_timeout: Duration,
}

impl DashScopeClient {
    pub fn new(
        settings: DashScopeSettings,
        submit_timeout: Duration,
        poll_timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(poll_timeout)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            settings,
            submit_timeout,
            poll_timeout,
        })
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        self.settings
            .api_key
            .as_deref()
            .filter(|k| wardrobe_common::config::is_non_blank(k))
            .ok_or_else(|| ProviderError::NotConfigured("missing DashScope API key".to_string()))
    }

    pub fn submit_url(&self) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), SYNTHESIS_PATH)
    }

    /// `<base>/tasks/<task_id>`, with the id encoded as one path segment
    pub fn status_url(&self, task_id: &str) -> Result<reqwest::Url, ProviderError> {
        let mut url = reqwest::Url::parse(self.settings.base_url.trim())
            .map_err(|e| ProviderError::NotConfigured(format!("invalid DashScope base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ProviderError::NotConfigured("DashScope base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .push("tasks")
            .push(task_id);
        Ok(url)
    }
}

fn transport_error(err: reqwest::Error, timeout: Duration) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Transport(format!("no response within {:?}", timeout))
    } else {
        ProviderError::Transport(err.to_string())
    }
}

#[async_trait]
impl ImagingProvider for DashScopeClient {
    async fn submit_job(&self, request: &TryOnJobRequest) -> Result<SubmitReceipt, ProviderError> {
        let api_key = self.api_key()?;

        tracing::debug!(model = %request.model, "Submitting try-on job to DashScope");

        let response = self
            .http_client
            .post(self.submit_url())
            .bearer_auth(api_key)
            .header("X-DashScope-Async", "enable")
            .timeout(self.submit_timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error(e, self.submit_timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(e, self.submit_timeout))?;

        if !status.is_success() {
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let task_id = serde_json::from_str::<SubmitResponse>(&body)
            .ok()
            .and_then(|parsed| parsed.output)
            .and_then(|output| output.task_id)
            .filter(|id| !id.trim().is_empty());

        Ok(SubmitReceipt {
            status: status.as_u16(),
            body,
            task_id,
        })
    }

    async fn job_status(&self, task_id: &str) -> Result<TaskStatusResponse, ProviderError> {
        let api_key = self.api_key()?;

        let response = self
            .http_client
            .get(self.status_url(task_id)?)
            .bearer_auth(api_key)
            .timeout(self.poll_timeout)
            .send()
            .await
            .map_err(|e| transport_error(e, self.poll_timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<TaskStatusResponse>()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))
    }

    fn is_configured(&self) -> bool {
        self.api_key().is_ok()
    }
}
