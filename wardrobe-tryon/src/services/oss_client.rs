//! Aliyun OSS object storage client
//!
//! Uploads with a single signed `PUT` (header signature, V1):
//!
//! ```text
//! Authorization: OSS <AccessKeyId>:base64(HMAC-SHA1(secret, StringToSign))
//! StringToSign = VERB \n Content-MD5 \n Content-Type \n Date \n
//!                CanonicalizedOSSHeaders CanonicalizedResource
//! ```
//!
//! Objects are written `public-read` so the imaging provider can fetch them.

use async_trait::async_trait;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use std::path::Path;
use std::time::Duration;

use super::storage::{ObjectStorage, StorageError};
use crate::config::OssSettings;

type HmacSha1 = Hmac<Sha1>;

const USER_AGENT: &str = concat!("wardrobe-tryon/", env!("CARGO_PKG_VERSION"));
const OBJECT_ACL: &str = "public-read";

/// OSS-backed [`ObjectStorage`]
pub struct OssStorage {
    http_client: reqwest::Client,
    settings: OssSettings,
    timeout: Duration,
}

impl OssStorage {
    pub fn new(settings: OssSettings, timeout: Duration) -> Result<Self, StorageError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| StorageError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            settings,
            timeout,
        })
    }

    /// Names of required settings that are absent or blank
    pub fn missing_settings(&self) -> Vec<&'static str> {
        let s = &self.settings;
        [
            ("access_key_id", &s.access_key_id),
            ("access_key_secret", &s.access_key_secret),
            ("bucket", &s.bucket),
            ("endpoint", &s.endpoint),
        ]
        .into_iter()
        .filter(|(_, value)| !value.as_deref().is_some_and(wardrobe_common::config::is_non_blank))
        .map(|(name, _)| name)
        .collect()
    }

    /// `https://<bucket>.<endpoint-host>/<key>`
    pub fn object_url(bucket: &str, endpoint: &str, key: &str) -> String {
        format!("https://{}.{}/{}", bucket, endpoint_host(endpoint), key)
    }

    /// Object URL, through the custom domain when one is configured
    fn url_for(&self, bucket: &str, endpoint: &str, key: &str) -> String {
        match self
            .settings
            .public_base_url
            .as_deref()
            .filter(|base| wardrobe_common::config::is_non_blank(base))
        {
            Some(base) => format!("{}/{}", base.trim().trim_end_matches('/'), key),
            None => Self::object_url(bucket, endpoint, key),
        }
    }
}

/// Endpoint host without scheme or trailing slash
fn endpoint_host(endpoint: &str) -> &str {
    let trimmed = endpoint.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    without_scheme.trim_end_matches('/')
}

/// Compute the `Authorization` header value for a public-read PUT
pub fn sign_put(
    access_key_id: &str,
    access_key_secret: &str,
    bucket: &str,
    key: &str,
    content_type: Option<&str>,
    date: &str,
) -> Result<String, StorageError> {
    let string_to_sign = format!(
        "PUT\n\n{}\n{}\nx-oss-object-acl:{}\n/{}/{}",
        content_type.unwrap_or(""),
        date,
        OBJECT_ACL,
        bucket,
        key
    );

    let mut mac = HmacSha1::new_from_slice(access_key_secret.as_bytes())
        .map_err(|e| StorageError::NotConfigured(format!("invalid access key secret: {}", e)))?;
    mac.update(string_to_sign.as_bytes());
    let signature = base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes());

    Ok(format!("OSS {}:{}", access_key_id, signature))
}

#[async_trait]
impl ObjectStorage for OssStorage {
    async fn publish(
        &self,
        file_path: &Path,
        key: &str,
        content_type: Option<&str>,
    ) -> Result<String, StorageError> {
        let missing = self.missing_settings();
        if !missing.is_empty() {
            return Err(StorageError::NotConfigured(format!(
                "missing {}",
                missing.join(", ")
            )));
        }

        // Presence checked above
        let s = &self.settings;
        let (Some(id), Some(secret), Some(bucket), Some(endpoint)) = (
            s.access_key_id.as_deref(),
            s.access_key_secret.as_deref(),
            s.bucket.as_deref(),
            s.endpoint.as_deref(),
        ) else {
            return Err(StorageError::NotConfigured("incomplete credentials".to_string()));
        };

        let bytes = tokio::fs::read(file_path).await?;
        let content_type = content_type.or_else(|| infer::get(&bytes).map(|t| t.mime_type()));

        let url = self.url_for(bucket, endpoint, key);
        let date = wardrobe_common::time::http_date(wardrobe_common::time::now());
        let authorization = sign_put(id, secret, bucket, key, content_type, &date)?;

        tracing::debug!(
            key = key,
            size_bytes = bytes.len(),
            content_type = content_type.unwrap_or("unknown"),
            "Uploading object to OSS"
        );

        let mut request = self
            .http_client
            .put(&url)
            .header("Date", &date)
            .header("x-oss-object-acl", OBJECT_ACL)
            .header("Authorization", authorization);
        if let Some(ct) = content_type {
            request = request.header("Content-Type", ct);
        }

        let response = request
            .body(bytes)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    StorageError::Network(format!("upload timed out after {:?}", self.timeout))
                } else {
                    StorageError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Http {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(key = key, url = %url, "Object published to OSS");
        Ok(url)
    }

    fn is_configured(&self) -> bool {
        self.missing_settings().is_empty()
    }
}
