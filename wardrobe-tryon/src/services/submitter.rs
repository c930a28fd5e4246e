//! Task submitter
//!
//! Validates a try-on intent, resolves its images, and submits one
//! asynchronous job. Returns as soon as the provider assigns a task id.
//!
//! # Garment selection
//!
//! - `Single(slot)`: the generic garment reference if given, otherwise the
//!   reference supplied for that same slot. A reference supplied only for
//!   the *other* slot is not used.
//! - `Full`: both top and bottom are required.
//!
//! Validation happens before any network call; resolution happens before
//! the job request is built, so a bad reference never produces a partial
//! submission.

use std::sync::Arc;
use tracing::{info, warn};

use super::errors::TryOnError;
use super::provider::{ImagingProvider, TryOnJobInput, TryOnJobParameters, TryOnJobRequest};
use super::resolver::ResourceResolver;
use crate::models::{GarmentSlot, ImageReference, TaskHandle, TryOnMode};

/// Garment references as supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GarmentRefs {
    /// Slot-agnostic garment, used by single-garment mode
    pub garment: Option<ImageReference>,
    pub top: Option<ImageReference>,
    pub bottom: Option<ImageReference>,
}

impl GarmentRefs {
    pub fn top(reference: ImageReference) -> Self {
        Self {
            top: Some(reference),
            ..Self::default()
        }
    }

    pub fn outfit(top: ImageReference, bottom: ImageReference) -> Self {
        Self {
            garment: None,
            top: Some(top),
            bottom: Some(bottom),
        }
    }
}

/// Pick the garment references `mode` needs, tagged by slot
pub fn select_garments(
    mode: TryOnMode,
    garments: &GarmentRefs,
) -> Result<Vec<(GarmentSlot, &ImageReference)>, TryOnError> {
    match mode {
        TryOnMode::Single(slot) => {
            let own = match slot {
                GarmentSlot::Top => garments.top.as_ref(),
                GarmentSlot::Bottom => garments.bottom.as_ref(),
            };
            let chosen = garments.garment.as_ref().or(own).ok_or_else(|| {
                TryOnError::MissingInput(format!("garment image for {} try-on", slot))
            })?;
            Ok(vec![(slot, chosen)])
        }
        TryOnMode::Full => match (garments.top.as_ref(), garments.bottom.as_ref()) {
            (Some(top), Some(bottom)) => {
                Ok(vec![(GarmentSlot::Top, top), (GarmentSlot::Bottom, bottom)])
            }
            (None, _) => Err(TryOnError::MissingInput(
                "top garment image for full try-on".to_string(),
            )),
            (_, None) => Err(TryOnError::MissingInput(
                "bottom garment image for full try-on".to_string(),
            )),
        },
    }
}

pub struct TaskSubmitter {
    resolver: Arc<ResourceResolver>,
    provider: Arc<dyn ImagingProvider>,
    model: String,
}

impl TaskSubmitter {
    pub fn new(
        resolver: Arc<ResourceResolver>,
        provider: Arc<dyn ImagingProvider>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            resolver,
            provider,
            model: model.into(),
        }
    }

    pub fn provider_configured(&self) -> bool {
        self.provider.is_configured()
    }

    /// Build the job request without submitting it
    pub async fn build_request(
        &self,
        person: &ImageReference,
        mode: TryOnMode,
        garments: &GarmentRefs,
    ) -> Result<TryOnJobRequest, TryOnError> {
        let selected = select_garments(mode, garments)?;

        let person_image_url = self.resolver.resolve(person).await?;

        let mut input = TryOnJobInput {
            person_image_url,
            top_garment_url: None,
            bottom_garment_url: None,
        };
        for (slot, reference) in selected {
            let url = self.resolver.resolve(reference).await?;
            match slot {
                GarmentSlot::Top => input.top_garment_url = Some(url),
                GarmentSlot::Bottom => input.bottom_garment_url = Some(url),
            }
        }

        Ok(TryOnJobRequest {
            model: self.model.clone(),
            input,
            parameters: TryOnJobParameters::default(),
        })
    }

    /// Submit a try-on job; returns a `Pending` handle
    pub async fn submit(
        &self,
        person: &ImageReference,
        mode: TryOnMode,
        garments: &GarmentRefs,
    ) -> Result<TaskHandle, TryOnError> {
        let request = self.build_request(person, mode, garments).await?;

        let receipt = self.provider.submit_job(&request).await.map_err(|e| {
            warn!(mode = %mode, error = %e, "Try-on submission failed");
            TryOnError::from_submit_failure(e)
        })?;

        let Some(task_id) = receipt.task_id else {
            warn!(status = receipt.status, body = %receipt.body, "Provider response missing task id");
            return Err(TryOnError::Submission {
                status: Some(receipt.status),
                message: "provider response missing task id".to_string(),
                body: receipt.body,
            });
        };

        info!(task_id = %task_id, mode = %mode, "Try-on job submitted");
        Ok(TaskHandle::pending(task_id, mode))
    }
}
