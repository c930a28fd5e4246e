//! End-to-end orchestration through the facade, with fake collaborators

mod helpers;

use helpers::{results_list, status, write_image, FakeStorage, Harness};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wardrobe_tryon::models::{GarmentSlot, ImageReference, TaskState, TryOnMode};
use wardrobe_tryon::services::provider::TaskStatusOutput;
use wardrobe_tryon::services::{
    FacadeSettings, GarmentRefs, ProviderError, SessionStore, StorageError, SubmitReceipt, TryOnError,
    SYNC_RESULT_TASK_ID,
};

const TOP: TryOnMode = TryOnMode::Single(GarmentSlot::Top);

#[tokio::test]
async fn test_local_person_remote_garment_submits_pending_task() {
    let dir = TempDir::new().unwrap();
    let photo = write_image(dir.path(), "photo.jpg");
    let h = Harness::new();
    h.provider.accept_with("t1").await;

    let handle = h
        .facade
        .submit_try_on(
            Some(ImageReference::local(&photo)),
            TOP,
            &GarmentRefs::top(ImageReference::remote("https://cdn/shirt.png")),
            None,
        )
        .await
        .unwrap();

    assert_eq!(handle.task_id, "t1");
    assert_eq!(handle.state, TaskState::Pending);
    assert_eq!(handle.mode, TOP);
    assert_eq!(h.storage.publish_count(), 1, "only the local photo is published");

    let request = h.provider.last_request().await.unwrap();
    assert!(request.input.person_image_url.starts_with("https://oss.test/tryon/"));
    assert!(request.input.person_image_url.ends_with("_photo.jpg"));
    assert_eq!(request.input.top_garment_url.as_deref(), Some("https://cdn/shirt.png"));
    assert_eq!(request.input.bottom_garment_url, None);
    assert_eq!(request.model, "aitryon");
}

#[tokio::test]
async fn test_remote_references_never_touch_storage() {
    let h = Harness::new();
    h.provider.accept_with("t2").await;

    h.facade
        .submit_try_on(
            Some(ImageReference::remote("https://cdn/person.jpg")),
            TryOnMode::Full,
            &GarmentRefs::outfit(
                ImageReference::remote("https://cdn/top.png"),
                ImageReference::remote("https://cdn/bottom.png"),
            ),
            None,
        )
        .await
        .unwrap();

    assert_eq!(h.storage.publish_count(), 0);
    let request = h.provider.last_request().await.unwrap();
    assert_eq!(request.input.person_image_url, "https://cdn/person.jpg");
    assert_eq!(request.input.top_garment_url.as_deref(), Some("https://cdn/top.png"));
    assert_eq!(request.input.bottom_garment_url.as_deref(), Some("https://cdn/bottom.png"));
}

#[tokio::test]
async fn test_full_mode_missing_top_makes_no_outbound_calls() {
    let h = Harness::new();

    let garments = GarmentRefs {
        bottom: Some(ImageReference::remote("https://cdn/jeans.png")),
        ..Default::default()
    };
    let err = h
        .facade
        .submit_try_on(
            Some(ImageReference::remote("https://cdn/person.jpg")),
            TryOnMode::Full,
            &garments,
            None,
        )
        .await
        .unwrap_err();

    match err {
        TryOnError::MissingInput(what) => assert!(what.contains("top"), "got: {}", what),
        other => panic!("expected MissingInput, got {:?}", other),
    }
    assert_eq!(h.storage.publish_count(), 0);
    assert_eq!(h.provider.submit_count(), 0);
}

#[tokio::test]
async fn test_single_mode_ignores_other_slot() {
    let h = Harness::new();

    let garments = GarmentRefs {
        bottom: Some(ImageReference::remote("https://cdn/jeans.png")),
        ..Default::default()
    };
    let err = h
        .facade
        .submit_try_on(
            Some(ImageReference::remote("https://cdn/person.jpg")),
            TOP,
            &garments,
            None,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, TryOnError::MissingInput(_)));
    assert_eq!(h.provider.submit_count(), 0);
}

#[tokio::test]
async fn test_missing_local_file_fails_before_submission() {
    let dir = TempDir::new().unwrap();
    let h = Harness::new();

    let err = h
        .facade
        .submit_try_on(
            Some(ImageReference::local(dir.path().join("nope.jpg"))),
            TOP,
            &GarmentRefs::top(ImageReference::remote("https://cdn/shirt.png")),
            None,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, TryOnError::FileNotFound { .. }));
    assert_eq!(h.storage.publish_count(), 0);
    assert_eq!(h.provider.submit_count(), 0);
}

#[tokio::test]
async fn test_storage_failure_aborts_submission() {
    let dir = TempDir::new().unwrap();
    let photo = write_image(dir.path(), "photo.jpg");
    let h = Harness::new();
    h.storage
        .fail_next(StorageError::Http {
            status: 403,
            body: "AccessDenied".to_string(),
        })
        .await;

    let err = h
        .facade
        .submit_try_on(
            Some(ImageReference::local(&photo)),
            TOP,
            &GarmentRefs::top(ImageReference::remote("https://cdn/shirt.png")),
            None,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, TryOnError::Storage { .. }));
    assert_eq!(h.provider.submit_count(), 0);
}

#[tokio::test]
async fn test_same_local_file_published_once_across_submissions() {
    let dir = TempDir::new().unwrap();
    let photo = write_image(dir.path(), "photo.jpg");
    let h = Harness::new();
    h.provider.accept_with("a").await;
    h.provider.accept_with("b").await;

    for _ in 0..2 {
        h.facade
            .submit_try_on(
                Some(ImageReference::local(&photo)),
                TOP,
                &GarmentRefs::top(ImageReference::remote("https://cdn/shirt.png")),
                None,
            )
            .await
            .unwrap();
    }

    assert_eq!(h.storage.publish_count(), 1);
    let requests = h.provider.requests.lock().await;
    assert_eq!(requests[0].input.person_image_url, requests[1].input.person_image_url);
}

#[tokio::test]
async fn test_concurrent_resolution_publishes_once() {
    let dir = TempDir::new().unwrap();
    let photo = write_image(dir.path(), "photo.jpg");
    let h = Arc::new(Harness::with_storage(FakeStorage::slow(Duration::from_millis(50))));

    let mut tasks = Vec::new();
    for _ in 0..6 {
        let h = h.clone();
        let photo = photo.clone();
        tasks.push(tokio::spawn(async move {
            h.facade.publish(&ImageReference::local(photo)).await
        }));
    }

    let mut urls = Vec::new();
    for task in tasks {
        urls.push(task.await.unwrap().unwrap());
    }

    assert_eq!(h.storage.publish_count(), 1);
    assert!(urls.windows(2).all(|w| w[0] == w[1]));
}

#[tokio::test]
async fn test_submission_without_task_id_is_error_with_body() {
    let h = Harness::new();
    h.provider
        .push_receipt(Ok(SubmitReceipt {
            status: 200,
            body: r#"{"output":{}}"#.to_string(),
            task_id: None,
        }))
        .await;

    let err = h
        .facade
        .submit_try_on(
            Some(ImageReference::remote("https://cdn/person.jpg")),
            TOP,
            &GarmentRefs::top(ImageReference::remote("https://cdn/shirt.png")),
            None,
        )
        .await
        .unwrap_err();

    match err {
        TryOnError::Submission { status, body, .. } => {
            assert_eq!(status, Some(200));
            assert_eq!(body, r#"{"output":{}}"#);
        }
        other => panic!("expected Submission, got {:?}", other),
    }
}

#[tokio::test]
async fn test_submission_http_rejection_carries_status() {
    let h = Harness::new();
    h.provider
        .push_receipt(Err(ProviderError::Http {
            status: 400,
            body: r#"{"code":"InvalidParameter"}"#.to_string(),
        }))
        .await;

    let err = h
        .facade
        .submit_try_on(
            Some(ImageReference::remote("https://cdn/person.jpg")),
            TOP,
            &GarmentRefs::top(ImageReference::remote("https://cdn/shirt.png")),
            None,
        )
        .await
        .unwrap_err();

    match err {
        TryOnError::Submission { status, body, .. } => {
            assert_eq!(status, Some(400));
            assert!(body.contains("InvalidParameter"));
        }
        other => panic!("expected Submission, got {:?}", other),
    }
}

#[tokio::test]
async fn test_poll_success_from_legacy_result_url() {
    let h = Harness::new();
    h.provider
        .push_status(TaskStatusOutput {
            task_status: Some("SUCCEEDED".to_string()),
            result_url: Some("https://r/legacy.png".to_string()),
            ..Default::default()
        })
        .await;

    let task = h.facade.poll_try_on("t1").await.unwrap();

    assert_eq!(task.state, TaskState::Succeeded);
    assert_eq!(task.result_url.as_deref(), Some("https://r/legacy.png"));
    assert_eq!(task.error_message, None);
}

#[tokio::test]
async fn test_poll_success_prefers_image_url_then_results() {
    let h = Harness::new();
    h.provider
        .push_status(TaskStatusOutput {
            task_status: Some("SUCCEEDED".to_string()),
            image_url: Some("https://r/primary.png".to_string()),
            result_url: Some("https://r/legacy.png".to_string()),
            results: results_list(&["https://r/list.png"]),
            ..Default::default()
        })
        .await;
    h.provider
        .push_status(TaskStatusOutput {
            task_status: Some("SUCCEEDED".to_string()),
            results: results_list(&["https://r/list.png", "https://r/second.png"]),
            ..Default::default()
        })
        .await;

    let first = h.facade.poll_try_on("t1").await.unwrap();
    let second = h.facade.poll_try_on("t1").await.unwrap();

    assert_eq!(first.result_url.as_deref(), Some("https://r/primary.png"));
    assert_eq!(second.result_url.as_deref(), Some("https://r/list.png"));
}

#[tokio::test]
async fn test_poll_success_without_any_url_is_error() {
    let h = Harness::new();
    h.provider.push_status(status("SUCCEEDED")).await;

    let err = h.facade.poll_try_on("t9").await.unwrap_err();

    assert!(matches!(err, TryOnError::Poll { ref task_id, .. } if task_id == "t9"));
}

#[tokio::test]
async fn test_poll_failed_reports_provider_message() {
    let h = Harness::new();
    h.provider
        .push_status(TaskStatusOutput {
            task_status: Some("FAILED".to_string()),
            message: Some("person not detected".to_string()),
            code: Some("InvalidInput".to_string()),
            ..Default::default()
        })
        .await;
    h.provider
        .push_status(TaskStatusOutput {
            task_status: Some("FAILED".to_string()),
            code: Some("InternalError".to_string()),
            ..Default::default()
        })
        .await;
    h.provider.push_status(status("FAILED")).await;

    let with_message = h.facade.poll_try_on("t1").await.unwrap();
    let with_code = h.facade.poll_try_on("t1").await.unwrap();
    let bare = h.facade.poll_try_on("t1").await.unwrap();

    assert_eq!(with_message.state, TaskState::Failed);
    assert_eq!(with_message.error_message.as_deref(), Some("person not detected"));
    assert_eq!(with_code.error_message.as_deref(), Some("InternalError"));
    assert_eq!(bare.error_message.as_deref(), Some("Unknown error"));
}

#[tokio::test]
async fn test_poll_in_progress_and_unrecognized_states() {
    let h = Harness::new();
    h.provider.push_status(status("PENDING")).await;
    h.provider.push_status(status("RUNNING")).await;
    h.provider.push_status(status("GARBAGE")).await;
    h.provider.push_status(TaskStatusOutput::default()).await;

    let states = [
        h.facade.poll_try_on("t1").await.unwrap().state,
        h.facade.poll_try_on("t1").await.unwrap().state,
        h.facade.poll_try_on("t1").await.unwrap().state,
        h.facade.poll_try_on("t1").await.unwrap().state,
    ];

    assert_eq!(
        states,
        [
            TaskState::Pending,
            TaskState::Running,
            TaskState::Unknown,
            TaskState::Unknown
        ]
    );
}

#[tokio::test]
async fn test_poll_transport_failure_is_poll_error() {
    let h = Harness::new();
    h.provider
        .push_status_error(ProviderError::Transport("timed out".to_string()))
        .await;

    let err = h.facade.poll_try_on("t1").await.unwrap_err();

    assert!(matches!(err, TryOnError::Poll { .. }));
    assert!(err.to_string().contains("timed out"));
}

#[tokio::test]
async fn test_malformed_task_id_never_reaches_provider() {
    let h = Harness::new();

    let err = h
        .facade
        .poll_try_on("../services/aigc/other?x=")
        .await
        .unwrap_err();

    assert!(matches!(err, TryOnError::InvalidTaskId(_)));
    assert_eq!(h.provider.poll_count(), 0);
}

#[tokio::test]
async fn test_rooted_facade_refuses_files_outside_upload_folder() {
    let uploads = TempDir::new().unwrap();
    let elsewhere = TempDir::new().unwrap();
    let secret = write_image(elsewhere.path(), "id_rsa");
    let settings = FacadeSettings {
        upload_root: Some(uploads.path().to_path_buf()),
        ..FacadeSettings::default()
    };
    let h = Harness::with_settings(FakeStorage::new(), &settings);

    let err = h
        .facade
        .publish(&ImageReference::local(&secret))
        .await
        .unwrap_err();

    assert!(matches!(err, TryOnError::FileNotFound { .. }));
    assert_eq!(h.storage.publish_count(), 0);
}

#[tokio::test]
async fn test_sync_result_sentinel_skips_provider() {
    let h = Harness::new();

    let task = h.facade.poll_try_on(SYNC_RESULT_TASK_ID).await.unwrap();

    assert_eq!(task.state, TaskState::Succeeded);
    assert_eq!(task.result_url, None);
    assert_eq!(h.provider.poll_count(), 0);
}

#[tokio::test]
async fn test_cached_model_photo_used_when_person_omitted() {
    let dir = TempDir::new().unwrap();
    let photo = write_image(dir.path(), "me.png");
    let h = Harness::new();
    h.provider.accept_with("t3").await;

    let published = h
        .facade
        .resolve_and_cache_model(&ImageReference::local(&photo), "/uploads/me.png", "s1")
        .await
        .unwrap();

    let entry = h.facade.current_model("s1").await.unwrap();
    assert_eq!(entry.published_url, published);
    assert_eq!(entry.original_reference_url, "/uploads/me.png");
    assert!(entry.permanent);

    h.facade
        .submit_try_on(
            None,
            TOP,
            &GarmentRefs::top(ImageReference::remote("https://cdn/shirt.png")),
            Some("s1"),
        )
        .await
        .unwrap();

    let request = h.provider.last_request().await.unwrap();
    assert_eq!(request.input.person_image_url, published);
    assert_eq!(h.storage.publish_count(), 1);
}

#[tokio::test]
async fn test_model_cache_is_per_session() {
    let h = Harness::new();

    h.facade
        .resolve_and_cache_model(&ImageReference::remote("https://cdn/a.jpg"), "https://cdn/a.jpg", "s1")
        .await
        .unwrap();

    assert!(h.facade.current_model("s1").await.is_some());
    assert!(h.facade.current_model("s2").await.is_none());

    let err = h
        .facade
        .submit_try_on(
            None,
            TOP,
            &GarmentRefs::top(ImageReference::remote("https://cdn/shirt.png")),
            Some("s2"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, TryOnError::MissingInput(_)));
    assert_eq!(h.provider.submit_count(), 0);
}

#[tokio::test]
async fn test_clear_model_forgets_entry() {
    let h = Harness::new();
    h.facade
        .resolve_and_cache_model(&ImageReference::remote("https://cdn/a.jpg"), "https://cdn/a.jpg", "s1")
        .await
        .unwrap();

    h.facade.clear_model("s1").await;

    assert!(h.facade.current_model("s1").await.is_none());
}

#[tokio::test]
async fn test_garbage_cache_value_reads_as_absent() {
    let h = Harness::new();
    h.sessions
        .set("s1", "model_image", "not json".to_string(), chrono::Duration::days(1))
        .await
        .unwrap();

    assert!(h.facade.current_model("s1").await.is_none());
}

#[tokio::test]
async fn test_unconfigured_storage_is_reported() {
    let dir = TempDir::new().unwrap();
    let photo = write_image(dir.path(), "photo.jpg");
    let h = Harness::with_storage(FakeStorage::unconfigured());

    assert!(!h.facade.storage_configured());

    let err = h
        .facade
        .publish(&ImageReference::local(&photo))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TryOnError::Storage {
            source: StorageError::NotConfigured(_),
            ..
        }
    ));
}
