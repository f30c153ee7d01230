//! Tests for storage clients

use super::*;
use bytes::Bytes;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::AsyncReadExt;

/// Test helper to create storage with one bucket
fn storage(page_size: usize) -> EphemeralStorage {
    let s = EphemeralStorage::with_page_size(page_size);
    s.create_bucket("bucket");
    s
}

// =============================================================================
// LISTING
// =============================================================================

mod listing_tests {
    use super::*;

    #[tokio::test]
    async fn test_list_empty_bucket() {
        let s = storage(10);
        let page = s.list_objects("bucket", None).await.unwrap();
        assert!(page.objects.is_empty());
        assert!(!page.is_truncated);
        assert!(page.next_continuation_token.is_none());
    }

    #[tokio::test]
    async fn test_list_pages_follow_continuation_token() {
        let s = storage(2);
        for key in ["a", "b", "c", "d", "e"] {
            s.put_object("bucket", key, Bytes::from("x")).await.unwrap();
        }

        let first = s.list_objects("bucket", None).await.unwrap();
        assert!(first.is_truncated);
        assert_eq!(first.objects.len(), 2);

        let second = s
            .list_objects("bucket", first.next_continuation_token.as_deref())
            .await
            .unwrap();
        assert!(second.is_truncated);
        assert_eq!(second.objects[0].key, "c");

        let third = s
            .list_objects("bucket", second.next_continuation_token.as_deref())
            .await
            .unwrap();
        assert!(!third.is_truncated);
        assert_eq!(third.objects.len(), 1);
        assert_eq!(third.objects[0].key, "e");
    }

    #[tokio::test]
    async fn test_list_reports_sizes() {
        let s = storage(10);
        s.put_object("bucket", "k", Bytes::from("hello")).await.unwrap();

        let page = s.list_objects("bucket", None).await.unwrap();
        assert_eq!(page.objects[0].size, 5);
        assert!(page.objects[0].last_modified.is_some());
    }

    #[tokio::test]
    async fn test_list_bucket_not_found() {
        let s = storage(10);
        let result = s.list_objects("missing", None).await;
        assert!(matches!(result, Err(StorageError::BucketNotFound(_))));
    }
}

// =============================================================================
// OBJECT OPERATIONS
// =============================================================================

mod object_tests {
    use super::*;

    #[tokio::test]
    async fn test_put_overwrites() {
        let s = storage(10);
        s.put_object("bucket", "k", Bytes::from("one")).await.unwrap();
        s.put_object("bucket", "k", Bytes::from("two")).await.unwrap();

        assert_eq!(s.object_data("bucket", "k").unwrap(), Bytes::from("two"));
    }

    #[tokio::test]
    async fn test_get_object_streams_content() {
        let s = storage(10);
        s.put_object("bucket", "k", Bytes::from("hello world")).await.unwrap();

        let mut content = s.get_object("bucket", "k").await.unwrap();
        assert_eq!(s.open_streams(), 1);

        let mut text = String::new();
        content.reader().read_to_string(&mut text).await.unwrap();
        assert_eq!(text, "hello world");

        content.close().unwrap();
        assert_eq!(s.open_streams(), 0);
    }

    #[tokio::test]
    async fn test_dropped_content_is_released() {
        let s = storage(10);
        s.put_object("bucket", "k", Bytes::from("data")).await.unwrap();

        let content = s.get_object("bucket", "k").await.unwrap();
        drop(content);
        assert_eq!(s.open_streams(), 0);
    }

    #[tokio::test]
    async fn test_get_object_not_found() {
        let s = storage(10);
        let result = s.get_object("bucket", "missing").await;
        assert!(matches!(result, Err(StorageError::ObjectNotFound { .. })));
        assert_eq!(s.open_streams(), 0);
    }

    #[tokio::test]
    async fn test_delete_object() {
        let s = storage(10);
        s.put_object("bucket", "k", Bytes::from("data")).await.unwrap();
        s.delete_object("bucket", "k").await.unwrap();
        assert!(s.object_data("bucket", "k").is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_object_succeeds() {
        let s = storage(10);
        assert!(s.delete_object("bucket", "missing").await.is_ok());
    }

    #[tokio::test]
    async fn test_put_object_bucket_not_found() {
        let s = storage(10);
        let result = s.put_object("missing", "k", Bytes::from("data")).await;
        assert!(matches!(result, Err(StorageError::BucketNotFound(_))));
    }
}

// =============================================================================
// CLIENT LIFECYCLE
// =============================================================================

mod lifecycle_tests {
    use super::*;

    #[tokio::test]
    async fn test_list_buckets_sorted() {
        let s = EphemeralStorage::new();
        s.create_bucket("gamma");
        s.create_bucket("alpha");
        s.create_bucket("beta");

        assert_eq!(s.list_buckets().await.unwrap(), vec!["alpha", "beta", "gamma"]);
    }

    #[tokio::test]
    async fn test_create_bucket_twice() {
        let s = EphemeralStorage::new();
        assert!(s.create_bucket("b"));
        assert!(!s.create_bucket("b"));
        assert!(s.bucket_exists("b"));
    }

    #[tokio::test]
    async fn test_shutdown() {
        let s = EphemeralStorage::new();
        s.shutdown().await.unwrap();
        assert!(s.is_shut_down());
    }

    #[tokio::test]
    async fn test_factory_shares_storage() {
        let factory = EphemeralClientFactory::new(Arc::new(storage(10)));
        let credentials = Credentials::new("AKIA", "secret").unwrap();
        let region = "us-east-1".parse().unwrap();

        let client = factory.build(region, credentials, None).unwrap();
        client.put_object("bucket", "k", Bytes::from("v")).await.unwrap();

        assert_eq!(factory.build_count(), 1);
        assert!(factory.storage().object_data("bucket", "k").is_some());
    }
}

// =============================================================================
// CONTENT STREAMS AND CREDENTIALS
// =============================================================================

mod content_tests {
    use super::*;

    #[test]
    fn test_release_runs_once() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&released);
        let content =
            ObjectContent::new("k", std::io::Cursor::new(Vec::new())).with_release(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });

        content.close().unwrap();
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_release_on_drop_is_swallowed() {
        let content = ObjectContent::new("k", std::io::Cursor::new(Vec::new()))
            .with_release(|| Err(StorageError::Backend("connection reset".to_string())));
        drop(content);
    }

    #[test]
    fn test_close_reports_release_failure() {
        let content = ObjectContent::new("k", std::io::Cursor::new(Vec::new()))
            .with_release(|| Err(StorageError::Backend("connection reset".to_string())));
        assert!(content.close().is_err());
    }

    #[test]
    fn test_credentials_reject_whitespace() {
        assert!(Credentials::new("AKIA EXAMPLE", "secret").is_err());
        assert!(Credentials::new("AKIA", "sec\nret").is_err());
        assert!(Credentials::new("", "secret").is_err());
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let credentials = Credentials::new("AKIA", "hunter2").unwrap();
        assert!(!format!("{credentials:?}").contains("hunter2"));
    }
}
