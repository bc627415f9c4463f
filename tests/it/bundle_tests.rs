use anyhow::{Result, bail};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use stowzip::{
    BundleItem, BundleRequest, Bundler, Error, Fetch, LocalFetcher, Progress, Scope,
};

use crate::read_back;

/// In-memory fetcher; each resource can be delayed to shuffle completion order.
#[derive(Default)]
struct MapFetcher {
    files: HashMap<String, (Vec<u8>, u64)>,
    calls: AtomicUsize,
}

impl MapFetcher {
    fn with(mut self, resource: &str, data: &[u8], delay_ms: u64) -> Self {
        self.files.insert(resource.to_string(), (data.to_vec(), delay_ms));
        self
    }
}

#[async_trait]
impl Fetch for MapFetcher {
    async fn fetch(&self, resource: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.files.get(resource) {
            Some((data, delay_ms)) => {
                tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
                Ok(data.clone())
            }
            None => bail!("404 Not Found: {}", resource),
        }
    }
}

fn items(resources: &[&str]) -> Vec<BundleItem> {
    resources.iter().map(|r| BundleItem::new(*r)).collect()
}

#[tokio::test]
async fn test_order_is_restored_after_concurrent_retrieval() {
    let fetcher = MapFetcher::default()
        .with("/csv/a.csv", b"1,2\n", 40)
        .with("/csv/b.csv", b"3,4\n", 0)
        .with("/csv/c.csv", b"5,6\n", 20);
    let bundler = Bundler::new(fetcher).with_concurrency(3);

    let request = BundleRequest::new(items(&["/csv/a.csv", "/csv/b.csv", "/csv/c.csv"]));
    let bundle = bundler.build(&request).await.unwrap();

    assert_eq!(bundle.included, vec!["a.csv", "b.csv", "c.csv"]);
    let names: Vec<_> = read_back(&bundle.bytes).into_iter().map(|f| f.name).collect();
    assert_eq!(names, bundle.included);
    assert!(bundle.skipped.is_empty());
    assert!(bundle.file_name.ends_with("-all.zip"));
    assert!(bundle.file_name.starts_with("data-"));
}

#[tokio::test]
async fn test_partial_failure_skips_failed_items() {
    let fetcher = MapFetcher::default()
        .with("a.csv", b"1,2\n", 0)
        .with("c.csv", b"5,6\n", 0);
    let bundler = Bundler::new(fetcher);

    let request = BundleRequest::new(items(&["a.csv", "missing.csv", "c.csv", "gone.csv"]))
        .with_name("forecasts")
        .with_scope(Scope::Selected);
    let bundle = bundler.build(&request).await.unwrap();

    let files = read_back(&bundle.bytes);
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].name, "a.csv");
    assert_eq!(files[0].data, b"1,2\n");
    assert_eq!(files[1].name, "c.csv");
    assert_eq!(files[1].data, b"5,6\n");

    let skipped: Vec<_> = bundle.skipped.iter().map(|s| s.resource.as_str()).collect();
    assert_eq!(skipped, vec!["missing.csv", "gone.csv"]);
    assert!(bundle.skipped[0].reason.contains("404"));

    assert!(bundle.file_name.starts_with("forecasts-"));
    assert!(bundle.file_name.ends_with("-selected.zip"));
}

#[tokio::test]
async fn test_all_failed_is_an_error() {
    let bundler = Bundler::new(MapFetcher::default());
    let request = BundleRequest::new(items(&["x.csv", "y.csv"]));
    assert!(matches!(
        bundler.build(&request).await,
        Err(Error::EmptyArchive { requested: 2 })
    ));
}

#[tokio::test]
async fn test_nothing_requested_gives_empty_archive() {
    let fetcher = Arc::new(MapFetcher::default());
    let bundler = Bundler::from_arc(fetcher.clone());
    let bundle = bundler.build(&BundleRequest::default()).await.unwrap();

    assert_eq!(bundle.bytes.len(), 22);
    assert!(bundle.included.is_empty());
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_duplicate_names_are_disambiguated() {
    let fetcher = MapFetcher::default()
        .with("2024/summary.csv", b"a", 0)
        .with("2025/summary.csv", b"b", 0)
        .with("2026/summary.csv", b"c", 0)
        .with("/", b"d", 0);
    let bundler = Bundler::new(fetcher);

    let request = BundleRequest::new(vec![
        BundleItem::new("2024/summary.csv"),
        BundleItem::new("2025/summary.csv"),
        BundleItem::new("2026/summary.csv").with_filename("latest.csv"),
        BundleItem::new("/"),
    ]);
    let bundle = bundler.build(&request).await.unwrap();
    assert_eq!(
        bundle.included,
        vec!["summary.csv", "summary-2.csv", "latest.csv", "file"]
    );

    let files = read_back(&bundle.bytes);
    assert_eq!(files[1].data, b"b");
    assert_eq!(files[3].data, b"d");
}

#[tokio::test]
async fn test_progress_reaches_total() {
    let fetcher = MapFetcher::default()
        .with("a", b"1", 5)
        .with("b", b"2", 0);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let bundler = Bundler::new(fetcher)
        .with_concurrency(1)
        .with_progress(move |p| sink.lock().unwrap().push(p));

    bundler
        .build(&BundleRequest::new(items(&["a", "b", "missing"])))
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![
            Progress { done: 1, total: 3 },
            Progress { done: 2, total: 3 },
            Progress { done: 3, total: 3 },
        ]
    );
}

/// Fetcher that never completes and counts how many retrievals were dropped.
#[derive(Default)]
struct HangingFetcher {
    started: AtomicUsize,
    dropped: Arc<AtomicUsize>,
}

struct DropCounter(Arc<AtomicUsize>);

impl Drop for DropCounter {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Fetch for HangingFetcher {
    async fn fetch(&self, _resource: &str) -> Result<Vec<u8>> {
        let _guard = DropCounter(self.dropped.clone());
        self.started.fetch_add(1, Ordering::SeqCst);
        std::future::pending::<()>().await;
        bail!("never reached")
    }
}

#[tokio::test]
async fn test_dropping_build_cancels_retrievals() {
    let fetcher = Arc::new(HangingFetcher::default());
    let bundler = Bundler::from_arc(fetcher.clone());
    let request = BundleRequest::new(items(&["a", "b", "c"]));

    let result = tokio::time::timeout(Duration::from_millis(50), bundler.build(&request)).await;
    assert!(result.is_err());

    // aborted tasks are dropped the next time the runtime gets to them
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(fetcher.started.load(Ordering::SeqCst), 3);
    assert_eq!(fetcher.dropped.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_local_fetcher_bundle() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("csv")).unwrap();
    std::fs::write(dir.path().join("csv/2024-01.csv"), b"period,value\n2024-01,3\n").unwrap();

    let bundler = Bundler::new(LocalFetcher::new(dir.path()));
    let request = BundleRequest::new(vec![
        BundleItem::new("csv/2024-01.csv").with_label("January 2024"),
        BundleItem::new("csv/2024-02.csv").with_label("February 2024"),
    ]);
    let bundle = bundler.build(&request).await.unwrap();

    let files = read_back(&bundle.bytes);
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].name, "2024-01.csv");
    assert_eq!(files[0].data, b"period,value\n2024-01,3\n");
    assert_eq!(bundle.skipped.len(), 1);
}

/// Serves one payload from `base` + resource, like a fetcher with a base prefix.
struct PrefixedFetcher {
    base: &'static str,
}

#[async_trait]
impl Fetch for PrefixedFetcher {
    async fn fetch(&self, _resource: &str) -> Result<Vec<u8>> {
        Ok(b"1,2\n".to_vec())
    }

    fn locate(&self, resource: &str) -> String {
        format!("{}{}", self.base, resource)
    }
}

#[tokio::test]
async fn test_names_come_from_the_prefixed_location() {
    let bundler = Bundler::new(PrefixedFetcher {
        base: "https://example.com/csv/summary.csv",
    });
    let request = BundleRequest::new(items(&["", "?v=2"]));
    let bundle = bundler.build(&request).await.unwrap();
    assert_eq!(bundle.included, vec!["summary.csv", "summary-2.csv"]);
}
