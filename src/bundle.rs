//! Selection and retrieval orchestration.
//!
//! A [`Bundler`] takes the caller's ordered selection, retrieves every item
//! through a [`Fetch`] implementation, drops the ones that fail, and hands
//! the rest to [`build_archive`] in the original order.
//!
//! Retrieval is best-effort: a failed item is logged and skipped, and the
//! build only fails with [`Error::EmptyArchive`] when nothing was retrieved.
//! Dropping the future returned by [`Bundler::build`] aborts every retrieval
//! still in flight, and no archive is produced.

use chrono::{NaiveDate, Utc};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::error::{Error, Result};
use crate::io::Fetch;
use crate::zip::{ArchiveEntry, PLACEHOLDER_NAME, build_archive};

/// Default number of concurrent retrievals.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Prefix used for the suggested file name when the caller gives none.
pub const DEFAULT_PREFIX: &str = "data";

/// One requested resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleItem {
    /// Identifier handed to the fetcher (path or URL).
    pub resource: String,
    /// Human-readable label, for display only.
    pub label: Option<String>,
    /// Explicit file name inside the archive.
    pub filename: Option<String>,
}

impl BundleItem {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            label: None,
            filename: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Label if one was given, otherwise the resource itself.
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.resource)
    }
}

/// Whether the archive holds a user-picked subset or every available item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    Selected,
    #[default]
    All,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Selected => f.write_str("selected"),
            Scope::All => f.write_str("all"),
        }
    }
}

/// Everything needed to build one archive.
#[derive(Debug, Clone, Default)]
pub struct BundleRequest {
    pub items: Vec<BundleItem>,
    /// Prefix of the suggested file name.
    pub name: Option<String>,
    pub scope: Scope,
}

impl BundleRequest {
    pub fn new(items: Vec<BundleItem>) -> Self {
        Self {
            items,
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }
}

/// An item that could not be retrieved and was left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    pub resource: String,
    pub reason: String,
}

/// A finished archive.
#[derive(Debug, Clone)]
pub struct Bundle {
    /// Suggested download name, `{prefix}-{date}-{scope}.zip`.
    pub file_name: String,
    /// The ZIP byte stream.
    pub bytes: Vec<u8>,
    /// Archive names of the included entries, in archive order.
    pub included: Vec<String>,
    /// Items dropped because retrieval failed, in request order.
    pub skipped: Vec<SkippedItem>,
}

/// Retrieval progress, reported after each item completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub done: usize,
    pub total: usize,
}

type ProgressFn = Box<dyn Fn(Progress) + Send + Sync>;

/// Retrieves a selection and builds its archive.
pub struct Bundler<F: Fetch> {
    fetcher: Arc<F>,
    concurrency: usize,
    on_progress: Option<ProgressFn>,
}

impl<F: Fetch + 'static> Bundler<F> {
    pub fn new(fetcher: F) -> Self {
        Self::from_arc(Arc::new(fetcher))
    }

    /// Share a fetcher the caller keeps a handle to.
    pub fn from_arc(fetcher: Arc<F>) -> Self {
        Self {
            fetcher,
            concurrency: DEFAULT_CONCURRENCY,
            on_progress: None,
        }
    }

    /// Limit the number of retrievals in flight (at least one).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_progress(mut self, callback: impl Fn(Progress) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Box::new(callback));
        self
    }

    /// Retrieve every requested item and build the archive.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyArchive`] if items were requested and none could be retrieved.
    /// - Capacity and encoding errors from [`build_archive`].
    pub async fn build(&self, request: &BundleRequest) -> Result<Bundle> {
        let total = request.items.len();
        let mut fetched: Vec<Option<std::result::Result<Vec<u8>, String>>> = vec![None; total];

        let permits = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();
        for (index, item) in request.items.iter().enumerate() {
            let fetcher = Arc::clone(&self.fetcher);
            let permits = Arc::clone(&permits);
            let resource = item.resource.clone();
            tasks.spawn(async move {
                let result = match permits.acquire_owned().await {
                    Ok(_permit) => fetcher.fetch(&resource).await,
                    Err(e) => Err(e.into()),
                };
                (index, result)
            });
        }

        let mut done = 0;
        while let Some(joined) = tasks.join_next().await {
            done += 1;
            match joined {
                Ok((index, result)) => {
                    fetched[index] = Some(result.map_err(|e| format!("{:#}", e)));
                }
                // A panicking fetcher loses its index; the slot stays empty.
                Err(e) => warn!("Retrieval task failed: {}", e),
            }
            if let Some(callback) = &self.on_progress {
                callback(Progress { done, total });
            }
        }

        let mut names = NameAllocator::default();
        let mut entries = Vec::with_capacity(total);
        let mut skipped = Vec::new();
        for (item, result) in request.items.iter().zip(fetched) {
            match result {
                Some(Ok(data)) => {
                    let location = self.fetcher.locate(&item.resource);
                    let name = names.allocate(&filename_for(item, &location));
                    debug!("retrieved {} as {} ({} bytes)", item.resource, name, data.len());
                    entries.push(ArchiveEntry::new(name, data));
                }
                Some(Err(reason)) => {
                    warn!("Skipping {}: {}", item.display_name(), reason);
                    skipped.push(SkippedItem {
                        resource: item.resource.clone(),
                        reason,
                    });
                }
                None => skipped.push(SkippedItem {
                    resource: item.resource.clone(),
                    reason: "retrieval task did not complete".to_string(),
                }),
            }
        }

        if total > 0 && entries.is_empty() {
            return Err(Error::EmptyArchive { requested: total });
        }

        let bytes = build_archive(&entries)?;
        info!(
            "Built archive with {} of {} items ({} bytes)",
            entries.len(),
            total,
            bytes.len()
        );

        Ok(Bundle {
            file_name: suggested_file_name(
                request.name.as_deref().unwrap_or(DEFAULT_PREFIX),
                Utc::now().date_naive(),
                request.scope,
            ),
            bytes,
            included: entries.into_iter().map(|e| e.name).collect(),
            skipped,
        })
    }
}

/// Download name for an archive: `{prefix}-{YYYY-MM-DD}-{scope}.zip`.
pub fn suggested_file_name(prefix: &str, date: NaiveDate, scope: Scope) -> String {
    let prefix = if prefix.is_empty() { DEFAULT_PREFIX } else { prefix };
    format!("{}-{}-{}.zip", prefix, date.format("%Y-%m-%d"), scope)
}

/// Archive name for an item fetched from `location`.
///
/// The explicit file name wins; otherwise the last non-empty segment of the
/// location's path, ignoring any query string or fragment. `location` is the
/// resource after the fetcher's base prefix was applied.
pub fn filename_for(item: &BundleItem, location: &str) -> String {
    if let Some(name) = item.filename.as_deref().filter(|n| !n.is_empty()) {
        return name.to_string();
    }

    let path = location
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    path.rsplit(['/', '\\'])
        .find(|s| !s.is_empty())
        .unwrap_or(PLACEHOLDER_NAME)
        .to_string()
}

/// Hands out unique archive names: `a.csv`, `a-2.csv`, `a-3.csv`, ...
#[derive(Debug, Default)]
struct NameAllocator {
    taken: HashSet<String>,
}

impl NameAllocator {
    fn allocate(&mut self, name: &str) -> String {
        let name = if name.is_empty() { PLACEHOLDER_NAME } else { name };
        if self.taken.insert(name.to_string()) {
            return name.to_string();
        }

        let (stem, ext) = match name.rfind('.') {
            Some(dot) if dot > 0 => name.split_at(dot),
            _ => (name, ""),
        };
        let mut n = 2;
        loop {
            let candidate = format!("{}-{}{}", stem, n, ext);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}
