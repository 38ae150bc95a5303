//! Slug enumeration and concurrent listing of a content collection

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

use super::bundle::{Bundle, Bundler, ContentItem};
use super::frontmatter::Frontmatter;
use crate::error::{BuildError, Result};

/// List the immediate subdirectory names of a collection root
///
/// Names come back in filesystem order, which is not stable across
/// platforms; sort them if order matters.
pub async fn list_slugs(root: &Path) -> Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(root)
        .await
        .map_err(|e| BuildError::fs(root, e))?;

    let mut slugs = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| BuildError::fs(root, e))?
    {
        let path = entry.path();
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| BuildError::fs(&path, e))?;

        let is_dir = if file_type.is_symlink() {
            match tokio::fs::metadata(&path).await {
                Ok(m) => m.is_dir(),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::warn!("Skipping dangling symlink {}", path.display());
                    false
                }
                Err(e) => return Err(BuildError::fs(&path, e)),
            }
        } else {
            file_type.is_dir()
        };
        if !is_dir {
            continue;
        }

        match entry.file_name().into_string() {
            Ok(name) => slugs.push(name),
            Err(name) => tracing::warn!("Skipping non UTF-8 directory {:?}", name),
        }
    }

    Ok(slugs)
}

/// Result of listing with per-item failure isolation
#[derive(Debug)]
pub struct Listing<F> {
    pub items: Vec<ContentItem<F>>,
    pub errors: Vec<(String, BuildError)>,
}

/// Number of bundles running, plus the highest number seen at once
#[derive(Debug, Default)]
struct InFlight {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlight {
    fn enter(self: &Arc<Self>) -> InFlightGuard {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        InFlightGuard(Arc::clone(self))
    }
}

struct InFlightGuard(Arc<InFlight>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// One content collection (articles or projects)
pub struct Collection<F> {
    bundler: Arc<Bundler<F>>,
    concurrency: usize,
    in_flight: Arc<InFlight>,
}

type Outcome<F> = (usize, String, Result<Bundle<F>>);

impl<F: Frontmatter> Collection<F> {
    pub fn new(bundler: Bundler<F>, concurrency: usize) -> Self {
        Self {
            bundler: Arc::new(bundler),
            concurrency: concurrency.max(1),
            in_flight: Arc::default(),
        }
    }

    pub fn root(&self) -> &Path {
        self.bundler.root()
    }

    /// Most bundles this collection has had running at the same time
    pub fn peak_in_flight(&self) -> usize {
        self.in_flight.peak.load(Ordering::SeqCst)
    }

    /// Slugs of every item in the collection
    pub async fn slugs(&self) -> Result<Vec<String>> {
        list_slugs(self.root()).await
    }

    /// Bundle a single item
    pub async fn bundle(&self, slug: &str) -> Result<Bundle<F>> {
        self.bundler.bundle(slug).await
    }

    /// List every item, failing as a whole if any item fails to bundle
    pub async fn list_all(&self) -> Result<Vec<ContentItem<F>>> {
        let slugs = self.slugs().await?;
        let mut slots: Vec<Option<ContentItem<F>>> = slugs.iter().map(|_| None).collect();

        // Returning early drops the set, which aborts the remaining bundles
        let mut tasks = self.spawn_all(slugs);
        while let Some(joined) = tasks.join_next().await {
            let (index, _, result) = joined.map_err(task_failed::<F>)?;
            slots[index] = Some(result?.into_item());
        }

        let mut items: Vec<_> = slots.into_iter().flatten().collect();
        F::sort(&mut items);

        tracing::info!("Listed {} {}", items.len(), F::COLLECTION);
        tracing::debug!(
            "Peak of {} concurrent {} bundles (limit {})",
            self.peak_in_flight(),
            F::COLLECTION,
            self.concurrency
        );
        Ok(items)
    }

    /// List every item, collecting failures instead of stopping at the first
    ///
    /// Only a failure to enumerate the root is returned as an error.
    pub async fn list_report(&self) -> Result<Listing<F>> {
        let slugs = self.slugs().await?;
        let mut slots: Vec<Option<(String, Result<Bundle<F>>)>> =
            slugs.iter().map(|_| None).collect();

        let mut tasks = self.spawn_all(slugs);
        while let Some(joined) = tasks.join_next().await {
            let (index, slug, result) = joined.map_err(task_failed::<F>)?;
            slots[index] = Some((slug, result));
        }

        let mut items = Vec::new();
        let mut errors = Vec::new();
        for (slug, result) in slots.into_iter().flatten() {
            match result {
                Ok(bundle) => items.push(bundle.into_item()),
                Err(e) => errors.push((slug, e)),
            }
        }
        F::sort(&mut items);

        Ok(Listing { items, errors })
    }

    /// Start one bundling task per slug, at most `concurrency` running at once
    fn spawn_all(&self, slugs: Vec<String>) -> JoinSet<Outcome<F>> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for (index, slug) in slugs.into_iter().enumerate() {
            let bundler = Arc::clone(&self.bundler);
            let semaphore = Arc::clone(&semaphore);
            let in_flight = Arc::clone(&self.in_flight);
            tasks.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => {
                        let _running = in_flight.enter();
                        bundler.bundle(&slug).await
                    }
                    Err(_) => Err(BuildError::compile(&slug, "bundling was cancelled")),
                };
                (index, slug, result)
            });
        }

        tasks
    }
}

fn task_failed<F: Frontmatter>(e: JoinError) -> BuildError {
    BuildError::compile(F::COLLECTION, format!("bundling task failed: {}", e))
}
