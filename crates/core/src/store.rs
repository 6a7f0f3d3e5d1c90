//! The document index: one collection fed by every watched root, published as
//! immutable snapshots.
//!
//! All mutations go through the collection mutex, so change batches, content
//! parsing results and user commands are applied one at a time. Provider
//! callbacks only ever hold a weak reference to the store.

use crate::archive;
use crate::config::AppConfig;
use crate::dates::DateParser;
use crate::error::StoreError;
use crate::extractor::{self, ParsingOptions, TextSource};
use crate::models::{archive_order, Document, DocumentEdit, TaggingStatus};
use crate::search::{self, SearchScope};
use crate::tag_index::TagIndex;
use providers::{
    build_provider, ChangeHandler, DownloadStatus, FileChangeEvent, FolderProvider,
    ProviderError, ProviderOptions,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub archive_root: PathBuf,
    pub cache_path: PathBuf,
    pub parsing: ParsingOptions,
    /// Tags recognised in content besides those already in the collection.
    pub vocabulary: BTreeSet<String>,
    pub providers: ProviderOptions,
    pub slugify: bool,
    pub watch: bool,
}

impl StoreOptions {
    pub fn new(archive_root: impl Into<PathBuf>, cache_path: impl Into<PathBuf>) -> Self {
        Self {
            archive_root: archive_root.into(),
            cache_path: cache_path.into(),
            parsing: ParsingOptions::ALL,
            vocabulary: BTreeSet::new(),
            providers: ProviderOptions::default(),
            slugify: true,
            watch: false,
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            archive_root: cfg.archive_root(),
            cache_path: PathBuf::from(&cfg.cache.path),
            parsing: cfg.parsing_options(),
            vocabulary: cfg
                .parsing
                .vocabulary
                .iter()
                .map(|t| t.to_lowercase())
                .collect(),
            providers: cfg.provider_options(),
            slugify: cfg.archive.slugify,
            watch: cfg.providers.watch,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreState {
    #[default]
    Uninitialized,
    /// Showing documents restored from the cache; no provider has reported yet.
    CachedDocuments,
    Live,
}

/// Immutable view of the collection handed to readers.
#[derive(Debug, Clone, Default)]
pub struct ArchiveSnapshot {
    pub state: StoreState,
    /// All documents in archive order.
    pub documents: Vec<Document>,
    /// Year folders present in the collection.
    pub years: BTreeSet<String>,
    pub tags: TagIndex,
}

impl ArchiveSnapshot {
    pub fn get(&self, path: &Path) -> Option<&Document> {
        self.documents.iter().find(|d| d.path() == path)
    }

    pub fn untagged(&self) -> impl Iterator<Item = &Document> {
        self.documents
            .iter()
            .filter(|d| d.tagging_status() == TaggingStatus::Untagged)
    }
}

#[derive(Default)]
struct Collection {
    state: StoreState,
    roots: BTreeSet<PathBuf>,
    documents: HashMap<PathBuf, Document>,
    /// Document path to the root whose provider reported it.
    owners: HashMap<PathBuf, PathBuf>,
    /// Per-root document paths in archive order.
    buckets: BTreeMap<PathBuf, Vec<PathBuf>>,
    /// Documents known before the last `configure`, whose metadata is
    /// carried over when a provider reports the same file again.
    previous: HashMap<PathBuf, Document>,
}

impl Collection {
    fn insert(&mut self, root: &Path, document: Document) {
        let path = document.path().to_path_buf();
        if self.documents.contains_key(&path) {
            self.remove(&path);
        }
        self.owners.insert(path.clone(), root.to_path_buf());
        self.buckets
            .entry(root.to_path_buf())
            .or_default()
            .push(path.clone());
        self.documents.insert(path, document);
    }

    fn remove(&mut self, path: &Path) -> Option<Document> {
        let root = self.owners.remove(path)?;
        if let Some(bucket) = self.buckets.get_mut(&root) {
            bucket.retain(|p| p != path);
        }
        self.documents.remove(path)
    }

    fn sort_bucket(&mut self, root: &Path) {
        let documents = &self.documents;
        if let Some(bucket) = self.buckets.get_mut(root) {
            bucket.sort_by(|a, b| match (documents.get(a), documents.get(b)) {
                (Some(a), Some(b)) => archive_order(a, b),
                _ => a.cmp(b),
            });
        }
    }

    fn owner(&self, path: &Path) -> Option<&PathBuf> {
        self.owners.get(path)
    }

    /// Move `path` into the bucket of `root`.
    fn adopt(&mut self, root: &Path, path: &Path) {
        let Some(old) = self.owners.insert(path.to_path_buf(), root.to_path_buf()) else {
            return;
        };
        if old == root {
            return;
        }
        if let Some(bucket) = self.buckets.get_mut(&old) {
            bucket.retain(|p| p != path);
        }
        self.buckets
            .entry(root.to_path_buf())
            .or_default()
            .push(path.to_path_buf());
    }

    /// The root a document reported by `reporter` belongs to: the deepest
    /// configured root containing it.
    fn owning_root(&self, reporter: &Path, path: &Path) -> PathBuf {
        match self.root_for(path) {
            Some(root) if root.starts_with(reporter) => root,
            _ => reporter.to_path_buf(),
        }
    }

    /// The configured root containing `path`, deepest first.
    fn root_for(&self, path: &Path) -> Option<PathBuf> {
        self.roots
            .iter()
            .filter(|root| path.starts_with(root))
            .max_by_key(|root| root.components().count())
            .cloned()
    }

    fn bucket(&self, root: &Path) -> Vec<Document> {
        self.buckets
            .get(root)
            .map(|paths| {
                paths
                    .iter()
                    .filter_map(|p| self.documents.get(p).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn known_tags(&self) -> BTreeSet<String> {
        self.documents
            .values()
            .flat_map(|d| d.tags.iter().cloned())
            .collect()
    }

    fn snapshot(&self) -> ArchiveSnapshot {
        let mut documents: Vec<Document> = self.documents.values().cloned().collect();
        documents.sort_by(archive_order);
        let years = documents
            .iter()
            .map(Document::folder)
            .filter(|f| is_year(f))
            .collect();
        let tags = TagIndex::build(documents.iter().map(|d| &d.tags));
        ArchiveSnapshot {
            state: self.state,
            documents,
            years,
            tags,
        }
    }
}

fn is_year(folder: &str) -> bool {
    !folder.is_empty() && folder.len() <= 4 && folder.chars().all(|c| c.is_ascii_digit())
}

struct Inner {
    options: StoreOptions,
    runtime: Handle,
    text_source: Arc<dyn TextSource>,
    date_parser: Arc<dyn DateParser>,
    collection: Mutex<Collection>,
    providers: Mutex<Vec<Box<dyn FolderProvider>>>,
    publisher: watch::Sender<Arc<ArchiveSnapshot>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    cache_generation: AtomicU64,
    /// Generation of the last cache write; held while writing.
    cache_written: Mutex<u64>,
}

/// Handle to the shared document index. Clones refer to the same store.
#[derive(Clone)]
pub struct DocumentStore {
    inner: Arc<Inner>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl DocumentStore {
    /// Create an empty store. Must be called from within a tokio runtime,
    /// which runs content parsing and cache writes.
    pub fn new(
        options: StoreOptions,
        text_source: Arc<dyn TextSource>,
        date_parser: Arc<dyn DateParser>,
    ) -> Result<Self, StoreError> {
        let runtime = Handle::try_current().map_err(|e| StoreError::NoRuntime(e.to_string()))?;
        let (publisher, _) = watch::channel(Arc::new(ArchiveSnapshot::default()));
        Ok(Self {
            inner: Arc::new(Inner {
                options,
                runtime,
                text_source,
                date_parser,
                collection: Mutex::new(Collection::default()),
                providers: Mutex::new(Vec::new()),
                publisher,
                tasks: Mutex::new(Vec::new()),
                cache_generation: AtomicU64::new(0),
                cache_written: Mutex::new(0),
            }),
        })
    }

    pub fn options(&self) -> &StoreOptions {
        &self.inner.options
    }

    /// Show the documents of the last session until providers report.
    /// An undecodable cache is deleted. Returns the number restored.
    pub fn load_cache(&self) -> usize {
        let path = &self.inner.options.cache_path;
        let documents: Vec<Document> = match storage::load(path) {
            Ok(Some(documents)) => documents,
            Ok(None) => return 0,
            Err(storage::CacheError::Decode(e)) => {
                warn!(path = %path.display(), error = %e, "discarding undecodable cache");
                if let Err(e) = storage::remove(path) {
                    warn!(path = %path.display(), error = %e, "could not delete cache");
                }
                return 0;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cache unreadable");
                return 0;
            }
        };

        let count = documents.len();
        let mut collection = lock(&self.inner.collection);
        if collection.state == StoreState::Live {
            return 0;
        }
        let cached = PathBuf::new();
        for document in documents {
            collection.insert(&cached, document);
        }
        collection.sort_bucket(&cached);
        collection.state = StoreState::CachedDocuments;
        self.inner.publish(&collection);
        info!(documents = count, "restored cached documents");
        count
    }

    /// Replace all providers with one per root and run the initial scan.
    /// Any root that no provider can serve fails the whole call.
    pub fn configure(&self, roots: &[PathBuf]) -> Result<Arc<ArchiveSnapshot>, StoreError> {
        let inner = &self.inner;
        let mut providers = lock(&inner.providers);
        providers.clear();

        {
            let mut collection = lock(&inner.collection);
            let previous = std::mem::take(&mut collection.documents);
            *collection = Collection {
                roots: roots.iter().cloned().collect(),
                previous,
                ..Collection::default()
            };
            inner.publish(&collection);
        }
        if let Err(e) = storage::remove(&inner.options.cache_path) {
            warn!(error = %e, "could not delete cache");
        }

        let weak: Weak<Inner> = Arc::downgrade(inner);
        let handler: ChangeHandler = Arc::new(move |root: &Path, events: Vec<FileChangeEvent>| {
            if let Some(inner) = weak.upgrade() {
                inner.apply_events(root, events);
            }
        });

        let mut built = Vec::with_capacity(roots.len());
        for root in roots {
            let provider = build_provider(root, handler.clone(), &inner.options.providers)
                .map_err(|e| match e {
                    ProviderError::Unavailable(path) => StoreError::ProviderUnavailable(path),
                    other => StoreError::Provider(other),
                })?;
            info!(root = %root.display(), kind = ?provider.kind(), "provider configured");
            built.push(provider);
        }

        for provider in &built {
            if inner.options.watch {
                provider.watch()?;
            }
            provider.refresh();
        }
        *providers = built;

        let mut collection = lock(&inner.collection);
        collection.previous.clear();
        collection.state = StoreState::Live;
        Ok(inner.publish_and_persist(&collection))
    }

    /// Rescan every root now instead of waiting for notifications.
    pub fn refresh(&self) {
        for provider in lock(&self.inner.providers).iter() {
            provider.refresh();
        }
    }

    /// Apply one batch of change events from the provider of `root`.
    pub fn apply_events(&self, root: &Path, events: Vec<FileChangeEvent>) -> Arc<ArchiveSnapshot> {
        self.inner.apply_events(root, events)
    }

    pub fn snapshot(&self) -> Arc<ArchiveSnapshot> {
        self.inner.publisher.borrow().clone()
    }

    /// Receive every snapshot published from now on.
    pub fn subscribe(&self) -> watch::Receiver<Arc<ArchiveSnapshot>> {
        self.inner.publisher.subscribe()
    }

    pub fn roots(&self) -> Vec<PathBuf> {
        lock(&self.inner.collection).roots.iter().cloned().collect()
    }

    pub fn get(&self, path: &Path) -> Option<Document> {
        lock(&self.inner.collection).documents.get(path).cloned()
    }

    /// Documents reported by the provider of `root`, in archive order.
    pub fn documents_in(&self, root: &Path) -> Vec<Document> {
        lock(&self.inner.collection).bucket(root)
    }

    pub fn query<S: AsRef<str>>(
        &self,
        scope: &SearchScope,
        terms: &[S],
        status: Option<TaggingStatus>,
    ) -> Vec<Document> {
        let snapshot = self.snapshot();
        let scoped: Vec<Document> = snapshot
            .documents
            .iter()
            .filter(|d| match scope {
                SearchScope::All => true,
                SearchScope::Year(year) => d.folder() == *year,
            })
            .filter(|d| status.map(|s| d.tagging_status() == s).unwrap_or(true))
            .cloned()
            .collect();
        search::filter(&scoped, terms)
    }

    /// The local untagged document to work on next, by filename.
    pub fn next_untagged(&self) -> Option<Document> {
        let snapshot = self.snapshot();
        snapshot
            .untagged()
            .filter(|d| d.download_status().is_local())
            .min_by(|a, b| a.filename().cmp(b.filename()))
            .cloned()
    }

    pub fn available_tags<S: AsRef<str>>(&self, terms: &[S]) -> BTreeSet<String> {
        self.snapshot().tags.available_tags(terms)
    }

    pub fn similar_tags(&self, tag: &str) -> BTreeSet<String> {
        self.snapshot().tags.similar(tag)
    }

    pub fn associated_tags(&self, tags: &[String]) -> BTreeSet<String> {
        self.snapshot().tags.associated(tags)
    }

    /// Change metadata without moving the file.
    pub fn update(&self, path: &Path, edit: &DocumentEdit) -> Result<Document, StoreError> {
        let inner = &self.inner;
        let mut collection = lock(&inner.collection);
        let document = collection
            .documents
            .get_mut(path)
            .ok_or_else(|| StoreError::DocumentNotFound(path.to_path_buf()))?;
        edit.apply(document);
        let updated = document.clone();
        if let Some(root) = collection.owner(path).cloned() {
            collection.sort_bucket(&root);
        }
        inner.publish_and_persist(&collection);
        Ok(updated)
    }

    /// Apply `edit`, then move the document into the archive. On failure the
    /// collection is left as it was.
    pub fn archive(&self, path: &Path, edit: &DocumentEdit) -> Result<Document, StoreError> {
        let inner = &self.inner;
        let providers = lock(&inner.providers);
        let provider = provider_for(&providers, path)
            .or_else(|| provider_for(&providers, &inner.options.archive_root))
            .ok_or_else(|| StoreError::ProviderUnavailable(path.to_path_buf()))?;

        let mut collection = lock(&inner.collection);
        let mut document = collection
            .documents
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::DocumentNotFound(path.to_path_buf()))?;
        edit.apply(&mut document);
        let destination = archive::archive_document(
            &mut document,
            &inner.options.archive_root,
            provider,
            inner.options.slugify,
        )?;

        collection.remove(path);
        let root = collection
            .root_for(&destination)
            .unwrap_or_else(|| inner.options.archive_root.clone());
        collection.insert(&root, document.clone());
        collection.sort_bucket(&root);
        inner.publish_and_persist(&collection);
        Ok(document)
    }

    pub fn delete(&self, path: &Path) -> Result<(), StoreError> {
        let inner = &self.inner;
        let providers = lock(&inner.providers);
        if !lock(&inner.collection).documents.contains_key(path) {
            return Err(StoreError::DocumentNotFound(path.to_path_buf()));
        }
        let provider = provider_for(&providers, path)
            .ok_or_else(|| StoreError::ProviderUnavailable(path.to_path_buf()))?;
        provider.delete(path)?;

        let mut collection = lock(&inner.collection);
        collection.remove(path);
        inner.publish_and_persist(&collection);
        info!(path = %path.display(), "document deleted");
        Ok(())
    }

    /// Ask the provider to materialize a remote document.
    pub fn download(&self, path: &Path) -> Result<(), StoreError> {
        let inner = &self.inner;
        let providers = lock(&inner.providers);
        let provider = provider_for(&providers, path)
            .ok_or_else(|| StoreError::ProviderUnavailable(path.to_path_buf()))?;
        provider.start_download(path)?;

        let mut collection = lock(&inner.collection);
        if let Some(document) = collection.documents.get_mut(path) {
            if !document.download_status().is_local() {
                document.set_download_status(DownloadStatus::Downloading(0.0));
            }
        }
        inner.publish(&collection);
        Ok(())
    }

    /// Wait until background parsing and cache writes queued so far are done.
    pub async fn settle(&self) {
        loop {
            let pending = std::mem::take(&mut *lock(&self.inner.tasks));
            if pending.is_empty() {
                break;
            }
            for task in pending {
                if let Err(e) = task.await {
                    warn!(error = %e, "background task failed");
                }
            }
        }
    }
}

/// The provider whose root is the deepest ancestor of `path`.
fn provider_for<'a>(
    providers: &'a [Box<dyn FolderProvider>],
    path: &Path,
) -> Option<&'a dyn FolderProvider> {
    providers
        .iter()
        .filter(|p| path.starts_with(p.root()))
        .max_by_key(|p| p.root().components().count())
        .map(|p| &**p)
}

impl Inner {
    fn apply_events(
        self: &Arc<Self>,
        root: &Path,
        events: Vec<FileChangeEvent>,
    ) -> Arc<ArchiveSnapshot> {
        let mut to_parse = Vec::new();
        let snapshot = {
            let mut collection = lock(&self.collection);
            if !collection.roots.contains(root) {
                debug!(root = %root.display(), "ignoring events of an unconfigured root");
                return self.publisher.borrow().clone();
            }
            let mut touched = BTreeSet::from([root.to_path_buf()]);
            for event in events {
                match event {
                    FileChangeEvent::Added(details) | FileChangeEvent::Updated(details) => {
                        let owner = collection.owning_root(root, &details.path);
                        if let Some(document) = collection.documents.get_mut(&details.path) {
                            document.set_download_status(details.download_status);
                            if collection.owner(&details.path) != Some(&owner) {
                                collection.adopt(&owner, &details.path);
                                touched.insert(owner);
                            }
                            continue;
                        }
                        let mut document = Document::from_details(&details);
                        match collection.previous.remove(&details.path) {
                            Some(known) if known.filename() == document.filename() => {
                                document.restore_metadata(&known);
                            }
                            _ if document.tagging_status() == TaggingStatus::Untagged => {
                                to_parse.push(details.path.clone());
                            }
                            _ => {}
                        }
                        collection.insert(&owner, document);
                        touched.insert(owner);
                    }
                    FileChangeEvent::Removed(path) => {
                        if collection.owner(&path).map(|o| o.as_path()) == Some(root) {
                            collection.remove(&path);
                        }
                    }
                }
            }
            for bucket in &touched {
                collection.sort_bucket(bucket);
            }
            if collection.state != StoreState::Uninitialized {
                collection.state = StoreState::Live;
            }
            self.publish_and_persist(&collection)
        };

        if !self.options.parsing.is_empty() {
            for path in to_parse {
                self.schedule_parse(path);
            }
        }
        snapshot
    }

    fn schedule_parse(self: &Arc<Self>, path: PathBuf) {
        let inner = Arc::clone(self);
        self.spawn(move || {
            let Some(text) = inner.text_source.text(&path) else {
                debug!(path = %path.display(), "no text to parse");
                return;
            };
            inner.merge_parsed(&path, &text);
        });
    }

    fn merge_parsed(self: &Arc<Self>, path: &Path, text: &str) {
        let mut collection = lock(&self.collection);
        let mut known = collection.known_tags();
        known.extend(self.options.vocabulary.iter().cloned());
        let Some(document) = collection.documents.get_mut(path) else {
            return;
        };
        let changed = extractor::merge_content(
            document,
            text,
            self.date_parser.as_ref(),
            &known,
            self.options.parsing,
        );
        if !changed {
            return;
        }
        debug!(path = %path.display(), date = ?document.date, tags = ?document.tags, "content parsed");
        if let Some(root) = collection.owner(path).cloned() {
            collection.sort_bucket(&root);
        }
        self.publish_and_persist(&collection);
    }

    fn publish(&self, collection: &Collection) -> Arc<ArchiveSnapshot> {
        let snapshot = Arc::new(collection.snapshot());
        self.publisher.send_replace(Arc::clone(&snapshot));
        snapshot
    }

    fn publish_and_persist(self: &Arc<Self>, collection: &Collection) -> Arc<ArchiveSnapshot> {
        let snapshot = self.publish(collection);
        self.persist(Arc::clone(&snapshot));
        snapshot
    }

    /// Write the cache in the background. A write never replaces a newer one.
    fn persist(self: &Arc<Self>, snapshot: Arc<ArchiveSnapshot>) {
        let generation = self.cache_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let inner = Arc::clone(self);
        self.spawn(move || {
            let mut written = lock(&inner.cache_written);
            if *written > generation {
                return;
            }
            match storage::save(&inner.options.cache_path, &snapshot.documents) {
                Ok(()) => *written = generation,
                Err(e) => warn!(error = %e, "could not write cache"),
            }
        });
    }

    fn spawn(&self, work: impl FnOnce() + Send + 'static) {
        let handle = self.runtime.spawn_blocking(work);
        let mut tasks = lock(&self.tasks);
        tasks.retain(|t| !t.is_finished());
        tasks.push(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use providers::FileDetails;

    fn details(path: &str) -> FileDetails {
        let path = PathBuf::from(path);
        FileDetails {
            filename: path.file_name().unwrap().to_string_lossy().into_owned(),
            path,
            size: 1,
            download_status: DownloadStatus::Local,
        }
    }

    fn collection_with_roots(roots: &[&str]) -> Collection {
        Collection {
            roots: roots.iter().map(PathBuf::from).collect(),
            ..Collection::default()
        }
    }

    #[test]
    fn buckets_stay_sorted() {
        let mut collection = collection_with_roots(&["/a"]);
        let root = Path::new("/a");
        collection.insert(root, Document::from_details(&details("/a/2021-01-01--x__t.pdf")));
        collection.insert(root, Document::from_details(&details("/a/2020-01-01--y__t.pdf")));
        collection.insert(root, Document::from_details(&details("/a/scan.pdf")));
        collection.sort_bucket(root);

        let names: Vec<String> = collection
            .bucket(root)
            .iter()
            .map(|d| d.filename().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["scan.pdf", "2020-01-01--y__t.pdf", "2021-01-01--x__t.pdf"]
        );
    }

    #[test]
    fn reinserting_moves_ownership() {
        let mut collection = collection_with_roots(&["/a", "/b"]);
        collection.insert(Path::new("/a"), Document::from_details(&details("/a/x.pdf")));
        collection.insert(Path::new("/b"), Document::from_details(&details("/a/x.pdf")));
        assert!(collection.bucket(Path::new("/a")).is_empty());
        assert_eq!(collection.bucket(Path::new("/b")).len(), 1);
        assert_eq!(collection.documents.len(), 1);
    }

    #[test]
    fn deepest_root_wins() {
        let collection = collection_with_roots(&["/srv", "/srv/archive"]);
        assert_eq!(
            collection.root_for(Path::new("/srv/archive/2021/x.pdf")),
            Some(PathBuf::from("/srv/archive"))
        );
        assert_eq!(
            collection.root_for(Path::new("/srv/inbox/x.pdf")),
            Some(PathBuf::from("/srv"))
        );
        assert_eq!(collection.root_for(Path::new("/other/x.pdf")), None);
    }

    #[test]
    fn snapshot_lists_years_and_tags() {
        let mut collection = collection_with_roots(&["/archive"]);
        let root = Path::new("/archive");
        collection.insert(
            root,
            Document::from_details(&details("/archive/2021/2021-01-01--x__bill_tax.pdf")),
        );
        collection.insert(
            root,
            Document::from_details(&details("/archive/misc/2020-01-01--y__bill.pdf")),
        );

        let snapshot = collection.snapshot();
        assert_eq!(snapshot.years, BTreeSet::from(["2021".to_string()]));
        assert_eq!(snapshot.tags.similar("tax"), BTreeSet::from(["bill".to_string()]));
        assert_eq!(snapshot.documents.len(), 2);
    }

    #[test]
    fn year_folders() {
        assert!(is_year("2021"));
        assert!(is_year("99"));
        assert!(!is_year("20211"));
        assert!(!is_year("misc"));
        assert!(!is_year(""));
    }
}
