use archiver_core::dates::TextDateParser;
use archiver_core::extractor::{text_source, SidecarText, TextSourceKind};
use archiver_core::search::SearchScope;
use archiver_core::{
    ArchiveError, DocumentEdit, DocumentStore, StoreError, StoreOptions, StoreState,
    TaggingStatus,
};
use chrono::NaiveDate;
use providers::{DownloadStatus, FileChangeEvent, ProviderError};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

struct Fixture {
    _temp: TempDir,
    inbox: PathBuf,
    archive: PathBuf,
    cache: PathBuf,
}

fn fixture() -> Fixture {
    let temp = tempfile::tempdir().unwrap();
    let inbox = temp.path().join("inbox");
    let archive = temp.path().join("archive");
    fs::create_dir_all(&inbox).unwrap();
    fs::create_dir_all(&archive).unwrap();
    let cache = temp.path().join("cache").join("documents.json");
    Fixture {
        _temp: temp,
        inbox,
        archive,
        cache,
    }
}

fn store(fx: &Fixture, vocabulary: &[&str]) -> DocumentStore {
    let mut options = StoreOptions::new(&fx.archive, &fx.cache);
    options.vocabulary = vocabulary.iter().map(|t| t.to_string()).collect();
    DocumentStore::new(
        options,
        text_source(TextSourceKind::Sidecar),
        Arc::new(TextDateParser),
    )
    .unwrap()
}

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn set(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|t| t.to_string()).collect()
}

#[tokio::test]
async fn scanned_document_is_parsed_then_archived() {
    let fx = fixture();
    let scan = fx.inbox.join("scan1.pdf");
    write(&scan, "%PDF-1.4");
    write(
        &SidecarText::sidecar_path(&scan).unwrap(),
        "Rechnung vom 12.03.2021\nOne bill for clothes.",
    );
    let store = store(&fx, &["bill", "clothes", "tax"]);

    store.configure(&[fx.inbox.clone(), fx.archive.clone()]).unwrap();
    store.settle().await;

    let doc = store.get(&scan).expect("scan indexed");
    assert_eq!(doc.date, NaiveDate::from_ymd_opt(2021, 3, 12));
    assert_eq!(doc.tags, set(&["bill", "clothes"]));
    assert_eq!(doc.tagging_status(), TaggingStatus::Untagged);

    let archived = store
        .archive(
            &scan,
            &DocumentEdit {
                description: Some("blue pullover".into()),
                ..Default::default()
            },
        )
        .unwrap();

    let expected = fx
        .archive
        .join("2021")
        .join("2021-03-12--blue-pullover__bill_clothes.pdf");
    assert_eq!(archived.path(), expected);
    assert_eq!(archived.tagging_status(), TaggingStatus::Tagged);
    assert!(expected.exists());
    assert!(!scan.exists());

    store.refresh();
    store.settle().await;

    let snapshot = store.snapshot();
    assert_eq!(snapshot.state, StoreState::Live);
    assert_eq!(snapshot.documents.len(), 1);
    assert_eq!(snapshot.documents[0].path(), expected);
    assert_eq!(snapshot.years, set(&["2021"]));
    assert_eq!(store.documents_in(&fx.archive).len(), 1);
    assert!(store.documents_in(&fx.inbox).is_empty());
}

#[tokio::test]
async fn archive_without_tags_leaves_the_document() {
    let fx = fixture();
    let scan = fx.inbox.join("scan1.pdf");
    write(&scan, "%PDF-1.4");
    let store = store(&fx, &[]);
    store.configure(&[fx.inbox.clone(), fx.archive.clone()]).unwrap();
    store.settle().await;

    let err = store
        .archive(
            &scan,
            &DocumentEdit {
                date: NaiveDate::from_ymd_opt(2021, 3, 12),
                description: Some("blue-pullover".into()),
                tags: None,
            },
        )
        .unwrap_err();

    assert!(matches!(err, StoreError::Archive(ArchiveError::MissingTags)));
    assert!(scan.exists());
    let doc = store.get(&scan).unwrap();
    assert_eq!(doc.date, None);
    assert_eq!(doc.tagging_status(), TaggingStatus::Untagged);
}

#[tokio::test]
async fn archive_refuses_to_overwrite() {
    let fx = fixture();
    let scan = fx.inbox.join("scan1.pdf");
    write(&scan, "new");
    let taken = fx
        .archive
        .join("2021")
        .join("2021-03-12--blue-pullover__bill.pdf");
    write(&taken, "old");
    let store = store(&fx, &[]);
    store.configure(&[fx.inbox.clone(), fx.archive.clone()]).unwrap();
    store.settle().await;

    let err = store
        .archive(
            &scan,
            &DocumentEdit {
                date: NaiveDate::from_ymd_opt(2021, 3, 12),
                description: Some("blue-pullover".into()),
                tags: Some(set(&["bill"])),
            },
        )
        .unwrap_err();

    assert!(matches!(
        err,
        StoreError::Archive(ArchiveError::DestinationAlreadyExists(_))
    ));
    assert_eq!(fs::read_to_string(&taken).unwrap(), "old");
    assert_eq!(store.snapshot().documents.len(), 2);
}

#[tokio::test]
async fn removals_only_count_for_the_owning_root() {
    let fx = fixture();
    let doc = fx.archive.join("2021").join("2021-01-01--x__bill.pdf");
    write(&doc, "x");
    let store = store(&fx, &[]);
    store.configure(&[fx.inbox.clone(), fx.archive.clone()]).unwrap();

    store.apply_events(&fx.inbox, vec![FileChangeEvent::Removed(doc.clone())]);
    assert!(store.get(&doc).is_some());

    store.apply_events(&fx.archive, vec![FileChangeEvent::Removed(doc.clone())]);
    assert!(store.get(&doc).is_none());
    store.settle().await;
}

#[tokio::test]
async fn updated_events_refresh_download_status_only() {
    let fx = fixture();
    let path = fx.archive.join("2021").join("2021-01-01--x__bill.pdf");
    write(&path, "x");
    let store = store(&fx, &[]);
    store.configure(&[fx.archive.clone()]).unwrap();
    store
        .update(
            &path,
            &DocumentEdit {
                tags: Some(set(&["bill", "tax"])),
                ..Default::default()
            },
        )
        .unwrap();

    let mut details = providers::FileDetails {
        path: path.clone(),
        filename: "2021-01-01--x__bill.pdf".into(),
        size: 99,
        download_status: DownloadStatus::Remote,
    };
    store.apply_events(&fx.archive, vec![FileChangeEvent::Updated(details.clone())]);
    let doc = store.get(&path).unwrap();
    assert_eq!(doc.download_status(), DownloadStatus::Remote);
    assert_eq!(doc.tags, set(&["bill", "tax"]));

    details.path = fx.archive.join("2021").join("2021-02-02--y__tax.pdf");
    details.filename = "2021-02-02--y__tax.pdf".into();
    store.apply_events(&fx.archive, vec![FileChangeEvent::Updated(details.clone())]);
    assert_eq!(store.get(&details.path).unwrap().tags, set(&["tax"]));
    store.settle().await;
}

#[tokio::test]
async fn queries_and_tag_suggestions() {
    let fx = fixture();
    write(
        &fx.archive.join("2021").join("2021-01-01--blue-pullover__bill_clothes.pdf"),
        "a",
    );
    write(
        &fx.archive.join("2020").join("2020-05-05--tax-return__bill_tax.pdf"),
        "b",
    );
    write(&fx.inbox.join("scan.pdf"), "c");
    write(&fx.inbox.join("another.pdf"), "d");
    let store = store(&fx, &[]);
    store.configure(&[fx.inbox.clone(), fx.archive.clone()]).unwrap();
    store.settle().await;

    let none: [&str; 0] = [];
    assert_eq!(
        store.query(&SearchScope::Year("2021".into()), &none, None).len(),
        1
    );
    let found = store.query(&SearchScope::All, &["PULLOVER"], None);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].description(), "blue-pullover");
    let untagged = store.query(&SearchScope::All, &none, Some(TaggingStatus::Untagged));
    assert_eq!(untagged.len(), 2);

    assert_eq!(store.similar_tags("bill"), set(&["clothes", "tax"]));
    assert_eq!(store.available_tags(&["t"]), set(&["clothes", "tax"]));
    assert_eq!(store.available_tags(&["ax"]), set(&["tax"]));
    assert_eq!(
        store.associated_tags(&["tax".to_string()]),
        set(&["bill"])
    );
    assert_eq!(store.snapshot().years, set(&["2020", "2021"]));
    assert_eq!(
        store.next_untagged().map(|d| d.filename().to_string()),
        Some("another.pdf".to_string())
    );
}

#[tokio::test]
async fn cache_restores_and_recovers() {
    let fx = fixture();
    write(
        &fx.archive.join("2021").join("2021-01-01--blue-pullover__bill.pdf"),
        "a",
    );
    let first = store(&fx, &[]);
    first.configure(&[fx.archive.clone()]).unwrap();
    first.settle().await;
    assert!(fx.cache.exists());

    let second = store(&fx, &[]);
    assert_eq!(second.load_cache(), 1);
    let snapshot = second.snapshot();
    assert_eq!(snapshot.state, StoreState::CachedDocuments);
    assert_eq!(snapshot.documents[0].tagging_status(), TaggingStatus::Tagged);

    fs::write(&fx.cache, "{ not json").unwrap();
    let third = store(&fx, &[]);
    assert_eq!(third.load_cache(), 0);
    assert!(!fx.cache.exists());
    assert_eq!(third.snapshot().state, StoreState::Uninitialized);
}

#[tokio::test]
async fn unusable_root_fails_configure() {
    let fx = fixture();
    let store = store(&fx, &[]);
    let missing = fx.archive.join("does-not-exist");

    let err = store
        .configure(&[fx.inbox.clone(), missing.clone()])
        .unwrap_err();
    assert!(matches!(err, StoreError::ProviderUnavailable(p) if p == missing));

    let err = store.configure(&[PathBuf::from("relative/dir")]).unwrap_err();
    assert!(matches!(err, StoreError::ProviderUnavailable(_)));
}

#[tokio::test]
async fn subscribers_see_new_snapshots() {
    let fx = fixture();
    write(&fx.inbox.join("scan.pdf"), "c");
    let store = store(&fx, &[]);
    let mut rx = store.subscribe();

    store.configure(&[fx.inbox.clone()]).unwrap();

    assert!(rx.has_changed().unwrap());
    let snapshot = rx.borrow_and_update().clone();
    assert_eq!(snapshot.state, StoreState::Live);
    assert_eq!(snapshot.documents.len(), 1);
    store.settle().await;
}

#[tokio::test]
async fn delete_and_download() {
    let fx = fixture();
    let scan = fx.inbox.join("scan.pdf");
    write(&scan, "c");
    let store = store(&fx, &[]);
    store.configure(&[fx.inbox.clone()]).unwrap();

    let err = store.download(&scan).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Provider(ProviderError::NotSupported(_))
    ));

    store.delete(&scan).unwrap();
    assert!(!scan.exists());
    assert!(store.get(&scan).is_none());
    assert!(matches!(
        store.delete(&scan),
        Err(StoreError::DocumentNotFound(_))
    ));
    store.settle().await;
}

#[tokio::test]
async fn edits_carry_over_into_the_next_session() {
    let fx = fixture();
    let scan = fx.inbox.join("scan.pdf");
    let other = fx.inbox.join("other.pdf");
    write(&scan, "a");
    write(&other, "b");
    let first = store(&fx, &[]);
    first.configure(&[fx.inbox.clone(), fx.archive.clone()]).unwrap();
    let edit = DocumentEdit {
        tags: Some(set(&["bill"])),
        ..Default::default()
    };
    first.update(&scan, &edit).unwrap();
    first.update(&other, &edit).unwrap();
    first.settle().await;

    fs::rename(&other, fx.inbox.join("renamed.pdf")).unwrap();
    let second = store(&fx, &[]);
    assert_eq!(second.load_cache(), 2);
    second.configure(&[fx.inbox.clone(), fx.archive.clone()]).unwrap();
    second.settle().await;

    assert_eq!(second.get(&scan).unwrap().tags, set(&["bill"]));
    assert!(second.get(&fx.inbox.join("renamed.pdf")).unwrap().tags.is_empty());
    assert_eq!(second.snapshot().documents.len(), 2);

    let archived = second
        .archive(
            &scan,
            &DocumentEdit {
                date: NaiveDate::from_ymd_opt(2021, 3, 12),
                description: Some("blue-pullover".into()),
                tags: None,
            },
        )
        .unwrap();
    assert_eq!(archived.filename(), "2021-03-12--blue-pullover__bill.pdf");
}

#[tokio::test]
async fn similar_tags_keep_the_filename_case() {
    let fx = fixture();
    write(
        &fx.archive.join("2021").join("2021-01-01--x__Bill_Tax.pdf"),
        "a",
    );
    let store = store(&fx, &[]);
    store.configure(&[fx.archive.clone()]).unwrap();
    store.settle().await;

    let none: [&str; 0] = [];
    assert_eq!(store.available_tags(&none), set(&["Bill", "Tax"]));
    assert_eq!(store.similar_tags("Bill"), set(&["Tax"]));
    assert_eq!(store.associated_tags(&["Bill".to_string()]), set(&["Tax"]));
    assert!(store.similar_tags("bill").is_empty());
}

#[tokio::test]
async fn nested_roots_own_their_documents() {
    let fx = fixture();
    let nested = fx.inbox.join("scans");
    let top = fx.inbox.join("top.pdf");
    let deep = nested.join("deep.pdf");
    write(&top, "a");
    write(&deep, "b");
    let store = store(&fx, &[]);

    store.configure(&[fx.inbox.clone(), nested.clone()]).unwrap();
    store.settle().await;

    let names = |root: &Path| -> Vec<String> {
        store
            .documents_in(root)
            .iter()
            .map(|d| d.filename().to_string())
            .collect()
    };
    assert_eq!(names(&fx.inbox), vec!["top.pdf".to_string()]);
    assert_eq!(names(&nested), vec!["deep.pdf".to_string()]);

    store.apply_events(&fx.inbox, vec![FileChangeEvent::Removed(deep.clone())]);
    assert!(store.get(&deep).is_some());

    fs::remove_file(&deep).unwrap();
    store.refresh();
    store.settle().await;
    assert!(store.get(&deep).is_none());
    assert_eq!(store.snapshot().documents.len(), 1);
}

#[test]
fn store_needs_a_runtime() {
    let fx = fixture();
    let result = DocumentStore::new(
        StoreOptions::new(&fx.archive, &fx.cache),
        text_source(TextSourceKind::None),
        Arc::new(TextDateParser),
    );
    assert!(matches!(result, Err(StoreError::NoRuntime(_))));
}
