//! End-to-end merge workflows driven through the session.

use pdffuse::config::{CompressionLevel, Config, Metadata, OverwriteMode};
use pdffuse::io::{FileDelivery, MemoryDelivery};
use pdffuse::merge::{MergeEngine, MergeState, MetadataManager};
use pdffuse::session::MergeSession;
use pdffuse::source::SourceFile;
use rstest::rstest;
use tempfile::TempDir;

use crate::common::{markers, markers_in_file, source, write_marked_pdf};

fn config_in(dir: &TempDir) -> Config {
    Config {
        output: dir.path().join("merged-document.pdf"),
        overwrite_mode: OverwriteMode::Force,
        quiet: true,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_add_reorder_remove_scenario() {
    let temp_dir = TempDir::new().unwrap();
    let a = write_marked_pdf(temp_dir.path(), "a.pdf", "A", 3);
    let b = write_marked_pdf(temp_dir.path(), "b.pdf", "B", 1);

    let config = config_in(&temp_dir);
    let output = config.output.clone();
    let mut session = MergeSession::new(config.clone(), FileDelivery::from_config(&config));

    session.on_files_added([source(&a).await, source(&b).await]);
    let report = session.on_merge_requested().await.unwrap().unwrap();
    assert_eq!(report.total_pages, 4);
    assert_eq!(markers_in_file(&output), vec!["A1", "A2", "A3", "B1"]);

    session.on_reorder(1, Some(0)).unwrap();
    session.on_merge_requested().await.unwrap().unwrap();
    assert_eq!(markers_in_file(&output), vec!["B1", "A1", "A2", "A3"]);

    let removed = session.on_remove(1).unwrap();
    assert_eq!(removed.name(), "a.pdf");
    assert!(!session.can_merge());
    assert!(session.on_merge_requested().await.unwrap().is_none());

    // The engine itself still accepts a single document.
    let merged = MergeEngine::default()
        .merge(session.snapshot().documents())
        .await
        .unwrap();
    assert_eq!(markers(&merged.bytes), vec!["B1"]);
}

#[rstest]
#[case(&[1, 1])]
#[case(&[2, 5, 1])]
#[case(&[4, 4, 4, 4])]
#[tokio::test]
async fn test_page_count_is_sum_of_inputs(#[case] page_counts: &[usize]) {
    let temp_dir = TempDir::new().unwrap();
    let mut session = MergeSession::new(config_in(&temp_dir), MemoryDelivery::new());

    let mut expected = Vec::new();
    for (index, &pages) in page_counts.iter().enumerate() {
        let label = format!("D{index}-");
        let path = write_marked_pdf(temp_dir.path(), &format!("{index}.pdf"), &label, pages);
        session.on_files_added([source(&path).await]);
        expected.extend((1..=pages).map(|page| format!("{label}{page}")));
    }

    let report = session.on_merge_requested().await.unwrap().unwrap();
    let delivered = session.delivery().delivered();

    assert_eq!(report.total_pages, page_counts.iter().sum::<usize>());
    assert_eq!(markers(&delivered[0].bytes), expected);
}

#[tokio::test]
async fn test_merging_twice_is_stable() {
    let temp_dir = TempDir::new().unwrap();
    let a = write_marked_pdf(temp_dir.path(), "a.pdf", "A", 2);
    let b = write_marked_pdf(temp_dir.path(), "b.pdf", "B", 2);

    let mut session = MergeSession::new(config_in(&temp_dir), MemoryDelivery::new());
    session.on_files_added([source(&a).await, source(&b).await]);

    session.on_merge_requested().await.unwrap().unwrap();
    session.on_merge_requested().await.unwrap().unwrap();

    let delivered = session.delivery().delivered();
    assert_eq!(delivered.len(), 2);
    assert_eq!(markers(&delivered[0].bytes), markers(&delivered[1].bytes));
    assert_eq!(session.merge_state(), MergeState::Succeeded);
}

#[tokio::test]
async fn test_duplicates_are_merged_twice() {
    let temp_dir = TempDir::new().unwrap();
    let a = write_marked_pdf(temp_dir.path(), "a.pdf", "A", 1);

    let mut session = MergeSession::new(config_in(&temp_dir), MemoryDelivery::new());
    session.on_files_added([source(&a).await, source(&a).await]);

    let keys: Vec<String> = session
        .snapshot()
        .entries()
        .into_iter()
        .map(|entry| entry.key)
        .collect();
    assert_ne!(keys[0], keys[1]);

    session.on_merge_requested().await.unwrap().unwrap();
    assert_eq!(
        markers(&session.delivery().delivered()[0].bytes),
        vec!["A1", "A1"]
    );
}

#[tokio::test]
async fn test_non_pdf_candidates_are_ignored() {
    let temp_dir = TempDir::new().unwrap();
    let a = write_marked_pdf(temp_dir.path(), "a.pdf", "A", 1);
    let notes = temp_dir.path().join("notes.txt");
    std::fs::write(&notes, b"hello").unwrap();

    let mut session = MergeSession::new(config_in(&temp_dir), MemoryDelivery::new());
    let report = session.on_files_added([
        source(&a).await,
        SourceFile::from_path(&notes).await.unwrap(),
    ]);

    assert_eq!(report.accepted, 1);
    assert_eq!(report.rejected, 1);
    assert_eq!(session.snapshot().len(), 1);
}

#[rstest]
#[case(CompressionLevel::None)]
#[case(CompressionLevel::Standard)]
#[case(CompressionLevel::Maximum)]
#[tokio::test]
async fn test_compression_levels_preserve_pages(#[case] compression: CompressionLevel) {
    let temp_dir = TempDir::new().unwrap();
    let a = write_marked_pdf(temp_dir.path(), "a.pdf", "A", 2);
    let b = write_marked_pdf(temp_dir.path(), "b.pdf", "B", 1);

    let config = Config {
        compression,
        ..config_in(&temp_dir)
    };
    let mut session = MergeSession::new(config, MemoryDelivery::new());
    session.on_files_added([source(&a).await, source(&b).await]);
    session.on_merge_requested().await.unwrap().unwrap();

    assert_eq!(
        markers(&session.delivery().delivered()[0].bytes),
        vec!["A1", "A2", "B1"]
    );
}

#[tokio::test]
async fn test_metadata_written_to_output() {
    let temp_dir = TempDir::new().unwrap();
    let a = write_marked_pdf(temp_dir.path(), "a.pdf", "A", 1);
    let b = write_marked_pdf(temp_dir.path(), "b.pdf", "B", 1);

    let config = Config {
        metadata: Metadata::new(
            Some("Combined".to_string()),
            Some("Records Office".to_string()),
            None,
            None,
        ),
        ..config_in(&temp_dir)
    };
    let output = config.output.clone();
    let mut session = MergeSession::new(config.clone(), FileDelivery::from_config(&config));
    session.on_files_added([source(&a).await, source(&b).await]);
    session.on_merge_requested().await.unwrap().unwrap();

    let doc = lopdf::Document::load(&output).unwrap();
    let metadata = MetadataManager::new().read(&doc);
    assert_eq!(metadata.title.as_deref(), Some("Combined"));
    assert_eq!(metadata.author.as_deref(), Some("Records Office"));
}

#[tokio::test]
async fn test_report_serializes_to_json() {
    let temp_dir = TempDir::new().unwrap();
    let a = write_marked_pdf(temp_dir.path(), "a.pdf", "A", 2);
    let b = write_marked_pdf(temp_dir.path(), "b.pdf", "B", 1);

    let mut session = MergeSession::new(config_in(&temp_dir), MemoryDelivery::new());
    session.on_files_added([source(&a).await, source(&b).await]);
    let report = session.on_merge_requested().await.unwrap().unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["totalPages"], 3);
    assert_eq!(json["mediaType"], "application/pdf");
    assert_eq!(json["documents"][1]["position"], 2);
    assert_eq!(json["documents"][1]["name"], "b.pdf");
    assert_eq!(json["contributions"][1]["firstPage"], 3);
    assert_eq!(json["delivery"]["location"], "merged-document.pdf");
}
