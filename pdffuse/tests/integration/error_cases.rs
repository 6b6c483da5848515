//! Integration tests for failure handling.

use pdffuse::config::{Config, OverwriteMode};
use pdffuse::io::{FileDelivery, MemoryDelivery};
use pdffuse::merge::MergeState;
use pdffuse::session::MergeSession;
use pdffuse::source::{PDF_MEDIA_TYPE, SourceFile};
use pdffuse::PdfFuseError;
use tempfile::TempDir;

use crate::common::{marked_pdf, markers_in_file, source, write_marked_pdf};

#[tokio::test]
async fn test_malformed_input_aborts_without_output() {
    let temp_dir = TempDir::new().unwrap();
    let a = write_marked_pdf(temp_dir.path(), "a.pdf", "A", 2);
    let broken = temp_dir.path().join("broken.pdf");
    std::fs::write(&broken, b"%PDF-1.7\nthis is not a pdf body").unwrap();

    let config = Config {
        output: temp_dir.path().join("out.pdf"),
        overwrite_mode: OverwriteMode::Force,
        ..Default::default()
    };
    let mut session = MergeSession::new(config.clone(), FileDelivery::from_config(&config));
    session.on_files_added([source(&a).await, source(&broken).await]);
    let before = session.snapshot().entries();

    let err = session.on_merge_requested().await.unwrap_err();

    assert!(err.is_decode_failure());
    assert!(err.to_string().contains("broken.pdf"));
    assert!(!config.output.exists());
    assert_eq!(session.snapshot().entries(), before);
    assert_eq!(session.merge_state(), MergeState::Failed);
}

#[tokio::test]
async fn test_recovers_after_failed_merge() {
    let mut session = MergeSession::new(Config::default(), MemoryDelivery::new());
    session.on_files_added([
        SourceFile::from_bytes("a.pdf", Some(PDF_MEDIA_TYPE), marked_pdf("A", 1)),
        SourceFile::from_bytes("bad.pdf", Some(PDF_MEDIA_TYPE), b"garbage".to_vec()),
        SourceFile::from_bytes("b.pdf", Some(PDF_MEDIA_TYPE), marked_pdf("B", 1)),
    ]);

    assert!(session.on_merge_requested().await.is_err());

    session.on_remove(1).unwrap();
    let report = session.on_merge_requested().await.unwrap().unwrap();

    assert_eq!(report.total_pages, 2);
    assert_eq!(session.merge_state(), MergeState::Succeeded);
}

#[tokio::test]
async fn test_source_removed_after_intake() {
    let temp_dir = TempDir::new().unwrap();
    let a = write_marked_pdf(temp_dir.path(), "a.pdf", "A", 1);
    let b = write_marked_pdf(temp_dir.path(), "b.pdf", "B", 1);

    let mut session = MergeSession::new(Config::default(), MemoryDelivery::new());
    session.on_files_added([source(&a).await, source(&b).await]);
    std::fs::remove_file(&b).unwrap();

    let err = session.on_merge_requested().await.unwrap_err();

    assert!(matches!(err, PdfFuseError::FailedToReadSource { ref name, .. } if name == "b.pdf"));
    assert!(session.delivery().delivered().is_empty());
}

#[tokio::test]
async fn test_no_clobber_keeps_existing_output() {
    let temp_dir = TempDir::new().unwrap();
    let a = write_marked_pdf(temp_dir.path(), "a.pdf", "A", 1);
    let b = write_marked_pdf(temp_dir.path(), "b.pdf", "B", 1);
    let output = temp_dir.path().join("out.pdf");
    std::fs::write(&output, b"precious").unwrap();

    let config = Config {
        output: output.clone(),
        overwrite_mode: OverwriteMode::NoClobber,
        ..Default::default()
    };
    let mut session = MergeSession::new(config.clone(), FileDelivery::from_config(&config));
    session.on_files_added([source(&a).await, source(&b).await]);

    let err = session.on_merge_requested().await.unwrap_err();

    assert!(matches!(err, PdfFuseError::OutputExists { .. }));
    assert_eq!(err.exit_code(), 4);
    assert_eq!(std::fs::read(&output).unwrap(), b"precious");
}

#[tokio::test]
async fn test_force_replaces_existing_output() {
    let temp_dir = TempDir::new().unwrap();
    let a = write_marked_pdf(temp_dir.path(), "a.pdf", "A", 1);
    let b = write_marked_pdf(temp_dir.path(), "b.pdf", "B", 1);
    let output = temp_dir.path().join("out.pdf");
    std::fs::write(&output, b"stale").unwrap();

    let config = Config {
        output: output.clone(),
        overwrite_mode: OverwriteMode::Force,
        ..Default::default()
    };
    let mut session = MergeSession::new(config.clone(), FileDelivery::from_config(&config));
    session.on_files_added([source(&a).await, source(&b).await]);
    session.on_merge_requested().await.unwrap().unwrap();

    assert_eq!(markers_in_file(&output), vec!["A1", "B1"]);
}

#[tokio::test]
async fn test_out_of_bounds_edits_leave_queue_alone() {
    let mut session = MergeSession::new(Config::default(), MemoryDelivery::new());
    session.on_files_added([
        SourceFile::from_bytes("a.pdf", Some(PDF_MEDIA_TYPE), marked_pdf("A", 1)),
        SourceFile::from_bytes("b.pdf", Some(PDF_MEDIA_TYPE), marked_pdf("B", 1)),
    ]);
    let before = session.snapshot().entries();

    assert!(matches!(
        session.on_reorder(0, Some(5)),
        Err(PdfFuseError::IndexOutOfBounds { index: 5, len: 2 })
    ));
    assert!(session.on_remove(2).is_err());
    assert_eq!(session.snapshot().entries(), before);
}

#[tokio::test]
async fn test_missing_input_path() {
    let result = SourceFile::from_path("/definitely/not/here.pdf").await;
    let err = result.unwrap_err();

    assert!(matches!(err, PdfFuseError::FileNotFound { .. }));
    assert_eq!(err.exit_code(), 2);
}
