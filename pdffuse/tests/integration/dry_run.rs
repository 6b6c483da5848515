//! Integration tests for planning a merge without writing output.

use pdffuse::config::Config;
use pdffuse::io::FileDelivery;
use pdffuse::session::MergeSession;
use pdffuse::PdfFuseError;
use tempfile::TempDir;

use crate::common::{source, write_marked_pdf};

#[tokio::test]
async fn test_plan_reports_page_ranges_without_writing() {
    let temp_dir = TempDir::new().unwrap();
    let a = write_marked_pdf(temp_dir.path(), "a.pdf", "A", 3);
    let b = write_marked_pdf(temp_dir.path(), "b.pdf", "B", 2);

    let config = Config {
        output: temp_dir.path().join("plan.pdf"),
        dry_run: true,
        ..Default::default()
    };
    let mut session = MergeSession::new(config.clone(), FileDelivery::from_config(&config));
    session.on_files_added([source(&a).await, source(&b).await]);
    session.on_reorder(1, Some(0)).unwrap();

    let plan = session.plan().await.unwrap();

    assert_eq!(plan.output_name, "plan.pdf");
    assert_eq!(plan.total_pages, 5);
    assert_eq!(plan.documents[0].name, "b.pdf");
    assert_eq!(plan.contributions[0].page_count, 2);
    assert_eq!(plan.contributions[1].first_page, 3);
    assert!(!config.output.exists());
}

#[tokio::test]
async fn test_plan_respects_merge_gate() {
    let temp_dir = TempDir::new().unwrap();
    let a = write_marked_pdf(temp_dir.path(), "a.pdf", "A", 1);

    let config = Config::default();
    let mut session = MergeSession::new(config.clone(), FileDelivery::from_config(&config));
    session.on_files_added([source(&a).await]);

    let err = session.plan().await.unwrap_err();
    assert!(matches!(
        err,
        PdfFuseError::NotEnoughDocuments {
            required: 2,
            queued: 1
        }
    ));
}

#[tokio::test]
async fn test_plan_surfaces_decode_failures() {
    let temp_dir = TempDir::new().unwrap();
    let a = write_marked_pdf(temp_dir.path(), "a.pdf", "A", 1);
    let broken = temp_dir.path().join("broken.pdf");
    std::fs::write(&broken, b"not a pdf").unwrap();

    let config = Config::default();
    let mut session = MergeSession::new(config.clone(), FileDelivery::from_config(&config));
    session.on_files_added([source(&a).await, source(&broken).await]);

    assert!(session.plan().await.unwrap_err().is_decode_failure());
}
