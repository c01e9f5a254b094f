use file_shelf::catalog::{Catalog, CatalogError, FileEntry};
use file_shelf::config::StorageConfig;
use file_shelf::file_store::FileStoreError;
use file_shelf::metadata::MetadataError;
use serde_json::json;

fn test_catalog() -> (tempfile::TempDir, Catalog) {
    let dir = tempfile::tempdir().unwrap();
    let config = StorageConfig {
        data_dir: dir.path().join("data").to_string_lossy().to_string(),
        ..Default::default()
    };
    let catalog = Catalog::open(&config).unwrap();
    (dir, catalog)
}

async fn upload(catalog: &Catalog, name: &str, data: &[u8]) -> Result<u64, CatalogError> {
    let mut reader = data;
    catalog.upload(Some(name), &mut reader).await.map(|f| f.size)
}

fn entry(name: &str, rendered: bool) -> FileEntry {
    FileEntry {
        name: name.to_string(),
        rendered,
    }
}

#[tokio::test]
async fn test_report_lifecycle() {
    let (_dir, catalog) = test_catalog();

    upload(&catalog, "report.pdf", b"%PDF").await.unwrap();
    assert_eq!(catalog.list().await.unwrap(), vec![entry("report.pdf", true)]);

    assert!(!catalog.set_rendered("report.pdf", &json!(false)).await.unwrap());
    assert_eq!(catalog.list().await.unwrap(), vec![entry("report.pdf", false)]);

    catalog.delete("report.pdf").await.unwrap();
    assert!(catalog.list().await.unwrap().is_empty());
    assert_eq!(catalog.metadata().load_all().await.get("report.pdf"), None);

    upload(&catalog, "report.pdf", b"%PDF").await.unwrap();
    assert_eq!(catalog.list().await.unwrap(), vec![entry("report.pdf", true)]);
}

#[tokio::test]
async fn test_reupload_resets_flag() {
    let (_dir, catalog) = test_catalog();

    upload(&catalog, "slides.pptx", b"v1").await.unwrap();
    catalog.set_rendered("slides.pptx", &json!(false)).await.unwrap();

    assert_eq!(upload(&catalog, "slides.pptx", b"v2-longer").await.unwrap(), 9);
    assert_eq!(catalog.list().await.unwrap(), vec![entry("slides.pptx", true)]);
}

#[tokio::test]
async fn test_listing_excludes_metadata_record() {
    let (dir, catalog) = test_catalog();

    catalog.set_rendered("pending.pdf", &json!(false)).await.unwrap();
    assert!(dir.path().join("data").join("metadata.json").exists());

    assert!(catalog.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_absolute_record_inside_data_dir_is_protected() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    let config = StorageConfig {
        data_dir: data_dir.to_string_lossy().to_string(),
        metadata_file: data_dir.join("flags.json").to_string_lossy().to_string(),
    };
    let catalog = Catalog::open(&config).unwrap();

    catalog.set_rendered("a.pdf", &json!(false)).await.unwrap();
    assert!(data_dir.join("flags.json").exists());
    assert!(catalog.list().await.unwrap().is_empty());

    assert!(matches!(
        catalog.delete("flags.json").await,
        Err(CatalogError::Files(FileStoreError::InvalidPath(_)))
    ));
    assert!(matches!(
        upload(&catalog, "flags.json", b"{}").await,
        Err(CatalogError::Files(FileStoreError::InvalidPath(_)))
    ));
    assert_eq!(catalog.metadata().load_all().await.get("a.pdf"), Some(false));
}

#[tokio::test]
async fn test_record_outside_data_dir_is_not_reserved() {
    let dir = tempfile::tempdir().unwrap();
    let config = StorageConfig {
        data_dir: dir.path().join("data").to_string_lossy().to_string(),
        metadata_file: dir.path().join("flags.json").to_string_lossy().to_string(),
    };
    let catalog = Catalog::open(&config).unwrap();

    catalog.set_rendered("a.pdf", &json!(false)).await.unwrap();
    assert!(dir.path().join("flags.json").exists());

    // Same name inside the data dir is just a regular upload
    upload(&catalog, "flags.json", b"{}").await.unwrap();
    assert_eq!(catalog.list().await.unwrap(), vec![entry("flags.json", true)]);
}

#[tokio::test]
async fn test_files_without_entry_default_to_rendered() {
    let (dir, catalog) = test_catalog();
    std::fs::write(dir.path().join("data").join("copied-in.txt"), "x").unwrap();

    assert_eq!(catalog.list().await.unwrap(), vec![entry("copied-in.txt", true)]);
}

#[tokio::test]
async fn test_corrupt_metadata_does_not_break_listing() {
    let (dir, catalog) = test_catalog();
    upload(&catalog, "a.pdf", b"a").await.unwrap();
    std::fs::write(dir.path().join("data").join("metadata.json"), "garbage").unwrap();

    assert_eq!(catalog.list().await.unwrap(), vec![entry("a.pdf", true)]);
}

#[tokio::test]
async fn test_delete_missing_file_leaves_metadata_untouched() {
    let (_dir, catalog) = test_catalog();
    catalog.set_rendered("ghost.pdf", &json!(false)).await.unwrap();
    let before = catalog.metadata().load_all().await;

    let result = catalog.delete("ghost.pdf").await;
    assert!(matches!(
        result,
        Err(CatalogError::Files(FileStoreError::NotFound(_)))
    ));
    assert_eq!(catalog.metadata().load_all().await, before);
}

#[tokio::test]
async fn test_delete_traversal_is_rejected() {
    let (dir, catalog) = test_catalog();
    std::fs::write(dir.path().join("secret"), "top secret").unwrap();

    let result = catalog.delete("../secret").await;
    assert!(matches!(
        result,
        Err(CatalogError::Files(FileStoreError::InvalidPath(_)))
    ));
    assert!(dir.path().join("secret").exists());
}

#[tokio::test]
async fn test_upload_traversal_is_rejected() {
    let (dir, catalog) = test_catalog();

    let result = upload(&catalog, "../escape.txt", b"x").await;
    assert!(matches!(
        result,
        Err(CatalogError::Files(FileStoreError::InvalidPath(_)))
    ));
    assert!(!dir.path().join("escape.txt").exists());
    assert!(catalog.metadata().load_all().await.is_empty());
}

#[tokio::test]
async fn test_upload_requires_a_name() {
    let (_dir, catalog) = test_catalog();

    let mut reader: &[u8] = b"data";
    let result = catalog.upload(None, &mut reader).await;
    assert!(matches!(result, Err(CatalogError::InvalidInput(_))));

    let mut reader: &[u8] = b"data";
    let result = catalog.upload(Some(""), &mut reader).await;
    assert!(matches!(result, Err(CatalogError::InvalidInput(_))));
}

#[tokio::test]
async fn test_upload_decodes_transport_name() {
    let (_dir, catalog) = test_catalog();
    let mangled: String = "회의록.txt".bytes().map(char::from).collect();

    let mut reader: &[u8] = b"notes";
    let uploaded = catalog.upload(Some(&mangled), &mut reader).await.unwrap();
    assert_eq!(uploaded.name, "회의록.txt");
    assert_eq!(uploaded.original_name, "회의록.txt");
    assert_eq!(uploaded.size, 5);

    assert_eq!(catalog.list().await.unwrap(), vec![entry("회의록.txt", true)]);
}

#[tokio::test]
async fn test_set_rendered_rejects_non_boolean() {
    let (_dir, catalog) = test_catalog();
    upload(&catalog, "a.pdf", b"a").await.unwrap();

    for value in [json!("false"), json!(0), json!(null)] {
        let result = catalog.set_rendered("a.pdf", &value).await;
        assert!(matches!(
            result,
            Err(CatalogError::Metadata(MetadataError::InvalidFlag(_)))
        ));
    }
    assert_eq!(catalog.list().await.unwrap(), vec![entry("a.pdf", true)]);
}

#[tokio::test]
async fn test_set_rendered_does_not_require_file() {
    let (_dir, catalog) = test_catalog();

    catalog.set_rendered("later.pdf", &json!(false)).await.unwrap();
    assert!(catalog.list().await.unwrap().is_empty());

    // Upload always seeds the flag, so a pre-seeded value is overwritten.
    upload(&catalog, "later.pdf", b"x").await.unwrap();
    assert_eq!(catalog.list().await.unwrap(), vec![entry("later.pdf", true)]);
}

#[tokio::test]
async fn test_set_rendered_rejects_invalid_name() {
    let (_dir, catalog) = test_catalog();

    let result = catalog.set_rendered("../x", &json!(true)).await;
    assert!(matches!(
        result,
        Err(CatalogError::Files(FileStoreError::InvalidPath(_)))
    ));
}
