use super::*;
use std::time::{SystemTime, UNIX_EPOCH};

fn scratch_dir(label: &str) -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    std::env::temp_dir().join(format!("sqlchat-{label}-{}-{nanos}", std::process::id()))
}

#[tokio::test]
async fn deliver_writes_file_into_dir() {
    let dir = scratch_dir("deliver");
    let downloader = FileDownloader::new(&dir);

    let path = downloader.deliver("query_results.csv", b"\"id\"\n\"1\"").await.unwrap();
    assert_eq!(path, dir.join("query_results.csv"));
    assert_eq!(std::fs::read(&path).unwrap(), b"\"id\"\n\"1\"");

    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn deliver_csv_uses_export_filename() {
    let dir = scratch_dir("csv");
    let downloader = FileDownloader::new(&dir);
    let export = CsvExport { filename: "sales.csv".into(), bytes: b"\"region\"".to_vec() };

    let path = downloader.deliver_csv(&export).await.unwrap();
    assert!(path.ends_with("sales.csv"));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn deliver_rejects_paths() {
    let downloader = FileDownloader::new(scratch_dir("reject"));
    for name in ["../escape.csv", "nested/file.csv", "..", ""] {
        let err = downloader.deliver(name, b"x").await.unwrap_err();
        assert!(matches!(err, DownloadError::InvalidFilename(_)), "{name} should be rejected");
    }
}
