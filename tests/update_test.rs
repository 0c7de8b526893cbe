//! Integration tests for the self-updater.
//!
//! A fake release client stands in for the release feed; the executable is
//! a file in a temporary directory.

use flate2::Compression;
use flate2::write::GzEncoder;
use mysql_mcp::error::{UpdateError, UpdateResult};
use mysql_mcp::update::{
    Platform, Release, ReleaseAsset, ReleaseClient, UpdateOutcome, Updater, staged_path,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

struct FakeClient {
    release: Release,
    payload: Vec<u8>,
    downloads: Arc<AtomicUsize>,
}

impl FakeClient {
    fn new(tag: &str, asset_names: &[&str], payload: Vec<u8>) -> Self {
        let assets = asset_names
            .iter()
            .map(|name| ReleaseAsset {
                name: name.to_string(),
                download_url: format!("https://example.com/{}", name),
            })
            .collect();
        Self {
            release: Release {
                tag_name: tag.to_string(),
                assets,
            },
            payload,
            downloads: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl ReleaseClient for FakeClient {
    async fn latest_release(&self) -> UpdateResult<Release> {
        Ok(self.release.clone())
    }

    async fn download(&self, _url: &str) -> UpdateResult<Vec<u8>> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        Ok(self.payload.clone())
    }
}

/// Temporary install holding an "old" executable.
fn install() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let exe = dir.path().join("mysql-mcp");
    std::fs::write(&exe, b"old binary").unwrap();
    (dir, exe)
}

fn updater(client: FakeClient, exe: PathBuf) -> Updater<FakeClient> {
    Updater::new(client, exe)
        .with_version("1.0.0")
        .with_platform(Platform::new("linux", "amd64"))
}

fn tar_gz(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (path, contents) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder
            .append_data(&mut header, path, contents.as_bytes())
            .unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

#[tokio::test]
async fn test_up_to_date_skips_download() {
    let (_dir, exe) = install();
    let client = FakeClient::new("v1.0.0", &["mysql-mcp_Linux_x86_64.tar.gz"], Vec::new());
    let downloads = client.downloads.clone();
    let updater = updater(client, exe.clone());

    let outcome = updater.run().await.unwrap();

    assert_eq!(
        outcome,
        UpdateOutcome::UpToDate {
            version: "1.0.0".to_string()
        }
    );
    assert_eq!(downloads.load(Ordering::SeqCst), 0);
    assert_eq!(std::fs::read(&exe).unwrap(), b"old binary");
}

#[tokio::test]
async fn test_no_compatible_asset_leaves_install_untouched() {
    let (dir, exe) = install();
    let client = FakeClient::new(
        "v1.1.0",
        &["mysql-mcp_Darwin_arm64.tar.gz", "mysql-mcp_Windows_x86_64.zip"],
        Vec::new(),
    );
    let updater = updater(client, exe.clone());

    let err = updater.run().await.unwrap_err();

    assert!(matches!(err, UpdateError::NoCompatibleAsset { .. }));
    assert_eq!(err.to_string(), "no compatible release found for Linux x86_64");
    assert_eq!(std::fs::read(&exe).unwrap(), b"old binary");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn test_raw_binary_replaces_executable() {
    let (_dir, exe) = install();
    let client = FakeClient::new(
        "v1.1.0",
        &["mysql-mcp_Linux_x86_64"],
        b"raw new binary".to_vec(),
    );
    let updater = updater(client, exe.clone());

    let outcome = updater.run().await.unwrap();

    assert_eq!(
        outcome,
        UpdateOutcome::Updated {
            previous: "1.0.0".to_string(),
            installed: "v1.1.0".to_string()
        }
    );
    assert_eq!(std::fs::read(&exe).unwrap(), b"raw new binary");
    assert!(!staged_path(&exe).exists());
}

#[tokio::test]
async fn test_archive_binary_replaces_executable() {
    let (_dir, exe) = install();
    let archive = tar_gz(&[
        ("README.md", "docs"),
        ("mysql-mcp_1.1.0/mysql-mcp", "archived new binary"),
    ]);
    let client = FakeClient::new("v1.1.0", &["mysql-mcp_Linux_x86_64.tar.gz"], archive);
    let updater = updater(client, exe.clone());

    updater.run().await.unwrap();

    assert_eq!(std::fs::read(&exe).unwrap(), b"archived new binary");
    assert!(!staged_path(&exe).exists());

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&exe).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}

#[tokio::test]
async fn test_archive_without_binary_cleans_up() {
    let (dir, exe) = install();
    let archive = tar_gz(&[("README.md", "docs")]);
    let client = FakeClient::new("v1.1.0", &["mysql-mcp_Linux_x86_64.tar.gz"], archive);
    let updater = updater(client, exe.clone());

    let err = updater.run().await.unwrap_err();

    assert!(matches!(err, UpdateError::BinaryNotFound));
    assert_eq!(std::fs::read(&exe).unwrap(), b"old binary");
    assert!(!staged_path(&exe).exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}
