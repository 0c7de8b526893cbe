//! Self-update.
//!
//! The updater walks a fixed sequence of states:
//!
//! ```text
//! Checking -> FoundNewer -> Downloading -> Extracting -> Replacing -> Done
//!     \
//!      -> UpToDate
//! ```
//!
//! Any step may fail with an [`UpdateError`]. The new binary is staged next
//! to the running executable as `<exe>.new`; the staged file is removed on
//! every failure after it was created, so a failed update leaves the
//! install untouched.

pub mod extract;
pub mod platform;
pub mod release;

pub use platform::Platform;
pub use release::{GitHubReleaseClient, Release, ReleaseAsset, ReleaseClient};

use crate::error::{UpdateError, UpdateResult};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Base name prefix of the executable inside release archives, and of the
/// release asset names.
pub const BINARY_PREFIX: &str = "mysql-mcp";

/// Terminal result of a successful update run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The latest release tag matches the running version.
    UpToDate { version: String },
    /// The executable was replaced; a restart is needed to use it.
    Updated { previous: String, installed: String },
}

#[derive(Debug)]
enum UpdateState<'a> {
    Checking,
    UpToDate,
    FoundNewer { tag: &'a str },
    Downloading { asset: &'a str },
    Extracting { size: usize },
    Replacing { target: &'a Path },
    Done { tag: &'a str },
}

impl fmt::Display for UpdateState<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checking => f.write_str("checking"),
            Self::UpToDate => f.write_str("up-to-date"),
            Self::FoundNewer { tag } => write!(f, "found-newer({})", tag),
            Self::Downloading { asset } => write!(f, "downloading({})", asset),
            Self::Extracting { size } => write!(f, "extracting({} bytes)", size),
            Self::Replacing { target } => write!(f, "replacing({})", target.display()),
            Self::Done { tag } => write!(f, "done({})", tag),
        }
    }
}

/// Replaces the executable at `executable` with the latest release.
pub struct Updater<C> {
    client: C,
    current_version: String,
    platform: Platform,
    executable: PathBuf,
}

impl<C: ReleaseClient> Updater<C> {
    pub fn new(client: C, executable: PathBuf) -> Self {
        Self {
            client,
            current_version: env!("CARGO_PKG_VERSION").to_string(),
            platform: Platform::current(),
            executable,
        }
    }

    /// Updater for the running executable.
    pub fn for_current_exe(client: C) -> UpdateResult<Self> {
        let executable = std::env::current_exe().map_err(UpdateError::CurrentExe)?;
        Ok(Self::new(client, executable))
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.current_version = version.into();
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    fn enter(&self, state: UpdateState<'_>) {
        debug!(state = %state, "Update state");
    }

    pub async fn run(&self) -> UpdateResult<UpdateOutcome> {
        self.enter(UpdateState::Checking);
        info!(
            version = %self.current_version,
            platform = %self.platform,
            "Checking for updates"
        );
        let release = self.client.latest_release().await?;

        if release.tag_name == format!("v{}", self.current_version) {
            self.enter(UpdateState::UpToDate);
            return Ok(UpdateOutcome::UpToDate {
                version: self.current_version.clone(),
            });
        }

        self.enter(UpdateState::FoundNewer {
            tag: &release.tag_name,
        });
        info!(
            latest = %release.tag_name,
            current = %self.current_version,
            "Found newer version"
        );

        let fragment = self.platform.asset_fragment(BINARY_PREFIX);
        let asset = release
            .find_asset(&fragment)
            .ok_or_else(|| UpdateError::NoCompatibleAsset {
                os: self.platform.os.clone(),
                arch: self.platform.arch.clone(),
            })?;

        self.enter(UpdateState::Downloading { asset: &asset.name });
        info!(url = %asset.download_url, "Downloading update");
        let bytes = self.client.download(&asset.download_url).await?;

        self.enter(UpdateState::Extracting { size: bytes.len() });
        let binary = tokio::task::spawn_blocking(move || {
            extract::extract_binary(bytes, BINARY_PREFIX)
        })
        .await
        .map_err(|e| UpdateError::extract(format!("extraction task failed: {}", e)))??;

        self.enter(UpdateState::Replacing {
            target: &self.executable,
        });
        let staged = StagedBinary::write(&self.executable, &binary).await?;
        staged.make_executable().await?;
        staged.commit().await?;

        self.enter(UpdateState::Done {
            tag: &release.tag_name,
        });
        Ok(UpdateOutcome::Updated {
            previous: self.current_version.clone(),
            installed: release.tag_name.clone(),
        })
    }
}

/// Sibling path the new binary is staged at.
pub fn staged_path(executable: &Path) -> PathBuf {
    let mut path = executable.as_os_str().to_owned();
    path.push(".new");
    PathBuf::from(path)
}

/// New binary written next to the executable, removed on drop unless committed.
struct StagedBinary {
    path: PathBuf,
    target: PathBuf,
    committed: bool,
}

impl StagedBinary {
    async fn write(target: &Path, contents: &[u8]) -> UpdateResult<Self> {
        let staged = Self {
            path: staged_path(target),
            target: target.to_path_buf(),
            committed: false,
        };
        tokio::fs::write(&staged.path, contents)
            .await
            .map_err(UpdateError::Write)?;
        Ok(staged)
    }

    #[cfg(unix)]
    async fn make_executable(&self) -> UpdateResult<()> {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o755))
            .await
            .map_err(UpdateError::Permissions)
    }

    #[cfg(not(unix))]
    async fn make_executable(&self) -> UpdateResult<()> {
        Ok(())
    }

    async fn commit(mut self) -> UpdateResult<()> {
        tokio::fs::rename(&self.path, &self.target)
            .await
            .map_err(UpdateError::Replace)?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedBinary {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed staged binary"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to remove staged binary"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staged_path_is_sibling() {
        assert_eq!(
            staged_path(Path::new("/usr/local/bin/mysql-mcp")),
            PathBuf::from("/usr/local/bin/mysql-mcp.new")
        );
    }

    #[tokio::test]
    async fn test_uncommitted_stage_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("mysql-mcp");
        std::fs::write(&exe, b"old").unwrap();

        let staged = StagedBinary::write(&exe, b"new").await.unwrap();
        assert!(staged_path(&exe).exists());
        drop(staged);

        assert!(!staged_path(&exe).exists());
        assert_eq!(std::fs::read(&exe).unwrap(), b"old");
    }

    #[tokio::test]
    async fn test_commit_replaces_target() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("mysql-mcp");
        std::fs::write(&exe, b"old").unwrap();

        let staged = StagedBinary::write(&exe, b"new").await.unwrap();
        staged.make_executable().await.unwrap();
        staged.commit().await.unwrap();

        assert_eq!(std::fs::read(&exe).unwrap(), b"new");
        assert!(!staged_path(&exe).exists());
    }
}
