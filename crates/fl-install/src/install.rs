use std::path::{Path, PathBuf};

use anyhow::Context;
use sha1::{Digest, Sha1};
use tracing::{debug, instrument, warn};

use crate::errors::{InstallError, Result};
use crate::repository::{BASE_GAME_VERSION, KNOWN_EXPANSIONS, Repository, is_valid_version};

/// Boot binaries covered by the version hash, in wire order
pub const BOOT_FILES_TO_HASH: [&str; 6] = [
    "ffxivboot.exe",
    "ffxivboot64.exe",
    "ffxivlauncher.exe",
    "ffxivlauncher64.exe",
    "ffxivupdater.exe",
    "ffxivupdater64.exe",
];

const GAME_EXECUTABLE: &str = "ffxiv_dx11.exe";

/// A local game installation rooted at the directory holding `boot/` and `game/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameInstall {
    root: PathBuf,
}

impl GameInstall {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read the on-disk version of a repository.
    ///
    /// A missing version file reads as [`BASE_GAME_VERSION`].
    #[instrument(skip(self), level = "debug")]
    pub async fn version(&self, repository: Repository) -> Result<String> {
        let path = repository.version_file(&self.root);

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(content.trim_end().to_string()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No version file for {} at {}", repository, path.display());
                Ok(BASE_GAME_VERSION.to_string())
            }
            Err(e) => Err(InstallError::VersionFileReadFailed {
                path,
                source: e.into(),
            }),
        }
    }

    /// Version used on the wire, honouring the base-version override
    pub async fn reported_version(
        &self,
        repository: Repository,
        force_base_version: bool,
    ) -> Result<String> {
        if force_base_version {
            return Ok(BASE_GAME_VERSION.to_string());
        }

        self.version(repository).await
    }

    /// Build `<boot version>=name/length/sha1,...` over the boot binaries that exist
    #[instrument(skip(self), level = "debug")]
    pub async fn boot_version_hash(&self) -> Result<String> {
        let boot_dir = self.root.join("boot");
        let mut tokens = Vec::with_capacity(BOOT_FILES_TO_HASH.len());

        for name in BOOT_FILES_TO_HASH {
            let path = boot_dir.join(name);
            if tokio::fs::metadata(&path).await.is_err() {
                debug!("Skipping missing boot binary {}", path.display());
                continue;
            }

            let hash = file_length_and_hash(&path).await?;
            tokens.push(format!("{name}/{hash}"));
        }

        let boot_version = self.version(Repository::Boot).await?;
        Ok(format!("{}={}", boot_version, tokens.join(",")))
    }

    /// Full version report posted to the game-version service.
    ///
    /// One `exN\t<version>` line follows the boot hash for every expansion the
    /// account is entitled to, capped at [`KNOWN_EXPANSIONS`].
    #[instrument(skip(self), level = "debug")]
    pub async fn version_report(&self, max_expansion: u32, force_base_version: bool) -> Result<String> {
        let mut report = self.boot_version_hash().await?;

        for n in 1..=max_expansion.min(KNOWN_EXPANSIONS) {
            let version = self
                .reported_version(Repository::Expansion(n), force_base_version)
                .await?;
            report.push_str(&format!("\nex{n}\t{version}"));
        }

        Ok(report)
    }

    /// Check that the game and every entitled expansion carry a well-formed version
    #[instrument(skip(self), level = "debug")]
    pub async fn ensure_version_sanity(&self, max_expansion: u32) -> Result<()> {
        let repositories = std::iter::once(Repository::Game)
            .chain((1..=max_expansion.min(KNOWN_EXPANSIONS)).map(Repository::Expansion));

        for repository in repositories {
            let version = self.version(repository).await?;
            if !is_valid_version(&version) {
                warn!("Malformed version file for {}: {:?}", repository, version);
                return Err(InstallError::InvalidVersionFile {
                    repository,
                    version,
                });
            }
        }

        Ok(())
    }

    /// Path of the game executable, failing when it is not installed
    pub async fn game_executable(&self) -> Result<PathBuf> {
        let path = self.root.join("game").join(GAME_EXECUTABLE);

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            _ => Err(InstallError::ExecutableMissing { path }),
        }
    }
}

async fn file_length_and_hash(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .context("Failed to read boot binary")
        .map_err(|e| InstallError::BinaryHashFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    let digest = Sha1::digest(&bytes);
    Ok(format!("{}/{}", bytes.len(), hex::encode(digest)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn write(root: &Path, relative: &str, content: &[u8]) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn fake_install() -> (GameInstall, TempDir) {
        let temp_dir = tempdir().unwrap();
        write(temp_dir.path(), "boot/ffxivboot.ver", b"2024.01.01.0000.0001");
        write(temp_dir.path(), "game/ffxivgame.ver", b"2024.05.01.0000.0000");
        write(temp_dir.path(), "game/sqpack/ex1/ex1.ver", b"2024.05.01.0000.0001");
        write(temp_dir.path(), "game/sqpack/ex2/ex2.ver", b"2024.05.01.0000.0002");
        (GameInstall::new(temp_dir.path()), temp_dir)
    }

    #[tokio::test]
    async fn test_missing_version_file_reads_as_base() {
        let temp_dir = tempdir().unwrap();
        let install = GameInstall::new(temp_dir.path());

        let version = install.version(Repository::Game).await.unwrap();
        assert_eq!(version, BASE_GAME_VERSION);
    }

    #[tokio::test]
    async fn test_boot_hash_only_present_files() {
        let (install, temp) = fake_install();
        write(temp.path(), "boot/ffxivboot.exe", b"abc");
        write(temp.path(), "boot/ffxivupdater64.exe", b"");

        let hash = install.boot_version_hash().await.unwrap();
        assert_eq!(
            hash,
            "2024.01.01.0000.0001=ffxivboot.exe/3/a9993e364706816aba3e25717850c26c9cd0d89d,\
             ffxivupdater64.exe/0/da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
    }

    #[tokio::test]
    async fn test_boot_hash_no_files() {
        let (install, _temp) = fake_install();

        let hash = install.boot_version_hash().await.unwrap();
        assert_eq!(hash, "2024.01.01.0000.0001=");
    }

    #[tokio::test]
    async fn test_boot_hash_keeps_list_order() {
        let (install, temp) = fake_install();
        for name in BOOT_FILES_TO_HASH.iter().rev() {
            write(temp.path(), &format!("boot/{name}"), name.as_bytes());
        }

        let hash = install.boot_version_hash().await.unwrap();
        let (_, files) = hash.split_once('=').unwrap();
        let names: Vec<&str> = files
            .split(',')
            .map(|token| token.split('/').next().unwrap())
            .collect();

        assert_eq!(names, BOOT_FILES_TO_HASH);
        assert!(!hash.ends_with(','));
    }

    #[tokio::test]
    async fn test_version_report_expansion_lines() {
        let (install, _temp) = fake_install();

        let report = install.version_report(2, false).await.unwrap();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(
            lines,
            vec![
                "2024.01.01.0000.0001=",
                "ex1\t2024.05.01.0000.0001",
                "ex2\t2024.05.01.0000.0002",
            ]
        );
    }

    #[tokio::test]
    async fn test_version_report_caps_at_known_expansions() {
        let (install, _temp) = fake_install();

        let report = install.version_report(9, false).await.unwrap();
        assert_eq!(report.lines().count(), 1 + KNOWN_EXPANSIONS as usize);
        assert!(report.ends_with(&format!("ex5\t{BASE_GAME_VERSION}")));
    }

    #[tokio::test]
    async fn test_version_report_no_entitlement() {
        let (install, _temp) = fake_install();

        let report = install.version_report(0, false).await.unwrap();
        assert_eq!(report, "2024.01.01.0000.0001=");
    }

    #[tokio::test]
    async fn test_version_report_forced_base() {
        let (install, _temp) = fake_install();

        let report = install.version_report(2, true).await.unwrap();
        assert!(report.contains(&format!("ex1\t{BASE_GAME_VERSION}")));
        assert!(report.contains(&format!("ex2\t{BASE_GAME_VERSION}")));
    }

    #[tokio::test]
    async fn test_version_sanity() {
        let (install, temp) = fake_install();
        assert!(install.ensure_version_sanity(2).await.is_ok());

        write(temp.path(), "game/sqpack/ex2/ex2.ver", b"not-a-version");
        let result = install.ensure_version_sanity(2).await;
        match result {
            Err(InstallError::InvalidVersionFile { repository, version }) => {
                assert_eq!(repository, Repository::Expansion(2));
                assert_eq!(version, "not-a-version");
            }
            other => panic!("Expected InvalidVersionFile, got {:?}", other),
        }

        // ex2 is not checked when the account isn't entitled to it
        assert!(install.ensure_version_sanity(1).await.is_ok());
    }

    #[tokio::test]
    async fn test_game_executable() {
        let (install, temp) = fake_install();

        let result = install.game_executable().await;
        assert!(matches!(result, Err(InstallError::ExecutableMissing { .. })));

        write(temp.path(), "game/ffxiv_dx11.exe", b"MZ");
        let path = install.game_executable().await.unwrap();
        assert_eq!(path, temp.path().join("game").join("ffxiv_dx11.exe"));
    }
}
