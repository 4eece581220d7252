use std::fmt;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

/// Placeholder version reported when a version file is absent or when
/// a full patch chain is forced.
pub const BASE_GAME_VERSION: &str = "2012.01.01.0000.0000";

/// Number of expansion repositories a stock install can carry (ex1..ex5).
pub const KNOWN_EXPANSIONS: u32 = 5;

static VERSION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}\.\d{2}\.\d{2}\.\d{4}\.\d{4}$").expect("valid version regex"));

/// Independently versioned parts of a game installation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Repository {
    Boot,
    Game,
    Expansion(u32),
}

impl Repository {
    /// Version file location relative to the installation root
    pub fn version_file(&self, root: &Path) -> PathBuf {
        match self {
            Self::Boot => root.join("boot").join("ffxivboot.ver"),
            Self::Game => root.join("game").join("ffxivgame.ver"),
            Self::Expansion(n) => root
                .join("game")
                .join("sqpack")
                .join(format!("ex{n}"))
                .join(format!("ex{n}.ver")),
        }
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boot => f.write_str("boot"),
            Self::Game => f.write_str("game"),
            Self::Expansion(n) => write!(f, "ex{n}"),
        }
    }
}

/// Whether `version` has the `YYYY.MM.DD.NNNN.NNNN` shape the patch servers expect
pub fn is_valid_version(version: &str) -> bool {
    VERSION_REGEX.is_match(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_file_locations() {
        let root = Path::new("/games/xiv");
        assert_eq!(
            Repository::Boot.version_file(root),
            root.join("boot/ffxivboot.ver")
        );
        assert_eq!(
            Repository::Game.version_file(root),
            root.join("game/ffxivgame.ver")
        );
        assert_eq!(
            Repository::Expansion(3).version_file(root),
            root.join("game/sqpack/ex3/ex3.ver")
        );
    }

    #[test]
    fn test_version_validity() {
        assert!(is_valid_version(BASE_GAME_VERSION));
        assert!(is_valid_version("2024.06.18.0000.0000"));
        assert!(!is_valid_version("2024.06.18.0000"));
        assert!(!is_valid_version("2024.06.18.0000.0000\n"));
        assert!(!is_valid_version("garbage"));
        assert!(!is_valid_version(""));
    }

    #[test]
    fn test_display() {
        assert_eq!(Repository::Expansion(2).to_string(), "ex2");
        assert_eq!(Repository::Boot.to_string(), "boot");
    }
}
