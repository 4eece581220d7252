pub mod errors;
mod install;
pub mod language;
pub mod repository;
mod settings;

pub use errors::{InstallError, Result};
pub use install::{BOOT_FILES_TO_HASH, GameInstall};
pub use language::ClientLanguage;
pub use repository::{BASE_GAME_VERSION, KNOWN_EXPANSIONS, Repository, is_valid_version};
pub use settings::LauncherSettings;
