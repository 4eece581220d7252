use serde::{Deserialize, Serialize};

/// Client language, as understood by the frontier pages and the game binary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientLanguage {
    Japanese,
    #[default]
    English,
    German,
    French,
}

impl ClientLanguage {
    /// Language code used by the frontier site (`rc_lang`, gate status `lang`)
    pub fn code(&self) -> &'static str {
        match self {
            Self::Japanese => "ja",
            Self::English => "en-gb",
            Self::German => "de",
            Self::French => "fr",
        }
    }

    /// Numeric id passed to the game process
    pub fn game_id(&self) -> u8 {
        match self {
            Self::Japanese => 0,
            Self::English => 1,
            Self::German => 2,
            Self::French => 3,
        }
    }
}
