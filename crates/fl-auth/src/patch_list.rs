use serde::{Deserialize, Serialize};

use crate::errors::{LauncherError, Result};

/// One pending patch announced by a version service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchListEntry {
    pub version_id: String,
    pub length: u64,
    pub url: String,
    #[serde(default)]
    pub hash_type: Option<String>,
    #[serde(default)]
    pub hash_block_size: u64,
    #[serde(default)]
    pub hashes: Vec<String>,
}

/// Turns a raw patch manifest into structured entries
pub trait PatchListParser: Send + Sync {
    fn parse(&self, manifest: &str) -> Result<Vec<PatchListEntry>>;
}

/// Parser for the multipart manifests served by the boot and game version services.
///
/// Each patch is a tab-separated line:
///
/// ```text
/// length  ?  ?  ?  version_id  url                                        (boot)
/// length  ?  ?  ?  version_id  hash_type  block_size  h1,h2,...  url      (game)
/// ```
///
/// Boundary and header lines are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultipartPatchListParser;

impl MultipartPatchListParser {
    fn parse_line(line: &str) -> Option<PatchListEntry> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 6 {
            return None;
        }

        let length = fields[0].parse().ok()?;
        let url = *fields.last()?;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return None;
        }

        let mut entry = PatchListEntry {
            version_id: fields[4].to_string(),
            length,
            url: url.to_string(),
            hash_type: None,
            hash_block_size: 0,
            hashes: Vec::new(),
        };

        if fields.len() >= 9 {
            entry.hash_type = Some(fields[5].to_string());
            entry.hash_block_size = fields[6].parse().unwrap_or(0);
            entry.hashes = fields[7]
                .split(',')
                .filter(|h| !h.is_empty())
                .map(str::to_string)
                .collect();
        }

        Some(entry)
    }
}

impl PatchListParser for MultipartPatchListParser {
    fn parse(&self, manifest: &str) -> Result<Vec<PatchListEntry>> {
        let entries: Vec<PatchListEntry> = manifest.lines().filter_map(Self::parse_line).collect();

        if entries.is_empty() && !manifest.trim().is_empty() {
            return Err(LauncherError::protocol("Patch manifest carried no entries", manifest));
        }

        Ok(entries)
    }
}
