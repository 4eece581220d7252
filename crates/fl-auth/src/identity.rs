use once_cell::sync::OnceCell;
use sha1::{Digest, Sha1};
use sysinfo::System;

use crate::config::USER_AGENT_TEMPLATE;

static COMPUTER_ID: OnceCell<String> = OnceCell::new();

/// Machine facts the computer id is derived from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineIdentity {
    pub machine_name: String,
    pub user_name: String,
    pub os_version: String,
    pub processor_count: usize,
}

impl MachineIdentity {
    pub fn from_environment() -> Self {
        let user_name = std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_default();

        Self {
            machine_name: System::host_name().unwrap_or_default(),
            user_name,
            os_version: System::long_os_version().unwrap_or_default(),
            processor_count: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }

    /// Ten lowercase hex chars: a checksum byte followed by the first four
    /// SHA-1 bytes of the UTF-16LE machine description.
    ///
    /// The checksum is the two's complement of the four bytes' sum, so all
    /// five bytes add up to zero mod 256.
    pub fn computer_id(&self) -> String {
        let description = format!(
            "{}{}{}{}",
            self.machine_name, self.user_name, self.os_version, self.processor_count
        );
        let utf16: Vec<u8> = description
            .encode_utf16()
            .flat_map(|unit| unit.to_le_bytes())
            .collect();

        let digest = Sha1::digest(&utf16);
        let mut bytes = [0u8; 5];
        bytes[1..].copy_from_slice(&digest[..4]);
        let sum = bytes[1..].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
        bytes[0] = sum.wrapping_neg();

        hex::encode(bytes)
    }
}

/// Computer id for this process, computed once
pub fn computer_id() -> &'static str {
    COMPUTER_ID.get_or_init(|| MachineIdentity::from_environment().computer_id())
}

/// SQEXAuthor User-Agent embedding the computer id
pub fn user_agent() -> String {
    USER_AGENT_TEMPLATE.replace("{}", computer_id())
}
