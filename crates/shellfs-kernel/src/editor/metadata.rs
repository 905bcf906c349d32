//! Metadata probe output parsing.
//!
//! The probe prints `SIZE MTIME OWNER:GROUP PERMS TYPE...` where the type
//! description is free text from `file -b`, or the `not_found` sentinel.

use std::fmt;

use serde::Serialize;

use super::shell::NOT_FOUND_SENTINEL;
use crate::channel::{CommandOutput, OutputClass};

/// Number of fields in a probe line; the last one swallows the remainder.
const METADATA_FIELDS: usize = 5;

/// Metadata of an existing remote path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMetadata {
    pub path: String,
    pub exists: bool,
    pub size_bytes: u64,
    /// Modification time in seconds since the Unix epoch.
    pub modified_time: i64,
    pub owner: String,
    pub group: String,
    /// Octal permission bits as printed by `stat` (e.g. `644`).
    pub permission_bits: String,
    pub type_description: String,
}

/// Outcome of probing one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MetadataEntry {
    Found(FileMetadata),
    NotFound { path: String },
    Unavailable { path: String, reason: String },
}

impl MetadataEntry {
    pub fn path(&self) -> &str {
        match self {
            Self::Found(meta) => &meta.path,
            Self::NotFound { path } | Self::Unavailable { path, .. } => path,
        }
    }

    pub fn unavailable(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for MetadataEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found(meta) => write!(
                f,
                "{}:\n  Size: {} bytes\n  Type: {}\n  Owner: {}:{}\n  Permissions: {}\n  Modified: {}",
                meta.path,
                meta.size_bytes,
                meta.type_description,
                meta.owner,
                meta.group,
                meta.permission_bits,
                meta.modified_time,
            ),
            Self::NotFound { path } => write!(f, "{}: Not found", path),
            Self::Unavailable { path, reason } if reason.is_empty() => {
                write!(f, "{}: Unable to get metadata", path)
            }
            Self::Unavailable { path, reason } => {
                write!(f, "{}: Unable to get metadata ({})", path, reason)
            }
        }
    }
}

/// Interpret the probe output for `path`.
pub fn parse_metadata_output(path: &str, output: &CommandOutput) -> MetadataEntry {
    let sentinel = output
        .output
        .lines()
        .any(|line| line.trim() == NOT_FOUND_SENTINEL);
    if sentinel || output.classify() == OutputClass::NotFound {
        return MetadataEntry::NotFound {
            path: path.to_string(),
        };
    }

    let fields = split_fields(&output.output, METADATA_FIELDS);
    let &[size, mtime, owner_group, perms, kind] = fields.as_slice() else {
        return MetadataEntry::unavailable(path, "");
    };

    let Ok(size_bytes) = size.parse::<u64>() else {
        return MetadataEntry::unavailable(path, format!("unexpected size field {:?}", size));
    };
    let Ok(modified_time) = mtime.parse::<i64>() else {
        return MetadataEntry::unavailable(path, format!("unexpected mtime field {:?}", mtime));
    };
    let (owner, group) = owner_group.split_once(':').unwrap_or((owner_group, ""));

    MetadataEntry::Found(FileMetadata {
        path: path.to_string(),
        exists: true,
        size_bytes,
        modified_time,
        owner: owner.to_string(),
        group: group.to_string(),
        permission_bits: perms.to_string(),
        type_description: kind.split_whitespace().collect::<Vec<_>>().join(" "),
    })
}

/// Split on whitespace into at most `max` fields; the last keeps the remainder.
fn split_fields(text: &str, max: usize) -> Vec<&str> {
    let mut fields = Vec::with_capacity(max);
    let mut rest = text.trim();
    while !rest.is_empty() {
        if fields.len() + 1 == max {
            fields.push(rest);
            break;
        }
        match rest.find(char::is_whitespace) {
            Some(idx) => {
                fields.push(&rest[..idx]);
                rest = rest[idx..].trim_start();
            }
            None => {
                fields.push(rest);
                break;
            }
        }
    }
    fields
}
