use std::path::Path;

use crate::core::error::{AlignError, AlignResult};

/// Suffixes of diagnostic files written next to the pages by earlier runs.
pub const ARTIFACT_SUFFIXES: [&str; 5] = [
    ".inv.png",
    ".mon.png",
    ".diff.png",
    ".crop.png",
    ".leveled.png",
];

pub fn is_artifact_name(name: &str) -> bool {
    ARTIFACT_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Page number encoded as the leading token of a page file name,
/// e.g. `0042-chapter.png` -> 42.
pub fn page_number_of(name: &str) -> AlignResult<u32> {
    let file_name = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(name);
    let token = match file_name.split_once('-') {
        Some((head, _)) => head,
        None => file_name.split('.').next().unwrap_or(file_name),
    };
    token.trim().parse::<u32>().map_err(|_| AlignError::IdentityParse {
        name: name.to_string(),
    })
}
