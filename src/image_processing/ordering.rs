use std::io;
use std::time::SystemTime;

use super::ImageFile;

/// How a group ended up ordered, for the plan table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderKey {
    CreationTime,
    /// Creation time was unavailable for at least one file
    FileName,
}

/// Order group members by filesystem creation time, oldest first
/// (newest first with `reverse`).
///
/// Falls back to case-insensitive file name order when any member has no
/// creation time on this platform.
pub fn sort_by_creation_time(files: &[ImageFile], reverse: bool) -> (Vec<ImageFile>, OrderKey) {
    sort_with_fallback(
        files.to_vec(),
        |file| std::fs::metadata(&file.path).and_then(|m| m.created()),
        |file| file.file_name().to_lowercase(),
        reverse,
    )
}

/// Stable sort by timestamp, or by name when a timestamp is missing
pub fn sort_with_fallback<T, C, N>(
    items: Vec<T>,
    created: C,
    name: N,
    reverse: bool,
) -> (Vec<T>, OrderKey)
where
    C: Fn(&T) -> io::Result<SystemTime>,
    N: Fn(&T) -> String,
{
    let timestamps: io::Result<Vec<SystemTime>> = items.iter().map(&created).collect();

    match timestamps {
        Ok(timestamps) => {
            let mut keyed: Vec<(SystemTime, T)> = timestamps.into_iter().zip(items).collect();
            if reverse {
                keyed.sort_by(|a, b| b.0.cmp(&a.0));
            } else {
                keyed.sort_by(|a, b| a.0.cmp(&b.0));
            }
            (keyed.into_iter().map(|(_, item)| item).collect(), OrderKey::CreationTime)
        }
        Err(_) => {
            let mut keyed: Vec<(String, T)> = items.into_iter().map(|item| (name(&item), item)).collect();
            if reverse {
                keyed.sort_by(|a, b| b.0.cmp(&a.0));
            } else {
                keyed.sort_by(|a, b| a.0.cmp(&b.0));
            }
            (keyed.into_iter().map(|(_, item)| item).collect(), OrderKey::FileName)
        }
    }
}
