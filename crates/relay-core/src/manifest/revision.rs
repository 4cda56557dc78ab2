//! Revision classification.

const MIN_HASH_LEN: usize = 7;
const MAX_HASH_LEN: usize = 40;

/// Check whether a revision is a commit hash rather than a branch or tag.
///
/// A hash is 7 to 40 hexadecimal characters (either case) after trimming
/// surrounding whitespace. Branch or tag names that happen to look like a
/// hash (e.g., `deadbee`) are classified as hashes too.
pub fn is_hash_revision(revision: &str) -> bool {
    let trimmed = revision.trim();
    (MIN_HASH_LEN..=MAX_HASH_LEN).contains(&trimmed.len())
        && trimmed.chars().all(|c| c.is_ascii_hexdigit())
}
