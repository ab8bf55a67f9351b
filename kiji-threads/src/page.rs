use std::cmp;

use crate::api::Comment;

/// Selects the `index`-th window of `size` roots from the ranked order, and
/// reports whether any root remains after it. Pages count threads, not
/// comments. An index past the end is a normal empty page, not an error:
/// infinite-scroll clients poll until they receive one.
pub fn window<'a>(ranked: &[&'a Comment], index: usize, size: usize) -> (Vec<&'a Comment>, bool) {
    let start = index.saturating_mul(size);
    if start >= ranked.len() {
        return (Vec::new(), false);
    }
    let end = cmp::min(ranked.len(), start + size);
    (ranked[start..end].to_vec(), end < ranked.len())
}
