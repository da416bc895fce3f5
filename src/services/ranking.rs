use std::cmp::Ordering;
use std::collections::HashSet;

use crate::models::Recommendation;

/// Number of top-rated titles considered when no limit is configured
pub const DEFAULT_LIMIT: usize = 10;

/// Ranks candidates by rating and keeps the displayable ones
///
/// Candidates are stably sorted by descending rating and truncated to `limit`
/// first. Only then are unreleased, owned and skipped titles removed, so the
/// result can be shorter than `limit` even when qualifying titles exist further
/// down the full list.
pub fn rank_and_filter(
    mut items: Vec<Recommendation>,
    owned: &HashSet<String>,
    skipped: &HashSet<String>,
    limit: usize,
) -> Vec<Recommendation> {
    // Ratings come from JSON numbers, so NaN never reaches the comparison
    items.sort_by(|a, b| b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal));
    items.truncate(limit);
    items.retain(|item| {
        item.is_released && !owned.contains(&item.title) && !skipped.contains(&item.title)
    });
    items
}
