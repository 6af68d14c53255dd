//! Fractional ordering keys for drag-and-drop reordering.
//!
//! Positions are plain `f64` values and only their relative order matters.
//! Inserting between two neighbors takes the midpoint, so siblings are never
//! renumbered when one item moves. Bisecting the same gap over and over eventually
//! runs out of float precision; callers detect that with [`needs_rebalance`] and
//! renumber the whole sequence with [`rebalanced`].
//!
//! The same functions serve the list ordering (`tasks.position`), the Kanban
//! ordering (`tasks.kanban_position`) and bucket ordering (`buckets.position`).
//! The key spaces are independent of each other.

/// Gap between neighbors when appending, prepending or rebalancing (2^16).
pub const DEFAULT_SPACING: f64 = 65536.0;

/// Compute a new position from the positions of the item's future neighbors.
///
/// - no neighbors: [`DEFAULT_SPACING`]
/// - only `after` (head insert): half of it when positive, otherwise one spacing below
/// - only `before` (tail insert): one spacing above it
/// - both: the midpoint
///
/// The result is **not** guaranteed to be strictly between the neighbors once the
/// gap is exhausted. Check it with [`needs_rebalance`].
pub fn allocate(before: Option<f64>, after: Option<f64>) -> f64 {
    match (before, after) {
        (None, None) => DEFAULT_SPACING,
        (None, Some(after)) if after > 0.0 => after / 2.0,
        (None, Some(after)) => after - DEFAULT_SPACING,
        (Some(before), None) => before + DEFAULT_SPACING,
        (Some(before), Some(after)) => before + (after - before) / 2.0,
    }
}

/// Position for a freshly inserted entity that has no explicit neighbors.
///
/// Keeps `current` when the client already supplied one, otherwise derives the key
/// from the database id so creation order is preserved.
pub fn default_position(id: i64, current: f64) -> f64 {
    if current != 0.0 {
        current
    } else {
        id as f64 * DEFAULT_SPACING
    }
}

/// True when `candidate` does not sit strictly between the given neighbors.
pub fn needs_rebalance(before: Option<f64>, after: Option<f64>, candidate: f64) -> bool {
    if !candidate.is_finite() {
        return true;
    }
    let above = before.is_none_or(|b| candidate > b);
    let below = after.is_none_or(|a| candidate < a);
    !(above && below)
}

/// Evenly spaced positions for `count` items, in order.
pub fn rebalanced(count: usize) -> Vec<f64> {
    (1..=count).map(|i| i as f64 * DEFAULT_SPACING).collect()
}
