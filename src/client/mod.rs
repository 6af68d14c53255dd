//! Client-side helpers for UIs that talk to the task board API.

pub mod reorder;

pub use reorder::{Orderable, PendingMove, ReorderController};
