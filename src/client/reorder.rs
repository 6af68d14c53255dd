//! Optimistic drag-and-drop ordering.
//!
//! A [`ReorderController`] holds the list a UI renders (one bucket's tasks, a
//! project's task list, or a board's buckets). A drag mutates the list right away
//! and yields a [`PendingMove`] describing the request to send. Positions are
//! computed with the same allocator the server uses, so the optimistic position
//! normally equals the stored one. When the server answers, [`ReorderController::reconcile`]
//! replaces the local copy with the canonical item.

use crate::{
    models::{
        bucket::{Bucket, BucketUpdate},
        task::{MoveTask, PositionScope, Task},
    },
    services::position,
};
use serde::Serialize;

/// Something with an id and an ordering key per scope.
pub trait Orderable {
    fn id(&self) -> i64;
    fn position(&self, scope: PositionScope) -> f64;
    fn set_position(&mut self, scope: PositionScope, value: f64);
}

impl Orderable for Task {
    fn id(&self) -> i64 {
        self.id
    }

    fn position(&self, scope: PositionScope) -> f64 {
        match scope {
            PositionScope::Kanban => self.kanban_position,
            PositionScope::List => self.position,
        }
    }

    fn set_position(&mut self, scope: PositionScope, value: f64) {
        match scope {
            PositionScope::Kanban => self.kanban_position = value,
            PositionScope::List => self.position = value,
        }
    }
}

/// Buckets have a single ordering key; the scope is ignored.
impl Orderable for Bucket {
    fn id(&self) -> i64 {
        self.id
    }

    fn position(&self, _scope: PositionScope) -> f64 {
        self.position
    }

    fn set_position(&mut self, _scope: PositionScope, value: f64) {
        self.position = value;
    }
}

/// A local move that still has to be persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingMove {
    pub id: i64,
    /// Position applied locally.
    pub position: f64,
    /// Item now directly before the moved one.
    pub before: Option<i64>,
    /// Item now directly after the moved one.
    pub after: Option<i64>,
    /// Bucket the list belongs to, for Kanban lists.
    pub bucket_id: Option<i64>,
    pub scope: PositionScope,
    /// The neighbors had no room left; the server will renumber the list.
    pub needs_rebalance: bool,
}

impl PendingMove {
    /// Body for `POST /tasks/{id}/position`.
    pub fn request(&self) -> MoveTask {
        MoveTask {
            bucket_id: self.bucket_id,
            before_id: self.before,
            after_id: self.after,
            scope: self.scope,
        }
    }

    /// Body for `POST /projects/{project}/buckets/{id}` when the moved item is a
    /// bucket. Buckets carry their position directly; the server does not look at
    /// neighbors.
    pub fn bucket_request(&self) -> BucketUpdate {
        BucketUpdate {
            position: Some(self.position),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReorderController<T> {
    items: Vec<T>,
    scope: PositionScope,
    bucket_id: Option<i64>,
}

impl<T: Orderable> ReorderController<T> {
    /// Take ownership of `items` and sort them by position, then id.
    pub fn new(mut items: Vec<T>, scope: PositionScope) -> Self {
        sort(&mut items, scope);
        Self {
            items,
            scope,
            bucket_id: None,
        }
    }

    /// Tag moves produced by this list with the bucket it shows.
    pub fn with_bucket(mut self, bucket_id: i64) -> Self {
        self.bucket_id = Some(bucket_id);
        self
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Move the item at `from` so it ends up at index `to`.
    ///
    /// Returns `None` when either index is out of range or nothing moves.
    pub fn move_item(&mut self, from: usize, to: usize) -> Option<PendingMove> {
        if from == to || from >= self.items.len() || to >= self.items.len() {
            return None;
        }
        let item = self.items.remove(from);
        Some(self.place(item, to))
    }

    /// Insert an item coming from another list at `index` (clamped to the end).
    pub fn insert(&mut self, item: T, index: usize) -> PendingMove {
        let index = index.min(self.items.len());
        self.place(item, index)
    }

    /// Take an item out of the list, e.g. when it is dragged into another one.
    pub fn remove(&mut self, id: i64) -> Option<T> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(index))
    }

    /// Replace the local copy with the server's version.
    ///
    /// Returns `true` when the canonical position changed the item's place in the
    /// list, which happens after the server renumbered it. Siblings may be stale
    /// then and the list should be reloaded.
    pub fn reconcile(&mut self, canonical: T) -> bool {
        let Some(index) = self.items.iter().position(|item| item.id() == canonical.id()) else {
            self.items.push(canonical);
            sort(&mut self.items, self.scope);
            return false;
        };
        let id = canonical.id();
        self.items[index] = canonical;
        sort(&mut self.items, self.scope);
        self.items.get(index).is_none_or(|item| item.id() != id)
    }

    /// True when some neighbors are not strictly ordered.
    pub fn needs_rebalance(&self) -> bool {
        self.items
            .windows(2)
            .any(|pair| !(pair[0].position(self.scope) < pair[1].position(self.scope)))
    }

    fn place(&mut self, mut item: T, index: usize) -> PendingMove {
        let before = index
            .checked_sub(1)
            .and_then(|i| self.items.get(i))
            .map(|n| (n.id(), n.position(self.scope)));
        let after = self
            .items
            .get(index)
            .map(|n| (n.id(), n.position(self.scope)));

        let before_pos = before.map(|(_, p)| p);
        let after_pos = after.map(|(_, p)| p);
        let value = position::allocate(before_pos, after_pos);
        item.set_position(self.scope, value);

        let pending = PendingMove {
            id: item.id(),
            position: value,
            before: before.map(|(id, _)| id),
            after: after.map(|(id, _)| id),
            bucket_id: self.bucket_id,
            scope: self.scope,
            needs_rebalance: position::needs_rebalance(before_pos, after_pos, value),
        };
        self.items.insert(index, item);
        pending
    }
}

fn sort<T: Orderable>(items: &mut [T], scope: PositionScope) {
    items.sort_by(|a, b| {
        a.position(scope)
            .total_cmp(&b.position(scope))
            .then(a.id().cmp(&b.id()))
    });
}
