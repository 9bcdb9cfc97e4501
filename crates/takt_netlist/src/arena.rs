//! Generic arena for dense, ID-indexed storage of netlist entities.
//!
//! The [`Arena`] provides O(1) insertion and lookup by opaque [`ArenaId`]
//! keys, cache-friendly sequential layout, and iteration in allocation
//! order. Netlists with feedback are navigated entirely through these
//! stable integer handles, so no entity ever holds a reference to another.

use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::ops::Index;

/// Trait for opaque ID types used as arena keys.
///
/// Implementors must provide a bijection between `u32` indices and the ID type.
pub trait ArenaId: Copy {
    /// Creates an ID from a raw `u32` index.
    fn from_raw(index: u32) -> Self;

    /// Returns the raw `u32` index.
    fn as_raw(self) -> u32;
}

/// A dense, ID-indexed container for netlist entities.
///
/// Items are always appended (never reordered or removed), making IDs stable
/// for the lifetime of the arena. The retiming applicator relies on this:
/// rather than deleting nodes in place, it rebuilds a fresh module and lets
/// the old arena drop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena<I: ArenaId, T> {
    items: Vec<T>,
    #[serde(skip)]
    _marker: PhantomData<I>,
}

impl<I: ArenaId, T> Default for Arena<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ArenaId, T> Arena<I, T> {
    /// Creates a new, empty arena.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Allocates a new item in the arena and returns its ID.
    pub fn alloc(&mut self, item: T) -> I {
        let id = I::from_raw(self.items.len() as u32);
        self.items.push(item);
        id
    }

    /// Returns a reference to the item with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if the ID is out of bounds.
    pub fn get(&self, id: I) -> &T {
        &self.items[id.as_raw() as usize]
    }

    /// Returns the item with the given ID, or `None` if the ID is out of
    /// bounds (e.g., an ID minted by a different module's arena).
    pub fn try_get(&self, id: I) -> Option<&T> {
        self.items.get(id.as_raw() as usize)
    }

    /// Returns the number of items in the arena.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the arena contains no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over `(ID, &T)` pairs in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| (I::from_raw(i as u32), item))
    }

    /// Iterates over references to items in allocation order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<I: ArenaId, T> Index<I> for Arena<I, T> {
    type Output = T;

    fn index(&self, id: I) -> &T {
        self.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::NodeId;

    #[test]
    fn alloc_and_get() {
        let mut arena: Arena<NodeId, &str> = Arena::new();
        let id = arena.alloc("add_0");
        assert_eq!(arena[id], "add_0");
    }

    #[test]
    fn ids_are_sequential() {
        let mut arena: Arena<NodeId, u32> = Arena::new();
        let a = arena.alloc(8);
        let b = arena.alloc(16);
        assert_eq!(a.as_raw(), 0);
        assert_eq!(b.as_raw(), 1);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn try_get_out_of_bounds() {
        let mut arena: Arena<NodeId, u32> = Arena::new();
        arena.alloc(1);
        assert_eq!(arena.try_get(NodeId::from_raw(0)), Some(&1));
        assert_eq!(arena.try_get(NodeId::from_raw(9)), None);
    }

    #[test]
    fn empty_arena() {
        let arena: Arena<NodeId, u32> = Arena::default();
        assert!(arena.is_empty());
        assert_eq!(arena.len(), 0);
    }

    #[test]
    fn iter_in_allocation_order() {
        let mut arena: Arena<NodeId, &str> = Arena::new();
        arena.alloc("in");
        arena.alloc("mul");
        arena.alloc("out");
        let names: Vec<&str> = arena.values().copied().collect();
        assert_eq!(names, vec!["in", "mul", "out"]);
        let ids: Vec<u32> = arena.iter().map(|(id, _)| id.as_raw()).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn serde_roundtrip() {
        let mut arena: Arena<NodeId, String> = Arena::new();
        arena.alloc("stage_0".to_string());
        arena.alloc("stage_1".to_string());
        let json = serde_json::to_string(&arena).unwrap();
        let restored: Arena<NodeId, String> = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.len(), 2);
        assert_eq!(restored[NodeId::from_raw(1)], "stage_1");
    }
}
