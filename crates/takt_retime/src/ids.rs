//! Opaque ID newtypes for weighted circuit graph entities.
//!
//! [`GraphNodeId`] and [`GraphEdgeId`] are thin `u32` wrappers used as arena
//! indices into a [`CircuitGraph`](crate::graph::CircuitGraph). They are
//! `Copy`, `Hash`, and `Serialize`/`Deserialize`, and are only meaningful for
//! the graph that allocated them.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }
    };
}

define_id!(
    /// Opaque, copyable ID for a node in the weighted circuit graph.
    GraphNodeId
);

define_id!(
    /// Opaque, copyable ID for an edge in the weighted circuit graph.
    GraphEdgeId
);
