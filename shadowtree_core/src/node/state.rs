// Copyright 2026 the Shadowtree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Opaque, revisioned component state.

use core::any::Any;
use core::fmt;
use std::sync::Arc;

/// Native-side state attached to a node.
///
/// The payload is opaque to this crate. `revision` orders successive states
/// of one family; a family never rolls back to a lower revision.
pub struct State {
    revision: u64,
    data: Arc<dyn Any + Send + Sync>,
}

/// Shared state handle.
pub type SharedState = Arc<State>;

impl State {
    /// Creates a shared state with the given revision and payload.
    #[must_use]
    pub fn new<T: Any + Send + Sync>(revision: u64, data: T) -> SharedState {
        Arc::new(Self {
            revision,
            data: Arc::new(data),
        })
    }

    /// Creates the next revision of this state with a new payload.
    #[must_use]
    pub fn next<T: Any + Send + Sync>(&self, data: T) -> SharedState {
        Self::new(self.revision + 1, data)
    }

    /// Monotonic revision number.
    #[inline]
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Downcasts the payload.
    #[must_use]
    pub fn data<T: Any>(&self) -> Option<&T> {
        self.data.downcast_ref::<T>()
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}
