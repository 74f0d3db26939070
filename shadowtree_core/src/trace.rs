// Copyright 2026 the Shadowtree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for diffing and mounting.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! differ and the mounting coordinator call as they run. All method bodies
//! default to no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace` enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`) gates [`DiffBranchEvent`] and
//!   [`ReparentEvent`] plus the corresponding `TraceSink` methods. These fire
//!   once per matched child, so they are far more voluminous.

#[cfg(feature = "trace-rich")]
use crate::diff::ReparentMode;
use crate::mutation::MutationCounts;
use crate::node::{SurfaceId, Tag};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which decision the differ took for one child (or pair of children).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiffBranch {
    /// Lock-step stage: tags differ, leaving the fast path.
    TagsDiffer,
    /// Lock-step stage: same tag, updated and possibly recursed.
    Matched,
    /// New layer exhausted: remove and delete the old child.
    DeleteTail,
    /// Old layer exhausted: create and insert the new child.
    CreateTail,
    /// General case: both cursors point at the same tag.
    MatchedInOrder,
    /// General case: the old child was already inserted further ahead.
    Reordered,
    /// General case: the old child is gone from the new layer.
    Removed,
    /// General case: the new child is inserted now, created later if needed.
    Inserted,
    /// A removed child was not claimed elsewhere and is deleted.
    Deleted,
    /// An inserted child was not claimed elsewhere and is created.
    Created,
}

impl DiffBranch {
    /// Short name, as used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TagsDiffer => "tags-differ",
            Self::Matched => "matched",
            Self::DeleteTail => "delete-tail",
            Self::CreateTail => "create-tail",
            Self::MatchedInOrder => "matched-in-order",
            Self::Reordered => "reordered",
            Self::Removed => "removed",
            Self::Inserted => "inserted",
            Self::Deleted => "deleted",
            Self::Created => "created",
        }
    }
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a top-level diff starts.
#[derive(Clone, Copy, Debug)]
pub struct DiffBeginEvent {
    /// Process-unique number of this diff.
    pub diff_index: u32,
    /// Surface of the diffed roots.
    pub surface_id: SurfaceId,
    /// Tag of the root node.
    pub root: Tag,
}

/// Emitted when a top-level diff finishes.
#[derive(Clone, Copy, Debug)]
pub struct DiffEndEvent {
    /// Number of the diff, matching its [`DiffBeginEvent`].
    pub diff_index: u32,
    /// What the diff produced.
    pub counts: MutationCounts,
}

/// Emitted when the mounting coordinator hands out a transaction.
#[derive(Clone, Copy, Debug)]
pub struct TransactionEvent {
    /// Surface the transaction belongs to.
    pub surface_id: SurfaceId,
    /// Transaction number, starting at 1 per surface.
    pub number: u64,
    /// Mutations in the transaction.
    pub counts: MutationCounts,
}

/// One differ decision (requires `trace-rich`).
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct DiffBranchEvent {
    /// Which branch was taken.
    pub branch: DiffBranch,
    /// Parent whose layer is being diffed.
    pub parent: Tag,
    /// Tag of the old child, or [`Tag::NONE`].
    pub old_tag: Tag,
    /// Tag of the new child, or [`Tag::NONE`].
    pub new_tag: Tag,
}

/// A flatten or unflatten pass starting at `node` (requires `trace-rich`).
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct ReparentEvent {
    /// Direction.
    pub mode: ReparentMode,
    /// Node whose children move.
    pub node: Tag,
    /// Parent the children move out of or into.
    pub parent: Tag,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the differ and the mounting coordinator.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a top-level diff starts.
    fn on_diff_begin(&mut self, e: &DiffBeginEvent) {
        _ = e;
    }

    /// Called when a top-level diff finishes.
    fn on_diff_end(&mut self, e: &DiffEndEvent) {
        _ = e;
    }

    /// Called when a mounting transaction is produced.
    fn on_transaction(&mut self, e: &TransactionEvent) {
        _ = e;
    }

    /// Called for each differ decision (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_diff_branch(&mut self, e: &DiffBranchEvent) {
        _ = e;
    }

    /// Called when a flatten or unflatten pass starts (requires `trace-rich`
    /// feature).
    #[cfg(feature = "trace-rich")]
    fn on_reparent(&mut self, e: &ReparentEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`DiffBeginEvent`].
    #[inline]
    pub fn diff_begin(&mut self, e: &DiffBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_diff_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`DiffEndEvent`].
    #[inline]
    pub fn diff_end(&mut self, e: &DiffEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_diff_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`TransactionEvent`].
    #[inline]
    pub fn transaction(&mut self, e: &TransactionEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_transaction(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`DiffBranchEvent`] (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn diff_branch(&mut self, e: &DiffBranchEvent) {
        if let Some(s) = &mut self.sink {
            s.on_diff_branch(e);
        }
    }

    /// Emits a [`ReparentEvent`] (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn reparent(&mut self, e: &ReparentEvent) {
        if let Some(s) = &mut self.sink {
            s.on_reparent(e);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
