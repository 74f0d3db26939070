// Copyright 2026 the Shadowtree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Immutable shadow trees and the differ that reconciles them.
//!
//! `shadowtree_core` models a UI component tree as a DAG of immutable,
//! reference-counted nodes. Each commit produces a new revision that shares
//! every unchanged subtree with the previous one. The differ compares two
//! revisions and emits the ordered list of primitive mutations (create,
//! delete, insert, remove, update) that turns the native view hierarchy
//! mounted for the old revision into the one for the new revision.
//!
//! # Architecture
//!
//! ```text
//!   producer ──► ShadowNode::new / clone_with ──► root revision
//!                                                     │
//!                  ┌──────────────────────────────────┘
//!                  ▼
//!   MountingCoordinator::push() ──► pull_transaction()
//!                                         │
//!          diff(base, newest) ◄───────────┘
//!              │  slice layers (culling) ─► match by tag (TinyMap)
//!              ▼
//!   MountingTransaction ──► MountingLayer::apply()
//! ```
//!
//! **[`node`]**: Families, nodes, traits, state and the component
//! interfaces. A family is the identity shared by every revision of a node.
//!
//! **[`view`]**: [`ShadowView`](view::ShadowView), the value snapshot the
//! mounting layer sees of a node.
//!
//! **[`diff`]**: Slicing trees into mount layers and diffing them, including
//! flattening changes that move views between layers.
//!
//! **[`mutation`]**: The mutation instructions and per-kind counts.
//!
//! **[`culling`]**: Viewport culling applied while slicing.
//!
//! **[`mount`]**: The [`MountingLayer`](mount::MountingLayer) trait and a
//! per-surface coordinator.
//!
//! **[`tiny_map`]**: The small tag-keyed map used while matching.
//!
//! **[`layout`]** and **[`transform`]**: Layout input types.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! diff instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-branch
//!   and per-reparent events.

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod culling;
pub mod diff;
pub mod layout;
pub mod mount;
pub mod mutation;
pub mod node;
pub mod tiny_map;
pub mod trace;
pub mod transform;
pub mod view;
