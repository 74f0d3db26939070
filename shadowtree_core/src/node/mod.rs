// Copyright 2026 the Shadowtree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The shadow tree data model.
//!
//! A tree is a DAG of immutable [`ShadowNode`]s shared through `Arc`. Every
//! revision of one logical node points at the same [`ShadowNodeFamily`],
//! which is what the differ compares to decide "same node".

mod component;
mod family;
mod id;
mod shadow_node;
mod state;
mod traits;

pub use component::{
    ComponentDescriptor, EventEmitter, Props, SharedComponentDescriptor, SharedEventEmitter,
    SharedProps, SimpleComponentDescriptor,
};
pub use family::{ShadowNodeFamily, ShadowNodeFamilyFragment};
pub use id::{ComponentHandle, SurfaceId, Tag};
pub use shadow_node::{ShadowNode, ShadowNodeFragment, ShadowNodeList, SharedShadowNode};
pub use state::{SharedState, State};
pub use traits::ShadowNodeTraits;
