// Copyright 2026 the Shadowtree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interfaces to the component layer that produces nodes.
//!
//! Prop parsing and event dispatch live outside this crate. The differ only
//! needs to copy these objects into views and compare them by identity.

use core::any::Any;
use core::fmt;
use std::sync::Arc;

use super::id::ComponentHandle;
use super::traits::ShadowNodeTraits;

/// Immutable, already-parsed props of a node.
///
/// Props are shared between revisions and compared by pointer, never by
/// value. Any `Debug + Send + Sync` type can serve as props; downcast through
/// `&dyn Any`.
pub trait Props: Any + fmt::Debug + Send + Sync {}

impl<T: Any + fmt::Debug + Send + Sync> Props for T {}

/// Shared props handle.
pub type SharedProps = Arc<dyn Props>;

/// Delivers events from a native view back to its component.
///
/// Only its identity matters here.
pub trait EventEmitter: fmt::Debug + Send + Sync + 'static {}

impl<T: fmt::Debug + Send + Sync + 'static> EventEmitter for T {}

/// Shared event emitter handle.
pub type SharedEventEmitter = Arc<dyn EventEmitter>;

/// Describes one kind of component.
pub trait ComponentDescriptor: fmt::Debug + Send + Sync {
    /// Component name used by the mounting layer to pick a native view class.
    fn component_name(&self) -> &'static str;

    /// Opaque component handle.
    fn component_handle(&self) -> ComponentHandle;

    /// Traits a freshly created node of this kind starts with.
    fn traits(&self) -> ShadowNodeTraits;

    /// Props a freshly created node of this kind starts with.
    ///
    /// Return the same `Arc` every time so that default-props nodes compare
    /// equal.
    fn default_props(&self) -> SharedProps;
}

/// Shared descriptor handle.
pub type SharedComponentDescriptor = Arc<dyn ComponentDescriptor>;

/// A [`ComponentDescriptor`] defined entirely by its fields.
#[derive(Debug)]
pub struct SimpleComponentDescriptor {
    name: &'static str,
    handle: ComponentHandle,
    traits: ShadowNodeTraits,
    default_props: SharedProps,
}

impl SimpleComponentDescriptor {
    /// Creates a descriptor with unit default props.
    #[must_use]
    pub fn new(name: &'static str, handle: ComponentHandle, traits: ShadowNodeTraits) -> Self {
        Self {
            name,
            handle,
            traits,
            default_props: Arc::new(()),
        }
    }

    /// Creates a shared descriptor with unit default props.
    #[must_use]
    pub fn shared(
        name: &'static str,
        handle: ComponentHandle,
        traits: ShadowNodeTraits,
    ) -> SharedComponentDescriptor {
        Arc::new(Self::new(name, handle, traits))
    }
}

impl ComponentDescriptor for SimpleComponentDescriptor {
    fn component_name(&self) -> &'static str {
        self.name
    }

    fn component_handle(&self) -> ComponentHandle {
        self.handle
    }

    fn traits(&self) -> ShadowNodeTraits {
        self.traits
    }

    fn default_props(&self) -> SharedProps {
        Arc::clone(&self.default_props)
    }
}
