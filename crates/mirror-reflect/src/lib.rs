//! Dynamic member resolution over a registry of native classes.
//!
//! Classes are registered ahead of time on a [`Runtime`] (constructors, methods and fields
//! backed by Rust closures). A [`Reflect`] session then resolves members by name and runtime
//! argument values: an exact signature match first, then the most specific assignable one.
//! [`Proxy`] exposes a target through an interface, with bean-style property access as a
//! fallback for key-value bags.

#![forbid(unsafe_code)]

mod define;
mod error;
mod jdk;
mod lookup;
mod proxy;
mod reflect;
mod runtime;
mod value;

pub use crate::define::ClassBuilder;
pub use crate::error::{ResolutionError, Result};
pub use crate::proxy::{Proxy, ProxyTarget};
pub use crate::reflect::Reflect;
pub use crate::runtime::{
    CallArgs, ConstructorDef, FieldDef, MethodDef, Modifiers, NativeFn, Runtime, Visibility,
};
pub use crate::value::{FromValue, Instance, MapRef, ObjectRef, Value};

pub use mirror_config::{AmbiguityPolicy, ResolutionConfig};
