//! Vellum Script - script-facing layer
//!
//! Wrapper identity, live collections and the per-document host
//! context exposed to a scripting bridge. Everything here is keyed by
//! arena indices; nothing owns a node.

mod collections;
mod error;
mod host;
mod wrapper;

pub use collections::{
    CollectionId, CollectionKind, CollectionSet, EditPolicy, KindConfig, LiveCollection, NotFound,
    ScriptValue,
};
pub use error::{CollectionError, CollectionResult};
pub use host::ScriptHost;
pub use wrapper::{IdentityCache, WrapperId};
