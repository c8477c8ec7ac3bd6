//! Type-erased extension registry.
//!
//! Callers register named capabilities against a facade kind and look the
//! whole set up later; the values are `Any` handles downcast by whoever
//! registered them. The registry itself never interprets them.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Which facade an extension attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionKind {
    Connection,
    Pool,
}

/// A registered extension value.
pub type Extension = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
pub struct Extensions {
    by_kind: HashMap<ExtensionKind, HashMap<String, Extension>>,
}

impl std::fmt::Debug for Extensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut dbg = f.debug_struct("Extensions");
        for (kind, map) in &self.by_kind {
            dbg.field(
                match kind {
                    ExtensionKind::Connection => "connection",
                    ExtensionKind::Pool => "pool",
                },
                &map.keys().collect::<Vec<_>>(),
            );
        }
        dbg.finish()
    }
}

impl Extensions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `value` under `name` for the given kind, replacing any
    /// previous registration. Returns whether the name was new.
    pub fn register(
        &mut self,
        kind: ExtensionKind,
        name: impl Into<String>,
        value: Extension,
    ) -> bool {
        self.by_kind
            .entry(kind)
            .or_default()
            .insert(name.into(), value)
            .is_none()
    }

    /// Everything registered for `kind`, keyed by name.
    #[must_use]
    pub fn lookup(&self, kind: ExtensionKind) -> Option<&HashMap<String, Extension>> {
        self.by_kind.get(&kind)
    }
}
