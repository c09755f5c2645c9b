//! Identifier types and the identifier source.
//!
//! Entities, rooms and viewports are keyed by string identifiers. Each kind
//! gets its own newtype so an entity id can never be passed where a room id
//! is expected. The payload is a shared `Rc<str>`, which keeps the ids cheap
//! to clone into room membership lists and query results.
//!
//! [`IdentifierSource`] generates random ids in the familiar 8-4-4-4-12 hex
//! layout (version 4, RFC 4122 variant). Seed it for reproducible ids in
//! tests.

use std::borrow::Borrow;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use fastrand::Rng;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(Rc<str>);

        impl $name {
            pub fn new(id: impl AsRef<str>) -> Self {
                Self(Rc::from(id.as_ref()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(Rc::from(value))
            }
        }

        impl From<&$name> for $name {
            fn from(value: &$name) -> Self {
                value.clone()
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of an entity.
    EntityId
);
string_id!(
    /// Identifier of a room.
    RoomId
);
string_id!(
    /// Identifier of a viewport.
    ViewportId
);

static NEXT_ENGINE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of an [`Engine`](crate::engine::Engine) instance.
///
/// Entities carry the id of the engine that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngineId(u64);

impl EngineId {
    pub(crate) fn next() -> Self {
        EngineId(NEXT_ENGINE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Generator for entity, room and viewport identifiers.
#[derive(Debug, Clone)]
pub struct IdentifierSource {
    rng: Rng,
    issued: u64,
}

impl Default for IdentifierSource {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentifierSource {
    /// Source seeded from the process entropy.
    pub fn new() -> Self {
        Self {
            rng: Rng::new(),
            issued: 0,
        }
    }

    /// Source with a fixed seed; yields the same sequence every run.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Rng::with_seed(seed),
            issued: 0,
        }
    }

    /// Next raw identifier string.
    pub fn next_string(&mut self) -> String {
        self.issued += 1;
        let hi = self.rng.u64(..);
        let lo = self.rng.u64(..);
        format!(
            "{:08x}-{:04x}-{:04x}-{:04x}-{:012x}",
            hi >> 32,
            (hi >> 16) & 0xffff,
            (hi & 0x0fff) | 0x4000,
            ((lo >> 48) & 0x3fff) | 0x8000,
            lo & 0xffff_ffff_ffff
        )
    }

    pub fn entity_id(&mut self) -> EntityId {
        EntityId::from(self.next_string())
    }

    pub fn room_id(&mut self) -> RoomId {
        RoomId::from(self.next_string())
    }

    pub fn viewport_id(&mut self) -> ViewportId {
        ViewportId::from(self.next_string())
    }

    /// How many identifiers this source has produced.
    pub fn issued(&self) -> u64 {
        self.issued
    }
}
