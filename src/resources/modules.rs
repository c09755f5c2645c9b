//! Registry of named engine modules.
//!
//! Modules are extension services built once, while the engine is being
//! constructed, by a constructor that receives the engine (typically to
//! register event handlers). They are stored under a name and looked up later
//! by name and type:
//!
//! ```ignore
//! let engine = Engine::builder()
//!     .with_module("mouse", MouseEvents::install)
//!     .build()?;
//! let mouse = engine.module::<MouseEvents>("mouse");
//! ```
//!
//! A name may not shadow the engine's own state or operations, nor a module
//! registered earlier; either is a [`EngineError::NameCollision`].

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::engine::ENGINE_MEMBERS;
use crate::error::{EngineError, EngineResult};

#[derive(Default)]
pub struct ModuleRegistry {
    modules: FxHashMap<String, Rc<dyn Any>>,
    order: Vec<String>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail with `NameCollision` if `name` cannot be used for a new module.
    pub fn check_name(&self, name: &str) -> EngineResult<()> {
        if is_engine_member(name) || self.modules.contains_key(name) {
            return Err(EngineError::NameCollision(name.to_string()));
        }
        Ok(())
    }

    /// Store a constructed module. Returns the shared handle.
    pub fn insert<T: 'static>(&mut self, name: &str, module: T) -> EngineResult<Rc<RefCell<T>>> {
        self.check_name(name)?;
        let handle = Rc::new(RefCell::new(module));
        let erased: Rc<dyn Any> = handle.clone();
        self.modules.insert(name.to_string(), erased);
        self.order.push(name.to_string());
        Ok(handle)
    }

    /// Look up a module by name; `None` if absent or of a different type.
    pub fn get<T: 'static>(&self, name: &str) -> Option<Rc<RefCell<T>>> {
        self.modules
            .get(name)?
            .clone()
            .downcast::<RefCell<T>>()
            .ok()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    /// Module names in registration order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// `createEntity` and `create_entity` both name the same engine operation.
fn is_engine_member(name: &str) -> bool {
    let mut snake = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            snake.push('_');
            snake.push(ch.to_ascii_lowercase());
        } else {
            snake.push(ch);
        }
    }
    ENGINE_MEMBERS.contains(&name) || ENGINE_MEMBERS.contains(&snake.as_str())
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.order.iter()).finish()
    }
}
