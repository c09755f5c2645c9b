//! Entity filters.
//!
//! An [`EntityFilter`] is an ordered list of `(component name, rule)` pairs.
//! Each rule narrows the candidate list in turn:
//!
//! - [`FilterRule::Required`]: the component is attached and truthy.
//! - [`FilterRule::Excluded`]: the component is absent or falsy.
//! - [`FilterRule::Matching`]: the component is attached and the predicate
//!   accepts its value.
//!
//! A component name that no entity has ever been given (or that has been
//! pruned) short-circuits: `Required`/`Matching` empty the result, `Excluded`
//! leaves the candidates unchanged.
//!
//! ```
//! use hex_engine::resources::filter::EntityFilter;
//!
//! let filter = EntityFilter::new()
//!     .require("position")
//!     .exclude("hidden")
//!     .matching("health", |v| v.as_i64().is_some_and(|hp| hp > 0));
//! assert_eq!(filter.len(), 3);
//! ```

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::components::value::is_truthy;
use crate::error::{EngineError, EngineResult};
use crate::resources::componentstore::ComponentStore;
use crate::resources::identifiers::EntityId;

/// Predicate over a component value.
pub type ValuePredicate = Rc<dyn Fn(&Value) -> bool>;

/// How one component name constrains the matching entities.
#[derive(Clone)]
pub enum FilterRule {
    Required,
    Excluded,
    Matching(ValuePredicate),
}

impl FilterRule {
    /// Evaluate the rule against the component value of one entity.
    pub fn accepts(&self, value: Option<&Value>) -> bool {
        match self {
            FilterRule::Required => value.is_some_and(is_truthy),
            FilterRule::Excluded => !value.is_some_and(is_truthy),
            FilterRule::Matching(predicate) => value.is_some_and(|v| predicate(v)),
        }
    }

    fn empties_when_unknown(&self) -> bool {
        !matches!(self, FilterRule::Excluded)
    }
}

impl fmt::Debug for FilterRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterRule::Required => f.write_str("Required"),
            FilterRule::Excluded => f.write_str("Excluded"),
            FilterRule::Matching(_) => f.write_str("Matching(<predicate>)"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EntityFilter {
    rules: Vec<(String, FilterRule)>,
}

impl EntityFilter {
    /// The empty filter matches every entity of the current room.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(self, name: impl Into<String>) -> Self {
        self.with_rule(name, FilterRule::Required)
    }

    pub fn exclude(self, name: impl Into<String>) -> Self {
        self.with_rule(name, FilterRule::Excluded)
    }

    pub fn matching(
        self,
        name: impl Into<String>,
        predicate: impl Fn(&Value) -> bool + 'static,
    ) -> Self {
        self.with_rule(name, FilterRule::Matching(Rc::new(predicate)))
    }

    /// Set the rule for `name`. A name that already has a rule keeps its
    /// position and gets the new rule.
    pub fn with_rule(mut self, name: impl Into<String>, rule: FilterRule) -> Self {
        let name = name.into();
        match self.rules.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = rule,
            None => self.rules.push((name, rule)),
        }
        self
    }

    /// Build a filter from a JSON object: truthy values require the
    /// component, falsy values exclude it.
    pub fn from_json(value: &Value) -> EngineResult<Self> {
        let Value::Object(map) = value else {
            return Err(EngineError::invalid(format!(
                "entity filter is expected to be an object, received {value} instead"
            )));
        };
        Ok(map.iter().fold(Self::new(), |filter, (name, flag)| {
            if is_truthy(flag) {
                filter.require(name.as_str())
            } else {
                filter.exclude(name.as_str())
            }
        }))
    }

    pub fn rules(&self) -> &[(String, FilterRule)] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Narrow `candidates` rule by rule, preserving their order.
    pub fn apply(&self, candidates: &[EntityId], components: &ComponentStore) -> Vec<EntityId> {
        let mut ids = candidates.to_vec();
        for (name, rule) in &self.rules {
            let Some(values) = components.values_of(name) else {
                if rule.empties_when_unknown() {
                    return Vec::new();
                }
                continue;
            };
            ids.retain(|id| rule.accepts(values.get(id)));
        }
        ids
    }
}
