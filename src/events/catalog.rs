//! Registry of trace events and their record sizes.
//!
//! Every event knows which regions trigger it. The record size starts at
//! zero and is filled in once by the event-size estimator.

use log::debug;
use std::collections::btree_map::{self, BTreeMap};
use std::collections::BTreeSet;

/// Which regions trigger an event
#[derive(Debug, Clone)]
pub enum EventPredicate {
    /// Every region except parameter regions (names containing `=`)
    AlwaysNonParameter,

    /// Regions whose name is in the set
    NameSet(BTreeSet<String>),

    /// Regions whose name starts with one of the prefixes
    PrefixSet(Vec<String>),

    /// Parameter regions, excluding dynamic `instance=` regions
    ParameterOnly,

    /// Any other rule
    Custom(fn(&str) -> bool),
}

impl EventPredicate {
    pub fn name_set<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EventPredicate::NameSet(names.into_iter().map(Into::into).collect())
    }

    pub fn prefix_set<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EventPredicate::PrefixSet(prefixes.into_iter().map(Into::into).collect())
    }

    /// Does the event fire in a region with this name
    pub fn matches(&self, region_name: &str) -> bool {
        match self {
            EventPredicate::AlwaysNonParameter => !is_parameter_region(region_name),
            EventPredicate::NameSet(names) => names.contains(region_name),
            EventPredicate::PrefixSet(prefixes) => {
                prefixes.iter().any(|p| region_name.starts_with(p.as_str()))
            }
            EventPredicate::ParameterOnly => {
                is_parameter_region(region_name) && !region_name.starts_with("instance=")
            }
            EventPredicate::Custom(rule) => rule(region_name),
        }
    }
}

/// Parameter regions carry no enter/leave records
fn is_parameter_region(region_name: &str) -> bool {
    region_name.contains('=')
}

/// A named trace record type
#[derive(Debug, Clone)]
pub struct Event {
    name: String,
    size: u64,
    doubled: bool,
    predicate: EventPredicate,
}

impl Event {
    pub fn new(name: impl Into<String>, predicate: EventPredicate) -> Self {
        Self {
            name: name.into(),
            size: 0,
            doubled: false,
            predicate,
        }
    }

    /// Mark the event as written twice per visit (at enter and at exit)
    pub fn doubled(mut self) -> Self {
        self.doubled = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record size in bytes per visit
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn is_doubled(&self) -> bool {
        self.doubled
    }

    pub fn predicate(&self) -> &EventPredicate {
        &self.predicate
    }

    fn set_size(&mut self, bytes: u64) {
        self.size = if self.doubled { bytes.saturating_mul(2) } else { bytes };
    }
}

/// Events keyed by name, iterated in name order
///
/// **Public** - owned by the estimator for one run
#[derive(Debug, Clone, Default)]
pub struct EventCatalog {
    events: BTreeMap<String, Event>,
}

impl EventCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an event; a later registration under the same name replaces it
    pub fn register(&mut self, event: Event) {
        if self.events.contains_key(event.name()) {
            debug!("Replacing event registration: {}", event.name());
        }
        self.events.insert(event.name.clone(), event);
    }

    /// Record size of an event, 0 when unknown
    pub fn size_of(&self, name: &str) -> u64 {
        self.events.get(name).map(Event::size).unwrap_or(0)
    }

    /// Update the record size of a known event
    ///
    /// Doubled events store twice the given value.
    /// Returns false when no event has this name.
    pub fn set_size(&mut self, name: &str, bytes: u64) -> bool {
        match self.events.get_mut(name) {
            Some(event) => {
                event.set_size(bytes);
                true
            }
            None => false,
        }
    }

    /// Whether `event` fires in the region; false for unknown events
    pub fn occurs_in(&self, event: &str, region_name: &str) -> bool {
        self.events
            .get(event)
            .map(|e| e.predicate.matches(region_name))
            .unwrap_or(false)
    }

    /// Sum of the sizes of all events firing in the region
    pub fn bytes_per_visit(&self, region_name: &str) -> u64 {
        self.events
            .values()
            .filter(|e| e.predicate.matches(region_name))
            .map(Event::size)
            .sum()
    }

    pub fn get(&self, name: &str) -> Option<&Event> {
        self.events.get(name)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.events.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Values<'_, String, Event> {
        self.events.values()
    }
}
