use facet::Facet;
use std::collections::BTreeMap;

/// A single named quality signal.
#[derive(Facet, Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub value: f64,
}

/// Named measurements attached to a transaction. Last write for a name wins.
#[derive(Facet, Debug, Clone, Default, PartialEq)]
#[facet(transparent)]
pub struct Measurements(BTreeMap<String, Measurement>);

impl Measurements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.0.insert(name.into(), Measurement { value });
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).map(|measurement| measurement.value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0
            .iter()
            .map(|(name, measurement)| (name.as_str(), measurement.value))
    }
}
