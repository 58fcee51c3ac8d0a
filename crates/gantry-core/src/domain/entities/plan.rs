use std::fmt;

use crate::domain::value_objects::UnitName;

/// Resolved order of units for one run.
///
/// Computed once by the composition resolver and reused for every phase.
/// Dynamic composition may append to it; it is never reordered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionPlan {
    order: Vec<UnitName>,
}

impl ExecutionPlan {
    pub(crate) fn from_order(order: Vec<UnitName>) -> Self {
        Self { order }
    }

    pub fn units(&self) -> &[UnitName] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnitName> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.order.iter().position(|n| n.as_str() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Plain unit names, mostly for reporting.
    pub fn names(&self) -> Vec<String> {
        self.order.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for ExecutionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names().join(" -> "))
    }
}

impl<'a> IntoIterator for &'a ExecutionPlan {
    type Item = &'a UnitName;
    type IntoIter = std::slice::Iter<'a, UnitName>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.iter()
    }
}
