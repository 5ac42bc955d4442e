//! Named exits leaving an action.

use std::collections::BTreeMap;

/// Labeled branches from one action to others.
///
/// Keys are exit labels, values are target action names. Targets are resolved
/// by the owning [`Scene`](crate::Scene) at lookup time, so an exit may name an
/// action that is added later.
///
/// Labels are kept sorted; the "first" label (used when a selection has to be
/// corrected) is therefore the lexicographically smallest one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ExitMap(BTreeMap<String, String>);

impl ExitMap {
    /// Creates an empty exit map (no branching).
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, label: impl Into<String>, target: impl Into<String>) -> Self {
        self.insert(label, target);
        self
    }

    /// Adds or replaces an exit, returning the previous target of `label`.
    pub fn insert(&mut self, label: impl Into<String>, target: impl Into<String>) -> Option<String> {
        self.0.insert(label.into(), target.into())
    }

    /// Target action name for `label`.
    pub fn target(&self, label: &str) -> Option<&str> {
        self.0.get(label).map(String::as_str)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.contains_key(label)
    }

    /// Labels in sorted order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn first_label(&self) -> Option<&str> {
        self.labels().next()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the selection that should be active after the exits become
    /// `self`.
    ///
    /// A selection that is still a valid label is kept. Otherwise, when the map
    /// is non-empty, the first label is chosen. With an empty map the current
    /// selection is left untouched.
    pub(crate) fn corrected_selection(&self, selected: Option<&str>) -> Option<String> {
        match selected {
            Some(label) if self.contains(label) => Some(label.to_owned()),
            _ if self.is_empty() => selected.map(str::to_owned),
            _ => self.first_label().map(str::to_owned),
        }
    }
}

impl<L, T> FromIterator<(L, T)> for ExitMap
where
    L: Into<String>,
    T: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (L, T)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(label, target)| (label.into(), target.into()))
                .collect(),
        )
    }
}
