//! Three-state wire fields for partial updates.

use serde::{Deserialize, Deserializer};

/// A request field that may be missing, explicitly `null`, or set.
///
/// Use with `#[serde(default)]` so a missing key becomes [`Patch::Absent`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    #[default]
    Absent,
    Null,
    Present(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    pub fn as_present(&self) -> Option<&T> {
        match self {
            Patch::Present(value) => Some(value),
            _ => None,
        }
    }
}

impl<T: Default> Patch<T> {
    /// Write the sent value into `target`; `Null` resets it to the default.
    pub fn apply(self, target: &mut T) {
        match self {
            Patch::Absent => {}
            Patch::Null => *target = T::default(),
            Patch::Present(value) => *target = value,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Patch::Present(value),
            None => Patch::Null,
        })
    }
}
