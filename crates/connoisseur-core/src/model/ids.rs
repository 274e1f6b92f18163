use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier for a catalog row.
///
/// A row id is the row's 0-based position in the filtered catalog. It is
/// assigned once at load time and survives exclusion: excluding a row never
/// renumbers the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(usize);

impl RowId {
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for RowId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_id_ordering() {
        assert!(RowId::new(0) < RowId::new(1));
        assert_eq!(RowId::from(7), RowId::new(7));
    }

    #[test]
    fn test_row_id_display() {
        assert_eq!(RowId::new(42).to_string(), "42");
    }

    #[test]
    fn test_row_id_serializes_as_integer() {
        let json = serde_json::to_string(&RowId::new(3)).unwrap();
        assert_eq!(json, "3");
    }
}
