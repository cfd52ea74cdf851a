// ---------------------------------------------------------------------------
// PlacementError: configuration errors and rejected operations
// ---------------------------------------------------------------------------

use std::fmt;

/// Errors produced by placement configuration and placement operations.
///
/// None of these are fatal during play: systems log them and leave the
/// affected state unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum PlacementError {
    /// Grid cell size was zero, negative, or not finite.
    InvalidCellSize(f32),
    /// A scale handle axis is not one of the six principal unit directions.
    InvalidHandleAxis([f32; 3]),
    /// A setting is outside its accepted range.
    InvalidSetting { name: &'static str, value: f32 },
    /// A building slot index beyond the catalog's length.
    SlotOutOfRange { index: usize, len: usize },
    /// The slot exists but has no prefab assigned.
    EmptySlot(usize),
    /// The prefab factory does not know this prefab.
    UnknownPrefab(u32),
    /// A confirm was requested while the preview has no valid cell.
    NoValidCell,
    /// An operation that needs a selected prefab ran without one.
    NothingSelected,
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementError::InvalidCellSize(size) => {
                write!(f, "Grid cell size must be a positive finite number, got {size}")
            }
            PlacementError::InvalidHandleAxis(axis) => write!(
                f,
                "Scale handle axis ({}, {}, {}) is not a principal unit direction",
                axis[0], axis[1], axis[2]
            ),
            PlacementError::InvalidSetting { name, value } => {
                write!(f, "Placement setting '{name}' has invalid value {value}")
            }
            PlacementError::SlotOutOfRange { index, len } => {
                write!(f, "Slot index {index} is out of range (catalog has {len} slots)")
            }
            PlacementError::EmptySlot(index) => write!(f, "Slot {index} has no prefab assigned"),
            PlacementError::UnknownPrefab(id) => write!(f, "Prefab {id} is not known to the factory"),
            PlacementError::NoValidCell => write!(f, "Preview is not over a valid grid cell"),
            PlacementError::NothingSelected => write!(f, "No building prefab is selected"),
        }
    }
}

impl std::error::Error for PlacementError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mentions_offending_value() {
        let msg = PlacementError::InvalidCellSize(-2.0).to_string();
        assert!(msg.contains("-2"), "message was: {msg}");

        let msg = PlacementError::SlotOutOfRange { index: 7, len: 3 }.to_string();
        assert!(msg.contains('7') && msg.contains('3'), "message was: {msg}");
    }
}
