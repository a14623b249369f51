//! Box lifecycle states and the eligibility rules derived from them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lifecycle state of a physical box.
///
/// Serialized in the PascalCase form used on the wire (`"InStock"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoxState {
    InStock,
    Lost,
    MarkedForShipment,
    Receiving,
    Donated,
    Scrap,
    InTransit,
    NotDelivered,
}

/// All states, in display order.
pub const ALL_BOX_STATES: &[BoxState] = &[
    BoxState::InStock,
    BoxState::Lost,
    BoxState::MarkedForShipment,
    BoxState::Receiving,
    BoxState::Donated,
    BoxState::Scrap,
    BoxState::InTransit,
    BoxState::NotDelivered,
];

impl BoxState {
    /// Wire name, e.g. `"MarkedForShipment"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InStock => "InStock",
            Self::Lost => "Lost",
            Self::MarkedForShipment => "MarkedForShipment",
            Self::Receiving => "Receiving",
            Self::Donated => "Donated",
            Self::Scrap => "Scrap",
            Self::InTransit => "InTransit",
            Self::NotDelivered => "NotDelivered",
        }
    }

    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::InStock => "In Stock",
            Self::Lost => "Lost",
            Self::MarkedForShipment => "Marked for Shipment",
            Self::Receiving => "Receiving",
            Self::Donated => "Donated",
            Self::Scrap => "Scrap",
            Self::InTransit => "In Transit",
            Self::NotDelivered => "Not Delivered",
        }
    }

    /// Only boxes sitting in the warehouse can be put on a shipment.
    pub fn is_assignable_to_shipment(self) -> bool {
        matches!(self, Self::InStock)
    }

    /// Boxes that are physically gone or in someone else's hands cannot be
    /// moved between warehouse locations.
    pub fn is_movable(self) -> bool {
        !matches!(
            self,
            Self::MarkedForShipment | Self::Receiving | Self::InTransit | Self::NotDelivered
        )
    }
}

impl fmt::Display for BoxState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoxState {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_BOX_STATES
            .iter()
            .copied()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Unknown box state '{s}'. Must be one of: {}",
                    ALL_BOX_STATES
                        .iter()
                        .map(|state| state.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
    }
}
