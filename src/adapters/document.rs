//! Persisted layout of a parking slot.
//!
//! ```json
//! {
//!   "id": "S1",
//!   "occupied": true,
//!   "stopEnd": "2024-05-01T09:00:00Z",
//!   "occupierId": "U1",
//!   "location": { "type": "Point", "coordinates": [11.0, 44.0] }
//! }
//! ```
//!
//! Coordinates are `[longitude, latitude]`. `stopEnd` and `occupierId` are
//! absent on a free slot.

use crate::domain::model::{GeoPoint, Occupation, ParkingSlot, SlotId, UserId};
use crate::utils::error::ParkingError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointType {
    Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointDocument {
    #[serde(rename = "type")]
    pub kind: PointType,
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
}

impl From<GeoPoint> for PointDocument {
    fn from(point: GeoPoint) -> Self {
        Self {
            kind: PointType::Point,
            coordinates: [point.longitude, point.latitude],
        }
    }
}

impl From<PointDocument> for GeoPoint {
    fn from(document: PointDocument) -> Self {
        let [longitude, latitude] = document.coordinates;
        GeoPoint {
            latitude,
            longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotDocument {
    pub id: String,
    pub occupied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_end: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupier_id: Option<String>,
    pub location: PointDocument,
}

impl From<&ParkingSlot> for SlotDocument {
    fn from(slot: &ParkingSlot) -> Self {
        Self {
            id: slot.id.to_string(),
            occupied: slot.is_occupied(),
            stop_end: slot.stop_end(),
            occupier_id: slot.occupier_id().map(|id| id.to_string()),
            location: slot.location.into(),
        }
    }
}

impl TryFrom<SlotDocument> for ParkingSlot {
    type Error = ParkingError;

    fn try_from(document: SlotDocument) -> Result<Self, Self::Error> {
        let occupation = match (document.occupied, document.stop_end, document.occupier_id) {
            (true, Some(stop_end), Some(occupier_id)) => Some(Occupation {
                occupier_id: UserId::new(occupier_id),
                stop_end,
            }),
            (false, None, None) => None,
            (occupied, stop_end, occupier_id) => {
                return Err(ParkingError::CorruptDocument {
                    slot_id: document.id,
                    reason: format!(
                        "occupied={} but stopEnd {} and occupierId {}",
                        occupied,
                        if stop_end.is_some() { "present" } else { "absent" },
                        if occupier_id.is_some() { "present" } else { "absent" },
                    ),
                })
            }
        };

        let location = GeoPoint::from(document.location);
        if !(-90.0..=90.0).contains(&location.latitude)
            || !(-180.0..=180.0).contains(&location.longitude)
        {
            return Err(ParkingError::CorruptDocument {
                slot_id: document.id,
                reason: format!(
                    "coordinates [{}, {}] out of range (expected [lon, lat])",
                    location.longitude, location.latitude
                ),
            });
        }

        Ok(ParkingSlot {
            id: SlotId::new(document.id),
            location,
            occupation,
        })
    }
}
