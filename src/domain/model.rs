use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

macro_rules! string_identifier {
    ($name:ident) => {
        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_identifier!(SlotId);
string_identifier!(UserId);

/// A position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Radius search parameters. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Center {
    pub position: GeoPoint,
    pub radius_km: f64,
}

impl Center {
    pub fn new(latitude: f64, longitude: f64, radius_km: f64) -> Self {
        Self {
            position: GeoPoint::new(latitude, longitude),
            radius_km,
        }
    }
}

/// The binding between an occupied slot and its occupier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupation {
    pub occupier_id: UserId,
    pub stop_end: DateTime<Utc>,
}

/// A tracked parking space.
///
/// The flat `occupied` / `stopEnd` / `occupierId` triple of the stored
/// document collapses into `occupation`, so a slot is either free or carries
/// both an occupier and a stop end.
#[derive(Debug, Clone, PartialEq)]
pub struct ParkingSlot {
    pub id: SlotId,
    pub location: GeoPoint,
    pub occupation: Option<Occupation>,
}

impl ParkingSlot {
    pub fn free(id: impl Into<SlotId>, location: GeoPoint) -> Self {
        Self {
            id: id.into(),
            location,
            occupation: None,
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.occupation.is_some()
    }

    pub fn occupier_id(&self) -> Option<&UserId> {
        self.occupation.as_ref().map(|o| &o.occupier_id)
    }

    pub fn stop_end(&self) -> Option<DateTime<Utc>> {
        self.occupation.as_ref().map(|o| o.stop_end)
    }
}

/// Public profile of a registered user; the password never leaves the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
}

/// Identity recovered from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub email: String,
}
