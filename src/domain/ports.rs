use crate::core::geo::SphericalCap;
use crate::domain::model::{Occupation, ParkingSlot, Principal, SlotId, UserId, UserInfo};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Precondition of a conditional update. Always names exactly one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotFilter {
    pub id: SlotId,
    pub occupied: Option<bool>,
    pub occupier_id: Option<UserId>,
    /// Matches only when the current stop end is strictly earlier than this.
    pub stop_end_before: Option<DateTime<Utc>>,
}

impl SlotFilter {
    pub fn by_id(id: SlotId) -> Self {
        Self {
            id,
            occupied: None,
            occupier_id: None,
            stop_end_before: None,
        }
    }

    pub fn occupied(mut self, occupied: bool) -> Self {
        self.occupied = Some(occupied);
        self
    }

    pub fn occupier(mut self, occupier_id: UserId) -> Self {
        self.occupier_id = Some(occupier_id);
        self
    }

    pub fn stop_end_before(mut self, bound: DateTime<Utc>) -> Self {
        self.stop_end_before = Some(bound);
        self
    }

    pub fn matches(&self, slot: &ParkingSlot) -> bool {
        if slot.id != self.id {
            return false;
        }
        if let Some(occupied) = self.occupied {
            if slot.is_occupied() != occupied {
                return false;
            }
        }
        if let Some(occupier_id) = &self.occupier_id {
            if slot.occupier_id() != Some(occupier_id) {
                return false;
            }
        }
        if let Some(bound) = self.stop_end_before {
            match slot.stop_end() {
                Some(stop_end) if stop_end < bound => {}
                _ => return false,
            }
        }
        true
    }
}

/// Write half of a conditional update. Each variant keeps the
/// occupied / stop end / occupier triple consistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotMutation {
    Occupy(Occupation),
    Extend { stop_end: DateTime<Utc> },
    Release,
}

impl SlotMutation {
    pub fn apply(&self, slot: &mut ParkingSlot) {
        match self {
            Self::Occupy(occupation) => slot.occupation = Some(occupation.clone()),
            Self::Extend { stop_end } => {
                if let Some(occupation) = slot.occupation.as_mut() {
                    occupation.stop_end = *stop_end;
                }
            }
            Self::Release => slot.occupation = None,
        }
    }
}

/// Durable store of parking slots. Every method is a single round trip and
/// `conditional_update` must test and set atomically.
#[async_trait]
pub trait SlotRepository: Send + Sync {
    async fn get(&self, id: &SlotId) -> Result<Option<ParkingSlot>>;

    async fn find_all(&self) -> Result<Vec<ParkingSlot>>;

    /// Fails with `MultipleOccupations` when more than one slot matches.
    async fn find_by_occupier(&self, user_id: &UserId) -> Result<Option<ParkingSlot>>;

    async fn find_within_radius(&self, cap: &SphericalCap) -> Result<Vec<ParkingSlot>>;

    /// Returns how many slots matched `filter` (0 or 1).
    async fn conditional_update(&self, filter: &SlotFilter, mutation: &SlotMutation) -> Result<u64>;
}

#[async_trait]
pub trait TokenIssuer: Send + Sync {
    async fn issue_token(&self, email: &str) -> Result<String>;
    async fn verify_token(&self, token: &str) -> Result<Option<Principal>>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn lookup_user(&self, email: &str) -> Result<Option<UserInfo>>;
}

#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send_mail(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}
