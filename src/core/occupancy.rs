use crate::core::geo::GeoRadiusTranslator;
use crate::domain::model::{Center, Occupation, ParkingSlot, SlotId, UserId};
use crate::domain::ports::{SlotFilter, SlotMutation, SlotRepository};
use crate::utils::error::{
    ConflictReason, Denial, InputViolation, ParkingError, Result, StateViolation,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreeOutcome {
    Released,
    AlreadyFree,
}

/// Occupy / extend / free transitions over slots held by a repository.
///
/// The service keeps no slot state of its own. Each transition is one
/// conditional update whose filter encodes the precondition; a zero match
/// count is the failure signal, and only then is the slot re-read to tell
/// the caller why.
pub struct SlotOccupancyService<R: SlotRepository> {
    repository: Arc<R>,
    translator: GeoRadiusTranslator,
}

impl<R: SlotRepository> Clone for SlotOccupancyService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            translator: self.translator,
        }
    }
}

impl<R: SlotRepository> SlotOccupancyService<R> {
    pub fn new(repository: Arc<R>, translator: GeoRadiusTranslator) -> Self {
        Self {
            repository,
            translator,
        }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    pub async fn occupy(
        &self,
        user_id: &UserId,
        slot_id: &SlotId,
        stop_end: DateTime<Utc>,
    ) -> Result<()> {
        tracing::debug!(%user_id, %slot_id, %stop_end, "Occupy requested");

        let filter = SlotFilter::by_id(slot_id.clone()).occupied(false);
        let mutation = SlotMutation::Occupy(Occupation {
            occupier_id: user_id.clone(),
            stop_end,
        });

        if self.repository.conditional_update(&filter, &mutation).await? > 0 {
            tracing::info!(%user_id, %slot_id, %stop_end, "Parking slot occupied");
            return Ok(());
        }

        let error = match self.repository.get(slot_id).await? {
            None => not_found(slot_id),
            Some(_) => ParkingError::Conflict(ConflictReason::AlreadyOccupied),
        };
        tracing::warn!(%user_id, %slot_id, %error, "Occupy rejected");
        Err(error)
    }

    pub async fn extend(
        &self,
        user_id: &UserId,
        slot_id: &SlotId,
        new_stop_end: DateTime<Utc>,
    ) -> Result<()> {
        tracing::debug!(%user_id, %slot_id, %new_stop_end, "Extend requested");

        let filter = SlotFilter::by_id(slot_id.clone())
            .occupied(true)
            .occupier(user_id.clone())
            .stop_end_before(new_stop_end);
        let mutation = SlotMutation::Extend {
            stop_end: new_stop_end,
        };

        if self.repository.conditional_update(&filter, &mutation).await? > 0 {
            tracing::info!(%user_id, %slot_id, %new_stop_end, "Parking slot occupation extended");
            return Ok(());
        }

        let error = match self.repository.get(slot_id).await? {
            None => not_found(slot_id),
            Some(slot) => match slot.occupation {
                None => ParkingError::InvalidState(StateViolation::NotOccupied),
                Some(current) if new_stop_end <= current.stop_end => {
                    ParkingError::InvalidInput(InputViolation::StopEndNotLater)
                }
                Some(current) if &current.occupier_id != user_id => {
                    ParkingError::Forbidden(Denial::NotOccupier)
                }
                Some(_) => ParkingError::Conflict(ConflictReason::ConcurrentModification),
            },
        };
        tracing::warn!(%user_id, %slot_id, %error, "Extend rejected");
        Err(error)
    }

    /// Idempotent: freeing a free slot succeeds without touching it.
    pub async fn free(&self, slot_id: &SlotId) -> Result<FreeOutcome> {
        tracing::debug!(%slot_id, "Free requested");

        let filter = SlotFilter::by_id(slot_id.clone()).occupied(true);
        if self
            .repository
            .conditional_update(&filter, &SlotMutation::Release)
            .await?
            > 0
        {
            tracing::info!(%slot_id, "Parking slot freed");
            return Ok(FreeOutcome::Released);
        }

        match self.repository.get(slot_id).await? {
            None => {
                tracing::warn!(%slot_id, "Free rejected, unknown slot");
                Err(not_found(slot_id))
            }
            Some(_) => {
                tracing::debug!(%slot_id, "Parking slot already free");
                Ok(FreeOutcome::AlreadyFree)
            }
        }
    }

    pub async fn slot(&self, slot_id: &SlotId) -> Result<Option<ParkingSlot>> {
        self.repository.get(slot_id).await
    }

    pub async fn slots(&self) -> Result<Vec<ParkingSlot>> {
        self.repository.find_all().await
    }

    pub async fn slot_occupied_by(&self, user_id: &UserId) -> Result<Option<ParkingSlot>> {
        self.repository.find_by_occupier(user_id).await
    }

    /// Unordered; callers wanting nearest-first sort by distance themselves.
    pub async fn slots_within(&self, center: &Center) -> Result<Vec<ParkingSlot>> {
        let cap = self.translator.translate(center)?;
        let slots = self.repository.find_within_radius(&cap).await?;
        tracing::debug!(?center, found = slots.len(), "Radius search");
        Ok(slots)
    }
}

fn not_found(slot_id: &SlotId) -> ParkingError {
    ParkingError::NotFound {
        slot_id: slot_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemorySlotRepository;
    use crate::domain::model::GeoPoint;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
    }

    fn service() -> SlotOccupancyService<InMemorySlotRepository> {
        let repository = InMemorySlotRepository::from_slots(vec![
            ParkingSlot::free("S1", GeoPoint::new(44.0, 11.0)),
            ParkingSlot::free("S2", GeoPoint::new(44.03, 11.0)),
        ]);
        SlotOccupancyService::new(Arc::new(repository), GeoRadiusTranslator::default())
    }

    fn u(id: &str) -> UserId {
        UserId::from(id)
    }

    fn s(id: &str) -> SlotId {
        SlotId::from(id)
    }

    #[tokio::test]
    async fn test_occupy_free_slot() {
        let service = service();
        service.occupy(&u("U1"), &s("S1"), t0()).await.unwrap();

        let slot = service.slot(&s("S1")).await.unwrap().unwrap();
        assert_eq!(slot.occupier_id(), Some(&u("U1")));
        assert_eq!(slot.stop_end(), Some(t0()));
    }

    #[tokio::test]
    async fn test_occupy_unknown_slot() {
        let result = service().occupy(&u("U1"), &s("missing"), t0()).await;
        assert!(matches!(result, Err(ParkingError::NotFound { slot_id }) if slot_id == "missing"));
    }

    #[tokio::test]
    async fn test_occupy_occupied_slot_conflicts_for_everyone() {
        let service = service();
        service.occupy(&u("U1"), &s("S1"), t0()).await.unwrap();

        for user in ["U1", "U2"] {
            let result = service.occupy(&u(user), &s("S1"), t0() + Duration::hours(1)).await;
            assert!(matches!(
                result,
                Err(ParkingError::Conflict(ConflictReason::AlreadyOccupied))
            ));
        }
        let slot = service.slot(&s("S1")).await.unwrap().unwrap();
        assert_eq!(slot.stop_end(), Some(t0()));
    }

    #[tokio::test]
    async fn test_extend_rejections() {
        let service = service();
        let result = service.extend(&u("U1"), &s("nope"), t0()).await;
        assert!(matches!(result, Err(ParkingError::NotFound { .. })));

        let result = service.extend(&u("U1"), &s("S1"), t0()).await;
        assert!(matches!(
            result,
            Err(ParkingError::InvalidState(StateViolation::NotOccupied))
        ));

        service.occupy(&u("U1"), &s("S1"), t0()).await.unwrap();

        let result = service.extend(&u("U1"), &s("S1"), t0()).await;
        assert!(matches!(
            result,
            Err(ParkingError::InvalidInput(InputViolation::StopEndNotLater))
        ));

        let result = service.extend(&u("U2"), &s("S1"), t0() + Duration::hours(1)).await;
        assert!(matches!(
            result,
            Err(ParkingError::Forbidden(Denial::NotOccupier))
        ));

        let slot = service.slot(&s("S1")).await.unwrap().unwrap();
        assert_eq!(slot.stop_end(), Some(t0()));
    }

    #[tokio::test]
    async fn test_extend_by_occupier() {
        let service = service();
        service.occupy(&u("U1"), &s("S1"), t0()).await.unwrap();
        service
            .extend(&u("U1"), &s("S1"), t0() + Duration::hours(2))
            .await
            .unwrap();

        let slot = service.slot(&s("S1")).await.unwrap().unwrap();
        assert_eq!(slot.stop_end(), Some(t0() + Duration::hours(2)));
        assert_eq!(slot.occupier_id(), Some(&u("U1")));
    }

    #[tokio::test]
    async fn test_free_is_idempotent() {
        let service = service();
        service.occupy(&u("U1"), &s("S1"), t0()).await.unwrap();

        assert_eq!(service.free(&s("S1")).await.unwrap(), FreeOutcome::Released);
        let first = service.slot(&s("S1")).await.unwrap();
        assert_eq!(service.free(&s("S1")).await.unwrap(), FreeOutcome::AlreadyFree);
        let second = service.slot(&s("S1")).await.unwrap();

        assert_eq!(first, second);
        assert!(!first.unwrap().is_occupied());
    }

    #[tokio::test]
    async fn test_free_unknown_slot() {
        let result = service().free(&s("missing")).await;
        assert!(matches!(result, Err(ParkingError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_slot_occupied_by() {
        let service = service();
        assert_eq!(service.slot_occupied_by(&u("U1")).await.unwrap(), None);

        service.occupy(&u("U1"), &s("S2"), t0()).await.unwrap();
        let slot = service.slot_occupied_by(&u("U1")).await.unwrap().unwrap();
        assert_eq!(slot.id, s("S2"));
    }

    #[tokio::test]
    async fn test_slots_within_radius() {
        let service = service();
        let mut ids: Vec<SlotId> = service
            .slots_within(&Center::new(44.0, 11.0, 5.0))
            .await
            .unwrap()
            .into_iter()
            .map(|slot| slot.id)
            .collect();
        ids.sort();
        assert_eq!(ids, vec![s("S1"), s("S2")]);

        let near = service
            .slots_within(&Center::new(44.0, 11.0, 1.0))
            .await
            .unwrap();
        assert_eq!(near.len(), 1);

        let result = service.slots_within(&Center::new(44.0, 11.0, -1.0)).await;
        assert!(matches!(result, Err(ParkingError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_storage_outage_surfaces_as_unavailable() {
        let service = service();
        service.repository().shutdown().await.unwrap();

        let result = service.occupy(&u("U1"), &s("S1"), t0()).await;
        assert!(matches!(result, Err(ParkingError::Unavailable { .. })));
        assert!(result.unwrap_err().is_retryable());
    }
}
