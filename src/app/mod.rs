//! Process-wide wiring: one slot store, one set of collaborators, opened at
//! start and shut down explicitly.

use crate::adapters::collaborators::{InMemoryTokenIssuer, LogMailSender, StaticUserDirectory};
use crate::adapters::memory::InMemorySlotRepository;
use crate::adapters::response::{Response, ResponseEncoder};
use crate::config::toml_config::ParkingConfig;
use crate::core::account::{self, Authenticator, PasswordRecovery};
use crate::core::geo::GeoRadiusTranslator;
use crate::core::occupancy::SlotOccupancyService;
use crate::domain::model::{Center, SlotId, UserId};
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    List,
    Get { slot_id: SlotId },
    OccupiedBy { user_id: UserId },
    Radius { center: Center },
    Occupy { user_id: UserId, slot_id: SlotId, stop_end: DateTime<Utc> },
    Extend { user_id: UserId, slot_id: SlotId, stop_end: DateTime<Utc> },
    Free { slot_id: SlotId },
    RecoverPassword { email: String },
    UserInfo { email: String },
}

pub struct ParkingApp {
    occupancy: SlotOccupancyService<InMemorySlotRepository>,
    directory: Arc<StaticUserDirectory>,
    issuer: Arc<InMemoryTokenIssuer>,
    mailer: Arc<LogMailSender>,
    recovery_base_url: String,
}

impl ParkingApp {
    pub async fn start(config: &ParkingConfig) -> Result<Self> {
        let repository = InMemorySlotRepository::open(&config.store.data_path).await?;
        Ok(Self::with_repository(config, repository))
    }

    pub fn with_repository(config: &ParkingConfig, repository: InMemorySlotRepository) -> Self {
        let translator = GeoRadiusTranslator::new(config.geo.earth_radius_km);
        Self {
            occupancy: SlotOccupancyService::new(Arc::new(repository), translator),
            directory: Arc::new(StaticUserDirectory::new(config.users.clone())),
            issuer: Arc::new(InMemoryTokenIssuer::new(config.token_ttl())),
            mailer: Arc::new(LogMailSender::new(config.mail.sender.clone())),
            recovery_base_url: config.mail.recovery_base_url.clone(),
        }
    }

    pub fn occupancy(&self) -> &SlotOccupancyService<InMemorySlotRepository> {
        &self.occupancy
    }

    pub fn issuer(&self) -> &Arc<InMemoryTokenIssuer> {
        &self.issuer
    }

    pub fn mailer(&self) -> &Arc<LogMailSender> {
        &self.mailer
    }

    pub async fn handle(&self, request: Request) -> Response {
        match request {
            Request::List => ResponseEncoder::slots(&self.occupancy.slots().await),
            Request::Get { slot_id } => ResponseEncoder::slot(&self.occupancy.slot(&slot_id).await),
            Request::OccupiedBy { user_id } => {
                ResponseEncoder::slot(&self.occupancy.slot_occupied_by(&user_id).await)
            }
            Request::Radius { center } => {
                ResponseEncoder::slots(&self.occupancy.slots_within(&center).await)
            }
            Request::Occupy {
                user_id,
                slot_id,
                stop_end,
            } => ResponseEncoder::occupy(&self.occupancy.occupy(&user_id, &slot_id, stop_end).await),
            Request::Extend {
                user_id,
                slot_id,
                stop_end,
            } => ResponseEncoder::extend(&self.occupancy.extend(&user_id, &slot_id, stop_end).await),
            Request::Free { slot_id } => ResponseEncoder::free(&self.occupancy.free(&slot_id).await),
            Request::RecoverPassword { email } => {
                let recovery = PasswordRecovery::new(
                    Arc::clone(&self.directory),
                    Arc::clone(&self.issuer),
                    Arc::clone(&self.mailer),
                    self.recovery_base_url.clone(),
                );
                ResponseEncoder::account(&recovery.recover(&email).await)
            }
            Request::UserInfo { email } => {
                ResponseEncoder::user_info(&account::user_info(self.directory.as_ref(), &email).await)
            }
        }
    }

    /// Runs `request` only if `token` authenticates.
    pub async fn handle_authenticated(&self, token: &str, request: Request) -> Response {
        let authenticator = Authenticator::new(Arc::clone(&self.issuer));
        match authenticator.authenticate(token).await {
            Ok(principal) => {
                tracing::debug!(email = %principal.email, "Request authenticated");
                self.handle(request).await
            }
            Err(e) => ResponseEncoder::account(&Err(e)),
        }
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.occupancy.repository().shutdown().await
    }
}
