pub mod account;
pub mod geo;
pub mod occupancy;

pub use crate::domain::model::{Center, GeoPoint, ParkingSlot, SlotId, UserId};
pub use crate::domain::ports::{MailSender, SlotRepository, TokenIssuer, UserDirectory};
pub use crate::utils::error::Result;
