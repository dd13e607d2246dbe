use crate::app::Request;
use crate::domain::model::{Center, SlotId, UserId};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "parking-slot")]
#[command(about = "Track parking slot occupancy and search slots by radius")]
pub struct CliConfig {
    #[arg(long, default_value = "parking.toml")]
    pub config: String,

    #[arg(long, help = "Override store.data_path from the config file")]
    pub data_path: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List every slot
    List,
    /// Show one slot
    Get {
        #[arg(long)]
        slot: String,
    },
    /// Show the slot a user currently occupies
    OccupiedBy {
        #[arg(long)]
        user: String,
    },
    /// Slots within a great-circle radius of a point
    Radius {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        #[arg(long)]
        radius_km: f64,
    },
    Occupy {
        #[arg(long)]
        user: String,
        #[arg(long)]
        slot: String,
        /// RFC 3339, e.g. 2024-05-01T09:00:00Z
        #[arg(long)]
        stop_end: DateTime<Utc>,
    },
    Extend {
        #[arg(long)]
        user: String,
        #[arg(long)]
        slot: String,
        #[arg(long)]
        stop_end: DateTime<Utc>,
    },
    Free {
        #[arg(long)]
        slot: String,
    },
    /// Mail a password recovery link
    RecoverPassword {
        #[arg(long)]
        email: String,
    },
    UserInfo {
        #[arg(long)]
        email: String,
    },
}

impl From<Command> for Request {
    fn from(command: Command) -> Self {
        match command {
            Command::List => Request::List,
            Command::Get { slot } => Request::Get {
                slot_id: SlotId::new(slot),
            },
            Command::OccupiedBy { user } => Request::OccupiedBy {
                user_id: UserId::new(user),
            },
            Command::Radius {
                lat,
                lon,
                radius_km,
            } => Request::Radius {
                center: Center::new(lat, lon, radius_km),
            },
            Command::Occupy {
                user,
                slot,
                stop_end,
            } => Request::Occupy {
                user_id: UserId::new(user),
                slot_id: SlotId::new(slot),
                stop_end,
            },
            Command::Extend {
                user,
                slot,
                stop_end,
            } => Request::Extend {
                user_id: UserId::new(user),
                slot_id: SlotId::new(slot),
                stop_end,
            },
            Command::Free { slot } => Request::Free {
                slot_id: SlotId::new(slot),
            },
            Command::RecoverPassword { email } => Request::RecoverPassword { email },
            Command::UserInfo { email } => Request::UserInfo { email },
        }
    }
}
