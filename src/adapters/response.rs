use crate::adapters::document::SlotDocument;
use crate::core::occupancy::FreeOutcome;
use crate::domain::model::{ParkingSlot, UserInfo};
use crate::utils::error::{ConflictReason, Denial, InputViolation, ParkingError, StateViolation};
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    Ok,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    InternalServerError,
    ServiceUnavailable,
}

impl Status {
    pub fn code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::InternalServerError => 500,
            Self::ServiceUnavailable => 503,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: Status,
    pub body: Value,
}

impl Response {
    fn success() -> Self {
        Self {
            status: Status::Ok,
            body: json!({ "successCode": "Success" }),
        }
    }

    fn error(status: Status, code: &str) -> Self {
        Self {
            status,
            body: json!({ "errorCode": code }),
        }
    }

    fn data(body: Value) -> Self {
        Self {
            status: Status::Ok,
            body,
        }
    }
}

/// Which operation produced the result; the same error kind maps to
/// different codes depending on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Occupy,
    Extend,
    Free,
    Query,
    Account,
}

pub struct ResponseEncoder;

impl ResponseEncoder {
    pub fn occupy(result: &Result<(), ParkingError>) -> Response {
        Self::unit(Operation::Occupy, result)
    }

    pub fn extend(result: &Result<(), ParkingError>) -> Response {
        Self::unit(Operation::Extend, result)
    }

    pub fn free(result: &Result<FreeOutcome, ParkingError>) -> Response {
        match result {
            Ok(_) => Response::success(),
            Err(e) => Self::error(Operation::Free, e),
        }
    }

    pub fn account(result: &Result<(), ParkingError>) -> Response {
        Self::unit(Operation::Account, result)
    }

    pub fn slots(result: &Result<Vec<ParkingSlot>, ParkingError>) -> Response {
        match result {
            Ok(slots) => {
                let documents: Vec<SlotDocument> = slots.iter().map(SlotDocument::from).collect();
                Response::data(json!(documents))
            }
            Err(e) => Self::error(Operation::Query, e),
        }
    }

    /// An absent slot is a successful `null`, not an error.
    pub fn slot(result: &Result<Option<ParkingSlot>, ParkingError>) -> Response {
        match result {
            Ok(slot) => Response::data(json!(slot.as_ref().map(SlotDocument::from))),
            Err(e) => Self::error(Operation::Query, e),
        }
    }

    pub fn user_info(result: &Result<Option<UserInfo>, ParkingError>) -> Response {
        match result {
            Ok(Some(info)) => Response::data(json!(info)),
            Ok(None) => Response::error(Status::NotFound, "UserNotFound"),
            Err(e) => Self::error(Operation::Account, e),
        }
    }

    fn unit(operation: Operation, result: &Result<(), ParkingError>) -> Response {
        match result {
            Ok(()) => Response::success(),
            Err(e) => Self::error(operation, e),
        }
    }

    pub fn error(operation: Operation, error: &ParkingError) -> Response {
        match error {
            ParkingError::NotFound { .. } if operation == Operation::Occupy => {
                Response::error(Status::NotFound, "ParkingSlotNotValid")
            }
            ParkingError::NotFound { .. } => Response::error(Status::NotFound, "ParkingSlotNotFound"),
            ParkingError::Conflict(ConflictReason::AlreadyOccupied) => {
                Response::error(Status::BadRequest, "ParkingSlotOccupied")
            }
            ParkingError::Conflict(ConflictReason::ConcurrentModification) => {
                Response::error(Status::Conflict, "ParkingSlotConcurrentlyModified")
            }
            ParkingError::InvalidState(StateViolation::NotOccupied) => {
                Response::error(Status::BadRequest, "ParkingSlotFree")
            }
            ParkingError::InvalidInput(InputViolation::StopEndNotLater) => {
                Response::error(Status::BadRequest, "InvalidParkingSlotStopEnd")
            }
            ParkingError::InvalidInput(InputViolation::InvalidCenter) => {
                Response::error(Status::BadRequest, "InvalidCenter")
            }
            ParkingError::Forbidden(Denial::NotOccupier) => {
                Response::error(Status::Forbidden, "ParkingSlotNotOccupiedByUser")
            }
            ParkingError::MultipleOccupations { .. } => {
                Response::error(Status::Conflict, "MultipleParkingSlotsOccupied")
            }
            ParkingError::UserNotFound { .. } => Response::error(Status::NotFound, "UserNotFound"),
            ParkingError::Unauthorized => Response::error(Status::Unauthorized, "Unauthorized"),
            ParkingError::Unavailable { .. } => {
                Response::error(Status::ServiceUnavailable, "ServiceUnavailable")
            }
            other => {
                tracing::error!(error = %other, "Unexpected failure");
                Response::error(Status::InternalServerError, "InternalError")
            }
        }
    }
}
