use crate::response::Status;
use serde::{Deserialize, Serialize};
use std::error;
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServiceError {
    pub msg: String,
    pub status: Status,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let json = serde_json::to_string_pretty(&self).map_err(|_| fmt::Error)?;
        write!(f, "{}", json)
    }
}

impl error::Error for ServiceError {}

impl ServiceError {
    pub fn bad_request<T: fmt::Display>(msg: T) -> ServiceError {
        ServiceError {
            msg: msg.to_string(),
            status: Status::BadRequest,
        }
    }

    pub fn not_found<T: fmt::Display>(msg: T) -> ServiceError {
        ServiceError {
            msg: msg.to_string(),
            status: Status::NotFound,
        }
    }

    pub fn internal_server_error<T: fmt::Display>(msg: T) -> ServiceError {
        ServiceError {
            msg: msg.to_string(),
            status: Status::InternalServerError,
        }
    }

    /// Whether the caller can fix the request, as opposed to a fault on our side.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_renders_json_with_numeric_status() {
        let err = ServiceError::bad_request("missing column");
        let rendered: serde_json::Value = serde_json::from_str(&err.to_string()).unwrap();
        assert_eq!(rendered["msg"], "missing column");
        assert_eq!(rendered["status"], 400);
    }

    #[test]
    fn classifies_client_errors() {
        assert!(ServiceError::not_found("gone").is_client_error());
        assert!(!ServiceError::internal_server_error("boom").is_client_error());
    }
}
