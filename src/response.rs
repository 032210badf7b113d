use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ServiceError;

/// HTTP-style outcome of an invocation; serialized as its numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Status {
    Ok,
    Accepted,
    BadRequest,
    NotFound,
    InternalServerError,
    GatewayTimeout,
}

impl Status {
    pub fn code(&self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::Accepted => 202,
            Status::BadRequest => 400,
            Status::NotFound => 404,
            Status::InternalServerError => 500,
            Status::GatewayTimeout => 504,
        }
    }
}

impl From<Status> for u16 {
    fn from(status: Status) -> u16 {
        status.code()
    }
}

impl TryFrom<u16> for Status {
    type Error = String;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            200 => Ok(Status::Ok),
            202 => Ok(Status::Accepted),
            400 => Ok(Status::BadRequest),
            404 => Ok(Status::NotFound),
            500 => Ok(Status::InternalServerError),
            504 => Ok(Status::GatewayTimeout),
            other => Err(format!("unsupported status code {}", other)),
        }
    }
}

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePayload {
    pub status_code: Status,
    pub headers: Value,
    pub body: Value,
}

pub fn make_response_payload(
    result: Result<Value, ServiceError>,
) -> Result<Value, lambda_runtime::Error> {
    let headers = json!({
        "Content-Type": "application/json",
        "Access-Control-Allow-Origin": "*"
    });
    let response_payload = match result {
        Err(err) => ResponsePayload {
            status_code: err.status,
            headers,
            body: Value::String(err.msg),
        },
        Ok(body) => ResponsePayload {
            status_code: Status::Ok,
            headers,
            body,
        },
    };
    serde_json::to_value(response_payload).map_err(lambda_runtime::Error::from)
}
