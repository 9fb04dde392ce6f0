/*!
 * Turns reconciliation reports, catalog reads and errors into HTTP-style responses
 */

use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;

use crate::error::{Error, Result};
use crate::reconcile::ReconciliationReport;

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub fn reconciliation(result: Result<ReconciliationReport>) -> Response {
    let message = match &result {
        Ok(report) if report.failed() > 0 => "Games synchronized with failures",
        _ => "Games synchronized successfully",
    };
    read(message, result)
}

/// `{"message": ..., "data": ...}` on success
pub fn read<T: Serialize>(message: &str, result: Result<T>) -> Response {
    let data = match result {
        Ok(data) => data,
        Err(e) => return failure(&e),
    };
    match serde_json::to_value(data) {
        Ok(data) => Response { status: 200, body: json!({ "message": message, "data": data }) },
        Err(e) => internal(&e.to_string(), vec![format!("{:?}", e)]),
    }
}

pub fn failure(e: &Error) -> Response {
    if e.is_internal() {
        error!("internal error: {e}");
        return internal(&e.to_string(), e.details());
    }
    Response { status: e.status(), body: json!({ "message": e.to_string() }) }
}

fn internal(message: &str, details: Vec<String>) -> Response {
    Response { status: 500, body: json!({ "error": message, "details": details }) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Association;
    use crate::reconcile::{GameOutcome, OutcomeStatus};

    #[test]
    fn report_is_200() {
        let report = ReconciliationReport {
            games: vec![GameOutcome {
                title: "Catan".into(),
                game_id: Some("g-1".into()),
                status: OutcomeStatus::Created,
                associations: vec![],
                persisted: None,
                error: None,
            }],
        };
        let response = reconciliation(Ok(report));
        assert_eq!(response.status, 200);
        assert!(response.is_success());
        assert_eq!(response.body["message"], "Games synchronized successfully");
        assert_eq!(response.body["data"]["games"][0]["status"], "created");
        assert_eq!(response.body["data"]["games"][0]["gameId"], "g-1");
    }

    #[test]
    fn reference_error_is_400() {
        let e =
            Error::NoValidReferences { game: "Catan".into(), association: Association::StoreLinks };
        let response = reconciliation(Err(e));
        assert_eq!(response.status, 400);
        assert_eq!(
            response.body,
            json!({ "message": "no valid store links found for game Catan" })
        );
    }

    #[test]
    fn malformed_body_is_400() {
        let e = serde_json::from_str::<Vec<u8>>("{").map_err(Error::from).unwrap_err();
        assert_eq!(failure(&e).status, 400);
    }

    #[test]
    fn store_error_is_500_with_details() {
        let response = failure(&Error::Db(diesel::result::Error::NotFound));
        assert_eq!(response.status, 500);
        assert_eq!(response.body["error"], diesel::result::Error::NotFound.to_string());
        assert_eq!(response.body["details"].as_array().unwrap().len(), 2);
        assert!(!response.is_success());
    }

    #[test]
    fn not_found_is_404() {
        let missing = Error::NotFound { what: "game", id: "x".into() };
        let response = read::<()>("Game retrieved successfully", Err(missing));
        assert_eq!(response.status, 404);
    }
}
