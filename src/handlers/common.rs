use crate::errors::{ApiError, ServiceError};
use crate::models::DateRange;
use crate::ApiResponse;
use axum::{http::StatusCode, Json};
use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

/// Result type for endpoints answering `201 Created`
pub type CreatedResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, Json(ApiResponse::success(data)))
}

/// Standard no content response
pub fn no_content_response() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ApiError> {
    input
        .validate()
        .map_err(|e| ApiError::ValidationError(format!("Validation failed: {}", e)))
}

/// Builds a range from optional query bounds: both or neither.
pub fn optional_range(
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<Option<DateRange>, ServiceError> {
    match (start_date, end_date) {
        (Some(start), Some(end)) => DateRange::new(start, end).map(Some),
        (None, None) => Ok(None),
        _ => Err(ServiceError::ValidationError(
            "startDate and endDate must be given together".to_string(),
        )),
    }
}

/// Parses a comma-separated id list, ignoring blank entries.
pub fn parse_uuid_list(raw: &str) -> Result<Vec<Uuid>, ServiceError> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            Uuid::parse_str(item)
                .map_err(|_| ServiceError::ValidationError(format!("'{}' is not a valid id", item)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_open_range_is_rejected() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1);
        assert!(optional_range(start, None).is_err());
        assert_eq!(optional_range(None, None).unwrap(), None);
        assert!(optional_range(start, start).unwrap().is_some());
    }

    #[test]
    fn uuid_list_skips_blanks_and_rejects_garbage() {
        let id = Uuid::new_v4();
        assert_eq!(parse_uuid_list(&format!(" {}, ,", id)).unwrap(), vec![id]);
        assert!(matches!(
            parse_uuid_list("not-a-uuid"),
            Err(ServiceError::ValidationError(_))
        ));
    }
}
