//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::OrderItemNotFound
            | Self::TransactionNotFound
            | Self::FoodNotFound
            | Self::CategoryNotFound
            | Self::TableNotFound
            | Self::StaffNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::TableOccupied
            | Self::TableStale
            | Self::TableHasOrders
            | Self::UnsavedOrderExists
            | Self::OrderNotReady
            | Self::SessionActive => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated | Self::InvalidPin => StatusCode::UNAUTHORIZED,

            // 503 Service Unavailable (transient, client can retry)
            Self::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::InternalError | Self::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_status() {
        assert_eq!(ErrorCode::Success.http_status(), StatusCode::OK);
    }

    #[test]
    fn test_not_found_status() {
        assert_eq!(ErrorCode::TableNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::FoodNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::TransactionNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_conflict_status() {
        assert_eq!(ErrorCode::TableOccupied.http_status(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::TableHasOrders.http_status(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::OrderNotReady.http_status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_unavailable_status() {
        assert_eq!(
            ErrorCode::StoreUnavailable.http_status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_bad_request_default() {
        assert_eq!(
            ErrorCode::ValidationFailed.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ErrorCode::OrderEmpty.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::InvalidQuantity.http_status(),
            StatusCode::BAD_REQUEST
        );
    }
}
