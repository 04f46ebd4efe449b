//! Unified error codes for the POS workspace
//!
//! This module defines all error codes shared by pos-server and its clients.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication / staff session errors
//! - 4xxx: Order errors
//! - 5xxx: Payment / ledger errors
//! - 6xxx: Catalog errors
//! - 7xxx: Table errors
//! - 8xxx: Staff roster errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// No staff member is logged in
    NotAuthenticated = 1001,
    /// Entered PIN does not match the selected staff member
    InvalidPin = 1008,
    /// PIN submitted before a staff member was selected
    StaffNotSelected = 1009,
    /// A staff session is already active on this terminal
    SessionActive = 1010,

    // ==================== 4xxx: Order ====================
    /// Order line not found
    OrderItemNotFound = 4006,
    /// Order is empty
    OrderEmpty = 4007,
    /// Logout blocked by an unsaved order
    UnsavedOrderExists = 4008,
    /// Kitchen has not marked the order ready yet
    OrderNotReady = 4009,
    /// Quantity is not a positive integer or exceeds the per-line limit
    InvalidQuantity = 4010,

    // ==================== 5xxx: Payment ====================
    /// Transaction not found in the ledger
    TransactionNotFound = 5004,

    // ==================== 6xxx: Catalog ====================
    /// Food item not found
    FoodNotFound = 6001,
    /// Category not found
    CategoryNotFound = 6101,
    /// Discount is outside its validity window
    DiscountNotActive = 6802,

    // ==================== 7xxx: Table ====================
    /// Table not found
    TableNotFound = 7001,
    /// Table is occupied by another staff member
    TableOccupied = 7002,
    /// Table state changed underneath the caller
    TableStale = 7004,
    /// Table has active orders
    TableHasOrders = 7104,

    // ==================== 8xxx: Staff ====================
    /// Staff member not found
    StaffNotFound = 8001,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Table record store unreachable (read/write/subscribe failed)
    StoreUnavailable = 9004,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Soft warnings are reported to the user but never abort a flow
    #[inline]
    pub const fn is_soft_warning(&self) -> bool {
        matches!(self, ErrorCode::TableStale)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "No staff member is logged in",
            ErrorCode::InvalidPin => "Invalid PIN",
            ErrorCode::StaffNotSelected => "Select a staff member first",
            ErrorCode::SessionActive => "A staff session is already active",

            // Order
            ErrorCode::OrderItemNotFound => "Order item not found",
            ErrorCode::OrderEmpty => "Order is empty",
            ErrorCode::UnsavedOrderExists => "Save or clear the current order before logging out",
            ErrorCode::OrderNotReady => "Order is not ready for pickup yet",
            ErrorCode::InvalidQuantity => "Quantity must be between 1 and 9999",

            // Payment
            ErrorCode::TransactionNotFound => "Transaction not found",

            // Catalog
            ErrorCode::FoodNotFound => "Food not found",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::DiscountNotActive => "Discount is not currently active",

            // Table
            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::TableOccupied => "Table is occupied",
            ErrorCode::TableStale => "Table state changed, action skipped",
            ErrorCode::TableHasOrders => "Table has active orders",

            // Staff
            ErrorCode::StaffNotFound => "Staff member not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::StoreUnavailable => "Table store is unavailable",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1008 => Ok(ErrorCode::InvalidPin),
            1009 => Ok(ErrorCode::StaffNotSelected),
            1010 => Ok(ErrorCode::SessionActive),

            // Order
            4006 => Ok(ErrorCode::OrderItemNotFound),
            4007 => Ok(ErrorCode::OrderEmpty),
            4008 => Ok(ErrorCode::UnsavedOrderExists),
            4009 => Ok(ErrorCode::OrderNotReady),
            4010 => Ok(ErrorCode::InvalidQuantity),

            // Payment
            5004 => Ok(ErrorCode::TransactionNotFound),

            // Catalog
            6001 => Ok(ErrorCode::FoodNotFound),
            6101 => Ok(ErrorCode::CategoryNotFound),
            6802 => Ok(ErrorCode::DiscountNotActive),

            // Table
            7001 => Ok(ErrorCode::TableNotFound),
            7002 => Ok(ErrorCode::TableOccupied),
            7004 => Ok(ErrorCode::TableStale),
            7104 => Ok(ErrorCode::TableHasOrders),

            // Staff
            8001 => Ok(ErrorCode::StaffNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9004 => Ok(ErrorCode::StoreUnavailable),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::InvalidPin.code(), 1008);
        assert_eq!(ErrorCode::OrderEmpty.code(), 4007);
        assert_eq!(ErrorCode::UnsavedOrderExists.code(), 4008);
        assert_eq!(ErrorCode::OrderNotReady.code(), 4009);
        assert_eq!(ErrorCode::TableNotFound.code(), 7001);
        assert_eq!(ErrorCode::TableStale.code(), 7004);
        assert_eq!(ErrorCode::StoreUnavailable.code(), 9004);
    }

    #[test]
    fn test_try_from_known_and_unknown() {
        assert_eq!(ErrorCode::try_from(4009), Ok(ErrorCode::OrderNotReady));
        assert_eq!(ErrorCode::try_from(7004), Ok(ErrorCode::TableStale));
        assert_eq!(ErrorCode::try_from(3001), Err(InvalidErrorCode(3001)));
        assert_eq!(ErrorCode::try_from(2001), Err(InvalidErrorCode(2001)));
        assert_eq!(ErrorCode::try_from(4010), Ok(ErrorCode::InvalidQuantity));
        assert_eq!(ErrorCode::try_from(8), Ok(ErrorCode::ValueOutOfRange));
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::OrderEmpty.message(), "Order is empty");
        assert_eq!(ErrorCode::InvalidPin.message(), "Invalid PIN");
        assert_eq!(ErrorCode::InternalError.message(), "Internal server error");
    }

    #[test]
    fn test_soft_warning() {
        assert!(ErrorCode::TableStale.is_soft_warning());
        assert!(!ErrorCode::OrderNotReady.is_soft_warning());
    }

    #[test]
    fn test_serializes_as_number() {
        let json = serde_json::to_string(&ErrorCode::TableOccupied).unwrap();
        assert_eq!(json, "7002");
        let parsed: ErrorCode = serde_json::from_str("1008").unwrap();
        assert_eq!(parsed, ErrorCode::InvalidPin);
        assert!(serde_json::from_str::<ErrorCode>("12345").is_err());
    }

    #[test]
    fn test_invalid_error_code_display() {
        let err = InvalidErrorCode(999);
        assert_eq!(format!("{}", err), "invalid error code: 999");
    }
}
