//! Staff Model

use serde::{Deserialize, Serialize};

/// Length of a staff PIN
pub const PIN_LENGTH: usize = 4;

/// Staff member (员工), read-only to the POS core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: i64,
    pub name: String,
    /// Never sent back to terminals
    #[serde(default, skip_serializing)]
    pub pin: String,
}

impl StaffMember {
    pub fn new(id: i64, name: impl Into<String>, pin: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            pin: pin.into(),
        }
    }

    pub fn pin_matches(&self, entered: &str) -> bool {
        is_valid_pin(entered) && self.pin == entered
    }
}

/// Exactly four ASCII digits
pub fn is_valid_pin(pin: &str) -> bool {
    pin.len() == PIN_LENGTH && pin.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_validation() {
        assert!(is_valid_pin("0420"));
        assert!(!is_valid_pin("042"));
        assert!(!is_valid_pin("04201"));
        assert!(!is_valid_pin("04a0"));
    }

    #[test]
    fn test_pin_matches() {
        let staff = StaffMember::new(1, "Alice", "1234");
        assert!(staff.pin_matches("1234"));
        assert!(!staff.pin_matches("4321"));
        assert!(!staff.pin_matches(""));
    }

    #[test]
    fn test_pin_not_serialized() {
        let staff = StaffMember::new(1, "Alice", "1234");
        let json = serde_json::to_string(&staff).unwrap();
        assert!(!json.contains("1234"));
        assert!(json.contains("Alice"));
    }
}
