//! Staff Session Gate (员工 PIN 登录)
//!
//! ```text
//!            select_staff            submit_pin (match)
//! LoggedOut ─────────────▶ PinPending ───────────────────▶ LoggedIn
//!     ▲                     │    ▲  │ submit_pin (mismatch)   │
//!     │        cancel       │    └──┘ input cleared          │
//!     ├─────────────────────┘                                │
//!     └──────────── logout (no unsaved lines, or forced) ────┘
//! ```
//!
//! Table ownership is cooperative: when a table is held by a staff member,
//! only that staff member may be selected on it.

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{PIN_LENGTH, StaffMember, TableRecord};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    LoggedOut,
    PinPending {
        staff: StaffMember,
        /// Digits typed so far
        input: String,
    },
    LoggedIn {
        staff: StaffMember,
    },
}

/// Outcome of a keypad press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeypadResult {
    /// Digits entered so far
    Pending(usize),
    LoggedIn(StaffMember),
}

#[derive(Debug, Clone, Default)]
pub struct StaffSessionGate {
    state: SessionState,
}

impl StaffSessionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self.state, SessionState::LoggedIn { .. })
    }

    /// Staff member holding the session
    pub fn current_staff(&self) -> Option<&StaffMember> {
        match &self.state {
            SessionState::LoggedIn { staff } => Some(staff),
            _ => None,
        }
    }

    /// Guard for mutations
    pub fn require_staff(&self) -> AppResult<&StaffMember> {
        self.current_staff().ok_or_else(AppError::not_authenticated)
    }

    /// Staff a terminal may offer for this table
    ///
    /// An occupied table offers only its occupying staff member.
    pub fn selectable_staff(roster: &[StaffMember], table: Option<&TableRecord>) -> Vec<StaffMember> {
        let holder = table.filter(|t| t.is_occupied()).and_then(|t| t.staff_id);
        match holder {
            Some(holder_id) => roster.iter().filter(|s| s.id == holder_id).cloned().collect(),
            None => roster.to_vec(),
        }
    }

    /// LoggedOut / PinPending -> PinPending(staff)
    pub fn select_staff(&mut self, staff: StaffMember, table: Option<&TableRecord>) -> AppResult<()> {
        if let SessionState::LoggedIn { staff: current } = &self.state {
            return Err(AppError::new(ErrorCode::SessionActive).with_detail("staff_id", current.id));
        }
        if let Some(t) = table.filter(|t| t.is_held_by_other(staff.id)) {
            tracing::warn!(
                table_id = t.id,
                staff_id = staff.id,
                holder = ?t.staff_id,
                "Staff selection rejected, table held by another staff member"
            );
            return Err(AppError::table_occupied(
                t.id,
                t.occupied_by.clone().unwrap_or_default(),
            ));
        }
        self.state = SessionState::PinPending {
            staff,
            input: String::new(),
        };
        Ok(())
    }

    /// PinPending -> LoggedOut
    pub fn cancel(&mut self) {
        if matches!(self.state, SessionState::PinPending { .. }) {
            self.state = SessionState::LoggedOut;
        }
    }

    /// PinPending(staff) -> LoggedIn(staff) on match
    ///
    /// A mismatch keeps the selected staff member and clears the input.
    pub fn submit_pin(&mut self, pin: &str) -> AppResult<StaffMember> {
        match &mut self.state {
            SessionState::LoggedOut => Err(AppError::new(ErrorCode::StaffNotSelected)),
            SessionState::LoggedIn { staff } => {
                Err(AppError::new(ErrorCode::SessionActive).with_detail("staff_id", staff.id))
            }
            SessionState::PinPending { staff, input } => {
                if staff.pin_matches(pin) {
                    let staff = staff.clone();
                    tracing::info!(staff_id = staff.id, staff_name = %staff.name, "Staff logged in");
                    self.state = SessionState::LoggedIn {
                        staff: staff.clone(),
                    };
                    Ok(staff)
                } else {
                    input.clear();
                    tracing::warn!(staff_id = staff.id, "Invalid PIN entered");
                    Err(AppError::invalid_pin().with_detail("staff_id", staff.id))
                }
            }
        }
    }

    /// Keypad digit; the last digit submits automatically
    pub fn push_digit(&mut self, digit: char) -> AppResult<KeypadResult> {
        let SessionState::PinPending { input, .. } = &mut self.state else {
            return Err(AppError::new(ErrorCode::StaffNotSelected));
        };
        if !digit.is_ascii_digit() {
            return Err(AppError::validation("PIN accepts digits only"));
        }
        if input.len() < PIN_LENGTH {
            input.push(digit);
        }
        if input.len() < PIN_LENGTH {
            return Ok(KeypadResult::Pending(input.len()));
        }
        let pin = std::mem::take(input);
        self.submit_pin(&pin).map(KeypadResult::LoggedIn)
    }

    pub fn pop_digit(&mut self) {
        if let SessionState::PinPending { input, .. } = &mut self.state {
            input.pop();
        }
    }

    pub fn clear_input(&mut self) {
        if let SessionState::PinPending { input, .. } = &mut self.state {
            input.clear();
        }
    }

    /// LoggedIn -> LoggedOut
    ///
    /// Blocked with `UnsavedOrderExists` while the order has lines, unless
    /// forced.
    pub fn logout(&mut self, unsaved_lines: usize, force: bool) -> AppResult<()> {
        let SessionState::LoggedIn { staff } = &self.state else {
            return Err(AppError::not_authenticated());
        };
        if unsaved_lines > 0 && !force {
            return Err(AppError::new(ErrorCode::UnsavedOrderExists)
                .with_detail("lines", unsaved_lines as u64));
        }
        tracing::info!(staff_id = staff.id, forced = force, "Staff logged out");
        self.state = SessionState::LoggedOut;
        Ok(())
    }
}
