//! Staff authentication
//!
//! - [`StaffSessionGate`] - PIN login that guards every order mutation

mod pin_gate;

pub use pin_gate::{KeypadResult, SessionState, StaffSessionGate};
