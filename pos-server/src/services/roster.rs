//! Staff roster

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{StaffMember, is_valid_pin};

#[async_trait]
pub trait StaffRoster: Send + Sync {
    async fn list_staff(&self) -> AppResult<Vec<StaffMember>>;

    async fn find_staff(&self, staff_id: i64) -> AppResult<StaffMember>;
}

/// In-memory roster, in insertion order
#[derive(Clone, Default)]
pub struct MemoryStaffRoster {
    staff: Arc<RwLock<Vec<StaffMember>>>,
}

impl MemoryStaffRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a staff member. PINs must be 4 digits.
    pub fn upsert(&self, member: StaffMember) -> AppResult<()> {
        if !is_valid_pin(&member.pin) {
            return Err(AppError::validation("PIN must be 4 digits").with_detail("staff_id", member.id));
        }
        let mut staff = self.staff.write();
        match staff.iter_mut().find(|s| s.id == member.id) {
            Some(existing) => *existing = member,
            None => staff.push(member),
        }
        Ok(())
    }
}

#[async_trait]
impl StaffRoster for MemoryStaffRoster {
    async fn list_staff(&self) -> AppResult<Vec<StaffMember>> {
        Ok(self.staff.read().clone())
    }

    async fn find_staff(&self, staff_id: i64) -> AppResult<StaffMember> {
        self.staff
            .read()
            .iter()
            .find(|s| s.id == staff_id)
            .cloned()
            .ok_or_else(|| AppError::new(ErrorCode::StaffNotFound).with_detail("staff_id", staff_id))
    }
}
