//! Driver profile and staff assignment

use crate::domain::station::ConnectorType;

/// Driver profile owned by a platform user
#[derive(Debug, Clone)]
pub struct Driver {
    pub id: i32,
    /// Identifier of the owning user account
    pub user_id: String,
    pub full_name: String,
    pub vehicle_connector: Option<ConnectorType>,
}

impl Driver {
    pub fn new(user_id: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            id: 0,
            user_id: user_id.into(),
            full_name: full_name.into(),
            vehicle_connector: None,
        }
    }
}

/// Staff member assigned to operate a station
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffAssignment {
    pub staff_id: String,
    pub station_id: i32,
}
