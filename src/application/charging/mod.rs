//! Charging: session lifecycle, energy accounting, staff operations

pub mod energy;
pub mod session_service;
pub mod staff;

pub use energy::{EnergyPolicy, SocDeltaPolicy, TelemetryPolicy};
pub use session_service::{CanStartSession, SessionService, TelemetryReading};
pub use staff::StaffService;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Which energy accounting a deployment uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyPolicyKind {
    #[default]
    SocDelta,
    Telemetry,
}

/// Charging rules
#[derive(Debug, Clone)]
pub struct ChargingSettings {
    /// Assumed battery capacity for SOC-delta energy accounting
    pub battery_capacity_kwh: f64,
    /// Pause budget when staff do not give one
    pub paused_max_minutes: i64,
    pub energy_policy: EnergyPolicyKind,
}

impl ChargingSettings {
    pub fn build_energy_policy(&self) -> Arc<dyn EnergyPolicy> {
        let soc_delta = SocDeltaPolicy::new(self.battery_capacity_kwh);
        match self.energy_policy {
            EnergyPolicyKind::SocDelta => Arc::new(soc_delta),
            EnergyPolicyKind::Telemetry => Arc::new(TelemetryPolicy::new(soc_delta)),
        }
    }
}

impl Default for ChargingSettings {
    fn default() -> Self {
        Self {
            battery_capacity_kwh: 60.0,
            paused_max_minutes: 30,
            energy_policy: EnergyPolicyKind::SocDelta,
        }
    }
}
