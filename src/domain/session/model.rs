//! Charging session domain entity

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::shared::errors::DomainError;

/// Charging session status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    InProgress,
    Paused,
    Completed,
    /// Ended by an emergency stop
    Interrupted,
    Cancelled,
}

impl SessionStatus {
    pub const ALL: [SessionStatus; 5] = [
        Self::InProgress,
        Self::Paused,
        Self::Completed,
        Self::Interrupted,
        Self::Cancelled,
    ];

    pub const ACTIVE: [SessionStatus; 2] = [Self::InProgress, Self::Paused];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
            Self::Cancelled => "cancelled",
        }
    }

    /// In progress or paused: the session occupies its point.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::InProgress | Self::Paused)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// Transition table for generic status updates. The paused-session
    /// timeout closes sessions through its own path, not this table.
    pub fn can_transition_to(&self, next: SessionStatus) -> bool {
        use SessionStatus::*;
        match self {
            InProgress => matches!(next, Paused | Completed | Interrupted | Cancelled),
            Paused => matches!(next, InProgress),
            Completed | Interrupted | Cancelled => false,
        }
    }
}

impl FromStr for SessionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::Validation(format!("Unknown session status '{}'", s)))
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejects state-of-charge values outside 0..=100.
pub fn validate_soc(soc: i32) -> Result<i32, DomainError> {
    if (0..=100).contains(&soc) {
        Ok(soc)
    } else {
        Err(DomainError::Validation(format!(
            "SOC must be between 0 and 100, got {}",
            soc
        )))
    }
}

/// Charging session
#[derive(Debug, Clone)]
pub struct ChargingSession {
    pub id: i32,
    pub driver_id: i32,
    pub point_id: i32,
    /// `None` for walk-in sessions
    pub reservation_id: Option<i32>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub initial_soc: i32,
    /// Latest SOC reported by telemetry
    pub current_soc: Option<i32>,
    pub final_soc: Option<i32>,
    pub energy_used_kwh: f64,
    pub duration_minutes: i64,
    pub cost_before_discount: Decimal,
    pub discount: Decimal,
    pub final_cost: Decimal,
    pub status: SessionStatus,
    pub paused_at: Option<DateTime<Utc>>,
    /// Pause budget requested by staff when pausing
    pub max_pause_minutes: Option<i32>,
    pub updated_at: DateTime<Utc>,
}

impl ChargingSession {
    pub fn is_walk_in(&self) -> bool {
        self.reservation_id.is_none()
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Last SOC known for the session, falling back to the initial value
    pub fn last_known_soc(&self) -> i32 {
        self.current_soc.unwrap_or(self.initial_soc)
    }

    /// When a paused session runs out of its pause budget
    pub fn pause_deadline(&self, default_max_minutes: i64) -> Option<DateTime<Utc>> {
        let paused_at = self.paused_at?;
        let minutes = self
            .max_pause_minutes
            .map(i64::from)
            .unwrap_or(default_max_minutes);
        Some(paused_at + chrono::Duration::minutes(minutes))
    }
}

/// Data needed to open a session
#[derive(Debug, Clone)]
pub struct NewSession {
    pub driver_id: i32,
    pub point_id: i32,
    pub reservation_id: Option<i32>,
    pub initial_soc: i32,
    pub start_time: DateTime<Utc>,
}

/// Values written when a session reaches a terminal status.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionClosing {
    pub status: SessionStatus,
    pub end_time: DateTime<Utc>,
    pub final_soc: i32,
    pub energy_used_kwh: f64,
    pub duration_minutes: i64,
    pub cost_before_discount: Decimal,
    pub discount: Decimal,
    pub final_cost: Decimal,
}

impl SessionClosing {
    /// Duration is whole minutes of `end - start`; cost is
    /// `energy × price` rounded to two decimals. Discounts belong to the
    /// pricing plans and are zero here.
    pub fn compute(
        session: &ChargingSession,
        status: SessionStatus,
        end_time: DateTime<Utc>,
        final_soc: i32,
        energy_used_kwh: f64,
        price_per_kwh: Decimal,
    ) -> Self {
        let end_time = end_time.max(session.start_time);
        let energy_used_kwh = if energy_used_kwh.is_finite() {
            energy_used_kwh.max(0.0)
        } else {
            0.0
        };
        let energy = Decimal::from_f64(energy_used_kwh).unwrap_or_default();
        let cost_before_discount = (energy * price_per_kwh).round_dp(2);
        let discount = Decimal::ZERO;

        Self {
            status,
            end_time,
            final_soc,
            energy_used_kwh,
            duration_minutes: (end_time - session.start_time).num_minutes(),
            cost_before_discount,
            discount,
            final_cost: cost_before_discount - discount,
        }
    }
}

/// Telemetry / audit entry attached to a session
#[derive(Debug, Clone)]
pub struct SessionLog {
    pub id: i32,
    pub session_id: i32,
    pub soc: i32,
    pub power_kw: Option<f64>,
    pub voltage: Option<f64>,
    pub temperature: Option<f64>,
    /// Staff action that produced the entry, if any
    pub note: Option<String>,
    pub logged_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSessionLog {
    pub session_id: i32,
    pub soc: i32,
    pub power_kw: Option<f64>,
    pub voltage: Option<f64>,
    pub temperature: Option<f64>,
    pub note: Option<String>,
    pub logged_at: DateTime<Utc>,
}

impl NewSessionLog {
    /// Audit entry for a staff action, carrying the session's last SOC.
    pub fn audit(session: &ChargingSession, note: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            session_id: session.id,
            soc: session.last_known_soc(),
            power_kw: None,
            voltage: None,
            temperature: None,
            note: Some(note.into()),
            logged_at: at,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
