//! Energy accounting policies
//!
//! How many kWh a session delivered is decided at stop time by an
//! [`EnergyPolicy`].

use crate::domain::{ChargingSession, SessionLog};

pub trait EnergyPolicy: Send + Sync {
    /// Energy delivered in kWh, never negative.
    fn energy_kwh(&self, session: &ChargingSession, final_soc: i32, logs: &[SessionLog]) -> f64;
}

/// `Δsoc × battery capacity`
#[derive(Debug, Clone, Copy)]
pub struct SocDeltaPolicy {
    pub battery_capacity_kwh: f64,
}

impl SocDeltaPolicy {
    pub fn new(battery_capacity_kwh: f64) -> Self {
        Self {
            battery_capacity_kwh,
        }
    }
}

impl EnergyPolicy for SocDeltaPolicy {
    fn energy_kwh(&self, session: &ChargingSession, final_soc: i32, _logs: &[SessionLog]) -> f64 {
        let delta = (final_soc - session.initial_soc).max(0) as f64;
        delta / 100.0 * self.battery_capacity_kwh
    }
}

/// Integrates logged power over time (trapezoidal rule). Falls back to
/// the SOC delta when fewer than two power readings exist.
#[derive(Debug, Clone, Copy)]
pub struct TelemetryPolicy {
    fallback: SocDeltaPolicy,
}

impl TelemetryPolicy {
    pub fn new(fallback: SocDeltaPolicy) -> Self {
        Self { fallback }
    }
}

impl EnergyPolicy for TelemetryPolicy {
    fn energy_kwh(&self, session: &ChargingSession, final_soc: i32, logs: &[SessionLog]) -> f64 {
        let mut readings: Vec<_> = logs
            .iter()
            .filter_map(|l| l.power_kw.map(|p| (l.logged_at, p.max(0.0))))
            .collect();
        if readings.len() < 2 {
            return self.fallback.energy_kwh(session, final_soc, logs);
        }
        readings.sort_by_key(|(at, _)| *at);

        readings
            .windows(2)
            .map(|pair| {
                let (t0, p0) = pair[0];
                let (t1, p1) = pair[1];
                let hours = (t1 - t0).num_milliseconds() as f64 / 3_600_000.0;
                (p0 + p1) / 2.0 * hours
            })
            .sum::<f64>()
            .max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::SessionStatus;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap()
    }

    fn session() -> ChargingSession {
        ChargingSession {
            id: 1,
            driver_id: 1,
            point_id: 1,
            reservation_id: None,
            start_time: start(),
            end_time: None,
            initial_soc: 20,
            current_soc: None,
            final_soc: None,
            energy_used_kwh: 0.0,
            duration_minutes: 0,
            cost_before_discount: Decimal::ZERO,
            discount: Decimal::ZERO,
            final_cost: Decimal::ZERO,
            status: SessionStatus::InProgress,
            paused_at: None,
            max_pause_minutes: None,
            updated_at: start(),
        }
    }

    fn log(minutes: i64, power_kw: Option<f64>) -> SessionLog {
        SessionLog {
            id: 0,
            session_id: 1,
            soc: 50,
            power_kw,
            voltage: None,
            temperature: None,
            note: None,
            logged_at: start() + Duration::minutes(minutes),
        }
    }

    #[test]
    fn soc_delta_scales_with_capacity() {
        let p = SocDeltaPolicy::new(60.0);
        assert!((p.energy_kwh(&session(), 80, &[]) - 36.0).abs() < 1e-9);
    }

    #[test]
    fn soc_drop_counts_as_zero() {
        let p = SocDeltaPolicy::new(60.0);
        assert_eq!(p.energy_kwh(&session(), 10, &[]), 0.0);
    }

    #[test]
    fn telemetry_integrates_power() {
        let p = TelemetryPolicy::new(SocDeltaPolicy::new(60.0));
        // 50 kW flat for 30 minutes, then ramping down to 30 kW over 30 minutes
        let logs = vec![log(0, Some(50.0)), log(30, Some(50.0)), log(60, Some(30.0))];
        let e = p.energy_kwh(&session(), 80, &logs);
        assert!((e - (25.0 + 20.0)).abs() < 1e-9, "{}", e);
    }

    #[test]
    fn telemetry_ignores_audit_entries_and_falls_back() {
        let p = TelemetryPolicy::new(SocDeltaPolicy::new(60.0));
        let logs = vec![log(0, Some(50.0)), log(10, None)];
        assert!((p.energy_kwh(&session(), 80, &logs) - 36.0).abs() < 1e-9);
    }
}
