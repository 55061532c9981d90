//! Staff operations on running sessions
//!
//! Pause, resume and emergency stop are restricted to staff assigned to
//! the station that owns the session's charging point.

use std::sync::Arc;

use tracing::info;

use super::SessionService;
use crate::domain::{ChargingSession, DomainError, DomainResult, RepositoryProvider};

pub struct StaffService {
    repos: Arc<dyn RepositoryProvider>,
    sessions: Arc<SessionService>,
}

impl StaffService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, sessions: Arc<SessionService>) -> Self {
        Self { repos, sessions }
    }

    /// Fails with `Unauthorized` unless `staff_id` is assigned to the
    /// station of the session's point.
    pub async fn authorize(&self, staff_id: &str, session_id: i32) -> DomainResult<ChargingSession> {
        let session = self.sessions.get_session(session_id).await?;
        let point = self
            .repos
            .stations()
            .find_point(session.point_id)
            .await?
            .ok_or_else(|| DomainError::not_found("ChargingPoint", "id", session.point_id))?;

        if !self.repos.staff().is_assigned(staff_id, point.station_id).await? {
            return Err(DomainError::Unauthorized(format!(
                "NotAssigned: staff {} is not assigned to station {}",
                staff_id, point.station_id
            )));
        }
        Ok(session)
    }

    pub async fn pause(
        &self,
        staff_id: &str,
        session_id: i32,
        max_pause_minutes: Option<i32>,
        reason: Option<&str>,
    ) -> DomainResult<ChargingSession> {
        self.authorize(staff_id, session_id).await?;
        let note = audit_note("paused", staff_id, reason);
        let session = self
            .sessions
            .pause(session_id, max_pause_minutes, &note)
            .await?;
        info!(session_id, staff_id, "Session paused by staff");
        Ok(session)
    }

    pub async fn resume(&self, staff_id: &str, session_id: i32) -> DomainResult<ChargingSession> {
        self.authorize(staff_id, session_id).await?;
        let note = audit_note("resumed", staff_id, None);
        let session = self.sessions.resume(session_id, &note).await?;
        info!(session_id, staff_id, "Session resumed by staff");
        Ok(session)
    }

    pub async fn emergency_stop(
        &self,
        staff_id: &str,
        session_id: i32,
        reason: Option<&str>,
    ) -> DomainResult<ChargingSession> {
        self.authorize(staff_id, session_id).await?;
        let note = audit_note("emergency stop", staff_id, reason);
        self.sessions.emergency_stop(session_id, &note).await
    }
}

fn audit_note(action: &str, staff_id: &str, reason: Option<&str>) -> String {
    match reason.map(str::trim).filter(|r| !r.is_empty()) {
        Some(r) => format!("{} by staff {}: {}", action, staff_id, r),
        None => format!("{} by staff {}", action, staff_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::harness;
    use crate::domain::{PointStatus, SessionStatus, StaffAssignment};

    #[tokio::test]
    async fn unassigned_staff_is_rejected() {
        let h = harness().await;
        let s = h.walk_in().await;
        let err = h
            .services
            .staff
            .pause("intruder", s.id, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(ref m) if m.starts_with("NotAssigned")));
    }

    #[tokio::test]
    async fn assigned_staff_pauses_and_resumes_with_audit_trail() {
        let h = harness().await;
        h.assign_staff("staff-1").await;
        let s = h.walk_in().await;

        let paused = h
            .services
            .staff
            .pause("staff-1", s.id, Some(10), Some("cable check"))
            .await
            .unwrap();
        assert_eq!(paused.status, SessionStatus::Paused);
        assert_eq!(paused.max_pause_minutes, Some(10));
        assert_eq!(h.point_status().await, PointStatus::Paused);

        let resumed = h.services.staff.resume("staff-1", s.id).await.unwrap();
        assert_eq!(resumed.status, SessionStatus::InProgress);
        assert_eq!(h.point_status().await, PointStatus::InUse);

        let notes: Vec<String> = h
            .services
            .sessions
            .list_logs(s.id)
            .await
            .unwrap()
            .into_iter()
            .filter_map(|l| l.note)
            .collect();
        assert_eq!(
            notes,
            vec![
                "paused by staff staff-1: cable check".to_string(),
                "resumed by staff staff-1".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn emergency_stop_interrupts_and_parks_point() {
        let h = harness().await;
        h.assign_staff("staff-1").await;
        let s = h.walk_in().await;
        h.services
            .staff
            .pause("staff-1", s.id, None, None)
            .await
            .unwrap();

        let stopped = h
            .services
            .staff
            .emergency_stop("staff-1", s.id, Some("smoke"))
            .await
            .unwrap();
        assert_eq!(stopped.status, SessionStatus::Interrupted);
        assert!(stopped.end_time.is_some());
        assert_eq!(h.point_status().await, PointStatus::Maintenance);

        let err = h
            .services
            .staff
            .emergency_stop("staff-1", s.id, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
    }

    #[tokio::test]
    async fn assignment_is_per_station() {
        let h = harness().await;
        let other = h
            .repos
            .stations()
            .save_station(crate::domain::Station::new("Elsewhere", "x"))
            .await
            .unwrap();
        h.repos
            .staff()
            .assign(StaffAssignment {
                staff_id: "staff-9".into(),
                station_id: other.id,
            })
            .await
            .unwrap();
        let s = h.walk_in().await;

        let err = h.services.staff.resume("staff-9", s.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));
    }
}
