//! Compatible station search
//!
//! Finds stations with at least one available point of the requested
//! connector type, optionally within a radius of the caller. Feeds
//! candidate points to booking.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use super::haversine_km;
use crate::domain::reservation::{ReservationStatus, TimeSlot};
use crate::domain::{
    ChargingPoint, ConnectorType, DomainError, DomainResult, PointStatus, RepositoryProvider,
    Station,
};
use crate::shared::clock::SharedClock;

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub result_cap: usize,
    pub default_radius_km: f64,
    pub past_buffer_minutes: i64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            result_cap: 20,
            default_radius_km: 10.0,
            past_buffer_minutes: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub connector_type: ConnectorType,
    /// When set, points with no free hour left on this date are skipped
    pub date: Option<NaiveDate>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_km: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct StationMatch {
    pub station: Station,
    pub distance_km: Option<f64>,
    pub compatible_points: Vec<ChargingPoint>,
}

impl StationMatch {
    pub fn compatible_count(&self) -> usize {
        self.compatible_points.len()
    }
}

/// One hour bucket of a point's day
#[derive(Debug, Clone, PartialEq)]
pub struct HourAvailability {
    pub hour: u32,
    pub slot: TimeSlot,
    pub available: bool,
    /// Code of the reservation holding the hour
    pub held_by: Option<String>,
}

pub struct StationSearchService {
    repos: Arc<dyn RepositoryProvider>,
    clock: SharedClock,
    settings: SearchSettings,
}

impl StationSearchService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, clock: SharedClock, settings: SearchSettings) -> Self {
        Self {
            repos,
            clock,
            settings,
        }
    }

    pub async fn search_compatible_stations(&self, query: &SearchQuery) -> DomainResult<Vec<StationMatch>> {
        let origin = match (query.latitude, query.longitude) {
            (Some(lat), Some(lon)) => {
                if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                    return Err(DomainError::Validation(format!(
                        "Coordinates out of range: ({}, {})",
                        lat, lon
                    )));
                }
                Some((lat, lon))
            }
            (None, None) => None,
            _ => {
                return Err(DomainError::Validation(
                    "Latitude and longitude must be given together".into(),
                ))
            }
        };
        let radius_km = query.radius_km.unwrap_or(self.settings.default_radius_km);
        if !(radius_km.is_finite() && radius_km > 0.0) {
            return Err(DomainError::Validation(format!(
                "Radius must be positive, got {} km",
                radius_km
            )));
        }

        let points = self
            .repos
            .stations()
            .find_points_by_connector(query.connector_type, Some(PointStatus::Available))
            .await?;

        let mut by_station: BTreeMap<i32, Vec<ChargingPoint>> = BTreeMap::new();
        for point in points {
            if let Some(date) = query.date {
                let hours = self.hourly_availability(point.id, date).await?;
                if !hours.iter().any(|h| h.available) {
                    continue;
                }
            }
            by_station.entry(point.station_id).or_default().push(point);
        }

        let mut matches = Vec::new();
        for (station_id, compatible_points) in by_station {
            let Some(station) = self.repos.stations().find_station(station_id).await? else {
                continue;
            };
            if !station.is_active {
                continue;
            }

            let distance_km = match (origin, station.coordinates()) {
                (Some(origin), Some(coords)) => {
                    let d = haversine_km(origin, coords);
                    if d > radius_km {
                        continue;
                    }
                    Some(d)
                }
                // Without a location the station cannot be placed in a radius
                (Some(_), None) => continue,
                (None, _) => None,
            };

            matches.push(StationMatch {
                station,
                distance_km,
                compatible_points,
            });
        }

        if origin.is_some() {
            matches.sort_by(|a, b| {
                a.distance_km
                    .partial_cmp(&b.distance_km)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }
        matches.truncate(self.settings.result_cap);
        Ok(matches)
    }

    /// The 24 hour buckets of `date` for a point. An hour is available
    /// when no slot-holding reservation overlaps it and it is not past.
    pub async fn hourly_availability(
        &self,
        point_id: i32,
        date: NaiveDate,
    ) -> DomainResult<Vec<HourAvailability>> {
        self.repos
            .stations()
            .find_point(point_id)
            .await?
            .ok_or_else(|| DomainError::not_found("ChargingPoint", "id", point_id))?;

        let day_start = TimeSlot::for_hour(date, 0)?.start;
        let day_end = TimeSlot::for_hour(date, 23)?.end;
        let holding = self
            .repos
            .reservations()
            .find_holding_for_point(point_id, day_start, day_end)
            .await?;

        let cutoff: DateTime<Utc> = self.clock.now() + Duration::minutes(self.settings.past_buffer_minutes);
        let mut hours = Vec::with_capacity(24);
        for hour in 0..24 {
            let slot = TimeSlot::for_hour(date, hour)?;
            let holder = holding
                .iter()
                .find(|r| ReservationStatus::SLOT_HOLDING.contains(&r.status) && r.slot().overlaps(&slot));
            hours.push(HourAvailability {
                hour,
                slot,
                available: holder.is_none() && slot.end > cutoff,
                held_by: holder.map(|r| r.code.clone()),
            });
        }
        Ok(hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{at, harness};

    fn june1() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn query(connector_type: ConnectorType) -> SearchQuery {
        SearchQuery {
            connector_type,
            date: None,
            latitude: None,
            longitude: None,
            radius_km: None,
        }
    }

    #[tokio::test]
    async fn radius_filters_and_sorts_by_distance() {
        let h = harness().await;
        // Fixture station sits at Berlin Mitte; add one at Alexanderplatz and one in Potsdam
        let near = h.add_station("Alex", (52.5219, 13.4132), ConnectorType::Ccs2).await;
        h.add_station("Potsdam", (52.3906, 13.0645), ConnectorType::Ccs2).await;

        let mut q = query(ConnectorType::Ccs2);
        q.latitude = Some(52.5219);
        q.longitude = Some(13.4132);
        q.radius_km = Some(5.0);

        let found = h.services.search.search_compatible_stations(&q).await.unwrap();
        let names: Vec<_> = found.iter().map(|m| m.station.name.as_str()).collect();
        assert_eq!(names, vec!["Alex", "Mitte Hub"]);
        assert_eq!(found[0].station.id, near);
        assert!(found[0].distance_km.unwrap() < 0.01);
        assert_eq!(found[1].compatible_count(), 1);
    }

    #[tokio::test]
    async fn only_available_points_of_the_connector_count() {
        let h = harness().await;
        h.fx.second_point(&h.db).await; // Type2
        let found = h
            .services
            .search
            .search_compatible_stations(&query(ConnectorType::Type2))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].compatible_count(), 1);

        h.repos
            .stations()
            .set_point_status(h.fx.point.id, PointStatus::InUse)
            .await
            .unwrap();
        let found = h
            .services
            .search
            .search_compatible_stations(&query(ConnectorType::Ccs2))
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn result_count_is_capped() {
        let h = harness().await;
        for i in 0..25 {
            h.add_station(&format!("S{}", i), (52.52, 13.40), ConnectorType::Chademo).await;
        }
        let found = h
            .services
            .search
            .search_compatible_stations(&query(ConnectorType::Chademo))
            .await
            .unwrap();
        assert_eq!(found.len(), 20);
    }

    #[tokio::test]
    async fn half_given_coordinates_are_rejected() {
        let h = harness().await;
        let mut q = query(ConnectorType::Ccs2);
        q.latitude = Some(52.0);
        let err = h.services.search.search_compatible_stations(&q).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn non_finite_or_non_positive_radius_is_rejected() {
        let h = harness().await;
        for radius in [f64::NAN, f64::INFINITY, 0.0, -1.0] {
            let mut q = query(ConnectorType::Ccs2);
            q.latitude = Some(52.52);
            q.longitude = Some(13.40);
            q.radius_km = Some(radius);
            let err = h.services.search.search_compatible_stations(&q).await.unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)), "radius {}: {:?}", radius, err);
        }
    }

    #[tokio::test]
    async fn availability_on_the_last_representable_date_is_a_validation_error() {
        let h = harness().await;
        let err = h
            .services
            .search
            .hourly_availability(h.fx.point.id, NaiveDate::MAX)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)), "{:?}", err);
    }

    #[tokio::test]
    async fn hourly_availability_marks_booked_and_past_hours() {
        let h = harness().await;
        let r = h
            .services
            .reservations
            .create_reservation("user-1", h.fx.point.id, june1(), 14)
            .await
            .unwrap();
        h.clock.set(at(9, 30));

        let hours = h
            .services
            .search
            .hourly_availability(h.fx.point.id, june1())
            .await
            .unwrap();
        assert_eq!(hours.len(), 24);
        assert!(!hours[8].available); // 08:00-09:00 is over
        assert!(hours[9].available); // 09:00-10:00 still ends in the future
        assert!(!hours[14].available);
        assert_eq!(hours[14].held_by.as_deref(), Some(r.code.as_str()));
        assert!(hours[15].available);
    }

    #[tokio::test]
    async fn date_filter_drops_fully_booked_points() {
        let h = harness().await;
        h.clock.set(at(23, 0));
        let r = h
            .services
            .reservations
            .create_reservation("user-1", h.fx.point.id, june1(), 23)
            .await
            .unwrap();
        assert_eq!(r.start_time, at(23, 0));

        let mut q = query(ConnectorType::Ccs2);
        q.date = Some(june1());
        let found = h.services.search.search_compatible_stations(&q).await.unwrap();
        assert!(found.is_empty());

        q.date = Some(NaiveDate::from_ymd_opt(2024, 6, 2).unwrap());
        let found = h.services.search.search_compatible_stations(&q).await.unwrap();
        assert_eq!(found.len(), 1);
    }
}
