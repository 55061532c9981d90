//! Repository provider for the domain layer
//!
//! Contains:
//! - `RepositoryProvider` — unified access to all per-aggregate repositories
//! - `DomainResult` — standard result type for domain operations

use super::driver::{DriverRepository, StaffRepository};
use super::reservation::ReservationRepository;
use super::session::SessionRepository;
use super::station::StationRepository;
use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Provides access to all domain repositories.
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let point = repos.stations().find_point(7).await?;
///     let active = repos.sessions().find_active_for_point(7).await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn stations(&self) -> &dyn StationRepository;
    fn reservations(&self) -> &dyn ReservationRepository;
    fn sessions(&self) -> &dyn SessionRepository;
    fn drivers(&self) -> &dyn DriverRepository;
    fn staff(&self) -> &dyn StaffRepository;
}
