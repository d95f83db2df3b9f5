use async_trait::async_trait;
use chrono::{FixedOffset, Offset, Utc};
use tracing::{debug, warn};

use crate::{config::CityConfig, AppError};

/// A place with a name and a fixed UTC offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocation {
    pub name: String,
    pub utc_offset: FixedOffset,
}

impl ResolvedLocation {
    pub fn new<S: Into<String>>(name: S, utc_offset: FixedOffset) -> Self {
        Self {
            name: name.into(),
            utc_offset,
        }
    }
}

impl From<&CityConfig> for ResolvedLocation {
    fn from(city: &CityConfig) -> Self {
        Self::new(city.name.clone(), offset_from_minutes(city.utc_offset_minutes))
    }
}

/// Converts a minute offset to a chrono offset, falling back to UTC for values
/// outside of ±24h.
pub fn offset_from_minutes(minutes: i32) -> FixedOffset {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| {
            warn!("UTC offset of {} minutes is out of range, using UTC", minutes);
            Utc.fix()
        })
}

/// Device location lookup (position plus reverse geocoding).
#[mockall::automock]
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn resolve(&self) -> Result<ResolvedLocation, AppError>;
}

/// Always reports the configured place.
#[derive(Debug, Clone)]
pub struct FixedLocationProvider {
    location: ResolvedLocation,
}

impl FixedLocationProvider {
    pub fn new(location: ResolvedLocation) -> Self {
        Self { location }
    }
}

#[async_trait]
impl LocationProvider for FixedLocationProvider {
    async fn resolve(&self) -> Result<ResolvedLocation, AppError> {
        debug!("Resolved fixed location {}", self.location.name);
        Ok(self.location.clone())
    }
}

/// Behaves like a device on which the user refused location access.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeniedLocationProvider;

#[async_trait]
impl LocationProvider for DeniedLocationProvider {
    async fn resolve(&self) -> Result<ResolvedLocation, AppError> {
        Err(AppError::LocationAccessDenied)
    }
}
