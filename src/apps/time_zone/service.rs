//! # Geo-time service
//!
//! Owns everything the Time Zone mini-app displays:
//!
//! - the current location's name and local time ([`GeoTimeService::current_location_time`]),
//! - the local time of a fixed list of reference cities ([`GeoTimeService::world_cities_time`]).
//!
//! Location lookups and the periodic refresh run on background tasks. Their
//! results are never written directly; they are posted to the [`MainQueue`] and
//! applied there, so observers always see writes in one order.
//!
//! A failed lookup leaves `Err(..)` on the location feed. The feed only turns
//! back into a payload when a later [`GeoTimeService::request_location`]
//! succeeds; there is no automatic retry.

use std::{
    sync::{Arc, Mutex, PoisonError, Weak},
    time::Duration,
};

use chrono::{DateTime, FixedOffset, Utc};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    config::TimeZoneConfig, dispatch::MainQueue, observable::StateStore, AppError,
};

use super::location::{LocationProvider, ResolvedLocation};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationTimeInfo {
    pub id: String,
    pub location_name: String,
    pub current_time: String,
}

impl LocationTimeInfo {
    pub fn new<N: Into<String>, T: Into<String>>(location_name: N, current_time: T) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            location_name: location_name.into(),
            current_time: current_time.into(),
        }
    }
}

const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(1);

/// `Ok(None)` until the first lookup finishes.
pub type LocationFeed = Result<Option<LocationTimeInfo>, AppError>;

pub fn format_time(now: DateTime<Utc>, offset: &FixedOffset) -> String {
    now.with_timezone(offset).format("%H:%M:%S").to_string()
}

pub struct GeoTimeService {
    provider: Arc<dyn LocationProvider>,
    main_queue: MainQueue,
    cities: Vec<ResolvedLocation>,
    refresh_interval: Duration,
    current_location: Arc<StateStore<LocationFeed>>,
    world_cities: Arc<StateStore<Vec<LocationTimeInfo>>>,
    resolved: Arc<Mutex<Option<ResolvedLocation>>>,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl GeoTimeService {
    pub fn new(
        provider: Arc<dyn LocationProvider>,
        main_queue: MainQueue,
        config: &TimeZoneConfig,
    ) -> Self {
        Self {
            provider,
            main_queue,
            cities: config.reference_cities.iter().map(Into::into).collect(),
            refresh_interval: config.refresh_interval,
            current_location: Arc::new(StateStore::new(Ok(None))),
            world_cities: Arc::new(StateStore::new(Vec::new())),
            resolved: Arc::new(Mutex::new(None)),
            ticker: Mutex::new(None),
        }
    }

    pub fn current_location_time(&self) -> watch::Receiver<LocationFeed> {
        self.current_location.subscribe()
    }

    pub fn world_cities_time(&self) -> watch::Receiver<Vec<LocationTimeInfo>> {
        self.world_cities.subscribe()
    }

    pub fn is_updating(&self) -> bool {
        self.ticker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// One-shot lookup of the device location. Also starts the periodic
    /// refresh if it is not running yet.
    pub fn request_location(self: &Arc<Self>) {
        self.start_updating_time();

        let provider = self.provider.clone();
        let main_queue = self.main_queue.clone();
        let current_location = self.current_location.clone();
        let world_cities = self.world_cities.clone();
        let resolved = self.resolved.clone();
        let cities = self.cities.clone();

        debug!("Requesting current location");
        tokio::spawn(async move {
            let result = provider.resolve().await;
            main_queue.dispatch(move || {
                let now = Utc::now();
                let mut resolved = resolved.lock().unwrap_or_else(PoisonError::into_inner);
                match result {
                    Ok(location) => {
                        info!("Location resolved: {}", location.name);
                        current_location.set(Ok(Some(LocationTimeInfo::new(
                            location.name.clone(),
                            format_time(now, &location.utc_offset),
                        ))));
                        world_cities.set(city_times(&cities, now));
                        *resolved = Some(location);
                    }
                    Err(e) => {
                        warn!("Location lookup failed: {}", e);
                        *resolved = None;
                        current_location.set(Err(e));
                    }
                }
            });
        });
    }

    /// Starts the periodic refresh. Calling it again while running is a no-op.
    pub fn start_updating_time(self: &Arc<Self>) {
        let mut ticker = self.ticker.lock().unwrap_or_else(PoisonError::into_inner);
        if ticker.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        let weak: Weak<Self> = Arc::downgrade(self);
        // interval() panics on zero
        let period = self.refresh_interval.max(MIN_REFRESH_INTERVAL);
        let mut interval = tokio::time::interval(period);
        debug!("Starting time updates every {:?}", self.refresh_interval);
        *ticker = Some(tokio::spawn(async move {
            loop {
                interval.tick().await;
                let Some(service) = weak.upgrade() else {
                    break;
                };
                service.refresh_times();
            }
        }));
    }

    pub fn stop_updating_time(&self) {
        if let Some(handle) = self
            .ticker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            debug!("Stopping time updates");
            handle.abort();
        }
    }

    fn refresh_times(&self) {
        let current_location = self.current_location.clone();
        let world_cities = self.world_cities.clone();
        let resolved = self.resolved.clone();
        let cities = self.cities.clone();

        self.main_queue.dispatch(move || {
            let now = Utc::now();
            world_cities.set(city_times(&cities, now));

            let resolved = resolved.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(location) = resolved.as_ref() {
                current_location.set(Ok(Some(LocationTimeInfo::new(
                    location.name.clone(),
                    format_time(now, &location.utc_offset),
                ))));
            }
        });
    }
}

impl Drop for GeoTimeService {
    fn drop(&mut self) {
        self.stop_updating_time();
    }
}

fn city_times(cities: &[ResolvedLocation], now: DateTime<Utc>) -> Vec<LocationTimeInfo> {
    cities
        .iter()
        .map(|city| LocationTimeInfo::new(city.name.clone(), format_time(now, &city.utc_offset)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        apps::time_zone::location::{offset_from_minutes, MockLocationProvider},
        config::CityConfig,
    };
    use chrono::TimeZone;
    use tokio::time::timeout;

    fn config() -> TimeZoneConfig {
        TimeZoneConfig {
            refresh_interval: Duration::from_millis(20),
            reference_cities: vec![CityConfig::new("London", 0), CityConfig::new("Tokyo", 540)],
            location: None,
        }
    }

    fn service_with(provider: MockLocationProvider) -> Arc<GeoTimeService> {
        let (main_queue, _handle) = MainQueue::spawned();
        Arc::new(GeoTimeService::new(Arc::new(provider), main_queue, &config()))
    }

    #[test]
    fn test_format_time_applies_offset() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 23, 30, 5).unwrap();
        assert_eq!(format_time(now, &offset_from_minutes(0)), "23:30:05");
        assert_eq!(format_time(now, &offset_from_minutes(540)), "08:30:05");
        assert_eq!(format_time(now, &offset_from_minutes(-300)), "18:30:05");
    }

    #[tokio::test]
    async fn test_zero_interval_still_ticks() {
        let (main_queue, _handle) = MainQueue::spawned();
        let config = TimeZoneConfig {
            refresh_interval: Duration::ZERO,
            ..config()
        };
        let service = Arc::new(GeoTimeService::new(
            Arc::new(MockLocationProvider::new()),
            main_queue,
            &config,
        ));

        service.start_updating_time();

        let mut cities_rx = service.world_cities_time();
        timeout(
            Duration::from_millis(500),
            cities_rx.wait_for(|cities| cities.len() == 2),
        )
        .await
        .unwrap()
        .unwrap();
        service.stop_updating_time();
        assert!(!service.is_updating());
    }

    #[tokio::test]
    async fn test_successful_request_publishes_location_and_cities() {
        let mut provider = MockLocationProvider::new();
        provider
            .expect_resolve()
            .times(1)
            .returning(|| Ok(ResolvedLocation::new("Lisbon", offset_from_minutes(0))));
        let service = service_with(provider);

        service.request_location();

        let mut location_rx = service.current_location_time();
        let feed = timeout(
            Duration::from_millis(500),
            location_rx.wait_for(|feed| matches!(feed, Ok(Some(_)))),
        )
        .await
        .unwrap()
        .unwrap()
        .clone();
        assert_eq!(feed.unwrap().unwrap().location_name, "Lisbon");

        let mut cities_rx = service.world_cities_time();
        let cities = timeout(
            Duration::from_millis(500),
            cities_rx.wait_for(|cities| !cities.is_empty()),
        )
        .await
        .unwrap()
        .unwrap()
        .clone();
        let names: Vec<_> = cities.iter().map(|c| c.location_name.as_str()).collect();
        assert_eq!(names, vec!["London", "Tokyo"]);
        assert!(service.is_updating());
    }

    #[tokio::test]
    async fn test_failed_request_is_terminal_until_next_success() {
        let mut provider = MockLocationProvider::new();
        let mut sequence = mockall::Sequence::new();
        provider
            .expect_resolve()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|| Err(AppError::LocationAccessDenied));
        provider
            .expect_resolve()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|| Ok(ResolvedLocation::new("Oslo", offset_from_minutes(60))));
        let service = service_with(provider);

        service.request_location();
        let mut location_rx = service.current_location_time();
        timeout(
            Duration::from_millis(500),
            location_rx.wait_for(|feed| feed.is_err()),
        )
        .await
        .unwrap()
        .unwrap();

        // ticks keep refreshing cities but must not bring the location back
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(
            *service.current_location_time().borrow(),
            Err(AppError::LocationAccessDenied)
        );

        service.request_location();
        timeout(
            Duration::from_millis(500),
            location_rx.wait_for(|feed| matches!(feed, Ok(Some(info)) if info.location_name == "Oslo")),
        )
        .await
        .unwrap()
        .unwrap();
    }

    #[tokio::test]
    async fn test_ticker_stops_with_service() {
        let service = service_with(MockLocationProvider::new());
        service.start_updating_time();
        service.start_updating_time();
        assert!(service.is_updating());

        service.stop_updating_time();
        assert!(!service.is_updating());
    }
}
