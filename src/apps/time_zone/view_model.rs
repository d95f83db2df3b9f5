use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::{
    error_presenter::ErrorPresenter,
    observable::{StateStore, Subscription},
    AppError,
};

use super::service::{GeoTimeService, LocationFeed, LocationTimeInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ViewState {
    Loading,
    Success,
    Failure,
}

pub const LOCATION_FAILURE_MESSAGE: &str = "Could not get location data for the Time Zone \
     mini-app. Please check location access settings.";

/// Latest location and city list, combined, plus the screen state derived from
/// them.
pub struct FullScreenViewModel {
    service: Arc<GeoTimeService>,
    stores: Arc<Stores>,
    _binding: Subscription,
}

struct Stores {
    view_state: StateStore<ViewState>,
    current_location: StateStore<Option<LocationTimeInfo>>,
    cities: StateStore<Vec<LocationTimeInfo>>,
    presenter: Arc<dyn ErrorPresenter>,
}

impl Stores {
    fn apply(&self, location: LocationFeed, cities: Vec<LocationTimeInfo>) {
        match location {
            Err(e) => self.fail(&e),
            Ok(Some(location)) if !cities.is_empty() => {
                self.current_location.set(Some(location));
                self.cities.set(cities);
                if self.view_state.get() != ViewState::Success {
                    self.view_state.set(ViewState::Success);
                }
            }
            // まだ片方しか届いていない
            Ok(_) => {
                if self.view_state.get() == ViewState::Success {
                    self.cities.set(cities);
                }
            }
        }
    }

    fn fail(&self, error: &AppError) {
        if self.view_state.get() == ViewState::Failure {
            return;
        }
        debug!("Time zone view failed: {}", error);
        self.view_state.set(ViewState::Failure);
        self.presenter.present(
            &AppError::Custom(LOCATION_FAILURE_MESSAGE.to_string()),
            LOCATION_FAILURE_MESSAGE,
            None,
        );
    }
}

impl FullScreenViewModel {
    /// Binds to the service and fires a location request right away.
    pub fn new(service: Arc<GeoTimeService>, presenter: Arc<dyn ErrorPresenter>) -> Self {
        let stores = Arc::new(Stores {
            view_state: StateStore::new(ViewState::Loading),
            current_location: StateStore::new(None),
            cities: StateStore::new(Vec::new()),
            presenter,
        });

        let binding = Self::bind(
            stores.clone(),
            service.current_location_time(),
            service.world_cities_time(),
        );
        service.request_location();

        Self {
            service,
            stores,
            _binding: binding,
        }
    }

    fn bind(
        stores: Arc<Stores>,
        mut location_rx: watch::Receiver<LocationFeed>,
        mut cities_rx: watch::Receiver<Vec<LocationTimeInfo>>,
    ) -> Subscription {
        Subscription::new(tokio::spawn(async move {
            loop {
                let location = location_rx.borrow_and_update().clone();
                let cities = cities_rx.borrow_and_update().clone();
                stores.apply(location, cities);

                tokio::select! {
                    changed = location_rx.changed() => if changed.is_err() { break },
                    changed = cities_rx.changed() => if changed.is_err() { break },
                }
            }
        }))
    }

    pub fn view_state(&self) -> watch::Receiver<ViewState> {
        self.stores.view_state.subscribe()
    }

    pub fn current_view_state(&self) -> ViewState {
        self.stores.view_state.get()
    }

    pub fn current_location_time_info(&self) -> watch::Receiver<Option<LocationTimeInfo>> {
        self.stores.current_location.subscribe()
    }

    pub fn current_time_in_cities(&self) -> watch::Receiver<Vec<LocationTimeInfo>> {
        self.stores.cities.subscribe()
    }

    pub fn number_of_rows(&self) -> usize {
        self.stores.cities.get().len()
    }

    pub fn city_model(&self, index: usize) -> Option<LocationTimeInfo> {
        self.stores
            .cities
            .get()
            .get(index)
            .map(|city| LocationTimeInfo::new(city.location_name.clone(), city.current_time.clone()))
    }

    pub fn height_for_row(&self, available_space: f64) -> f64 {
        available_space / 8.0
    }

    pub fn current_time(&self) -> String {
        self.stores
            .current_location
            .get()
            .map(|info| info.current_time)
            .unwrap_or_else(|| "N/A".to_string())
    }

    pub fn current_city_name(&self) -> String {
        self.stores
            .current_location
            .get()
            .map(|info| info.location_name)
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// User-triggered retry.
    pub fn refresh(&self) {
        self.service.request_location();
    }
}
