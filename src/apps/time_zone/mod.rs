//! World clock.
//!
//! Shows the local time at the device location and in a list of reference
//! cities. All surfaces read from the instance's [`GeoTimeService`].

pub mod location;
pub mod service;
pub mod view_model;
pub mod views;

use std::sync::Arc;

use crate::{
    config::TimeZoneConfig,
    dispatch::MainQueue,
    error_presenter::ErrorPresenter,
    mini_app::{
        CompactView, FullScreenController, InteractiveView, MiniApp, MiniAppId, MiniAppKind,
        MiniAppViewProviding, VisualConfiguration,
    },
    observable::StateStore,
    resources::IconLoader,
};

pub use location::{
    DeniedLocationProvider, FixedLocationProvider, LocationProvider, ResolvedLocation,
};
pub use service::{GeoTimeService, LocationFeed, LocationTimeInfo};
pub use view_model::{FullScreenViewModel, ViewState};
pub use views::{TimeZoneController, TimeZoneInteractiveView};

pub const APP_NAME: &str = "Time Zone";
const APP_DESCRIPTION: &str = "Time at your location and in cities around the world";
const ICON_NAME: &str = "time_zone";

pub struct TimeZoneMiniApp {
    id: MiniAppId,
    configuration: StateStore<VisualConfiguration>,
    service: Arc<GeoTimeService>,
    icons: Arc<dyn IconLoader>,
    error_presenter: Arc<dyn ErrorPresenter>,
}

impl TimeZoneMiniApp {
    pub fn new(
        id: MiniAppId,
        configuration: VisualConfiguration,
        icons: Arc<dyn IconLoader>,
        error_presenter: Arc<dyn ErrorPresenter>,
        location_provider: Arc<dyn LocationProvider>,
        main_queue: MainQueue,
        config: &TimeZoneConfig,
    ) -> Self {
        Self {
            id,
            configuration: StateStore::new(configuration),
            service: Arc::new(GeoTimeService::new(location_provider, main_queue, config)),
            icons,
            error_presenter,
        }
    }

    pub fn service(&self) -> &Arc<GeoTimeService> {
        &self.service
    }
}

impl MiniApp for TimeZoneMiniApp {
    fn id(&self) -> &MiniAppId {
        &self.id
    }

    fn kind(&self) -> MiniAppKind {
        MiniAppKind::TimeZone
    }

    fn visual_configuration(&self) -> VisualConfiguration {
        self.configuration.get()
    }

    fn configure(&self, configuration: VisualConfiguration) {
        self.configuration.set(configuration);
    }

    fn view_provider(&self) -> &dyn MiniAppViewProviding {
        self
    }
}

impl MiniAppViewProviding for TimeZoneMiniApp {
    fn create_compact_view(&self) -> CompactView {
        CompactView::new(self.icons.load(ICON_NAME), APP_NAME, APP_DESCRIPTION)
    }

    fn create_interactive_view(&self) -> Box<dyn InteractiveView> {
        Box::new(TimeZoneInteractiveView::new(self.service.clone()))
    }

    fn create_full_screen_controller(&self) -> Box<dyn FullScreenController> {
        let view_model =
            FullScreenViewModel::new(self.service.clone(), self.error_presenter.clone());
        Box::new(TimeZoneController::new(view_model, &self.configuration))
    }
}
