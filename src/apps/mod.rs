//! Bundled mini-apps and the factory that builds them by kind.

pub mod guess_number;
pub mod time_zone;

use std::sync::Arc;

use tracing::debug;

use crate::{
    config::{GuessNumberConfig, HubConfig, TimeZoneConfig},
    dispatch::MainQueue,
    error_presenter::{ErrorPresenter, LoggingErrorPresenter},
    mini_app::{MiniApp, MiniAppId, MiniAppKind, VisualConfiguration},
    resources::{DirectoryIconLoader, IconLoader, NoIcons},
};

use self::{
    guess_number::GuessNumberMiniApp,
    time_zone::{DeniedLocationProvider, FixedLocationProvider, LocationProvider, TimeZoneMiniApp},
};

/// Collaborators handed to every mini-app at construction.
#[derive(Clone)]
pub struct MiniAppEnvironment {
    pub icons: Arc<dyn IconLoader>,
    pub main_queue: MainQueue,
    pub error_presenter: Arc<dyn ErrorPresenter>,
    pub location_provider: Arc<dyn LocationProvider>,
    pub guess_number: GuessNumberConfig,
    pub time_zone: TimeZoneConfig,
}

impl MiniAppEnvironment {
    /// Environment backed by the bundled collaborators described in `config`.
    pub fn from_config(config: &HubConfig, main_queue: MainQueue) -> Self {
        let icons: Arc<dyn IconLoader> = match &config.icon_dir {
            Some(dir) => Arc::new(DirectoryIconLoader::new(dir)),
            None => Arc::new(NoIcons),
        };
        let location_provider: Arc<dyn LocationProvider> = match &config.time_zone.location {
            Some(city) => Arc::new(FixedLocationProvider::new(city.into())),
            None => Arc::new(DeniedLocationProvider),
        };
        Self {
            icons,
            main_queue,
            error_presenter: Arc::new(LoggingErrorPresenter),
            location_provider,
            guess_number: config.guess_number.clone(),
            time_zone: config.time_zone.clone(),
        }
    }
}

/// Builds a new instance of `kind` with a fresh id.
pub fn create_mini_app(
    kind: MiniAppKind,
    environment: &MiniAppEnvironment,
    configuration: VisualConfiguration,
) -> Arc<dyn MiniApp> {
    let id = MiniAppId::generate();
    debug!("Creating {} mini-app {}", kind, id);
    match kind {
        MiniAppKind::GuessNumber => Arc::new(GuessNumberMiniApp::new(
            id,
            configuration,
            environment.icons.clone(),
            environment.guess_number.clone(),
        )),
        MiniAppKind::TimeZone => Arc::new(TimeZoneMiniApp::new(
            id,
            configuration,
            environment.icons.clone(),
            environment.error_presenter.clone(),
            environment.location_provider.clone(),
            environment.main_queue.clone(),
            &environment.time_zone,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[tokio::test]
    async fn test_factory_builds_every_kind() {
        let (main_queue, _handle) = MainQueue::spawned();
        let environment = MiniAppEnvironment::from_config(&HubConfig::default(), main_queue);

        for kind in MiniAppKind::iter() {
            let app = create_mini_app(kind, &environment, VisualConfiguration::default());
            assert_eq!(app.kind(), kind);
            assert!(!app.view_provider().create_compact_view().app_name.is_empty());
        }
    }

    #[tokio::test]
    async fn test_factory_generates_distinct_ids() {
        let (main_queue, _handle) = MainQueue::spawned();
        let environment = MiniAppEnvironment::from_config(&HubConfig::default(), main_queue);

        let first = create_mini_app(
            MiniAppKind::GuessNumber,
            &environment,
            VisualConfiguration::default(),
        );
        let second = create_mini_app(
            MiniAppKind::GuessNumber,
            &environment,
            VisualConfiguration::default(),
        );
        assert_ne!(first.id(), second.id());
    }
}
