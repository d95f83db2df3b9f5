//! Root list: density mode, row geometry and row selection.

use std::sync::{Arc, Weak};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::{
    manager::{DisplayModel, MiniAppManager},
    mini_app::InteractiveView,
    navigation::{NavigationDestination, Navigator},
    observable::StateStore,
};

pub const ROOT_TITLE: &str = "MiniHub";

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DensityMode {
    #[default]
    Compact,
    Interactive,
}

impl DensityMode {
    pub fn toggled(self) -> Self {
        match self {
            DensityMode::Compact => DensityMode::Interactive,
            DensityMode::Interactive => DensityMode::Compact,
        }
    }

    pub fn cell_type(self) -> CellType {
        match self {
            DensityMode::Compact => CellType::Compact,
            DensityMode::Interactive => CellType::Interactive,
        }
    }
}

/// Which row template the list renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum CellType {
    Compact,
    Interactive,
}

pub trait HeightCalculator: Send + Sync {
    fn height_for_row(&self, mode: DensityMode, available_space: f64) -> f64;
}

/// Row height as a fixed fraction of the available space per mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractionHeightCalculator {
    pub compact_divisor: f64,
    pub interactive_divisor: f64,
}

impl Default for FractionHeightCalculator {
    fn default() -> Self {
        Self {
            compact_divisor: 8.0,
            interactive_divisor: 2.0,
        }
    }
}

impl HeightCalculator for FractionHeightCalculator {
    fn height_for_row(&self, mode: DensityMode, available_space: f64) -> f64 {
        match mode {
            DensityMode::Compact => available_space / self.compact_divisor,
            DensityMode::Interactive => available_space / self.interactive_divisor,
        }
    }
}

/// Everything the list needs to draw one row.
pub struct Row {
    pub model: DisplayModel,
    pub cell_type: CellType,
    pub interactive_view: Option<Box<dyn InteractiveView>>,
}

impl std::fmt::Debug for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Row")
            .field("model", &self.model)
            .field("cell_type", &self.cell_type)
            .field("interactive_view", &self.interactive_view.is_some())
            .finish()
    }
}

/// View-model of the root list.
///
/// The navigator is held weakly: the navigation stack owns this view-model,
/// not the other way around.
pub struct MainViewModel {
    manager: Arc<MiniAppManager>,
    navigator: Weak<dyn Navigator>,
    density_mode: StateStore<DensityMode>,
    heights: Box<dyn HeightCalculator>,
}

impl MainViewModel {
    pub fn new(manager: Arc<MiniAppManager>, navigator: Weak<dyn Navigator>) -> Self {
        Self {
            manager,
            navigator,
            density_mode: StateStore::new(DensityMode::default()),
            heights: Box::new(FractionHeightCalculator::default()),
        }
    }

    pub fn with_height_calculator(mut self, heights: impl HeightCalculator + 'static) -> Self {
        self.heights = Box::new(heights);
        self
    }

    pub fn title(&self) -> &'static str {
        ROOT_TITLE
    }

    pub fn manager(&self) -> &Arc<MiniAppManager> {
        &self.manager
    }

    pub fn density_mode(&self) -> DensityMode {
        self.density_mode.get()
    }

    pub fn observe_density_mode(&self) -> watch::Receiver<DensityMode> {
        self.density_mode.subscribe()
    }

    pub fn observe_models(&self) -> watch::Receiver<Arc<Vec<DisplayModel>>> {
        self.manager.observe_available_models()
    }

    /// Flips between compact and interactive. Returns the new mode.
    pub fn toggle_density_mode(&self) -> DensityMode {
        self.density_mode.update(|mode| *mode = mode.toggled());
        let mode = self.density_mode.get();
        info!("Density mode is now {}", mode);
        mode
    }

    /// The cell type is the same for every row; the index is accepted so
    /// callers can ask per row.
    pub fn cell_type(&self, _index: usize) -> CellType {
        self.density_mode().cell_type()
    }

    pub fn height_for_row(&self, available_space: f64) -> f64 {
        self.heights
            .height_for_row(self.density_mode(), available_space)
    }

    pub fn number_of_rows(&self) -> usize {
        self.manager.models().len()
    }

    pub fn model(&self, index: usize) -> Option<DisplayModel> {
        self.manager.models().get(index).cloned()
    }

    /// Builds a row. Interactive rows get a fresh interactive view each time.
    pub async fn row(&self, index: usize) -> Option<Row> {
        let model = self.model(index)?;
        let cell_type = self.cell_type(index);
        let interactive_view = match cell_type {
            CellType::Compact => None,
            CellType::Interactive => self.manager.get_interactive_view(&model.app_id).await,
        };
        Some(Row {
            model,
            cell_type,
            interactive_view,
        })
    }

    /// Opens the row's full-screen controller. Out-of-range rows, unknown ids
    /// and a dropped navigator are ignored; returns whether anything was pushed.
    pub async fn select_row(&self, index: usize) -> bool {
        let Some(model) = self.model(index) else {
            debug!("No row at index {}", index);
            return false;
        };
        let Some(controller) = self.manager.get_full_screen_controller(&model.app_id).await
        else {
            return false;
        };
        let Some(navigator) = self.navigator.upgrade() else {
            debug!("Navigator is gone, dropping selection of {}", model.app_name);
            return false;
        };
        navigator
            .navigate(NavigationDestination::MiniApp(controller))
            .await;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        apps::MiniAppEnvironment,
        config::HubConfig,
        dispatch::MainQueue,
        manager::KindLoader,
        mini_app::{MiniAppKind, VisualConfiguration},
    };
    use async_trait::async_trait;
    use proptest::prelude::*;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingNavigator {
        titles: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Navigator for RecordingNavigator {
        async fn navigate(&self, destination: NavigationDestination) {
            let NavigationDestination::MiniApp(controller) = destination;
            self.titles.lock().await.push(controller.title());
        }
    }

    async fn manager(iterations: usize) -> Arc<MiniAppManager> {
        let (main_queue, _handle) = MainQueue::spawned();
        let environment = MiniAppEnvironment::from_config(&HubConfig::default(), main_queue);
        let loader = KindLoader::new(
            vec![MiniAppKind::GuessNumber, MiniAppKind::TimeZone],
            iterations,
            environment,
            VisualConfiguration::default(),
        );
        Arc::new(MiniAppManager::with_loaded(Arc::new(loader)).await)
    }

    fn detached() -> Weak<dyn Navigator> {
        Weak::<RecordingNavigator>::new()
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_mode() {
        let view_model = MainViewModel::new(manager(1).await, detached());
        assert_eq!(view_model.density_mode(), DensityMode::Compact);

        assert_eq!(view_model.toggle_density_mode(), DensityMode::Interactive);
        assert_eq!(view_model.cell_type(0), CellType::Interactive);
        assert_eq!(view_model.toggle_density_mode(), DensityMode::Compact);
        assert_eq!(view_model.cell_type(0), CellType::Compact);
    }

    #[tokio::test]
    async fn test_height_for_row_per_mode() {
        let view_model = MainViewModel::new(manager(1).await, detached());
        assert_eq!(view_model.height_for_row(160.0), 20.0);
        view_model.toggle_density_mode();
        assert_eq!(view_model.height_for_row(160.0), 80.0);
    }

    #[tokio::test]
    async fn test_rows_follow_mode() {
        let view_model = MainViewModel::new(manager(2).await, detached());
        assert_eq!(view_model.number_of_rows(), 4);

        let compact = view_model.row(1).await.unwrap();
        assert_eq!(compact.cell_type, CellType::Compact);
        assert!(compact.interactive_view.is_none());
        assert_eq!(compact.model.app_name, "Time Zone");

        view_model.toggle_density_mode();
        let interactive = view_model.row(0).await.unwrap();
        assert_eq!(interactive.cell_type, CellType::Interactive);
        assert!(interactive.interactive_view.is_some());

        assert!(view_model.row(4).await.is_none());
    }

    #[tokio::test]
    async fn test_select_row_pushes_controller() {
        let navigator = Arc::new(RecordingNavigator::default());
        let weak: Weak<dyn Navigator> = Arc::downgrade(&navigator) as Weak<dyn Navigator>;
        let view_model = MainViewModel::new(manager(1).await, weak);

        assert!(view_model.select_row(0).await);
        assert!(view_model.select_row(1).await);
        assert!(!view_model.select_row(9).await);

        assert_eq!(
            *navigator.titles.lock().await,
            vec!["Guess Number".to_string(), "Time Zone".to_string()]
        );
    }

    #[tokio::test]
    async fn test_select_row_without_navigator() {
        let view_model = MainViewModel::new(manager(1).await, detached());
        assert!(!view_model.select_row(0).await);
    }

    #[test]
    fn test_custom_height_calculator() {
        let calculator = FractionHeightCalculator {
            compact_divisor: 10.0,
            interactive_divisor: 4.0,
        };
        assert_eq!(calculator.height_for_row(DensityMode::Compact, 200.0), 20.0);
        assert_eq!(calculator.height_for_row(DensityMode::Interactive, 200.0), 50.0);
    }

    proptest! {
        #[test]
        fn interactive_rows_are_four_compact_rows(available in 0.0f64..10_000.0) {
            let calculator = FractionHeightCalculator::default();
            let compact = calculator.height_for_row(DensityMode::Compact, available);
            let interactive = calculator.height_for_row(DensityMode::Interactive, available);
            prop_assert!((interactive - compact * 4.0).abs() < 1e-9);
            prop_assert!(compact <= available);
        }

        #[test]
        fn toggling_is_an_involution(mode in prop_oneof![Just(DensityMode::Compact), Just(DensityMode::Interactive)]) {
            prop_assert_eq!(mode.toggled().toggled(), mode);
            prop_assert_ne!(mode.toggled(), mode);
        }
    }
}
