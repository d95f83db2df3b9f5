//! Number guessing game.
//!
//! The instance owns one [`GuessNumberService`]; the inline widget shows its
//! best score and every full-screen controller plays against it with its own
//! secret number.

pub mod service;
pub mod view_model;
pub mod views;

use std::sync::Arc;

use crate::{
    config::GuessNumberConfig,
    mini_app::{
        CompactView, FullScreenController, InteractiveView, MiniApp, MiniAppId, MiniAppKind,
        MiniAppViewProviding, VisualConfiguration,
    },
    observable::StateStore,
    resources::IconLoader,
};

pub use service::GuessNumberService;
pub use view_model::{GuessNumberViewModel, GuessOutcome, GuessResult};
pub use views::{GuessInteractiveView, GuessNumberController};

pub const APP_NAME: &str = "Guess Number";
const APP_DESCRIPTION: &str = "Guess the number in as few attempts as possible";
const ICON_NAME: &str = "guess_number";

pub struct GuessNumberMiniApp {
    id: MiniAppId,
    configuration: StateStore<VisualConfiguration>,
    service: Arc<GuessNumberService>,
    icons: Arc<dyn IconLoader>,
    range: GuessNumberConfig,
}

impl GuessNumberMiniApp {
    pub fn new(
        id: MiniAppId,
        configuration: VisualConfiguration,
        icons: Arc<dyn IconLoader>,
        range: GuessNumberConfig,
    ) -> Self {
        Self {
            id,
            configuration: StateStore::new(configuration),
            service: Arc::new(GuessNumberService::new()),
            icons,
            range,
        }
    }

    pub fn service(&self) -> &Arc<GuessNumberService> {
        &self.service
    }
}

impl MiniApp for GuessNumberMiniApp {
    fn id(&self) -> &MiniAppId {
        &self.id
    }

    fn kind(&self) -> MiniAppKind {
        MiniAppKind::GuessNumber
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

impl MiniAppViewProviding for GuessNumberMiniApp {
    fn create_compact_view(&self) -> CompactView {
        CompactView::new(self.icons.load(ICON_NAME), APP_NAME, APP_DESCRIPTION)
    }

    fn create_interactive_view(&self) -> Box<dyn InteractiveView> {
        Box::new(GuessInteractiveView::new(self.service.clone()))
    }

    fn create_full_screen_controller(&self) -> Box<dyn FullScreenController> {
        let view_model = GuessNumberViewModel::new(self.service.clone(), self.range.clone());
        Box::new(GuessNumberController::new(view_model, &self.configuration))
    }
}
