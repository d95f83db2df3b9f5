use std::sync::Arc;

use tokio::sync::watch;

use crate::{
    mini_app::{
        ColorToken, FullScreenController, InteractiveView, ViewAction, ViewFrame,
        VisualConfiguration,
    },
    observable::{ObserveExt, StateStore, Subscription},
    HubError, HubResult,
};

use super::{service::GuessNumberService, view_model::GuessNumberViewModel, APP_NAME};

fn best_score_line(best_score: Option<u32>) -> String {
    match best_score {
        Some(score) => format!("Best score: {}", score),
        None => "Best score: n/a".to_string(),
    }
}

/// Inline widget: best score plus an erase button.
pub struct GuessInteractiveView {
    service: Arc<GuessNumberService>,
    frames: Arc<StateStore<ViewFrame>>,
    _subscription: Subscription,
}

impl GuessInteractiveView {
    pub fn new(service: Arc<GuessNumberService>) -> Self {
        let frames = Arc::new(StateStore::new(Self::render(
            service.current_best_score(),
        )));

        let frames_clone = frames.clone();
        let subscription = service
            .best_score()
            .observe(move |best_score| frames_clone.set(Self::render(best_score)));

        Self {
            service,
            frames,
            _subscription: subscription,
        }
    }

    fn render(best_score: Option<u32>) -> ViewFrame {
        ViewFrame::new(APP_NAME, ColorToken::system_background())
            .line(best_score_line(best_score))
            .line("[erase]")
    }
}

impl InteractiveView for GuessInteractiveView {
    fn frame(&self) -> ViewFrame {
        self.frames.get()
    }

    fn frames(&self) -> watch::Receiver<ViewFrame> {
        self.frames.subscribe()
    }

    fn handle_action(&self, action: &ViewAction) -> bool {
        match action {
            ViewAction::Erase => {
                self.service.reset_game_stats();
                true
            }
            _ => false,
        }
    }
}

/// Full-screen game.
pub struct GuessNumberController {
    view_model: Arc<GuessNumberViewModel>,
    frames: Arc<StateStore<ViewFrame>>,
    _redraw: Subscription,
}

impl GuessNumberController {
    pub fn new(
        view_model: GuessNumberViewModel,
        configuration: &StateStore<VisualConfiguration>,
    ) -> Self {
        let view_model = Arc::new(view_model);
        let frames = Arc::new(StateStore::new(Self::render(
            &view_model,
            &configuration.get(),
        )));

        // 結果・ベストスコア・見た目のどれが変わっても、同じタスクで再描画する
        let redraw = {
            let view_model = view_model.clone();
            let frames = frames.clone();
            let mut results_rx = view_model.results();
            let mut best_score_rx = view_model.service().best_score();
            let mut configuration_rx = configuration.subscribe();
            Subscription::new(tokio::spawn(async move {
                loop {
                    let configuration = configuration_rx.borrow_and_update().clone();
                    frames.set(Self::render(&view_model, &configuration));

                    tokio::select! {
                        changed = results_rx.changed() => if changed.is_err() { break },
                        changed = best_score_rx.changed() => if changed.is_err() { break },
                        changed = configuration_rx.changed() => if changed.is_err() { break },
                    }
                }
            }))
        };

        Self {
            view_model,
            frames,
            _redraw: redraw,
        }
    }

    pub fn view_model(&self) -> &Arc<GuessNumberViewModel> {
        &self.view_model
    }

    fn render(view_model: &GuessNumberViewModel, configuration: &VisualConfiguration) -> ViewFrame {
        let range = view_model.range();
        let result = view_model
            .last_result()
            .map(|result| result.message())
            .unwrap_or_else(|| "Make your first guess!".to_string());
        ViewFrame::new(APP_NAME, configuration.background_color.clone())
            .line(format!(
                "Guess a number between {} and {}",
                range.min, range.max
            ))
            .line(result)
            .line(format!(
                "Attempts: {}",
                view_model.service().current_attempts()
            ))
            .line(best_score_line(view_model.service().current_best_score()))
    }
}

impl FullScreenController for GuessNumberController {
    fn title(&self) -> String {
        APP_NAME.to_string()
    }

    fn frame(&self) -> ViewFrame {
        self.frames.get()
    }

    fn frames(&self) -> watch::Receiver<ViewFrame> {
        self.frames.subscribe()
    }

    fn handle_input(&self, input: &str) -> HubResult<()> {
        let guess: u32 = input
            .trim()
            .parse()
            .map_err(|_| HubError::invalid_input(APP_NAME, input))?;
        self.view_model.make_guess(guess);
        Ok(())
    }
}
