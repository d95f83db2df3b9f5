use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use tokio::sync::watch;

use crate::{
    mini_app::{
        ColorToken, FullScreenController, InteractiveView, ViewAction, ViewFrame,
        VisualConfiguration,
    },
    observable::{ObserveExt, StateStore, Subscription},
    HubError, HubResult,
};

use super::{
    service::{GeoTimeService, LocationTimeInfo},
    view_model::{FullScreenViewModel, ViewState},
    APP_NAME,
};

/// Inline clock for one reference city, picked from a list.
pub struct TimeZoneInteractiveView {
    service: Arc<GeoTimeService>,
    selected: Arc<AtomicUsize>,
    cities: Arc<StateStore<Vec<LocationTimeInfo>>>,
    frames: Arc<StateStore<ViewFrame>>,
    _subscription: Subscription,
}

impl TimeZoneInteractiveView {
    pub fn new(service: Arc<GeoTimeService>) -> Self {
        let selected = Arc::new(AtomicUsize::new(0));
        let initial = service.world_cities_time().borrow().clone();
        let frames = Arc::new(StateStore::new(Self::render(&initial, 0)));
        let cities = Arc::new(StateStore::new(initial));

        let subscription = {
            let selected = selected.clone();
            let cities = cities.clone();
            let frames = frames.clone();
            service.world_cities_time().observe(move |update| {
                frames.set(Self::render(&update, selected.load(Ordering::SeqCst)));
                cities.set(update);
            })
        };
        service.start_updating_time();

        Self {
            service,
            selected,
            cities,
            frames,
            _subscription: subscription,
        }
    }

    fn render(cities: &[LocationTimeInfo], selected: usize) -> ViewFrame {
        let frame = ViewFrame::new(APP_NAME, ColorToken::system_background());
        match cities.get(selected) {
            Some(city) => frame.line(city.current_time.clone()).lines(
                cities.iter().enumerate().map(|(i, c)| {
                    let marker = if i == selected { ">" } else { " " };
                    format!("{} {}", marker, c.location_name)
                }),
            ),
            None => frame.line("Loading..."),
        }
    }
}

impl InteractiveView for TimeZoneInteractiveView {
    fn frame(&self) -> ViewFrame {
        self.frames.get()
    }

    fn frames(&self) -> watch::Receiver<ViewFrame> {
        self.frames.subscribe()
    }

    fn handle_action(&self, action: &ViewAction) -> bool {
        match action {
            ViewAction::SelectCity(index) => {
                let cities = self.cities.get();
                if *index >= cities.len() {
                    return false;
                }
                self.selected.store(*index, Ordering::SeqCst);
                self.frames.set(Self::render(&cities, *index));
                true
            }
            ViewAction::Refresh => {
                self.service.request_location();
                true
            }
            ViewAction::Erase => false,
        }
    }
}

/// Full-screen: current location on top, reference cities below.
pub struct TimeZoneController {
    view_model: Arc<FullScreenViewModel>,
    frames: Arc<StateStore<ViewFrame>>,
    _redraw: Subscription,
}

impl TimeZoneController {
    pub fn new(
        view_model: FullScreenViewModel,
        configuration: &StateStore<VisualConfiguration>,
    ) -> Self {
        let view_model = Arc::new(view_model);
        let frames = Arc::new(StateStore::new(Self::render(
            &view_model,
            &configuration.get(),
        )));

        let redraw = {
            let view_model = view_model.clone();
            let frames = frames.clone();
            let mut state_rx = view_model.view_state();
            let mut location_rx = view_model.current_location_time_info();
            let mut cities_rx = view_model.current_time_in_cities();
            let mut configuration_rx = configuration.subscribe();
            Subscription::new(tokio::spawn(async move {
                loop {
                    let configuration = configuration_rx.borrow_and_update().clone();
                    frames.set(Self::render(&view_model, &configuration));

                    tokio::select! {
                        changed = state_rx.changed() => if changed.is_err() { break },
                        changed = location_rx.changed() => if changed.is_err() { break },
                        changed = cities_rx.changed() => if changed.is_err() { break },
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

    pub fn view_model(&self) -> &Arc<FullScreenViewModel> {
        &self.view_model
    }

    fn render(view_model: &FullScreenViewModel, configuration: &VisualConfiguration) -> ViewFrame {
        let frame = ViewFrame::new(APP_NAME, configuration.background_color.clone());
        match view_model.current_view_state() {
            ViewState::Loading => frame.line("Loading..."),
            ViewState::Failure => frame
                .line("Location unavailable.")
                .line("Type 'refresh' to try again."),
            ViewState::Success => {
                let cities = (0..view_model.number_of_rows())
                    .filter_map(|i| view_model.city_model(i))
                    .map(|city| format!("{:<12} {}", city.location_name, city.current_time));
                frame
                    .line(format!(
                        "{}: {}",
                        view_model.current_city_name(),
                        view_model.current_time()
                    ))
                    .lines(cities)
            }
        }
    }
}

impl FullScreenController for TimeZoneController {
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
        match input.trim() {
            "refresh" => {
                self.view_model.refresh();
                Ok(())
            }
            _ => Err(HubError::invalid_input(APP_NAME, input)),
        }
    }
}
