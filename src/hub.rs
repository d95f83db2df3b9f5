//! Host wiring: main queue, mini-app environment, manager and navigation.

use std::{sync::Arc, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{timeout_at, Instant},
};
use tracing::{debug, info};

use crate::{
    apps::MiniAppEnvironment,
    config::HubConfig,
    dispatch::MainQueue,
    manager::{KindLoader, MiniAppManager},
    mini_app::{ViewAction, ViewFrame},
    navigation::{NavigationRouter, Screen},
    router::MainViewModel,
    HubError, HubResult,
};

const REDRAW_WAIT: Duration = Duration::from_millis(200);
const SETTLE_WAIT: Duration = Duration::from_millis(20);

pub struct MiniHub {
    config: HubConfig,
    main_queue: MainQueue,
    main_loop: JoinHandle<()>,
    manager: Arc<MiniAppManager>,
    navigation: Arc<NavigationRouter>,
}

impl MiniHub {
    /// Validates `config`, spawns the main loop and loads every configured
    /// mini-app. Must be called inside a tokio runtime.
    pub async fn new(config: HubConfig) -> HubResult<Self> {
        config.validate()?;

        let (main_queue, main_loop) = MainQueue::spawned();
        let environment = MiniAppEnvironment::from_config(&config, main_queue.clone());
        let loader = KindLoader::new(
            config.mini_apps.clone(),
            config.load_iterations,
            environment,
            config.default_visual.clone(),
        );
        let manager = Arc::new(MiniAppManager::with_loaded(Arc::new(loader)).await);
        let navigation = NavigationRouter::new(manager.clone());

        info!("MiniHub ready with {} mini-apps", manager.len().await);
        Ok(Self {
            config,
            main_queue,
            main_loop,
            manager,
            navigation,
        })
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    pub fn main_queue(&self) -> &MainQueue {
        &self.main_queue
    }

    pub fn manager(&self) -> &Arc<MiniAppManager> {
        &self.manager
    }

    pub fn navigation(&self) -> &Arc<NavigationRouter> {
        &self.navigation
    }

    /// Shows the root list.
    pub async fn start(&self) -> Arc<MainViewModel> {
        self.navigation.start_navigation().await
    }

    pub async fn root(&self) -> HubResult<Arc<MainViewModel>> {
        self.navigation.root().await
    }

    /// Opens the mini-app at `row`. Returns `false` if nothing was pushed.
    pub async fn open(&self, row: usize) -> HubResult<bool> {
        Ok(self.root().await?.select_row(row).await)
    }

    pub async fn back(&self) -> Option<String> {
        self.navigation.pop().await
    }

    /// Forwards text input to the controller on top of the stack and returns
    /// its frame once it has redrawn.
    pub async fn say(&self, input: &str) -> HubResult<ViewFrame> {
        let mut frames = self
            .navigation
            .with_top(|entry| match &entry.screen {
                Screen::Root(_) => Err(HubError::Navigation("no mini-app is open".to_string())),
                Screen::MiniApp(controller) => {
                    let frames = controller.frames();
                    controller.handle_input(input)?;
                    Ok(frames)
                }
            })
            .await??;

        // redraws run on the controller's own task; read once it goes quiet
        let deadline = Instant::now() + REDRAW_WAIT;
        let mut redrawn = false;
        loop {
            let wait = if redrawn { SETTLE_WAIT } else { REDRAW_WAIT };
            let until = (Instant::now() + wait).min(deadline);
            match timeout_at(until, frames.changed()).await {
                Ok(Ok(())) => redrawn = true,
                _ => break,
            }
        }
        if !redrawn {
            debug!("No redraw after input {:?}", input);
        }
        let frame = frames.borrow().clone();
        Ok(frame)
    }

    /// Sends an action to a fresh interactive view of the mini-app at `row`.
    pub async fn act(&self, row: usize, action: &ViewAction) -> HubResult<ViewFrame> {
        let model = self
            .root()
            .await?
            .model(row)
            .ok_or_else(|| HubError::invalid_input("row", row.to_string()))?;
        let view = self
            .manager
            .get_interactive_view(&model.app_id)
            .await
            .ok_or_else(|| HubError::internal(format!("{} has no live instance", model.app_id)))?;
        if !view.handle_action(action) {
            debug!("{} ignored {:?}", model.app_name, action);
        }
        Ok(view.frame())
    }

    /// Stops the main loop. Work still queued is dropped.
    pub async fn shutdown(self) -> HubResult<()> {
        self.main_loop.abort();
        match self.main_loop.await {
            Ok(()) => {}
            Err(e) if e.is_cancelled() => {}
            Err(e) => return Err(HubError::internal(format!("main loop failed: {}", e))),
        }
        info!("MiniHub shut down");
        Ok(())
    }
}
