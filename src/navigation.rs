//! # Navigation
//!
//! One stack of screens. The bottom entry is always the root list once
//! [`NavigationRouter::start_navigation`] has run; mini-app full-screen
//! controllers are pushed above it and popped again with
//! [`NavigationRouter::pop`]. Dropping a popped controller ends its
//! subscriptions.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
    manager::MiniAppManager,
    mini_app::{FullScreenController, ViewFrame},
    router::{MainViewModel, ROOT_TITLE},
    HubError, HubResult,
};

/// Where a selection leads.
pub enum NavigationDestination {
    MiniApp(Box<dyn FullScreenController>),
}

/// Anything that can take a destination and show it.
#[async_trait]
pub trait Navigator: Send + Sync {
    async fn navigate(&self, destination: NavigationDestination);
}

pub enum Screen {
    Root(Arc<MainViewModel>),
    MiniApp(Box<dyn FullScreenController>),
}

impl Screen {
    pub fn title(&self) -> String {
        match self {
            Screen::Root(_) => ROOT_TITLE.to_string(),
            Screen::MiniApp(controller) => controller.title(),
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self, Screen::Root(_))
    }

    /// Current frame for mini-app screens; the root list has none.
    pub fn frame(&self) -> Option<ViewFrame> {
        match self {
            Screen::Root(_) => None,
            Screen::MiniApp(controller) => Some(controller.frame()),
        }
    }
}

pub struct StackEntry {
    pub screen: Screen,
    pub animated: bool,
}

pub struct NavigationRouter {
    manager: Arc<MiniAppManager>,
    stack: Mutex<Vec<StackEntry>>,
}

impl NavigationRouter {
    pub fn new(manager: Arc<MiniAppManager>) -> Arc<Self> {
        Arc::new(Self {
            manager,
            stack: Mutex::new(Vec::new()),
        })
    }

    /// Pushes the root list, unanimated, and returns its view-model. Calling it
    /// again hands back the existing root.
    pub async fn start_navigation(self: &Arc<Self>) -> Arc<MainViewModel> {
        let mut stack = self.stack.lock().await;
        if let Some(StackEntry {
            screen: Screen::Root(root),
            ..
        }) = stack.first()
        {
            debug!("Navigation already started");
            return root.clone();
        }

        let navigator: std::sync::Weak<dyn Navigator> =
            Arc::downgrade(self) as std::sync::Weak<dyn Navigator>;
        let root = Arc::new(MainViewModel::new(self.manager.clone(), navigator));
        stack.push(StackEntry {
            screen: Screen::Root(root.clone()),
            animated: false,
        });
        info!("Navigation started");
        root
    }

    /// Back. The root is never popped; returns the popped screen's title.
    pub async fn pop(&self) -> Option<String> {
        let mut stack = self.stack.lock().await;
        if stack.len() <= 1 {
            debug!("Nothing to pop");
            return None;
        }
        let entry = stack.pop()?;
        let title = entry.screen.title();
        info!("Popped {}", title);
        Some(title)
    }

    pub async fn depth(&self) -> usize {
        self.stack.lock().await.len()
    }

    pub async fn top_title(&self) -> Option<String> {
        self.stack
            .lock()
            .await
            .last()
            .map(|entry| entry.screen.title())
    }

    /// Runs `f` against the top entry while holding the stack.
    pub async fn with_top<F, R>(&self, f: F) -> HubResult<R>
    where
        F: FnOnce(&StackEntry) -> R,
    {
        let stack = self.stack.lock().await;
        let entry = stack
            .last()
            .ok_or_else(|| HubError::Navigation("navigation has not started".to_string()))?;
        Ok(f(entry))
    }

    pub async fn root(&self) -> HubResult<Arc<MainViewModel>> {
        match self.stack.lock().await.first() {
            Some(StackEntry {
                screen: Screen::Root(root),
                ..
            }) => Ok(root.clone()),
            _ => Err(HubError::Navigation(
                "navigation has not started".to_string(),
            )),
        }
    }
}

#[async_trait]
impl Navigator for NavigationRouter {
    async fn navigate(&self, destination: NavigationDestination) {
        let mut stack = self.stack.lock().await;
        match destination {
            NavigationDestination::MiniApp(controller) => {
                info!("Navigating to {}", controller.title());
                stack.push(StackEntry {
                    screen: Screen::MiniApp(controller),
                    animated: true,
                });
            }
        }
    }
}
