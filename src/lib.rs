//! # MiniHub: a host for small embedded apps
//!
//! MiniHub loads a set of mini-apps, lists them, and lets the user open one
//! full screen. Each mini-app offers three surfaces over one shared state:
//!
//! - Compact view: icon, name and description for a list row
//! - Interactive view: a small stateful widget shown inline in an expanded row
//! - Full-screen controller: the app's own screen, pushed on the navigation stack
//!
//! ## Layers
//!
//! ```text
//! MiniHub → NavigationRouter → MainViewModel → MiniAppManager → MiniApp
//! ```
//!
//! - [`mini_app`]: the contract every mini-app implements
//! - [`apps`]: bundled mini-apps (guess the number, world clock)
//! - [`manager`]: the registry of live instances and their display models
//! - [`router`]: the root list, density mode and row geometry
//! - [`navigation`]: the screen stack
//! - [`hub`]: wires everything from a [`config::HubConfig`]
//!
//! ## State and threading
//!
//! Shared state lives in [`observable::StateStore`]s (replay-latest, fan-out).
//! Background producers post their writes through the [`dispatch::MainQueue`],
//! which applies them in order on a single task.

pub mod apps;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod error_presenter;
pub mod hub;
pub mod manager;
pub mod mini_app;
pub mod navigation;
pub mod observable;
pub mod resources;
pub mod router;

// Re-exports
pub use error::*;
pub use hub::MiniHub;
