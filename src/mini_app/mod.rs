//! # Mini-app contract
//!
//! Every plugin hosted by MiniHub implements [`MiniApp`]. The host only ever
//! talks to plugins through this trait and the [`MiniAppViewProviding`]
//! capability it hands out, so the host decides *where* a mini-app is shown and
//! the mini-app decides *what* is shown.
//!
//! ## Three surfaces
//!
//! ```text
//! MiniAppViewProviding
//!  ├─ create_compact_view()            -> CompactView (value, list row)
//!  ├─ create_interactive_view()        -> Box<dyn InteractiveView> (inline widget)
//!  └─ create_full_screen_controller()  -> Box<dyn FullScreenController>
//! ```
//!
//! The interactive view and the full-screen controller of one instance share
//! the instance's service object, so state such as a best score is the same on
//! every surface.

pub mod view;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use view::{FullScreenController, InteractiveView, ViewAction, ViewFrame};

/// Unique, opaque identity of a live mini-app instance.
///
/// Regenerated on every run; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MiniAppId(String);

impl MiniAppId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MiniAppId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for MiniAppId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for MiniAppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Named color used for theming, e.g. `system_background` or `#1E90FF`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorToken(String);

impl ColorToken {
    pub fn new<S: Into<String>>(token: S) -> Self {
        Self(token.into())
    }

    pub fn system_background() -> Self {
        Self::new("system_background")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ColorToken {
    fn default() -> Self {
        Self::system_background()
    }
}

impl fmt::Display for ColorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VisualConfiguration {
    #[serde(default)]
    pub background_color: ColorToken,
}

impl VisualConfiguration {
    pub fn new(background_color: ColorToken) -> Self {
        Self { background_color }
    }
}

/// List-row summary of a mini-app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactView {
    pub app_icon: Option<Vec<u8>>,
    pub app_name: String,
    pub description: String,
}

impl CompactView {
    pub fn new<N: Into<String>, D: Into<String>>(
        app_icon: Option<Vec<u8>>,
        app_name: N,
        description: D,
    ) -> Self {
        Self {
            app_icon,
            app_name: app_name.into(),
            description: description.into(),
        }
    }
}

/// Closed set of mini-app kinds the host knows how to construct.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MiniAppKind {
    GuessNumber,
    TimeZone,
}

pub trait MiniApp: Send + Sync {
    fn id(&self) -> &MiniAppId;

    fn kind(&self) -> MiniAppKind;

    fn visual_configuration(&self) -> VisualConfiguration;

    /// Replaces the visual configuration. Has no other effect.
    fn configure(&self, configuration: VisualConfiguration);

    fn view_provider(&self) -> &dyn MiniAppViewProviding;
}

pub trait MiniAppViewProviding: Send + Sync {
    /// Pure function of the current state; safe to call repeatedly.
    fn create_compact_view(&self) -> CompactView;

    /// Builds a new inline widget. Successive calls return distinct widgets
    /// bound to the same underlying state.
    fn create_interactive_view(&self) -> Box<dyn InteractiveView>;

    /// Builds the full experience with a fresh view-model over the shared
    /// service.
    fn create_full_screen_controller(&self) -> Box<dyn FullScreenController>;
}
