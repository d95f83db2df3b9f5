//! # Mini-app registry
//!
//! [`MiniAppManager`] owns every live mini-app and a display-ready projection
//! of them.
//!
//! ## Directory
//!
//! Instances and their [`DisplayModel`]s live side by side in one
//! insertion-ordered map keyed by [`MiniAppId`]. The ordered model list handed
//! to the list view is read straight out of that map, so every listed id can
//! always be looked up again.
//!
//! ## Lookups
//!
//! Asking for a view or controller of an unknown id is not an error. The
//! manager logs the miss and returns `None`; callers ignore the request.
//!
//! ## Staleness
//!
//! Display models are snapshots taken at load time. Changing a mini-app's
//! configuration does not touch its model; call
//! [`MiniAppManager::refresh_display_model`] to regenerate it.

use std::sync::Arc;

use indexmap::IndexMap;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info, instrument};

use crate::{
    apps::{create_mini_app, MiniAppEnvironment},
    mini_app::{
        ColorToken, FullScreenController, InteractiveView, MiniApp, MiniAppId, MiniAppKind,
        VisualConfiguration,
    },
    observable::StateStore,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppVisualStyle {
    pub background_color: ColorToken,
}

/// Immutable, render-ready snapshot of one mini-app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayModel {
    pub app_icon_image: Option<Vec<u8>>,
    pub app_name: String,
    pub app_id: MiniAppId,
    pub app_description: String,
    pub app_style: AppVisualStyle,
}

impl DisplayModel {
    pub fn derive(app: &dyn MiniApp) -> Self {
        let compact = app.view_provider().create_compact_view();
        Self {
            app_icon_image: compact.app_icon,
            app_name: compact.app_name,
            app_id: app.id().clone(),
            app_description: compact.description,
            app_style: AppVisualStyle {
                background_color: app.visual_configuration().background_color,
            },
        }
    }
}

/// Source of mini-app instances for [`MiniAppManager::load`].
pub trait MiniAppLoader: Send + Sync {
    fn load(&self) -> Vec<Arc<dyn MiniApp>>;
}

/// Instantiates a fixed list of kinds, `iterations` times over.
pub struct KindLoader {
    kinds: Vec<MiniAppKind>,
    iterations: usize,
    environment: MiniAppEnvironment,
    default_visual: VisualConfiguration,
}

impl KindLoader {
    pub fn new(
        kinds: Vec<MiniAppKind>,
        iterations: usize,
        environment: MiniAppEnvironment,
        default_visual: VisualConfiguration,
    ) -> Self {
        Self {
            kinds,
            iterations,
            environment,
            default_visual,
        }
    }
}

impl MiniAppLoader for KindLoader {
    fn load(&self) -> Vec<Arc<dyn MiniApp>> {
        (0..self.iterations)
            .flat_map(|_| self.kinds.iter())
            .map(|kind| create_mini_app(*kind, &self.environment, self.default_visual.clone()))
            .collect()
    }
}

struct RegistryEntry {
    app: Arc<dyn MiniApp>,
    model: DisplayModel,
}

pub struct MiniAppManager {
    loader: Arc<dyn MiniAppLoader>,
    directory: RwLock<IndexMap<MiniAppId, RegistryEntry>>,
    models: StateStore<Arc<Vec<DisplayModel>>>,
}

impl MiniAppManager {
    /// Empty manager; nothing is loaded until [`MiniAppManager::load`].
    pub fn new(loader: Arc<dyn MiniAppLoader>) -> Self {
        Self {
            loader,
            directory: RwLock::new(IndexMap::new()),
            models: StateStore::new(Arc::new(Vec::new())),
        }
    }

    /// Creates the manager and runs the initial load.
    pub async fn with_loaded(loader: Arc<dyn MiniAppLoader>) -> Self {
        let manager = Self::new(loader);
        manager.load().await;
        manager
    }

    /// Replaces the directory with a fresh set of instances from the loader
    /// and publishes the new list once. Returns the number of instances.
    #[instrument(level = "debug", skip(self))]
    pub async fn load(&self) -> usize {
        let mut loaded = IndexMap::new();
        for app in self.loader.load() {
            let model = DisplayModel::derive(app.as_ref());
            loaded.insert(app.id().clone(), RegistryEntry { app, model });
        }

        let mut directory = self.directory.write().await;
        *directory = loaded;
        self.publish(&directory);
        info!("Loaded {} mini-apps", directory.len());
        directory.len()
    }

    /// Current list first, then every change. Any number of subscribers.
    pub fn observe_available_models(&self) -> watch::Receiver<Arc<Vec<DisplayModel>>> {
        self.models.subscribe()
    }

    pub fn models(&self) -> Arc<Vec<DisplayModel>> {
        self.models.get()
    }

    pub async fn len(&self) -> usize {
        self.directory.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.directory.read().await.is_empty()
    }

    pub async fn contains(&self, id: &MiniAppId) -> bool {
        self.directory.read().await.contains_key(id)
    }

    pub async fn get_mini_app(&self, id: &MiniAppId) -> Option<Arc<dyn MiniApp>> {
        let app = self
            .directory
            .read()
            .await
            .get(id)
            .map(|entry| entry.app.clone());
        if app.is_none() {
            debug!("No mini-app with id {}", id);
        }
        app
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn get_full_screen_controller(
        &self,
        id: &MiniAppId,
    ) -> Option<Box<dyn FullScreenController>> {
        let app = self.get_mini_app(id).await?;
        Some(app.view_provider().create_full_screen_controller())
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn get_interactive_view(&self, id: &MiniAppId) -> Option<Box<dyn InteractiveView>> {
        let app = self.get_mini_app(id).await?;
        Some(app.view_provider().create_interactive_view())
    }

    /// Forwards a new configuration to the mini-app. The display model keeps
    /// its load-time style. Returns `false` if the id is unknown.
    #[instrument(level = "debug", skip(self, configuration))]
    pub async fn update_mini_app_configuration(
        &self,
        id: &MiniAppId,
        configuration: VisualConfiguration,
    ) -> bool {
        match self.get_mini_app(id).await {
            Some(app) => {
                app.configure(configuration);
                true
            }
            None => false,
        }
    }

    /// Re-derives one display model from the mini-app's current state and
    /// publishes the list.
    #[instrument(level = "debug", skip(self))]
    pub async fn refresh_display_model(&self, id: &MiniAppId) -> bool {
        let mut directory = self.directory.write().await;
        let Some(entry) = directory.get_mut(id) else {
            debug!("No mini-app with id {}", id);
            return false;
        };
        entry.model = DisplayModel::derive(entry.app.as_ref());
        self.publish(&directory);
        true
    }

    /// Drops the instance and its model, keeping the order of the rest.
    #[instrument(level = "debug", skip(self))]
    pub async fn evict(&self, id: &MiniAppId) -> bool {
        let mut directory = self.directory.write().await;
        if directory.shift_remove(id).is_none() {
            debug!("No mini-app with id {}", id);
            return false;
        }
        self.publish(&directory);
        info!("Evicted mini-app {}", id);
        true
    }

    fn publish(&self, directory: &IndexMap<MiniAppId, RegistryEntry>) {
        let models: Vec<DisplayModel> = directory.values().map(|entry| entry.model.clone()).collect();
        self.models.set(Arc::new(models));
    }
}
