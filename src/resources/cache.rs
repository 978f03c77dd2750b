//! Idempotent, shared asset loading.
//!
//! Every logical path maps to one [`Shared`] future. The first caller creates it, every
//! later caller (and a preload issued before first use) awaits the same result.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use futures::{FutureExt, future::Shared};

use crate::resources::{AssetSource, GltfScene, load_gltf};

/// Failures are shared with every waiter, hence the `Arc`.
pub type LoadResult = Result<Arc<GltfScene>, Arc<anyhow::Error>>;

#[cfg(not(target_arch = "wasm32"))]
pub type LoadFuture = futures::future::BoxFuture<'static, LoadResult>;
#[cfg(target_arch = "wasm32")]
pub type LoadFuture = futures::future::LocalBoxFuture<'static, LoadResult>;

pub struct AssetCache {
    source: Arc<dyn AssetSource>,
    entries: Mutex<HashMap<String, Shared<LoadFuture>>>,
}

impl std::fmt::Debug for AssetCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetCache")
            .field("entries", &self.entries().keys().collect::<Vec<_>>())
            .finish()
    }
}

impl AssetCache {
    pub fn new(source: Arc<dyn AssetSource>) -> Self {
        Self {
            source,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Shared<LoadFuture>>> {
        // The map stays consistent even if a holder panicked
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns the shared load of `path`, starting it on first use.
    pub fn fetch(&self, path: &str) -> Shared<LoadFuture> {
        self.entries()
            .entry(path.to_string())
            .or_insert_with(|| {
                let source = self.source.clone();
                let path = path.to_string();
                let load = async move {
                    match load_gltf(source.as_ref(), &path).await {
                        Ok(scene) => Ok(Arc::new(scene)),
                        Err(e) => {
                            log::error!("failed to load {path}: {e:#}");
                            Err(Arc::new(e))
                        }
                    }
                };
                #[cfg(not(target_arch = "wasm32"))]
                let load = load.boxed();
                #[cfg(target_arch = "wasm32")]
                let load = load.boxed_local();
                load.shared()
            })
            .clone()
    }

    /// Resolves `path`. Repeated calls yield the same `Arc`.
    pub async fn load(&self, path: &str) -> LoadResult {
        self.fetch(path).await
    }

    /// Starts loading `path` in the background without waiting for it.
    ///
    /// Natively the load is driven on the current tokio runtime. Without one the entry is
    /// only registered and resolves on the first [`AssetCache::load`].
    pub fn preload(&self, path: &str) {
        let load = self.fetch(path).map(|_| ());
        #[cfg(not(target_arch = "wasm32"))]
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(load);
            }
            Err(_) => log::debug!("no async runtime, {path} loads on first use"),
        }
        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(load);
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries().contains_key(path)
    }

    /// The result of `path` if it has already resolved.
    pub fn peek(&self, path: &str) -> Option<LoadResult> {
        self.entries().get(path).and_then(|entry| entry.peek().cloned())
    }
}
