//! Ingestion fixtures: fake collaborators and a queue harness

use addonkit_common::config::IngestConfig;
use addonkit_ingest::models::Drawable;
use addonkit_ingest::services::{AssetStore, DuplicateRegistry, ResolvedType, TypeResolver};
use addonkit_ingest::{addon_manager, AddonManager, InlineExecutor, IngestQueue, SharedAddonManager};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use uuid::Uuid;

/// Resolves by file name, with an optional fallback for unlisted files
#[derive(Default)]
pub struct FixedResolver {
    by_name: HashMap<String, ResolvedType>,
    fallback: Option<ResolvedType>,
}

impl FixedResolver {
    /// Every file resolves to the same non-prop category
    pub fn uniform(category: u32) -> Self {
        Self {
            by_name: HashMap::new(),
            fallback: Some(ResolvedType {
                is_prop: false,
                category,
            }),
        }
    }

    pub fn with(mut self, file_name: &str, is_prop: bool, category: u32) -> Self {
        self.by_name
            .insert(file_name.to_string(), ResolvedType { is_prop, category });
        self
    }

    /// Files not listed fail to resolve
    pub fn strict(mut self) -> Self {
        self.fallback = None;
        self
    }
}

impl TypeResolver for FixedResolver {
    fn resolve(&self, path: &Path) -> Option<ResolvedType> {
        let name = path.file_name()?.to_string_lossy().into_owned();
        self.by_name.get(&name).copied().or(self.fallback)
    }
}

/// Records registry calls in order
#[derive(Default)]
pub struct RecordingRegistry {
    pub registered: Mutex<Vec<Uuid>>,
    pub unregistered: Mutex<Vec<Uuid>>,
}

impl DuplicateRegistry for RecordingRegistry {
    fn register(&self, drawable: &Drawable) {
        self.registered.lock().unwrap().push(drawable.id);
    }

    fn unregister(&self, drawable: &Drawable) {
        self.unregistered.lock().unwrap().push(drawable.id);
    }
}

/// Queue wired to an inline executor, a recording registry and a temp store
pub struct Harness {
    pub temp: TempDir,
    pub queue: IngestQueue,
    pub manager: SharedAddonManager,
    pub registry: Arc<RecordingRegistry>,
}

impl Harness {
    /// Must be called inside a tokio runtime
    pub fn new(batch_size: usize, capacity: usize, resolver: impl TypeResolver + 'static) -> Self {
        let temp = TempDir::new().unwrap();
        let store = AssetStore::new(temp.path().join("assets"));
        let registry = Arc::new(RecordingRegistry::default());
        let manager = AddonManager::new(registry.clone(), store.clone(), capacity).into_shared();

        let config = IngestConfig {
            batch_size,
            max_drawables_per_addon: capacity,
            ..Default::default()
        };
        let queue = IngestQueue::new(
            &config,
            manager.clone(),
            Arc::new(InlineExecutor),
            Arc::new(resolver),
            store,
        );

        Self {
            temp,
            queue,
            manager,
            registry,
        }
    }

    pub fn store_root(&self) -> PathBuf {
        self.temp.path().join("assets")
    }

    /// Create an import file under `incoming/`
    pub fn file(&self, relative: &str) -> PathBuf {
        let path = self.temp.path().join("incoming").join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, relative.as_bytes()).unwrap();
        path
    }

    /// Path under `incoming/` without creating it
    pub fn missing_file(&self, relative: &str) -> PathBuf {
        self.temp.path().join("incoming").join(relative)
    }

    /// Every committed drawable, addon by addon
    pub fn drawables(&self) -> Vec<Drawable> {
        let manager = addon_manager::lock(&self.manager).unwrap();
        manager
            .addons()
            .iter()
            .flat_map(|a| a.drawables.iter().cloned())
            .collect()
    }

    pub fn drawable_from(&self, file_name: &str) -> Drawable {
        self.drawables()
            .into_iter()
            .find(|d| d.file_path.file_name().unwrap().to_string_lossy() == file_name)
            .unwrap_or_else(|| panic!("no drawable for {}", file_name))
    }
}
