//! Registry of root engines bound to one host window

use crate::saved::SavedHostState;
use crate::settings::HostSettings;
use ahash::AHashMap;
use nav_core::{Key, KeyCodec, NavigationEngine, Result, SerdeKeyCodec};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Owns the root engines of a host, keyed by tag
///
/// Lives longer than any single host window: `on_destroyed(false)` only
/// detaches render collaborators, so the next window can attach new ones
/// to the same engines.
pub struct EngineHost<K: Key> {
    settings: HostSettings,
    engines: RwLock<AHashMap<String, NavigationEngine<K>>>,
    codec: Arc<dyn KeyCodec<K>>,
    foreground: AtomicBool,
}

impl<K> EngineHost<K>
where
    K: Key + Serialize + DeserializeOwned,
{
    /// Host that persists keys with [`SerdeKeyCodec`]
    pub fn with_serde_codec(settings: HostSettings) -> Self {
        Self::new(settings, Arc::new(SerdeKeyCodec))
    }
}

impl<K: Key> EngineHost<K> {
    pub fn new(settings: HostSettings, codec: Arc<dyn KeyCodec<K>>) -> Self {
        let foreground = AtomicBool::new(settings.start_in_foreground);
        Self {
            settings,
            engines: RwLock::new(AHashMap::new()),
            codec,
            foreground,
        }
    }

    pub fn settings(&self) -> &HostSettings {
        &self.settings
    }

    /// Get or create the root engine for `tag`
    ///
    /// A newly created engine is restored from the matching entry of
    /// `saved`, if there is one. An existing engine is returned as is.
    pub fn attach_engine(&self, saved: Option<&SavedHostState>, tag: &str) -> Result<NavigationEngine<K>> {
        if let Some(existing) = self.engines.read().get(tag) {
            return Ok(existing.clone());
        }

        let engine = NavigationEngine::with_tag(tag);
        if let Some(state) = saved.and_then(|saved| saved.engine(tag)) {
            engine.restore_state(state, self.codec.as_ref())?;
            tracing::info!("Restored root engine {:?}", tag);
        }
        if !self.is_foreground() {
            engine.set_background();
        }

        let engine = self
            .engines
            .write()
            .entry(tag.to_string())
            .or_insert(engine)
            .clone();
        Ok(engine)
    }

    /// [`Self::attach_engine`] with the configured default tag
    pub fn attach_default_engine(&self, saved: Option<&SavedHostState>) -> Result<NavigationEngine<K>> {
        let tag = self.settings.default_tag.clone();
        self.attach_engine(saved, &tag)
    }

    pub fn engine(&self, tag: &str) -> Option<NavigationEngine<K>> {
        self.engines.read().get(tag).cloned()
    }

    pub fn default_engine(&self) -> Option<NavigationEngine<K>> {
        self.engine(&self.settings.default_tag)
    }

    pub fn tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.engines.read().keys().cloned().collect();
        tags.sort();
        tags
    }

    pub fn is_foreground(&self) -> bool {
        self.foreground.load(Ordering::SeqCst)
    }

    /// Engines are called without the registry lock held
    fn snapshot(&self) -> Vec<NavigationEngine<K>> {
        self.engines.read().values().cloned().collect()
    }

    /// The host window became visible; queued transitions start draining
    pub fn on_resume(&self) -> Result<()> {
        self.foreground.store(true, Ordering::SeqCst);
        tracing::info!("Host resumed");
        for engine in self.snapshot() {
            engine.set_foreground()?;
        }
        Ok(())
    }

    /// The host window is no longer visible; transitions queue up
    pub fn on_pause(&self) {
        self.foreground.store(false, Ordering::SeqCst);
        tracing::info!("Host paused");
        for engine in self.snapshot() {
            engine.set_background();
        }
    }

    /// The host window went away
    ///
    /// When `finishing` the host itself is done and every engine is
    /// destroyed. Otherwise the engines survive for the next window and
    /// only lose their render collaborators.
    pub fn on_destroyed(&self, finishing: bool) -> Result<()> {
        if finishing {
            let engines: Vec<_> = self.engines.write().drain().map(|(_, engine)| engine).collect();
            tracing::info!("Host finished, destroying {} root engines", engines.len());
            let mut result = Ok(());
            for engine in engines {
                if let Err(err) = engine.destroy() {
                    tracing::error!("Failed to destroy engine {:?}: {}", engine.scope_tag(), err);
                    result = Err(err);
                }
            }
            return result;
        }

        tracing::info!("Host window destroyed, detaching render collaborators");
        for engine in self.snapshot() {
            engine.on_host_destroyed();
        }
        Ok(())
    }

    /// Save every root engine and its subtree
    pub fn on_save(&self) -> Result<SavedHostState> {
        let engines = self
            .engines
            .read()
            .iter()
            .map(|(tag, engine)| (tag.clone(), engine.clone()))
            .collect::<Vec<_>>();

        let mut saved = BTreeMap::new();
        for (tag, engine) in engines {
            saved.insert(tag, engine.save_state(self.codec.as_ref())?);
        }
        tracing::debug!("Saved {} root engines", saved.len());
        Ok(SavedHostState { engines: saved })
    }

    /// Route a back press to the default root; `false` if it was not consumed
    pub fn handle_back(&self) -> Result<bool> {
        match self.default_engine() {
            Some(engine) => engine.handle_back(),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nav_core::Direction;
    use nav_render::{DeferredRenderer, RecordingRenderer};

    fn host() -> EngineHost<String> {
        EngineHost::with_serde_codec(HostSettings::default())
    }

    fn key(name: &str) -> String {
        name.to_string()
    }

    #[test]
    fn test_attach_returns_same_engine_per_tag() {
        let host = host();
        let first = host.attach_engine(None, "main").unwrap();
        let again = host.attach_engine(None, "main").unwrap();
        let other = host.attach_engine(None, "dialog").unwrap();

        assert!(first.same_engine(&again));
        assert!(!first.same_engine(&other));
        assert_eq!(first.scope_tag(), "main");
        assert_eq!(host.tags(), vec!["dialog".to_string(), "main".to_string()]);
    }

    #[test]
    fn test_save_and_restore_through_json() {
        let host = host();
        let engine = host.attach_default_engine(None).unwrap();
        engine
            .set_render_collaborator(Arc::new(RecordingRenderer::<String>::new()))
            .unwrap();
        engine.set_root(key("home")).unwrap();
        engine.push(key("split")).unwrap();
        let child = engine.get_child_engine(&key("split"), "top").unwrap();
        child
            .set_render_collaborator(Arc::new(RecordingRenderer::<String>::new()))
            .unwrap();
        child.set_root(key("counter")).unwrap();
        child.push(key("detail")).unwrap();

        let json = host.on_save().unwrap().to_json().unwrap();
        let saved = SavedHostState::from_json(&json).unwrap();

        let restored_host = self::host();
        let restored = restored_host.attach_default_engine(Some(&saved)).unwrap();
        assert_eq!(restored.stack(), vec![key("home"), key("split")]);
        assert_eq!(restored.ordering_indices(), engine.ordering_indices());
        assert!(!restored.has_pending_transition());

        let restored_child = restored.get_child_engine(&key("split"), "top").unwrap();
        assert_eq!(restored_child.stack(), vec![key("counter"), key("detail")]);
        assert_eq!(restored_child.ordering_indices(), child.ordering_indices());
        assert_eq!(restored.children().len(), 1);
    }

    #[test]
    fn test_pause_defers_until_resume() {
        let host = host();
        let engine = host.attach_default_engine(None).unwrap();
        let renderer = Arc::new(RecordingRenderer::<String>::new());
        engine.set_render_collaborator(renderer.clone()).unwrap();
        engine.set_root(key("home")).unwrap();

        host.on_pause();
        engine.push(key("detail")).unwrap();
        assert_eq!(engine.stack(), vec![key("home")]);
        assert_eq!(engine.pending_transition_count(), 1);

        host.on_resume().unwrap();
        assert_eq!(engine.stack(), vec![key("home"), key("detail")]);
        assert_eq!(renderer.last_change().unwrap().direction(), Direction::Forward);
    }

    #[test]
    fn test_engine_attached_while_paused_starts_in_background() {
        let host = host();
        host.on_pause();
        let engine = host.attach_engine(None, "late").unwrap();
        assert!(!engine.is_foreground());

        host.on_resume().unwrap();
        assert!(engine.is_foreground());
    }

    #[test]
    fn test_window_destroyed_keeps_engines() {
        let host = host();
        let engine = host.attach_default_engine(None).unwrap();
        let deferred = Arc::new(DeferredRenderer::<String>::new());
        engine.set_render_collaborator(deferred.clone()).unwrap();
        deferred.complete_all().unwrap();
        engine.set_root(key("home")).unwrap();
        assert_eq!(deferred.pending_count(), 1);

        host.on_destroyed(false).unwrap();
        assert!(!engine.has_render_collaborator());
        // completing on the old window is ignored
        deferred.complete_all().unwrap();
        assert!(engine.stack().is_empty());

        let renderer = Arc::new(RecordingRenderer::<String>::new());
        let reattached = host.attach_default_engine(None).unwrap();
        reattached.set_render_collaborator(renderer.clone()).unwrap();
        assert_eq!(reattached.stack(), vec![key("home")]);
        assert_eq!(renderer.changes().len(), 1);
    }

    #[test]
    fn test_finishing_destroys_engines() {
        let host = host();
        let engine = host.attach_default_engine(None).unwrap();
        let renderer = Arc::new(RecordingRenderer::<String>::new());
        engine.set_render_collaborator(renderer.clone()).unwrap();
        engine.set_root(key("home")).unwrap();

        host.on_destroyed(true).unwrap();
        assert!(host.tags().is_empty());
        assert!(engine.stack().is_empty());
        assert!(!engine.has_render_collaborator());
        assert!(host.default_engine().is_none());
    }

    #[test]
    fn test_back_goes_to_default_engine() {
        let host = host();
        assert!(!host.handle_back().unwrap());

        let engine = host.attach_default_engine(None).unwrap();
        engine
            .set_render_collaborator(Arc::new(RecordingRenderer::<String>::new()))
            .unwrap();
        engine.set_root(key("home")).unwrap();
        engine.push(key("detail")).unwrap();

        assert!(host.handle_back().unwrap());
        assert_eq!(engine.stack(), vec![key("home")]);
        assert!(!host.handle_back().unwrap());
    }
}
