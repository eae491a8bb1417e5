//! Page session — process-scoped state for one page load.
//!
//! A session owns the document tree, the extracted identity, the current
//! settings snapshot, and the watcher state, and exposes the two DOM-mutating
//! entry points (apply and revert). The async event loop consumes host
//! events: mutation signals feed the debounced rescan, settings snapshots
//! replace the current one wholesale, and explicit rescan requests cancel
//! any pending debounce before re-extracting.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::dom::{self, DomTree, NodeId};
use crate::extract::{self, Identity, Platform};
use crate::mask::{self, RuleSet, ScanStats};
use crate::page::PageContext;
use crate::settings::{EffectiveSettings, Settings, SettingsStore};
use crate::watch::{debounce, Debouncer, RescanCoordinator};

/// Handle to the live document, shared between the session and its host.
pub type SharedDom = Arc<Mutex<DomTree>>;

/// Host-driven events consumed by [`PageSession::run`].
#[derive(Debug)]
pub enum SessionEvent {
    /// The document mutated; the journal should be drained and inspected.
    Mutated,
    /// A fresh settings snapshot replaces the current one.
    SettingsChanged(Settings),
    /// Manual refresh: revert, re-extract, re-apply.
    RescanRequested,
    /// The document finished loading.
    DocumentReady,
    Shutdown,
}

pub struct PageSession {
    url: String,
    source: String,
    platform: Option<Platform>,
    dom: SharedDom,
    identity: Option<Identity>,
    settings: Settings,
    rules: RuleSet,
    coordinator: RescanCoordinator,
    debouncer: Debouncer,
    content_root: Option<NodeId>,
    scan_passes: u64,
}

impl PageSession {
    /// Parse a full document and set up a session for it. Settings start at
    /// the built-in defaults until a snapshot is delivered.
    pub fn new(url: &str, html: &str) -> Self {
        Self::from_dom(url, html, dom::parse_document(html))
    }

    /// Wrap an already-ingested tree. `source` is the raw page text that
    /// source-scanning extraction strategies inspect.
    pub fn from_dom(url: &str, source: &str, tree: DomTree) -> Self {
        let content_root = tree.find_by_tag(tree.root(), "body").into_iter().next();
        let mut session = Self {
            url: url.to_string(),
            source: source.to_string(),
            platform: Platform::from_url(url),
            dom: Arc::new(Mutex::new(tree)),
            identity: None,
            settings: Settings::built_in(),
            rules: RuleSet::default(),
            coordinator: RescanCoordinator::new(),
            debouncer: Debouncer::default(),
            content_root,
            scan_passes: 0,
        };
        session.rebuild_rules();
        session
    }

    /// Force the platform instead of deriving it from the URL.
    pub fn with_platform(mut self, platform: Option<Platform>) -> Self {
        self.platform = platform;
        self.rebuild_rules();
        self
    }

    pub fn platform(&self) -> Option<Platform> {
        self.platform
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Shared handle to the live document for host-side mutation.
    pub fn dom(&self) -> SharedDom {
        Arc::clone(&self.dom)
    }

    /// True when any rule would currently mask something.
    pub fn is_active(&self) -> bool {
        self.rules.is_active()
    }

    /// Scan passes performed so far (bootstrap, debounced and explicit).
    pub fn scan_passes(&self) -> u64 {
        self.scan_passes
    }

    /// Serialize the current document.
    pub fn render(&self) -> String {
        let dom = self.lock();
        dom::to_html(&dom, dom.root())
    }

    fn lock(&self) -> MutexGuard<'_, DomTree> {
        self.dom.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn effective(&self) -> EffectiveSettings {
        self.settings.effective(self.platform)
    }

    fn rebuild_rules(&mut self) {
        self.rules = RuleSet::build(self.identity.as_ref(), &self.effective());
    }

    /// Replace the settings snapshot wholesale and rebuild the rule set.
    pub fn replace_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.rebuild_rules();
    }

    /// Pull a snapshot from the store. Failures keep the current snapshot;
    /// masking stays on defaults rather than breaking.
    pub async fn load_settings(&mut self, store: &dyn SettingsStore) {
        match store.load().await {
            Ok(settings) => self.replace_settings(settings),
            Err(err) => warn!(error = %err, "settings unavailable, keeping current snapshot"),
        }
    }

    /// Run extraction on demand and replace the stored identity wholesale.
    pub fn extract_identity(&mut self) -> Option<Identity> {
        let identity = self.run_extraction();
        self.identity = identity.clone();
        self.rebuild_rules();
        identity
    }

    fn run_extraction(&self) -> Option<Identity> {
        let platform = self.platform?;
        let dom = self.lock();
        let ctx = PageContext::new(&self.url, &self.source, &dom);
        extract::extract(&ctx, platform)
    }

    /// Revert-then-scan over the content root. A no-op until the content
    /// root is attached.
    pub fn apply_masking(&mut self) -> ScanStats {
        let Some(root) = self.content_root else {
            debug!("content root not attached yet, skipping scan");
            return ScanStats::default();
        };
        self.coordinator.begin_scan();
        let stats = {
            let mut dom = self.lock();
            mask::revert(&mut dom, root);
            mask::scan(&mut dom, root, &self.rules)
        };
        self.scan_passes += 1;

        // Our own rewrites sit in the journal now; external churn that raced
        // in parks a pending rescan instead.
        let batch = self.lock().drain_mutations();
        self.coordinator.on_mutations(&batch);
        if self.coordinator.finish_scan() {
            self.debouncer.poke();
        }
        stats
    }

    /// Collapse every masked span back to original text.
    pub fn revert_all(&mut self) -> usize {
        let Some(root) = self.content_root else {
            return 0;
        };
        let count = mask::revert(&mut self.lock(), root);
        let batch = self.lock().drain_mutations();
        self.coordinator.on_mutations(&batch);
        count
    }

    /// Explicit update: cancel any pending rescan, revert, re-extract, and
    /// re-apply with the freshest configuration.
    pub fn refresh(&mut self) -> ScanStats {
        self.debouncer.cancel();
        self.attach_content_root();
        self.revert_all();
        self.identity = self.run_extraction();
        self.rebuild_rules();
        self.apply_masking()
    }

    /// Document-ready entry point: attach the content root (deferred until
    /// now if the body was missing), extract once, and apply.
    pub fn bootstrap(&mut self) -> ScanStats {
        self.attach_content_root();
        if self.identity.is_none() {
            self.identity = self.run_extraction();
            self.rebuild_rules();
        }
        self.apply_masking()
    }

    fn attach_content_root(&mut self) {
        if self.content_root.is_some() {
            return;
        }
        let dom = self.lock();
        let root = dom
            .find_by_tag(dom.root(), "body")
            .into_iter()
            .next()
            .unwrap_or_else(|| dom.root());
        drop(dom);
        self.content_root = Some(root);
        debug!("content root attached");
    }

    /// Drive the session until shutdown (or until the sender goes away).
    pub async fn run(&mut self, events: &mut mpsc::Receiver<SessionEvent>) {
        loop {
            let deadline = self.debouncer.deadline();
            tokio::select! {
                maybe = events.recv() => match maybe {
                    None | Some(SessionEvent::Shutdown) => {
                        self.debouncer.cancel();
                        break;
                    }
                    Some(SessionEvent::Mutated) => {
                        let batch = self.lock().drain_mutations();
                        if self.coordinator.on_mutations(&batch) {
                            self.debouncer.poke();
                        }
                    }
                    Some(SessionEvent::SettingsChanged(settings)) => {
                        self.debouncer.cancel();
                        self.replace_settings(settings);
                        self.apply_masking();
                    }
                    Some(SessionEvent::RescanRequested) => {
                        self.refresh();
                    }
                    Some(SessionEvent::DocumentReady) => {
                        self.bootstrap();
                    }
                },
                _ = debounce::wait(deadline), if deadline.is_some() => {
                    self.debouncer.cancel();
                    self.apply_masking();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_fragment;
    use tokio::time::Duration;

    const TWITTER_PAGE: &str = r#"<html><head>
        <meta property="og:title" content="Jane Doe (@jdoe) on X">
        </head><body><p>jdoe posted: Jane Doe was here</p></body></html>"#;

    #[test]
    fn test_bootstrap_extracts_and_masks() {
        let mut session = PageSession::new("https://x.com/jdoe", TWITTER_PAGE);
        assert!(!session.is_active());

        let stats = session.bootstrap();
        assert_eq!(stats.spans_created, 2);
        assert!(session.is_active());
        assert_eq!(
            session.identity().unwrap().username.as_deref(),
            Some("jdoe")
        );
        let html = session.render();
        assert!(html.contains("veil-blur"));
    }

    #[test]
    fn test_unknown_platform_masks_custom_words_only() {
        let mut settings = Settings::built_in();
        settings.global.custom_words = "secret".to_string();

        let mut session = PageSession::new(
            "https://example.com/",
            "<html><body><p>the secret and jdoe</p></body></html>",
        );
        session.replace_settings(settings);
        let stats = session.bootstrap();

        assert_eq!(stats.spans_created, 1);
        assert!(session.identity().is_none());
        assert!(session.render().contains("<span class=\"veil-blur\">secret</span>"));
    }

    #[test]
    fn test_content_root_attachment_is_deferred_for_fragments() {
        let mut settings = Settings::built_in();
        settings.global.custom_words = "secret".to_string();

        let tree = parse_fragment("<p>a secret here</p>");
        let mut session = PageSession::from_dom("https://example.com/", "", tree);
        session.replace_settings(settings);

        // No body yet: nothing to scan.
        assert_eq!(session.apply_masking(), ScanStats::default());
        assert_eq!(session.scan_passes(), 0);

        // Document-ready falls back to the tree root and masks.
        let stats = session.bootstrap();
        assert_eq!(stats.spans_created, 1);
    }

    #[test]
    fn test_refresh_picks_up_changed_identity() {
        let mut session = PageSession::new("https://x.com/jdoe", TWITTER_PAGE);
        session.bootstrap();
        assert_eq!(
            session.identity().unwrap().full_name.as_deref(),
            Some("Jane Doe")
        );

        {
            let dom = session.dom();
            let mut tree = dom.lock().unwrap();
            let meta = tree.find_by_attr(tree.root(), "property", "og:title")[0];
            tree.set_attr(meta, "content", "John Roe (@jroe) on X");
        }
        session.refresh();
        assert_eq!(
            session.identity().unwrap().username.as_deref(),
            Some("jroe")
        );
        // The old identity's spans were reverted, not stacked.
        let html = session.render();
        assert!(!html.contains("veil-blur"));
    }

    #[tokio::test]
    async fn test_load_settings_from_store() {
        let mut settings = Settings::built_in();
        settings.global.custom_words = "secret".to_string();
        let store = crate::settings::MemoryStore::with(settings);

        let mut session = PageSession::new(
            "https://example.com/",
            "<html><body><p>a secret</p></body></html>",
        );
        session.load_settings(&store).await;
        let stats = session.bootstrap();
        assert_eq!(stats.spans_created, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mutation_bursts_coalesce_into_one_rescan() {
        let mut settings = Settings::built_in();
        settings.global.custom_words = "secret".to_string();

        let mut session = PageSession::new(
            "https://example.com/",
            "<html><body><p>nothing yet</p></body></html>",
        );
        session.replace_settings(settings);
        session.bootstrap();
        assert_eq!(session.scan_passes(), 1);

        let dom = session.dom();
        let (tx, mut rx) = mpsc::channel(32);
        let handle = tokio::spawn(async move {
            session.run(&mut rx).await;
            session
        });

        for _ in 0..5 {
            {
                let mut tree = dom.lock().unwrap();
                let body = tree.find_by_tag(tree.root(), "body")[0];
                let node = tree.create_text("the secret is out");
                tree.append_child(body, node);
            }
            tx.send(SessionEvent::Mutated).await.unwrap();
        }

        tokio::time::sleep(Duration::from_millis(500)).await;
        tx.send(SessionEvent::Shutdown).await.unwrap();
        let session = handle.await.unwrap();

        // One bootstrap pass plus exactly one coalesced rescan.
        assert_eq!(session.scan_passes(), 2);
        assert_eq!(session.render().matches("veil-blur").count(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settings_update_cancels_pending_debounce() {
        let mut settings = Settings::built_in();
        settings.global.custom_words = "secret".to_string();

        let mut session = PageSession::new(
            "https://example.com/",
            "<html><body><p>a secret</p></body></html>",
        );
        session.replace_settings(settings.clone());
        session.bootstrap();
        assert_eq!(session.scan_passes(), 1);

        let dom = session.dom();
        let (tx, mut rx) = mpsc::channel(8);
        let handle = tokio::spawn(async move {
            session.run(&mut rx).await;
            session
        });

        {
            let mut tree = dom.lock().unwrap();
            let body = tree.find_by_tag(tree.root(), "body")[0];
            let node = tree.create_text("another secret");
            tree.append_child(body, node);
        }
        tx.send(SessionEvent::Mutated).await.unwrap();

        settings.global.custom_words_replace = true;
        tx.send(SessionEvent::SettingsChanged(settings)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(500)).await;
        tx.send(SessionEvent::Shutdown).await.unwrap();
        let session = handle.await.unwrap();

        // The settings push applied immediately; the parked debounce never
        // fired a second pass.
        assert_eq!(session.scan_passes(), 2);
        assert_eq!(session.render().matches("veil-replaced").count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_engine_rewrites_do_not_rearm_the_watcher() {
        let mut settings = Settings::built_in();
        settings.global.custom_words = "secret".to_string();

        let mut session = PageSession::new(
            "https://example.com/",
            "<html><body><p>a secret</p></body></html>",
        );
        session.replace_settings(settings);
        session.bootstrap();

        let (tx, mut rx) = mpsc::channel(8);
        let handle = tokio::spawn(async move {
            session.run(&mut rx).await;
            session
        });

        // Signal without any fresh journal entries.
        tx.send(SessionEvent::Mutated).await.unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        tx.send(SessionEvent::Shutdown).await.unwrap();
        let session = handle.await.unwrap();

        assert_eq!(session.scan_passes(), 1);
    }
}
