//! Scripted browser, operator, clipboard and fetcher for pipeline tests.
#![allow(dead_code)]

pub mod pages;

use std::collections::{HashMap, VecDeque};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use image::{ImageFormat, RgbImage};
use importer_core::{Credentials, ImportConfig, Locator};
use importer_engine::{
    Clipboard, ClipboardError, Decision, Escalation, FailureKind, FetchError, FetchOutput,
    ImageFetcher, ImportSession, Operator, Page, PageError, Ports, SessionSettings,
    TabHandle, Timings,
};
use serde_json::{json, Value};
use tempfile::TempDir;

static INIT: Once = Once::new();

pub fn init_logging() {
    INIT.call_once(importer_logging::initialize_for_tests);
}

/// What happens to the active tab when a node is clicked.
#[derive(Debug, Clone)]
pub enum Reaction {
    SetTitle(String),
}

/// Static description of an element and its subtree.
#[derive(Debug, Clone)]
pub struct Node {
    locator: Locator,
    name: Option<String>,
    text: String,
    attrs: HashMap<String, String>,
    clickable: bool,
    children: Vec<Node>,
    opens: Option<TabSpec>,
    on_click: Vec<Reaction>,
}

impl Node {
    pub fn new(locator: Locator) -> Self {
        Self {
            locator,
            name: None,
            text: String::new(),
            attrs: HashMap::new(),
            clickable: true,
            children: Vec::new(),
            opens: None,
            on_click: Vec::new(),
        }
    }

    /// Name used in the interaction log; defaults to the locator.
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.clickable = false;
        self
    }

    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Content of the tab opened when this node is opened in a new tab.
    pub fn opens(mut self, tab: TabSpec) -> Self {
        self.opens = Some(tab);
        self
    }

    pub fn on_click(mut self, reaction: Reaction) -> Self {
        self.on_click.push(reaction);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct TabSpec {
    title: String,
    body: String,
    nodes: Vec<Node>,
}

impl TabSpec {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }

    pub fn body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }

    pub fn node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn nodes(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.nodes.extend(nodes);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FakeElement(usize);

struct Stored {
    locator: Locator,
    label: String,
    text: String,
    attrs: HashMap<String, String>,
    clickable: bool,
    children: Vec<usize>,
    opens: Option<TabSpec>,
    on_click: Vec<Reaction>,
}

struct FakeTab {
    handle: TabHandle,
    title: String,
    body: String,
    roots: Vec<usize>,
}

#[derive(Default)]
struct Inner {
    nodes: Vec<Stored>,
    tabs: Vec<FakeTab>,
    active: Option<TabHandle>,
    next_tab: usize,
    sites: HashMap<String, TabSpec>,
    log: Vec<String>,
    profile_dir: Option<PathBuf>,
}

impl Inner {
    fn store(&mut self, node: &Node) -> usize {
        let children: Vec<usize> = node.children.iter().map(|c| self.store(c)).collect();
        self.nodes.push(Stored {
            locator: node.locator.clone(),
            label: node.name.clone().unwrap_or_else(|| node.locator.to_string()),
            text: node.text.clone(),
            attrs: node.attrs.clone(),
            clickable: node.clickable,
            children,
            opens: node.opens.clone(),
            on_click: node.on_click.clone(),
        });
        self.nodes.len() - 1
    }

    fn open_tab(&mut self, spec: &TabSpec) -> TabHandle {
        let handle = format!("tab-{}", self.next_tab);
        self.next_tab += 1;
        let roots: Vec<usize> = spec.nodes.iter().map(|n| self.store(n)).collect();
        self.tabs.push(FakeTab {
            handle: handle.clone(),
            title: spec.title.clone(),
            body: spec.body.clone(),
            roots,
        });
        handle
    }

    fn active_tab(&mut self) -> Result<&mut FakeTab, PageError> {
        let active = self.active.clone().unwrap_or_default();
        self.tabs
            .iter_mut()
            .find(|tab| tab.handle == active)
            .ok_or(PageError::UnknownTab(active))
    }

    fn matches_under(&self, roots: &[usize], locator: &Locator, out: &mut Vec<usize>) {
        for &id in roots {
            if &self.nodes[id].locator == locator {
                out.push(id);
            }
            self.matches_under(&self.nodes[id].children, locator, out);
        }
    }

    fn find_all(&mut self, locator: &Locator) -> Result<Vec<usize>, PageError> {
        let roots = self.active_tab()?.roots.clone();
        let mut out = Vec::new();
        self.matches_under(&roots, locator, &mut out);
        Ok(out)
    }

    fn find_all_in(&self, parent: FakeElement, locator: &Locator) -> Vec<usize> {
        let mut out = Vec::new();
        self.matches_under(&self.nodes[parent.0].children, locator, &mut out);
        out
    }
}

/// In-memory browser. Clones share the same state, so a test can keep one
/// handle for assertions while the session owns another.
#[derive(Clone, Default)]
pub struct FakePage {
    inner: Arc<Mutex<Inner>>,
}

impl FakePage {
    /// Browser with one blank tab.
    pub fn new() -> Self {
        Self::with_tab(TabSpec::new("New Tab"))
    }

    /// Browser whose only tab shows `spec`.
    pub fn with_tab(spec: TabSpec) -> Self {
        let page = Self::default();
        {
            let mut inner = page.inner.lock().unwrap();
            let handle = inner.open_tab(&spec);
            inner.active = Some(handle);
        }
        page
    }

    /// Content served when the active tab navigates to `url`.
    pub fn site(self, url: &str, spec: TabSpec) -> Self {
        self.inner
            .lock()
            .unwrap()
            .sites
            .insert(url.to_string(), spec);
        self
    }

    pub fn with_profile_dir(self, dir: &Path) -> Self {
        self.inner.lock().unwrap().profile_dir = Some(dir.to_path_buf());
        self
    }

    /// Every interaction in order, e.g. `click:continue`, `type:url:https://...`.
    pub fn log(&self) -> Vec<String> {
        self.inner.lock().unwrap().log.clone()
    }

    pub fn clicked(&self, name: &str) -> bool {
        self.log().contains(&format!("click:{name}"))
    }

    pub fn count(&self, entry: &str) -> usize {
        self.log().iter().filter(|e| e.as_str() == entry).count()
    }

    pub fn open_tabs(&self) -> Vec<TabHandle> {
        let inner = self.inner.lock().unwrap();
        inner.tabs.iter().map(|tab| tab.handle.clone()).collect()
    }

    pub fn active(&self) -> Option<TabHandle> {
        self.inner.lock().unwrap().active.clone()
    }

    fn record(&self, entry: String) {
        self.inner.lock().unwrap().log.push(entry);
    }

    fn label(&self, element: &FakeElement) -> String {
        self.inner.lock().unwrap().nodes[element.0].label.clone()
    }
}

#[async_trait::async_trait]
impl Page for FakePage {
    type Element = FakeElement;

    async fn navigate(&self, url: &str) -> Result<(), PageError> {
        let mut inner = self.inner.lock().unwrap();
        inner.log.push(format!("navigate:{url}"));
        let spec = inner.sites.get(url).cloned().unwrap_or_default();
        let roots: Vec<usize> = spec.nodes.iter().map(|n| inner.store(n)).collect();
        let tab = inner.active_tab()?;
        tab.title = spec.title;
        tab.body = spec.body;
        tab.roots = roots;
        Ok(())
    }

    async fn refresh(&self) -> Result<(), PageError> {
        self.record("refresh".into());
        Ok(())
    }

    async fn title(&self) -> Result<String, PageError> {
        Ok(self.inner.lock().unwrap().active_tab()?.title.clone())
    }

    async fn find(&self, locator: &Locator) -> Result<Option<FakeElement>, PageError> {
        let ids = self.inner.lock().unwrap().find_all(locator)?;
        Ok(ids.first().map(|id| FakeElement(*id)))
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<FakeElement>, PageError> {
        let ids = self.inner.lock().unwrap().find_all(locator)?;
        Ok(ids.into_iter().map(FakeElement).collect())
    }

    async fn find_in(
        &self,
        parent: &FakeElement,
        locator: &Locator,
    ) -> Result<Option<FakeElement>, PageError> {
        let ids = self.inner.lock().unwrap().find_all_in(*parent, locator);
        Ok(ids.first().map(|id| FakeElement(*id)))
    }

    async fn find_all_in(
        &self,
        parent: &FakeElement,
        locator: &Locator,
    ) -> Result<Vec<FakeElement>, PageError> {
        let ids = self.inner.lock().unwrap().find_all_in(*parent, locator);
        Ok(ids.into_iter().map(FakeElement).collect())
    }

    async fn text(&self, element: &FakeElement) -> Result<String, PageError> {
        Ok(self.inner.lock().unwrap().nodes[element.0].text.clone())
    }

    async fn attribute(
        &self,
        element: &FakeElement,
        name: &str,
    ) -> Result<Option<String>, PageError> {
        Ok(self.inner.lock().unwrap().nodes[element.0]
            .attrs
            .get(name)
            .cloned())
    }

    async fn is_clickable(&self, element: &FakeElement) -> Result<bool, PageError> {
        Ok(self.inner.lock().unwrap().nodes[element.0].clickable)
    }

    async fn click(&self, element: &FakeElement) -> Result<(), PageError> {
        let mut inner = self.inner.lock().unwrap();
        let label = inner.nodes[element.0].label.clone();
        inner.log.push(format!("click:{label}"));
        for reaction in inner.nodes[element.0].on_click.clone() {
            match reaction {
                Reaction::SetTitle(title) => inner.active_tab()?.title = title,
            }
        }
        Ok(())
    }

    async fn clear(&self, element: &FakeElement) -> Result<(), PageError> {
        self.record(format!("clear:{}", self.label(element)));
        Ok(())
    }

    async fn type_text(&self, element: &FakeElement, text: &str) -> Result<(), PageError> {
        self.record(format!("type:{}:{text}", self.label(element)));
        Ok(())
    }

    async fn submit(&self, element: &FakeElement) -> Result<(), PageError> {
        self.record(format!("submit:{}", self.label(element)));
        Ok(())
    }

    async fn set_file(&self, element: &FakeElement, path: &Path) -> Result<(), PageError> {
        self.record(format!("file:{}:{}", self.label(element), path.display()));
        Ok(())
    }

    async fn open_in_new_tab(&self, element: &FakeElement) -> Result<(), PageError> {
        let mut inner = self.inner.lock().unwrap();
        let label = inner.nodes[element.0].label.clone();
        let spec = inner.nodes[element.0].opens.clone().unwrap_or_default();
        let handle = inner.open_tab(&spec);
        inner.log.push(format!("open:{label}:{handle}"));
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<Value, PageError> {
        self.record("evaluate".into());
        if script.contains("test.musicbrainz.org") {
            self.record("rewrite:test.musicbrainz.org".into());
        }
        Ok(json!(1))
    }

    async fn evaluate_on(
        &self,
        element: &FakeElement,
        _function: &str,
    ) -> Result<Value, PageError> {
        let text = self.inner.lock().unwrap().nodes[element.0].text.clone();
        Ok(json!(text.trim().to_lowercase()))
    }

    async fn window_handles(&self) -> Result<Vec<TabHandle>, PageError> {
        Ok(self.open_tabs())
    }

    async fn current_handle(&self) -> Result<TabHandle, PageError> {
        self.inner
            .lock()
            .unwrap()
            .active
            .clone()
            .ok_or_else(|| PageError::UnknownTab(String::new()))
    }

    async fn switch_to(&self, handle: &str) -> Result<(), PageError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.tabs.iter().any(|tab| tab.handle == handle) {
            return Err(PageError::UnknownTab(handle.to_string()));
        }
        inner.active = Some(handle.to_string());
        Ok(())
    }

    async fn close_current(&self) -> Result<(), PageError> {
        let mut inner = self.inner.lock().unwrap();
        let active = inner
            .active
            .take()
            .ok_or_else(|| PageError::UnknownTab(String::new()))?;
        inner.tabs.retain(|tab| tab.handle != active);
        inner.log.push(format!("close:{active}"));
        Ok(())
    }

    async fn profile_dir(&self) -> Result<Option<PathBuf>, PageError> {
        Ok(self.inner.lock().unwrap().profile_dir.clone())
    }

    async fn body_text(&self) -> Result<String, PageError> {
        Ok(self.inner.lock().unwrap().active_tab()?.body.clone())
    }
}

/// Answers escalations from a script, then with a fixed fallback.
pub struct ScriptedOperator {
    script: Mutex<VecDeque<Decision>>,
    fallback: Decision,
    seen: Mutex<Vec<Escalation>>,
}

impl ScriptedOperator {
    pub fn answering(fallback: Decision) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn then(self, decision: Decision) -> Self {
        self.script.lock().unwrap().push_back(decision);
        self
    }

    pub fn escalations(&self) -> Vec<Escalation> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Operator for ScriptedOperator {
    async fn decide(&self, escalation: &Escalation) -> Decision {
        self.seen.lock().unwrap().push(escalation.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.fallback)
    }
}

#[derive(Default)]
pub struct RecordingClipboard {
    texts: Mutex<Vec<String>>,
}

impl RecordingClipboard {
    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

impl Clipboard for RecordingClipboard {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        self.texts.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Serves canned bodies by URL; unknown URLs fail like an unreachable host.
#[derive(Default)]
pub struct FakeFetcher {
    bodies: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn serve(mut self, url: &str, body: Vec<u8>) -> Self {
        self.bodies.insert(url.to_string(), body);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ImageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        let bytes = self
            .bodies
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::new(FailureKind::Network, "connection refused"))?;
        Ok(FetchOutput {
            bytes,
            final_url: url.to_string(),
            content_type: Some("image/png".to_string()),
        })
    }
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    RgbImage::new(width, height)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

pub fn fast_timings() -> Timings {
    Timings {
        poll_interval: Duration::from_millis(1),
        default_wait: Duration::from_millis(40),
        edit_wait: Duration::from_millis(40),
        long_wait: Duration::from_millis(40),
        submit_settle: Duration::ZERO,
        tab_settle: Duration::ZERO,
    }
}

/// A session over `page` plus handles on everything it talks to.
pub struct Harness {
    pub session: ImportSession<FakePage>,
    pub page: FakePage,
    pub operator: Arc<ScriptedOperator>,
    pub clipboard: Arc<RecordingClipboard>,
    pub fetcher: Arc<FakeFetcher>,
    pub dirs: TempDir,
}

impl Harness {
    pub fn new(
        page: FakePage,
        operator: ScriptedOperator,
        fetcher: FakeFetcher,
        config: ImportConfig,
    ) -> Self {
        Self::with_credentials(page, operator, fetcher, config, None)
    }

    pub fn with_credentials(
        page: FakePage,
        operator: ScriptedOperator,
        fetcher: FakeFetcher,
        config: ImportConfig,
        credentials: Option<Credentials>,
    ) -> Self {
        init_logging();
        let dirs = TempDir::new().unwrap();
        let operator = Arc::new(operator);
        let clipboard = Arc::new(RecordingClipboard::default());
        let fetcher = Arc::new(fetcher);
        let ports = Ports {
            operator: operator.clone(),
            clipboard: clipboard.clone(),
            fetcher: fetcher.clone(),
        };
        let settings = SessionSettings {
            config,
            credentials,
            timings: fast_timings(),
            covers_dir: dirs.path().join("covers"),
            profile_dir: dirs.path().join("profile"),
        };
        Self {
            session: ImportSession::new(page.clone(), ports, settings),
            page,
            operator,
            clipboard,
            fetcher,
            dirs,
        }
    }

    pub fn covers_dir(&self) -> PathBuf {
        self.dirs.path().join("covers")
    }

    pub fn profile_dir(&self) -> PathBuf {
        self.dirs.path().join("profile")
    }
}

/// Configuration that never stops for the operator.
pub fn unattended() -> ImportConfig {
    ImportConfig {
        manual_review_before_publish: false,
        ..ImportConfig::default()
    }
}
