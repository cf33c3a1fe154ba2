use std::fmt;
use std::path::{Path, PathBuf};

use importer_core::Locator;
use thiserror::Error;

/// Opaque identifier of a browser tab (window handle / target id).
pub type TabHandle = String;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("browser command failed: {0}")]
    Command(String),
    #[error("tab {0} is not open")]
    UnknownTab(TabHandle),
    #[error("{0} is not supported by this browser binding")]
    Unsupported(String),
    #[error("element is no longer attached to the page")]
    StaleElement,
}

impl PageError {
    pub fn command(err: impl fmt::Display) -> Self {
        PageError::Command(err.to_string())
    }
}

/// Browser capability consumed by the import pipeline.
///
/// Every call acts on the active tab. Lookups report absence with `None` or an
/// empty list; `Err` is reserved for the browser itself failing.
#[async_trait::async_trait]
pub trait Page: Send + Sync {
    type Element: Clone + fmt::Debug + Send + Sync;

    async fn navigate(&self, url: &str) -> Result<(), PageError>;
    async fn refresh(&self) -> Result<(), PageError>;
    async fn title(&self) -> Result<String, PageError>;

    async fn find(&self, locator: &Locator) -> Result<Option<Self::Element>, PageError>;
    async fn find_all(&self, locator: &Locator) -> Result<Vec<Self::Element>, PageError>;
    async fn find_in(
        &self,
        parent: &Self::Element,
        locator: &Locator,
    ) -> Result<Option<Self::Element>, PageError>;
    async fn find_all_in(
        &self,
        parent: &Self::Element,
        locator: &Locator,
    ) -> Result<Vec<Self::Element>, PageError>;

    /// Rendered text of the element and its descendants.
    async fn text(&self, element: &Self::Element) -> Result<String, PageError>;
    async fn attribute(
        &self,
        element: &Self::Element,
        name: &str,
    ) -> Result<Option<String>, PageError>;
    /// Displayed and enabled.
    async fn is_clickable(&self, element: &Self::Element) -> Result<bool, PageError>;

    async fn click(&self, element: &Self::Element) -> Result<(), PageError>;
    async fn clear(&self, element: &Self::Element) -> Result<(), PageError>;
    async fn type_text(&self, element: &Self::Element, text: &str) -> Result<(), PageError>;
    /// Submits the form the element belongs to.
    async fn submit(&self, element: &Self::Element) -> Result<(), PageError>;
    /// Points a file input at a local file.
    async fn set_file(&self, element: &Self::Element, path: &Path) -> Result<(), PageError>;
    /// Activates the element so that its target opens in a new tab,
    /// without changing the active tab.
    async fn open_in_new_tab(&self, element: &Self::Element) -> Result<(), PageError>;

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, PageError>;
    /// Calls a `function() { ... }` declaration with `this` bound to the element.
    async fn evaluate_on(
        &self,
        element: &Self::Element,
        function: &str,
    ) -> Result<serde_json::Value, PageError>;

    async fn window_handles(&self) -> Result<Vec<TabHandle>, PageError>;
    async fn current_handle(&self) -> Result<TabHandle, PageError>;
    async fn switch_to(&self, handle: &str) -> Result<(), PageError>;
    /// Closes the active tab. The caller must switch to another tab afterwards.
    async fn close_current(&self) -> Result<(), PageError>;

    /// Directory holding the live browser profile, if the binding exposes one.
    async fn profile_dir(&self) -> Result<Option<PathBuf>, PageError>;

    async fn body_text(&self) -> Result<String, PageError> {
        match self.find(&Locator::tag_name("body")).await? {
            Some(body) => self.text(&body).await,
            None => Ok(String::new()),
        }
    }
}
