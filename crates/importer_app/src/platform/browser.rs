//! `Page` binding over the Chrome DevTools Protocol.
//!
//! Elements are remote object handles resolved in the active tab. Tab handles
//! are CDP target ids.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::cdp::browser_protocol::input::InsertTextParams;
use chromiumoxide::cdp::browser_protocol::target::{GetTargetsParams, TargetId};
use chromiumoxide::cdp::js_protocol::runtime::{
    CallFunctionOnParams, EvaluateParams, ExceptionDetails, GetPropertiesParams, RemoteObject,
    RemoteObjectId,
};
use chromiumoxide::Page as CdpPage;
use futures::StreamExt;
use importer_core::Locator;
use importer_engine::{Page, PageError, TabHandle};
use importer_logging::{importer_debug, importer_info, importer_warn};
use tokio::task::JoinHandle;

/// Protocol errors that mean the element handle died with its document.
const STALE_MARKERS: [&str; 3] = [
    "Could not find object with given id",
    "Cannot find context with specified id",
    "Node is detached",
];

const FIND_ALL_FN: &str = r#"function (root, kind, value) {
    if (kind === 'xpath') {
        const doc = root.ownerDocument || root;
        const snapshot = doc.evaluate(value, root, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
        const out = [];
        for (let i = 0; i < snapshot.snapshotLength; i++) out.push(snapshot.snapshotItem(i));
        return out;
    }
    return Array.from(root.querySelectorAll(value));
}"#;

const TEXT_FN: &str = "function () { return this.innerText ?? this.textContent ?? ''; }";

const CLICKABLE_FN: &str = r#"function () {
    const style = getComputedStyle(this);
    const rect = this.getBoundingClientRect();
    return !this.disabled && style.visibility !== 'hidden' && style.display !== 'none'
        && (rect.width > 0 || rect.height > 0);
}"#;

const CLICK_FN: &str = "function () { this.scrollIntoView({ block: 'center' }); this.click(); }";

const CLEAR_FN: &str = r#"function () {
    this.focus();
    if ('value' in this) {
        this.value = '';
        this.dispatchEvent(new Event('input', { bubbles: true }));
    }
}"#;

const FOCUS_FN: &str = "function () { this.scrollIntoView({ block: 'center' }); this.focus(); }";

const SUBMIT_FN: &str = r#"function () {
    const form = this.form || this.closest('form');
    if (!form) throw new Error('element is not inside a form');
    if (form.requestSubmit) form.requestSubmit(); else form.submit();
}"#;

const OPEN_IN_NEW_TAB_FN: &str = r#"function () {
    if (this.href) {
        window.open(this.href, '_blank');
        return;
    }
    const form = this.form;
    if (!form) throw new Error('element has neither a link nor a form');
    const previous = form.getAttribute('target');
    form.target = '_blank';
    this.click();
    if (previous === null) form.removeAttribute('target'); else form.target = previous;
}"#;

/// Remote element handle, valid while its document is loaded.
#[derive(Debug, Clone)]
pub struct ChromiumElement {
    object_id: RemoteObjectId,
}

#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Working copy of the browser profile.
    pub profile_dir: PathBuf,
    pub executable: Option<PathBuf>,
}

/// A headful Chromium instance and its active tab.
pub struct ChromiumPage {
    browser: Browser,
    handler: JoinHandle<()>,
    active: Mutex<CdpPage>,
    profile_dir: PathBuf,
}

impl fmt::Debug for ChromiumPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChromiumPage")
            .field("profile_dir", &self.profile_dir)
            .finish_non_exhaustive()
    }
}

impl ChromiumPage {
    pub async fn launch(options: LaunchOptions) -> Result<Self, PageError> {
        let mut builder = BrowserConfig::builder()
            .with_head()
            .user_data_dir(&options.profile_dir)
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-popup-blocking");
        if let Some(executable) = &options.executable {
            builder = builder.chrome_executable(executable);
        }
        let config = builder.build().map_err(PageError::Command)?;

        let (browser, mut handler) = Browser::launch(config).await.map_err(cdp_error)?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    importer_debug!("CDP handler event error: {}", err);
                }
            }
            importer_debug!("CDP handler finished");
        });

        let page = browser.new_page("about:blank").await.map_err(cdp_error)?;
        importer_info!(
            "Browser launched with profile {:?} (tab {})",
            options.profile_dir,
            page.target_id().inner()
        );

        Ok(Self {
            browser,
            handler,
            active: Mutex::new(page),
            profile_dir: options.profile_dir,
        })
    }

    /// Closes the browser and waits for the process to exit.
    pub async fn shutdown(mut self) {
        if let Err(err) = self.browser.close().await {
            importer_warn!("Browser did not close cleanly: {}", err);
        }
        if let Err(err) = self.browser.wait().await {
            importer_warn!("Could not wait for the browser process: {}", err);
        }
        self.handler.abort();
    }

    fn current(&self) -> Result<CdpPage, PageError> {
        self.active
            .lock()
            .map(|page| page.clone())
            .map_err(|_| PageError::Command("active tab lock poisoned".to_string()))
    }

    fn set_current(&self, page: CdpPage) -> Result<(), PageError> {
        let mut active = self
            .active
            .lock()
            .map_err(|_| PageError::Command("active tab lock poisoned".to_string()))?;
        *active = page;
        Ok(())
    }

    /// Calls `function` with `this` bound to the element.
    async fn call_on(
        &self,
        element: &ChromiumElement,
        function: &str,
        by_value: bool,
    ) -> Result<RemoteObject, PageError> {
        let params = CallFunctionOnParams::builder()
            .function_declaration(function)
            .object_id(element.object_id.clone())
            .return_by_value(by_value)
            .await_promise(true)
            .user_gesture(true)
            .build()
            .map_err(PageError::Command)?;
        let response = self.current()?.execute(params).await.map_err(cdp_error)?;
        check_exception(response.result.exception_details.as_ref())?;
        Ok(response.result.result)
    }

    async fn call_for_value(
        &self,
        element: &ChromiumElement,
        function: &str,
    ) -> Result<serde_json::Value, PageError> {
        let object = self.call_on(element, function, true).await?;
        Ok(object.value.unwrap_or(serde_json::Value::Null))
    }

    /// Resolves a locator under `root` (the document when `None`) into element handles.
    async fn query(
        &self,
        root: Option<&ChromiumElement>,
        locator: &Locator,
    ) -> Result<Vec<ChromiumElement>, PageError> {
        let (kind, value) = match locator {
            Locator::XPath(xpath) => ("xpath", xpath.clone()),
            other => (
                "css",
                other
                    .to_css()
                    .ok_or_else(|| PageError::Unsupported(other.to_string()))?,
            ),
        };
        let value = js_string(&value)?;

        let array = match root {
            Some(element) => {
                let function = format!(
                    "function () {{ return ({FIND_ALL_FN})(this, '{kind}', {value}); }}"
                );
                self.call_on(element, &function, false).await?
            }
            None => {
                let expression = format!("({FIND_ALL_FN})(document, '{kind}', {value})");
                let params = EvaluateParams::builder()
                    .expression(expression)
                    .return_by_value(false)
                    .build()
                    .map_err(PageError::Command)?;
                let response = self.current()?.execute(params).await.map_err(cdp_error)?;
                check_exception(response.result.exception_details.as_ref())?;
                response.result.result
            }
        };
        let Some(array_id) = array.object_id else {
            return Ok(Vec::new());
        };

        let params = GetPropertiesParams::builder()
            .object_id(array_id)
            .own_properties(true)
            .build()
            .map_err(PageError::Command)?;
        let response = self.current()?.execute(params).await.map_err(cdp_error)?;

        let mut indexed: Vec<(usize, RemoteObjectId)> = response
            .result
            .result
            .into_iter()
            .filter_map(|property| {
                let index = property.name.parse::<usize>().ok()?;
                let object_id = property.value?.object_id?;
                Some((index, object_id))
            })
            .collect();
        indexed.sort_by_key(|(index, _)| *index);
        Ok(indexed
            .into_iter()
            .map(|(_, object_id)| ChromiumElement { object_id })
            .collect())
    }
}

#[async_trait::async_trait]
impl Page for ChromiumPage {
    type Element = ChromiumElement;

    async fn navigate(&self, url: &str) -> Result<(), PageError> {
        importer_debug!("Navigating to {}", url);
        self.current()?.goto(url).await.map_err(cdp_error)?;
        Ok(())
    }

    async fn refresh(&self) -> Result<(), PageError> {
        self.current()?.reload().await.map_err(cdp_error)?;
        Ok(())
    }

    async fn title(&self) -> Result<String, PageError> {
        let title = self.current()?.get_title().await.map_err(cdp_error)?;
        Ok(title.unwrap_or_default())
    }

    async fn find(&self, locator: &Locator) -> Result<Option<ChromiumElement>, PageError> {
        Ok(self.query(None, locator).await?.into_iter().next())
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<ChromiumElement>, PageError> {
        self.query(None, locator).await
    }

    async fn find_in(
        &self,
        parent: &ChromiumElement,
        locator: &Locator,
    ) -> Result<Option<ChromiumElement>, PageError> {
        Ok(self.query(Some(parent), locator).await?.into_iter().next())
    }

    async fn find_all_in(
        &self,
        parent: &ChromiumElement,
        locator: &Locator,
    ) -> Result<Vec<ChromiumElement>, PageError> {
        self.query(Some(parent), locator).await
    }

    async fn text(&self, element: &ChromiumElement) -> Result<String, PageError> {
        let value = self.call_for_value(element, TEXT_FN).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn attribute(
        &self,
        element: &ChromiumElement,
        name: &str,
    ) -> Result<Option<String>, PageError> {
        let function = attribute_fn(&js_string(name)?);
        let value = self.call_for_value(element, &function).await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn is_clickable(&self, element: &ChromiumElement) -> Result<bool, PageError> {
        let value = self.call_for_value(element, CLICKABLE_FN).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn click(&self, element: &ChromiumElement) -> Result<(), PageError> {
        self.call_on(element, CLICK_FN, true).await.map(drop)
    }

    async fn clear(&self, element: &ChromiumElement) -> Result<(), PageError> {
        self.call_on(element, CLEAR_FN, true).await.map(drop)
    }

    async fn type_text(&self, element: &ChromiumElement, text: &str) -> Result<(), PageError> {
        self.call_on(element, FOCUS_FN, true).await?;
        self.current()?
            .execute(InsertTextParams::new(text))
            .await
            .map_err(cdp_error)?;
        Ok(())
    }

    async fn submit(&self, element: &ChromiumElement) -> Result<(), PageError> {
        self.call_on(element, SUBMIT_FN, true).await.map(drop)
    }

    async fn set_file(&self, element: &ChromiumElement, path: &Path) -> Result<(), PageError> {
        let params = SetFileInputFilesParams::builder()
            .files(vec![path.display().to_string()])
            .object_id(element.object_id.clone())
            .build()
            .map_err(PageError::Command)?;
        self.current()?.execute(params).await.map_err(cdp_error)?;
        Ok(())
    }

    async fn open_in_new_tab(&self, element: &ChromiumElement) -> Result<(), PageError> {
        self.call_on(element, OPEN_IN_NEW_TAB_FN, true).await.map(drop)
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, PageError> {
        let params = EvaluateParams::builder()
            .expression(script)
            .return_by_value(true)
            .await_promise(true)
            .build()
            .map_err(PageError::Command)?;
        let response = self.current()?.execute(params).await.map_err(cdp_error)?;
        check_exception(response.result.exception_details.as_ref())?;
        Ok(response.result.result.value.unwrap_or(serde_json::Value::Null))
    }

    async fn evaluate_on(
        &self,
        element: &ChromiumElement,
        function: &str,
    ) -> Result<serde_json::Value, PageError> {
        self.call_for_value(element, function).await
    }

    async fn window_handles(&self) -> Result<Vec<TabHandle>, PageError> {
        let response = self
            .current()?
            .execute(GetTargetsParams::default())
            .await
            .map_err(cdp_error)?;
        Ok(response
            .result
            .target_infos
            .into_iter()
            .filter(|target| target.r#type == "page")
            .map(|target| target.target_id.inner().clone())
            .collect())
    }

    async fn current_handle(&self) -> Result<TabHandle, PageError> {
        Ok(self.current()?.target_id().inner().clone())
    }

    async fn switch_to(&self, handle: &str) -> Result<(), PageError> {
        let page = self
            .browser
            .get_page(TargetId::from(handle.to_string()))
            .await
            .map_err(|err| {
                importer_debug!("Tab {} lookup failed: {}", handle, err);
                PageError::UnknownTab(handle.to_string())
            })?;
        page.activate().await.map_err(cdp_error)?;
        self.set_current(page)
    }

    async fn close_current(&self) -> Result<(), PageError> {
        self.current()?.close().await.map_err(cdp_error)
    }

    async fn profile_dir(&self) -> Result<Option<PathBuf>, PageError> {
        Ok(Some(self.profile_dir.clone()))
    }
}

fn attribute_fn(name: &str) -> String {
    format!(
        r#"function () {{
    const name = {name};
    const property = this[name];
    if (typeof property === 'boolean') return property ? 'true' : null;
    if (typeof property === 'string' || typeof property === 'number') return String(property);
    return this.getAttribute(name);
}}"#
    )
}

/// Encodes a value as a JavaScript string literal.
fn js_string(value: &str) -> Result<String, PageError> {
    serde_json::to_string(value).map_err(PageError::command)
}

fn check_exception(details: Option<&ExceptionDetails>) -> Result<(), PageError> {
    let Some(details) = details else {
        return Ok(());
    };
    let description = details
        .exception
        .as_ref()
        .and_then(|exception| exception.description.clone())
        .unwrap_or_else(|| details.text.clone());
    Err(classify(description))
}

fn cdp_error(err: impl fmt::Display) -> PageError {
    classify(err.to_string())
}

fn classify(message: String) -> PageError {
    if STALE_MARKERS.iter().any(|marker| message.contains(marker)) {
        PageError::StaleElement
    } else {
        PageError::Command(message)
    }
}
