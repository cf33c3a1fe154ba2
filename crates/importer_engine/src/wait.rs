use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use importer_core::{ElementQuery, WaitCondition};
use importer_logging::{importer_debug, importer_info, importer_warn};
use tokio::time::{sleep, Instant};

use crate::operator::{Decision, Escalation, Operator};
use crate::{ImportError, Page, PageError};

/// Bounded polling wait. A timeout is handed to the operator, who can restart
/// the wait with the same budget or let it fail.
#[derive(Clone)]
pub struct Waiter {
    operator: Arc<dyn Operator>,
    poll_interval: Duration,
}

impl Waiter {
    pub fn new(operator: Arc<dyn Operator>, poll_interval: Duration) -> Self {
        Self {
            operator,
            poll_interval,
        }
    }

    /// Waits for the first element matching the query (`Present` or `Clickable`).
    pub async fn wait_for<P: Page>(
        &self,
        page: &P,
        query: &ElementQuery,
    ) -> Result<P::Element, ImportError> {
        let what = query.to_string();
        self.wait_until(&what, query.timeout, || probe_one(page, query))
            .await
    }

    /// Waits until at least one element matches and returns all matches.
    pub async fn wait_for_all<P: Page>(
        &self,
        page: &P,
        query: &ElementQuery,
    ) -> Result<Vec<P::Element>, ImportError> {
        let what = query.to_string();
        self.wait_until(&what, query.timeout, || probe_all(page, query))
            .await
    }

    /// Polls `probe` until it yields a value. Probe errors count as "not yet":
    /// the page may be in the middle of a navigation.
    pub async fn wait_until<T, F, Fut>(
        &self,
        what: &str,
        timeout: Duration,
        mut probe: F,
    ) -> Result<T, ImportError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>, PageError>>,
    {
        loop {
            let deadline = Instant::now() + timeout;
            loop {
                match probe().await {
                    Ok(Some(value)) => return Ok(value),
                    Ok(None) => {}
                    Err(err) => importer_debug!("Probe for {} failed: {}", what, err),
                }
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                sleep(self.poll_interval.min(deadline - now)).await;
            }

            importer_warn!("Timed out after {:?} waiting for {}", timeout, what);
            let escalation = Escalation::WaitTimeout {
                what: what.to_string(),
            };
            match self.operator.decide(&escalation).await {
                Decision::Retry => importer_info!("Retrying wait for {}", what),
                Decision::Proceed | Decision::Abort => {
                    return Err(ImportError::Timeout {
                        what: what.to_string(),
                        timeout,
                    })
                }
            }
        }
    }
}

async fn probe_one<P: Page>(
    page: &P,
    query: &ElementQuery,
) -> Result<Option<P::Element>, PageError> {
    let Some(element) = page.find(&query.locator).await? else {
        return Ok(None);
    };
    match query.condition {
        WaitCondition::Clickable if !page.is_clickable(&element).await? => Ok(None),
        _ => Ok(Some(element)),
    }
}

async fn probe_all<P: Page>(
    page: &P,
    query: &ElementQuery,
) -> Result<Option<Vec<P::Element>>, PageError> {
    let elements = page.find_all(&query.locator).await?;
    Ok((!elements.is_empty()).then_some(elements))
}
