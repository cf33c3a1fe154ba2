mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use importer_core::{ElementQuery, Locator};
use importer_engine::{Decision, Escalation, ImportError, PageError, Waiter};
use support::{init_logging, FakePage, Node, ScriptedOperator, TabSpec};

const BUDGET: Duration = Duration::from_millis(30);

fn waiter(operator: &Arc<ScriptedOperator>) -> Waiter {
    init_logging();
    Waiter::new(operator.clone(), Duration::from_millis(1))
}

#[tokio::test]
async fn present_element_is_returned_without_escalation() {
    let page = FakePage::with_tab(TabSpec::new("Ready").node(Node::new(Locator::id("ready"))));
    let operator = Arc::new(ScriptedOperator::answering(Decision::Abort));

    let found = waiter(&operator)
        .wait_for(&page, &ElementQuery::present(Locator::id("ready"), BUDGET))
        .await;

    assert!(found.is_ok());
    assert!(operator.escalations().is_empty());
}

#[tokio::test]
async fn timeout_asks_operator_and_abort_fails() {
    let page = FakePage::new();
    let operator = Arc::new(ScriptedOperator::answering(Decision::Abort));

    let err = waiter(&operator)
        .wait_for(&page, &ElementQuery::present(Locator::id("missing"), BUDGET))
        .await
        .unwrap_err();

    match err {
        ImportError::Timeout { what, timeout } => {
            assert!(what.contains("missing"));
            assert_eq!(timeout, BUDGET);
        }
        other => panic!("expected timeout, got {other:?}"),
    }
    let escalations = operator.escalations();
    assert_eq!(escalations.len(), 1);
    assert!(matches!(&escalations[0], Escalation::WaitTimeout { what } if what.contains("missing")));
}

#[tokio::test]
async fn retry_restarts_the_wait() {
    let page = FakePage::new();
    let operator = Arc::new(
        ScriptedOperator::answering(Decision::Proceed)
            .then(Decision::Retry)
            .then(Decision::Retry),
    );

    let err = waiter(&operator)
        .wait_for(&page, &ElementQuery::present(Locator::id("missing"), BUDGET))
        .await
        .unwrap_err();

    assert!(matches!(err, ImportError::Timeout { .. }));
    assert_eq!(operator.escalations().len(), 3);
}

#[tokio::test]
async fn clickable_query_ignores_disabled_elements() {
    let page = FakePage::with_tab(
        TabSpec::new("Form").node(Node::new(Locator::id("submit")).disabled()),
    );
    let operator = Arc::new(ScriptedOperator::answering(Decision::Abort));
    let waiter = waiter(&operator);

    let present = waiter
        .wait_for(&page, &ElementQuery::present(Locator::id("submit"), BUDGET))
        .await;
    assert!(present.is_ok());

    let clickable = waiter
        .wait_for(&page, &ElementQuery::clickable(Locator::id("submit"), BUDGET))
        .await;
    assert!(matches!(clickable, Err(ImportError::Timeout { .. })));
}

#[tokio::test]
async fn wait_for_all_returns_every_match() {
    let page = FakePage::with_tab(
        TabSpec::new("Links")
            .node(Node::new(Locator::class_name("link")))
            .node(Node::new(Locator::class_name("link")))
            .node(Node::new(Locator::class_name("other"))),
    );
    let operator = Arc::new(ScriptedOperator::answering(Decision::Abort));

    let links = waiter(&operator)
        .wait_for_all(&page, &ElementQuery::all(Locator::class_name("link"), BUDGET))
        .await
        .unwrap();
    assert_eq!(links.len(), 2);
}

#[tokio::test]
async fn wait_until_polls_until_the_probe_yields() {
    let operator = Arc::new(ScriptedOperator::answering(Decision::Abort));
    let calls = AtomicUsize::new(0);

    let value = waiter(&operator)
        .wait_until("third poll", Duration::from_secs(1), || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                match n {
                    1 => Err(PageError::StaleElement),
                    2 => Ok(None),
                    n => Ok(Some(n)),
                }
            }
        })
        .await
        .unwrap();

    assert_eq!(value, 3);
    assert!(operator.escalations().is_empty());
}
