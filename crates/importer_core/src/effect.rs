/// Side effects requested by [`crate::update`]; the orchestrator executes them in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    CopyToClipboard(String),
    /// Block until the operator lets the batch move on.
    PauseForOperator,
    /// Point the aggregator's target-database links at the test server.
    EnableTestServer,
    /// Read the generated release identifier from the processing tab.
    ReadReleaseId,
    CloseProcessingTab,
    ReturnToSource,
}
