//! Trait describing a runnable client front-end.
use anyhow::Result;
use async_trait::async_trait;
use runtime::EngineHandle;

/// Frontend abstraction for UI layers.
///
/// Frontends communicate with the session via [`EngineHandle`]:
/// - Watch published snapshots
/// - Subscribe to sync events
/// - Submit the `refresh`, `enter`, and `select` intents
///
/// Frontends do NOT own the session runtime. When the wallet switches account
/// or chain the composition root drops the running `run` future and calls it
/// again with the handle of the new session, so implementations must keep any
/// input state they cannot lose in `self`.
#[async_trait]
pub trait Frontend: Send {
    /// Run the frontend until the user quits.
    ///
    /// # Errors
    ///
    /// Returns an error if the frontend encounters a fatal error.
    async fn run(&mut self, handle: EngineHandle) -> Result<()>;
}
