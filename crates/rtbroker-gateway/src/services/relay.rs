use async_trait::async_trait;

use rtbroker_core::error::Result;
use rtbroker_core::Envelope;

use crate::dispatch::{HubCtx, HubListener};

/// Hub listener that rebroadcasts the envelope, unchanged, to its own room.
/// Register it for the custom events a deployment wants relayed (e.g. chat).
pub struct RoomRelay;

#[async_trait]
impl HubListener for RoomRelay {
    async fn on_event(&self, ctx: HubCtx, env: Envelope) -> Result<()> {
        ctx.emit(&env).await;
        Ok(())
    }
}
