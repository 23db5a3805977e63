//! Requests a replica sends up to the authority

use tokio::sync::oneshot;

use crate::core::error::{DismemberError, Result};
use crate::core::types::DamageSurfaceId;

/// Mutation a non-authoritative node asks the authority to perform
#[derive(Debug)]
pub enum AuthorityRequest {
    /// Reassign the surface whose point hits the skeleton accepts
    SetDamageSurface {
        surface: DamageSurfaceId,
        reply: oneshot::Sender<Result<()>>,
    },
}

/// Acknowledgement the authority sends back once it has handled a request
#[derive(Debug)]
pub struct PendingAck(oneshot::Receiver<Result<()>>);

impl PendingAck {
    pub(crate) fn new(receiver: oneshot::Receiver<Result<()>>) -> Self {
        Self(receiver)
    }

    /// Wait for the authority's answer
    pub async fn wait(self) -> Result<()> {
        self.0.await.map_err(|_| DismemberError::ChannelClosed)?
    }

    /// Non-blocking check; `None` while the authority has not answered yet
    pub fn try_take(&mut self) -> Option<Result<()>> {
        match self.0.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(DismemberError::ChannelClosed)),
        }
    }
}
