use jsongraph_core::config::BuildOptions;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// One change forwarded by the editor. Every edit carries the full text; the
/// graph is always rebuilt from scratch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Edit {
    Replace { text: String },
    Reconfigure { options: BuildOptions },
}

#[async_trait::async_trait]
pub trait EditQueue: Send + Sync {
    async fn enqueue(&self, edit: Edit) -> anyhow::Result<()>;
}

/// Forwards editor changes to a [`RebuildWorker`](crate::RebuildWorker) over a
/// bounded mpsc channel. `enqueue` waits while the worker is behind.
pub struct ChannelEditQueue {
    sender: mpsc::Sender<Edit>,
}

impl ChannelEditQueue {
    pub fn new(sender: mpsc::Sender<Edit>) -> Self {
        Self { sender }
    }
}

#[async_trait::async_trait]
impl EditQueue for ChannelEditQueue {
    async fn enqueue(&self, edit: Edit) -> anyhow::Result<()> {
        self.sender
            .send(edit)
            .await
            .map_err(|e| anyhow::anyhow!("Edit queue send error: {}", e))
    }
}
