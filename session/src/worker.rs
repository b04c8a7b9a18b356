use crate::live::LiveGraph;
use crate::queue::Edit;
use tokio::sync::mpsc;
use tracing::{error, info};

pub struct RebuildWorker {
    receiver: mpsc::Receiver<Edit>,
    live: LiveGraph,
}

impl RebuildWorker {
    pub fn new(receiver: mpsc::Receiver<Edit>, live: LiveGraph) -> Self {
        Self { receiver, live }
    }

    /// Applies edits until every sender is dropped, then hands the session back.
    pub async fn run(mut self) -> LiveGraph {
        info!("Rebuild worker started");
        while let Some(edit) = self.receiver.recv().await {
            let result = match edit {
                Edit::Replace { text } => {
                    info!("Processing edit ({} bytes)", text.len());
                    self.live.apply_text(text)
                }
                Edit::Reconfigure { options } => {
                    info!("Processing reconfigure");
                    self.live.reconfigure(options)
                }
            };
            if let Err(e) = result {
                error!("Failed to rebuild graph: {}", e);
            }
        }
        info!("Rebuild worker stopped");
        self.live
    }
}
