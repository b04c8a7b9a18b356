pub mod live;
pub mod queue;
pub mod worker;

pub use live::{GraphView, LiveGraph, SessionError};
pub use queue::{ChannelEditQueue, Edit, EditQueue};
pub use worker::RebuildWorker;
