//! Order lifecycle events. The order flow publishes on [`EventProducers`]; hooks registered in [`EventHooks`] consume
//! them on their own tasks, so a slow hook never delays a checkout or a webhook response.
mod channel;
mod event_types;
mod hooks;

pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::*;
pub use hooks::{EventHandlers, EventHooks, EventProducers, HookFuture};
