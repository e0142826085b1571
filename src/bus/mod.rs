//! Synchronous event bus shared by the recorder, the replay scheduler and
//! the external UI.

mod event_bus;
mod kind;


pub use event_bus::{BusEvent, EventBus, SubscriptionId};
pub use kind::EventKind;
