//! # Event Bus
//!
//! A small, type-safe event bus used to fan container notifications out to the
//! rest of the process (shutdown coordination, change feeds).
//!
//! * **Type-keyed**: each Rust type gets its own channel.
//! * **Broadcast** channels fan every event out to all current subscribers.
//! * **Watch** channels keep only the latest value, which suits one-shot signals
//!   such as a shutdown request.
//!
//! # Example
//!
//! ```rust
//! use cfgd_event_bus::{EventBus, EventBusError};
//!
//! #[derive(Debug, PartialEq)]
//! struct Stop(bool);
//!
//! # fn main() -> Result<(), EventBusError> {
//! let bus = EventBus::new();
//! let rx = bus.subscribe_watch(Stop(false))?;
//! bus.publish_watch(Stop(true))?;
//! assert!(rx.borrow().0);
//! # Ok(())
//! # }
//! ```

mod bus;
mod error;
mod receiver;

pub use bus::{ChannelKind, Event, EventBus};
pub use error::{EventBusError, EventBusErrorExt};
pub use receiver::EventReceiverExt;
