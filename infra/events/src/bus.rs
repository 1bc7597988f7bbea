use crate::error::EventBusError;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::any::{Any, TypeId, type_name};
use std::mem::discriminant;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{trace, warn};

/// Default buffer for broadcast channels. Container events are small and bursty.
const DEFAULT_CAPACITY: usize = 128;

/// Supported channel kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    /// Fan-out: every subscriber sees every event published after it subscribed.
    Broadcast { capacity: usize },
    /// Latest-value: subscribers observe the most recent event only.
    Watch,
}

/// Marker trait for types that can travel across the [`EventBus`].
pub trait Event: Any + Send + Sync + 'static {}
impl<T: Any + Send + Sync + 'static> Event for T {}

#[derive(Debug)]
struct ChannelSlot {
    kind: ChannelKind,
    sender: Box<dyn Any + Send + Sync>,
}

/// A thread-safe event bus keyed by the Rust type of the event.
///
/// Cloning is cheap; clones share the same channels.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    channels: Arc<RwLock<FxHashMap<TypeId, ChannelSlot>>>,
}

impl EventBus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to broadcast events of type `T` with the default capacity.
    ///
    /// # Errors
    /// Returns [`EventBusError::ChannelKindMismatch`] if `T` is already carried by a watch channel.
    ///
    /// # Examples
    /// ```rust
    /// use cfgd_event_bus::{EventBus, EventReceiverExt};
    ///
    /// #[derive(Debug, PartialEq)]
    /// struct Saved(u32);
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() -> Result<(), cfgd_event_bus::EventBusError> {
    /// let bus = EventBus::new();
    /// let mut rx = bus.subscribe::<Saved>()?;
    /// bus.publish(Saved(7))?;
    /// assert_eq!(rx.next_event().await.map(|e| e.0), Some(7));
    /// # Ok(())
    /// # }
    /// ```
    pub fn subscribe<T: Event>(&self) -> Result<broadcast::Receiver<Arc<T>>, EventBusError> {
        self.subscribe_with_capacity::<T>(DEFAULT_CAPACITY)
    }

    /// Subscribes to broadcast events of type `T`, creating the channel with `capacity`
    /// if it does not exist yet.
    ///
    /// # Errors
    /// Returns [`EventBusError::InvalidCapacity`] for a zero capacity and
    /// [`EventBusError::ChannelKindMismatch`] if `T` is carried by a watch channel.
    pub fn subscribe_with_capacity<T: Event>(
        &self,
        capacity: usize,
    ) -> Result<broadcast::Receiver<Arc<T>>, EventBusError> {
        if capacity == 0 {
            return Err(EventBusError::InvalidCapacity {
                message: "broadcast capacity must be at least 1".into(),
                context: Some(type_name::<T>().into()),
            });
        }
        let sender = self.sender::<T, broadcast::Sender<Arc<T>>>(
            ChannelKind::Broadcast { capacity },
            || broadcast::channel(capacity).0,
        )?;
        Ok(sender.subscribe())
    }

    /// Publishes `event` to every broadcast subscriber of `T`.
    ///
    /// Returns the number of subscribers that received it; publishing with no
    /// subscribers is not an error.
    ///
    /// # Errors
    /// Returns [`EventBusError::ChannelKindMismatch`] if `T` is carried by a watch channel.
    pub fn publish<T: Event>(&self, event: T) -> Result<usize, EventBusError> {
        self.publish_arc(Arc::new(event))
    }

    /// Publishes an already shared event without re-wrapping it.
    ///
    /// # Errors
    /// See [`EventBus::publish`].
    pub fn publish_arc<T: Event>(&self, event: Arc<T>) -> Result<usize, EventBusError> {
        let sender = self.sender::<T, broadcast::Sender<Arc<T>>>(
            ChannelKind::Broadcast { capacity: DEFAULT_CAPACITY },
            || broadcast::channel(DEFAULT_CAPACITY).0,
        )?;

        if let Ok(count) = sender.send(event) {
            trace!(event = type_name::<T>(), count, "Event dispatched");
            Ok(count)
        } else {
            trace!(event = type_name::<T>(), "Event dropped: no active subscribers");
            Ok(0)
        }
    }

    /// Subscribes to the latest value of `T`, seeding the channel with `initial`
    /// if nobody has published yet.
    ///
    /// # Errors
    /// Returns [`EventBusError::ChannelKindMismatch`] if `T` is carried by a broadcast channel.
    pub fn subscribe_watch<T: Event>(
        &self,
        initial: T,
    ) -> Result<watch::Receiver<Arc<T>>, EventBusError> {
        let sender = self.sender::<T, watch::Sender<Arc<T>>>(ChannelKind::Watch, || {
            watch::channel(Arc::new(initial)).0
        })?;
        Ok(sender.subscribe())
    }

    /// Replaces the latest value of `T`, waking every watch subscriber.
    ///
    /// # Errors
    /// Returns [`EventBusError::ChannelKindMismatch`] if `T` is carried by a broadcast channel.
    pub fn publish_watch<T: Event>(&self, event: T) -> Result<(), EventBusError> {
        let event = Arc::new(event);
        let seeded = event.clone();
        let sender = self.sender::<T, watch::Sender<Arc<T>>>(ChannelKind::Watch, move || {
            watch::channel(seeded).0
        })?;
        sender.send_replace(event);
        Ok(())
    }

    /// Number of channels currently registered.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.read().len()
    }

    /// Drops every channel; receivers observe closure.
    ///
    /// Returns the number of channels closed.
    #[must_use]
    pub fn shutdown(&self) -> usize {
        let mut channels = self.channels.write();
        let closed = channels.len();
        channels.clear();
        closed
    }

    /// Returns a clone of the sender for `T`, creating the channel on first use.
    fn sender<T: Event, S: Clone + Send + Sync + 'static>(
        &self,
        kind: ChannelKind,
        create: impl FnOnce() -> S,
    ) -> Result<S, EventBusError> {
        let id = TypeId::of::<T>();

        if let Some(slot) = self.channels.read().get(&id) {
            return downcast_sender::<T, S>(slot, kind);
        }

        let mut channels = self.channels.write();
        let slot = channels.entry(id).or_insert_with(|| {
            trace!(event = type_name::<T>(), ?kind, "Initializing event channel");
            ChannelSlot { kind, sender: Box::new(create()) }
        });
        downcast_sender::<T, S>(slot, kind)
    }
}

fn downcast_sender<T: Event, S: Clone + 'static>(
    slot: &ChannelSlot,
    requested: ChannelKind,
) -> Result<S, EventBusError> {
    if discriminant(&slot.kind) != discriminant(&requested) {
        return Err(EventBusError::ChannelKindMismatch {
            message: format!("expected {requested:?} but found {:?}", slot.kind).into(),
            context: Some(type_name::<T>().into()),
        });
    }

    if let (
        ChannelKind::Broadcast { capacity: existing },
        ChannelKind::Broadcast { capacity: requested },
    ) = (slot.kind, requested)
        && existing != requested
        && requested != DEFAULT_CAPACITY
    {
        warn!(
            event = type_name::<T>(),
            existing, requested, "Broadcast channel already initialized with a different capacity"
        );
    }

    slot.sender.downcast_ref::<S>().cloned().ok_or_else(|| EventBusError::TypeMismatch {
        message: type_name::<T>().into(),
        context: Some("unexpected sender type".into()),
    })
}
