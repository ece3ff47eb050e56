//! # RUNEFORGE Event Channels
//!
//! Bounded channels between the enchanting engine and whatever consumes
//! its results (chat feedback, analytics, the trigger pump).
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐      ┌─────────────┐      ┌─────────────────┐
//! │ EnchantingTable │─────>│   Forge     │─────>│  Host adapter   │
//! │  (engine)       │      │   Channel   │      │  (UI, logging)  │
//! └─────────────────┘      └─────────────┘      └─────────────────┘
//!          ^                                             │
//!          │          HostEvent (hits, kills, ticks)     │
//!          └─────────────────────────────────────────────┘
//! ```
//!
//! Sending never blocks. A full channel drops the event and reports it.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use runeforge_enchanting::EnchantingTable;
use runeforge_shared::events::HostEvent;
use tracing::warn;

pub use runeforge_enchanting::EnchantEvent;

/// Default channel capacity.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Everything that travels over a forge channel.
#[derive(Clone, Debug, PartialEq)]
pub enum ForgeEvent {
    /// Produced by the engine during an enchant action.
    Enchant(EnchantEvent),
    /// Produced by the host for the trigger dispatcher.
    Host(HostEvent),
}

impl From<EnchantEvent> for ForgeEvent {
    fn from(event: EnchantEvent) -> Self {
        Self::Enchant(event)
    }
}

impl From<HostEvent> for ForgeEvent {
    fn from(event: HostEvent) -> Self {
        Self::Host(event)
    }
}

/// Bounded event bus.
pub struct EventBus {
    sender: Sender<ForgeEvent>,
    receiver: Receiver<ForgeEvent>,
}

impl EventBus {
    /// Creates a bus holding at most `capacity` events in flight.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self { sender, receiver }
    }

    /// Creates a sender handle (clone for multiple producers).
    #[must_use]
    pub fn sender(&self) -> EventSender {
        EventSender {
            sender: self.sender.clone(),
        }
    }

    /// Creates a receiver handle (clone for multiple consumers).
    #[must_use]
    pub fn receiver(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.receiver.clone(),
        }
    }

    /// Creates a connected sender/receiver pair.
    #[must_use]
    pub fn create_pair(capacity: usize) -> (EventSender, EventReceiver) {
        let bus = Self::new(capacity);
        (bus.sender(), bus.receiver())
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Handle for sending events.
#[derive(Clone)]
pub struct EventSender {
    sender: Sender<ForgeEvent>,
}

impl EventSender {
    /// Sends an event without blocking.
    ///
    /// Returns `false` if the channel is full or every receiver is gone.
    #[inline]
    pub fn send(&self, event: impl Into<ForgeEvent>) -> bool {
        match self.sender.try_send(event.into()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("forge channel full, event dropped");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Moves every buffered event out of `table` onto the channel.
    ///
    /// Returns the number of events that were dropped.
    pub fn forward_from(&self, table: &EnchantingTable) -> usize {
        table
            .drain_events()
            .into_iter()
            .map(|event| self.send(event))
            .filter(|sent| !sent)
            .count()
    }
}

/// Handle for receiving events.
#[derive(Clone)]
pub struct EventReceiver {
    receiver: Receiver<ForgeEvent>,
}

impl EventReceiver {
    /// Takes every pending event without blocking.
    #[inline]
    pub fn drain(&self) -> Vec<ForgeEvent> {
        self.receiver.try_iter().collect()
    }

    /// Takes one event, if any.
    #[inline]
    pub fn try_recv(&self) -> Option<ForgeEvent> {
        self.receiver.try_recv().ok()
    }

    /// Number of pending events.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Whether anything is waiting.
    #[inline]
    #[must_use]
    pub fn has_events(&self) -> bool {
        !self.receiver.is_empty()
    }
}
