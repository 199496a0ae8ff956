//! Single-threaded message bus.
//!
//! This module provides [`Bus`], a type-keyed publish/subscribe registry. Receivers
//! subscribe to a message type, and dispatching a message of that type calls every
//! subscribed receiver synchronously, in the order they subscribed.
//!
//! # Overview
//!
//! - **Subscription table**: one entry per message type, mapping to the ordered
//!   receivers subscribed to it. Entries only exist while they have subscribers.
//! - **Identity**: receivers are compared by the address of their `Rc` allocation,
//!   never by value. Subscribing the same receiver twice is a no-op.
//! - **Weak references**: the bus never owns receivers. A receiver dropped while
//!   subscribed is skipped at dispatch until it is unsubscribed or pruned.
//! - **Error policy**: misuse (unsubscribing something unknown, dispatching to nobody) is
//!   reported or ignored according to the bus's [`Config`].
//!
//! # Type Erasure
//!
//! Internally, receivers of every message type are stored as `Box<dyn ErasedReceiver>`
//! keyed by [`MessageType`]. Generic methods recover the concrete types: subscribe
//! captures `Weak<dyn Receiver<M>>`, and dispatch hands the message over as `&dyn Any`
//! for the slot to downcast back to `M`.
//!
//! # Example
//!
//! ```rust,ignore
//! use potion::{Bus, HandlerResult, Message, Receiver};
//!
//! #[derive(Message)]
//! struct PotionBrewed { doses: u32 }
//!
//! struct Shopkeeper { stock: Cell<u32> }
//!
//! impl Receiver<PotionBrewed> for Shopkeeper {
//!     fn handle(&self, message: &PotionBrewed) -> HandlerResult {
//!         self.stock.set(self.stock.get() + message.doses);
//!         Ok(())
//!     }
//! }
//!
//! let shopkeeper = Rc::new(Shopkeeper { stock: Cell::new(0) });
//! let mut bus = Bus::new();
//!
//! bus.subscribe::<PotionBrewed, _>(&shopkeeper);
//! bus.dispatch(PotionBrewed { doses: 3 })?;
//!
//! assert_eq!(shopkeeper.stock.get(), 3);
//! ```

use std::{
    collections::HashMap,
    fmt,
    rc::{Rc, Weak},
};

use log::trace;

use crate::{
    config::Config,
    error::BusError,
    message::{Message, MessageType},
    receiver::{ErasedReceiver, Receiver, ReceiverId},
    subscribers::{Slot, Subscribers},
};

type LocalSubscribers = Subscribers<Box<dyn ErasedReceiver>>;

/// A single-threaded, type-keyed message bus.
///
/// # Thread Safety
///
/// `Bus` holds `Rc`-family weak references and is neither `Send` nor `Sync`. Use
/// [`SharedBus`](crate::SharedBus) to share a bus between threads.
///
/// # Re-entrancy
///
/// [`dispatch()`](Self::dispatch) only needs `&self`, so a receiver that can reach the bus
/// (for example through an `Rc<RefCell<Bus>>`) may dispatch further messages from its
/// handler. Subscribing or unsubscribing from inside a handler needs `&mut Bus` and is
/// subject to the caller's own borrow rules.
pub struct Bus {
    /// Error policy.
    config: Config,

    /// Subscription table. Every entry holds at least one receiver.
    subscribers: HashMap<MessageType, LocalSubscribers>,
}

impl Bus {
    /// Creates an empty bus with the default (strict) configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an empty bus with the given configuration.
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            subscribers: HashMap::new(),
        }
    }

    /// The bus's error policy.
    #[inline]
    pub fn config(&self) -> Config {
        self.config
    }

    /// Subscribes `receiver` to messages of type `M`.
    ///
    /// Receivers are notified in the order they subscribed. Subscribing a receiver that is
    /// already subscribed to `M` does nothing. The bus keeps a weak reference only: the
    /// caller decides how long the receiver lives.
    ///
    /// When `R` handles several message types, name the one to subscribe to:
    ///
    /// ```rust,ignore
    /// bus.subscribe::<PotionBrewed, _>(&shopkeeper);
    /// bus.subscribe::<PotionSold, _>(&shopkeeper);
    /// ```
    pub fn subscribe<M, R>(&mut self, receiver: &Rc<R>)
    where
        M: Message,
        R: Receiver<M> + 'static,
    {
        let message_type = MessageType::of::<M>();
        let id = ReceiverId::of(receiver);

        let weak: Weak<dyn Receiver<M>> = Rc::downgrade(receiver) as Weak<R>;
        let erased: Box<dyn ErasedReceiver> = Box::new(weak);

        let added = self
            .subscribers
            .entry(message_type)
            .or_insert_with(Subscribers::new)
            .insert(Slot::new(id, erased));

        if added {
            trace!("{id} subscribed to `{message_type}`");
        } else {
            trace!("{id} already subscribed to `{message_type}`");
        }
    }

    /// Unsubscribes `receiver` from messages of type `M`.
    ///
    /// Removing the last receiver of a message type removes the type from the table.
    ///
    /// # Errors
    ///
    /// With `strict_errors` on, returns [`BusError::UnknownMessageType`] if nobody is
    /// subscribed to `M`, and [`BusError::ReceiverNotSubscribed`] if `receiver` isn't.
    /// Otherwise both cases are ignored.
    pub fn unsubscribe<M, R>(&mut self, receiver: &Rc<R>) -> Result<(), BusError>
    where
        M: Message,
        R: Receiver<M> + ?Sized,
    {
        self.unsubscribe_id::<M>(ReceiverId::of(receiver))
    }

    /// Unsubscribes the receiver with the given identity from messages of type `M`.
    ///
    /// Useful for removing a receiver whose handle is gone. Same errors as
    /// [`unsubscribe()`](Self::unsubscribe).
    ///
    /// An id is only meaningful while its slot is in the table. Once the receiver has been
    /// unsubscribed everywhere and dropped, its address can be reused by a new receiver,
    /// and a stale id would then remove that receiver instead.
    pub fn unsubscribe_id<M: Message>(&mut self, id: ReceiverId) -> Result<(), BusError> {
        let message_type = MessageType::of::<M>();

        let Some(subscribers) = self.subscribers.get_mut(&message_type) else {
            return self
                .config
                .unsubscribe_misuse(BusError::UnknownMessageType { message_type });
        };

        if !subscribers.remove(id) {
            return self.config.unsubscribe_misuse(BusError::ReceiverNotSubscribed {
                message_type,
                receiver: id,
            });
        }

        if subscribers.is_empty() {
            self.subscribers.remove(&message_type);
        }

        trace!("{id} unsubscribed from `{message_type}`");
        Ok(())
    }

    /// Dispatches `message` to every receiver subscribed to its type.
    ///
    /// Receivers are called synchronously, in subscription order, before this returns.
    /// Returns the number of receivers notified.
    ///
    /// # Errors
    ///
    /// - [`BusError::NoListenerForType`] if nobody is subscribed to `M` and the
    ///   configuration requires a listener. Otherwise that case returns `Ok(0)`.
    ///   Receivers dropped without unsubscribing still count as subscribed until they are
    ///   [pruned](Self::prune), so if every receiver of `M` was dropped this returns
    ///   `Ok(0)` even under a strict configuration.
    /// - [`BusError::ReceiverFailed`] if a receiver returns an error. Receivers after it
    ///   are **not** notified; the error says how many were skipped. The receiver's own
    ///   error is its `source`, unchanged, and
    ///   [`into_handler_error()`](BusError::into_handler_error) hands it back.
    ///
    /// # Panics
    ///
    /// A panicking receiver unwinds through `dispatch` untouched; the receivers after it
    /// are not notified.
    pub fn dispatch<M: Message>(&self, message: M) -> Result<usize, BusError> {
        let message_type = MessageType::of::<M>();

        let Some(subscribers) = self.subscribers.get(&message_type) else {
            return self.config.missing_listener(message_type);
        };

        trace!(
            "dispatching `{message_type}` to {} receiver(s)",
            subscribers.len()
        );
        subscribers.deliver(message_type, &message)
    }

    /// Returns `true` if `receiver` is subscribed to messages of type `M`.
    pub fn is_subscribed<M, R>(&self, receiver: &Rc<R>) -> bool
    where
        M: Message,
        R: Receiver<M> + ?Sized,
    {
        self.subscribers
            .get(&MessageType::of::<M>())
            .is_some_and(|subscribers| subscribers.contains(ReceiverId::of(receiver)))
    }

    /// Number of receivers subscribed to messages of type `M`.
    pub fn subscriber_count<M: Message>(&self) -> usize {
        self.subscribers
            .get(&MessageType::of::<M>())
            .map_or(0, |subscribers| subscribers.len())
    }

    /// Returns `true` if at least one receiver is subscribed to messages of type `M`.
    #[inline]
    pub fn has_subscribers<M: Message>(&self) -> bool {
        self.subscribers.contains_key(&MessageType::of::<M>())
    }

    /// Identities of the receivers subscribed to `M`, in notification order.
    pub fn subscriber_ids<M: Message>(&self) -> Vec<ReceiverId> {
        self.subscribers
            .get(&MessageType::of::<M>())
            .map(|subscribers| subscribers.ids().collect())
            .unwrap_or_default()
    }

    /// Message types that currently have subscribers, in no particular order.
    pub fn message_types(&self) -> Vec<MessageType> {
        self.subscribers.keys().copied().collect()
    }

    /// Number of message types that currently have subscribers.
    #[inline]
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Returns `true` if nothing is subscribed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Removes receivers that were dropped while still subscribed.
    ///
    /// Message types left without subscribers are removed from the table. Returns the
    /// number of subscriptions removed.
    pub fn prune(&mut self) -> usize {
        let mut removed = 0;
        self.subscribers.retain(|message_type, subscribers| {
            let pruned = subscribers.prune();
            if pruned > 0 {
                trace!("pruned {pruned} dropped receiver(s) from `{message_type}`");
            }
            removed += pruned;
            !subscribers.is_empty()
        });
        removed
    }

    /// Removes every subscription.
    pub fn clear(&mut self) {
        self.subscribers.clear();
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bus")
            .field("config", &self.config)
            .field(
                "subscribers",
                &self
                    .subscribers
                    .iter()
                    .map(|(message_type, subscribers)| (message_type, subscribers.len()))
                    .collect::<HashMap<_, _>>(),
            )
            .finish()
    }
}
