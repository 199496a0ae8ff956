//! Thread-safe message bus.
//!
//! [`SharedBus`] has the same subscription and dispatch semantics as [`Bus`](crate::Bus)
//! but can be shared between threads. Receivers are held as `Arc`s and must be
//! `Send + Sync`.
//!
//! # Locking
//!
//! The subscription table is a `DashMap` keyed by [`MessageType`], so operations on
//! different message types rarely contend. Dispatch copies the subscriber sequence of the
//! message's type while holding that entry's read lock, releases the lock, and only then
//! calls receivers. As a result:
//!
//! - receivers may subscribe, unsubscribe or dispatch from their handlers without
//!   deadlocking;
//! - a receiver that subscribes during a dispatch is not notified by that dispatch;
//! - a receiver unsubscribed by another thread while a dispatch is in flight may still
//!   receive the in-flight message.
//!
//! Delivery itself is still synchronous: receivers run on the dispatching thread.

use std::{
    fmt,
    sync::{Arc, Weak},
};

use dashmap::{DashMap, Entry};
use log::trace;

use crate::{
    config::Config,
    error::BusError,
    message::{Message, MessageType},
    receiver::{ErasedReceiver, Receiver, ReceiverId},
    subscribers::{Slot, Subscribers},
};

type SharedSubscribers = Subscribers<Arc<dyn ErasedReceiver + Send + Sync>>;

/// A thread-safe, type-keyed message bus.
///
/// # Example
///
/// ```rust,ignore
/// let bus = Arc::new(SharedBus::new());
/// let ledger = Arc::new(Ledger::default());
///
/// bus.subscribe::<PotionSold, _>(&ledger);
///
/// thread::scope(|scope| {
///     for _ in 0..4 {
///         scope.spawn(|| bus.dispatch(PotionSold { price: 10 }));
///     }
/// });
/// ```
pub struct SharedBus {
    /// Error policy.
    config: Config,

    /// Subscription table. Every entry holds at least one receiver.
    subscribers: DashMap<MessageType, SharedSubscribers>,
}

impl SharedBus {
    /// Creates an empty bus with the default (strict) configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an empty bus with the given configuration.
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            subscribers: DashMap::new(),
        }
    }

    /// The bus's error policy.
    #[inline]
    pub fn config(&self) -> Config {
        self.config
    }

    /// Subscribes `receiver` to messages of type `M`.
    ///
    /// See [`Bus::subscribe()`](crate::Bus::subscribe).
    pub fn subscribe<M, R>(&self, receiver: &Arc<R>)
    where
        M: Message,
        R: Receiver<M> + Send + Sync + 'static,
    {
        let message_type = MessageType::of::<M>();
        let id = ReceiverId::of_shared(receiver);

        let weak: Weak<dyn Receiver<M> + Send + Sync> = Arc::downgrade(receiver) as Weak<R>;
        let erased: Arc<dyn ErasedReceiver + Send + Sync> = Arc::new(weak);

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
    /// See [`Bus::unsubscribe()`](crate::Bus::unsubscribe).
    pub fn unsubscribe<M, R>(&self, receiver: &Arc<R>) -> Result<(), BusError>
    where
        M: Message,
        R: Receiver<M> + ?Sized,
    {
        self.unsubscribe_id::<M>(ReceiverId::of_shared(receiver))
    }

    /// Unsubscribes the receiver with the given identity from messages of type `M`.
    ///
    /// Removing the receiver and dropping an emptied entry happen under the same entry
    /// lock, so other threads never observe an empty entry.
    ///
    /// A stale id, kept after its receiver was unsubscribed and dropped, may match a newer
    /// receiver that reuses the address.
    pub fn unsubscribe_id<M: Message>(&self, id: ReceiverId) -> Result<(), BusError> {
        let message_type = MessageType::of::<M>();

        match self.subscribers.entry(message_type) {
            Entry::Vacant(_) => self
                .config
                .unsubscribe_misuse(BusError::UnknownMessageType { message_type }),
            Entry::Occupied(mut occupied) => {
                if !occupied.get_mut().remove(id) {
                    return self.config.unsubscribe_misuse(BusError::ReceiverNotSubscribed {
                        message_type,
                        receiver: id,
                    });
                }
                if occupied.get().is_empty() {
                    occupied.remove();
                }
                trace!("{id} unsubscribed from `{message_type}`");
                Ok(())
            }
        }
    }

    /// Dispatches `message` to every receiver subscribed to its type.
    ///
    /// Same ordering, failure and panic behaviour as
    /// [`Bus::dispatch()`](crate::Bus::dispatch). Receivers are called after the table
    /// lock has been released.
    ///
    /// # Errors
    ///
    /// As for `Bus::dispatch()`. In particular, a message type whose receivers were all
    /// dropped without unsubscribing returns `Ok(0)` until [`prune()`](Self::prune)
    /// removes them, and a receiver's error comes back unchanged through
    /// [`BusError::into_handler_error()`].
    pub fn dispatch<M: Message>(&self, message: M) -> Result<usize, BusError> {
        let message_type = MessageType::of::<M>();

        let snapshot = match self.subscribers.get(&message_type) {
            Some(subscribers) => subscribers.value().clone(),
            None => return self.config.missing_listener(message_type),
        };

        trace!(
            "dispatching `{message_type}` to {} receiver(s)",
            snapshot.len()
        );
        snapshot.deliver(message_type, &message)
    }

    /// Returns `true` if `receiver` is subscribed to messages of type `M`.
    pub fn is_subscribed<M, R>(&self, receiver: &Arc<R>) -> bool
    where
        M: Message,
        R: Receiver<M> + ?Sized,
    {
        self.subscribers
            .get(&MessageType::of::<M>())
            .is_some_and(|subscribers| subscribers.contains(ReceiverId::of_shared(receiver)))
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
        self.subscribers.iter().map(|entry| *entry.key()).collect()
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
    /// See [`Bus::prune()`](crate::Bus::prune).
    pub fn prune(&self) -> usize {
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
    pub fn clear(&self) {
        self.subscribers.clear();
    }
}

impl Default for SharedBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SharedBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedBus")
            .field("config", &self.config)
            .field("message_types", &self.message_types())
            .finish()
    }
}
