//! Ordered receiver sequence for a single message type.
//!
//! [`Subscribers`] is the value side of a bus's subscription table. It keeps receivers in
//! the order they subscribed and never holds the same [`ReceiverId`] twice. Both
//! [`Bus`](crate::Bus) and [`SharedBus`](crate::SharedBus) build their tables out of it and
//! differ only in the pointer used to hold the type-erased receiver (`Box` vs `Arc`).

use std::ops::Deref;

use log::warn;

use crate::{
    error::BusError,
    message::{Message, MessageType},
    receiver::{ErasedReceiver, ReceiverId},
};

/// One subscribed receiver.
#[derive(Clone)]
pub(crate) struct Slot<P> {
    id: ReceiverId,
    receiver: P,
}

impl<P> Slot<P> {
    #[inline]
    pub(crate) fn new(id: ReceiverId, receiver: P) -> Self {
        Self { id, receiver }
    }
}

/// Receivers subscribed to one message type, in subscription order.
#[derive(Clone)]
pub(crate) struct Subscribers<P> {
    slots: Vec<Slot<P>>,
}

impl<P> Subscribers<P>
where
    P: Deref,
    P::Target: ErasedReceiver,
{
    #[inline]
    pub(crate) fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Check if a receiver is in the sequence. Linear in the number of subscribers.
    #[inline]
    pub(crate) fn contains(&self, id: ReceiverId) -> bool {
        self.slots.iter().any(|slot| slot.id == id)
    }

    /// Append a receiver unless it is already present.
    ///
    /// Returns `true` if the receiver was added.
    pub(crate) fn insert(&mut self, slot: Slot<P>) -> bool {
        if self.contains(slot.id) {
            return false;
        }
        self.slots.push(slot);
        true
    }

    /// Remove a receiver, keeping the order of the others.
    ///
    /// Returns `true` if the receiver was present.
    pub(crate) fn remove(&mut self, id: ReceiverId) -> bool {
        match self.slots.iter().position(|slot| slot.id == id) {
            Some(index) => {
                self.slots.remove(index);
                true
            }
            None => false,
        }
    }

    /// Drop slots whose receivers no longer exist. Returns the number removed.
    pub(crate) fn prune(&mut self) -> usize {
        let before = self.slots.len();
        self.slots.retain(|slot| slot.receiver.is_live());
        before - self.slots.len()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Receiver ids in subscription order.
    pub(crate) fn ids(&self) -> impl Iterator<Item = ReceiverId> + '_ {
        self.slots.iter().map(|slot| slot.id)
    }

    /// Hand `message` to every receiver in subscription order.
    ///
    /// Stops at the first receiver that returns an error; the receivers after it are not
    /// notified. Dropped receivers are skipped. Returns the number of receivers notified.
    pub(crate) fn deliver<M: Message>(
        &self,
        message_type: MessageType,
        message: &M,
    ) -> Result<usize, BusError> {
        let total = self.slots.len();
        let mut delivered = 0;

        for (index, slot) in self.slots.iter().enumerate() {
            match slot.receiver.deliver(message) {
                Some(Ok(())) => delivered += 1,
                Some(Err(source)) => {
                    return Err(BusError::ReceiverFailed {
                        message_type,
                        index,
                        skipped: total - index - 1,
                        source,
                    });
                }
                None => warn!(
                    "skipping dropped {} still subscribed to `{}`",
                    slot.id, message_type
                ),
            }
        }

        Ok(delivered)
    }
}
