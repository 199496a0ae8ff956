//! Receiver-side subscription helpers.
//!
//! These traits let a receiver handle subscribe itself, which often reads better at the
//! call site than going through the bus:
//!
//! ```rust,ignore
//! use potion::prelude::*;
//!
//! let shopkeeper = Rc::new(Shopkeeper::default());
//!
//! shopkeeper.subscribe_to::<PotionBrewed>(&mut bus);
//! shopkeeper.subscribe_to::<PotionSold>(&mut bus);
//!
//! // Later, before the shopkeeper goes away:
//! shopkeeper.unsubscribe_from::<PotionBrewed>(&mut bus)?;
//! ```

use std::{rc::Rc, sync::Arc};

use crate::{bus::Bus, error::BusError, message::Message, receiver::Receiver, shared::SharedBus};

/// Subscription helpers for single-threaded receiver handles.
pub trait Subscribe<R> {
    /// Equivalent to `bus.subscribe::<M, R>(self)`.
    fn subscribe_to<M: Message>(&self, bus: &mut Bus)
    where
        R: Receiver<M>;

    /// Equivalent to `bus.unsubscribe::<M, R>(self)`.
    fn unsubscribe_from<M: Message>(&self, bus: &mut Bus) -> Result<(), BusError>
    where
        R: Receiver<M>;
}

impl<R: 'static> Subscribe<R> for Rc<R> {
    #[inline]
    fn subscribe_to<M: Message>(&self, bus: &mut Bus)
    where
        R: Receiver<M>,
    {
        bus.subscribe::<M, R>(self);
    }

    #[inline]
    fn unsubscribe_from<M: Message>(&self, bus: &mut Bus) -> Result<(), BusError>
    where
        R: Receiver<M>,
    {
        bus.unsubscribe::<M, R>(self)
    }
}

/// Subscription helpers for thread-safe receiver handles.
pub trait SubscribeShared<R> {
    /// Equivalent to `bus.subscribe::<M, R>(self)`.
    fn subscribe_to<M: Message>(&self, bus: &SharedBus)
    where
        R: Receiver<M>;

    /// Equivalent to `bus.unsubscribe::<M, R>(self)`.
    fn unsubscribe_from<M: Message>(&self, bus: &SharedBus) -> Result<(), BusError>
    where
        R: Receiver<M>;
}

impl<R: Send + Sync + 'static> SubscribeShared<R> for Arc<R> {
    #[inline]
    fn subscribe_to<M: Message>(&self, bus: &SharedBus)
    where
        R: Receiver<M>,
    {
        bus.subscribe::<M, R>(self);
    }

    #[inline]
    fn unsubscribe_from<M: Message>(&self, bus: &SharedBus) -> Result<(), BusError>
    where
        R: Receiver<M>,
    {
        bus.unsubscribe::<M, R>(self)
    }
}
