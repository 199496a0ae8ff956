//! Receivers: the subscriber side of a bus.
//!
//! A [`Receiver<M>`] declares that it can handle messages of type `M`. A single type can
//! implement `Receiver` for several message types and subscribe to each of them
//! independently.
//!
//! Buses never own receivers. Callers keep them alive in an `Rc` (for [`Bus`](crate::Bus))
//! or an `Arc` (for [`SharedBus`](crate::SharedBus)) and the bus only stores a weak
//! reference, compared by the address of the shared allocation ([`ReceiverId`]).
//!
//! # Example
//!
//! ```rust,ignore
//! struct Cauldron {
//!     brewed: Cell<u32>,
//! }
//!
//! impl Receiver<PotionBrewed> for Cauldron {
//!     fn handle(&self, message: &PotionBrewed) -> HandlerResult {
//!         self.brewed.set(self.brewed.get() + message.doses);
//!         Ok(())
//!     }
//! }
//! ```

use std::{any::Any, fmt, rc, sync};

use crate::message::Message;

/// Error returned by a receiver that failed to handle a message.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Outcome of [`Receiver::handle`].
pub type HandlerResult = Result<(), HandlerError>;

/// Something capable of handling messages of type `M`.
///
/// Handlers take `&self`: receivers that keep state use interior mutability. This keeps
/// dispatch free of borrow bookkeeping and lets a handler dispatch further messages.
///
/// Closures of the form `Fn(&M) -> HandlerResult` are receivers too.
pub trait Receiver<M: Message> {
    /// Handle one message.
    ///
    /// Returning an error stops the dispatch: receivers subscribed after this one are not
    /// notified for that message.
    fn handle(&self, message: &M) -> HandlerResult;
}

impl<M, F> Receiver<M> for F
where
    M: Message,
    F: Fn(&M) -> HandlerResult,
{
    #[inline]
    fn handle(&self, message: &M) -> HandlerResult {
        self(message)
    }
}

/// Identity of a subscribed receiver.
///
/// Two handles have the same id iff they point at the same shared allocation. The
/// receiver's contents are never compared.
///
/// A subscribed slot holds a weak reference, which keeps the allocation (and so the id)
/// reserved. After the receiver is unsubscribed and dropped, its address may be handed to
/// a new receiver, so an id kept around past that point can name a different receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReceiverId(usize);

impl ReceiverId {
    /// Identity of a single-threaded receiver handle.
    #[inline]
    pub fn of<R: ?Sized>(receiver: &rc::Rc<R>) -> Self {
        Self(rc::Rc::as_ptr(receiver).cast::<()>() as usize)
    }

    /// Identity of a thread-safe receiver handle.
    #[inline]
    pub fn of_shared<R: ?Sized>(receiver: &sync::Arc<R>) -> Self {
        Self(sync::Arc::as_ptr(receiver).cast::<()>() as usize)
    }
}

impl fmt::Display for ReceiverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "receiver@{:#x}", self.0)
    }
}

/// Type-erased view of a weakly held receiver.
///
/// Subscription tables store receivers of many message types side by side. The concrete
/// message type is recovered at dispatch by downcasting the message, which always
/// succeeds because a slot only ever sits under its own message type's key.
pub(crate) trait ErasedReceiver {
    /// Returns `true` while the receiver has not been dropped.
    fn is_live(&self) -> bool;

    /// Hand the message to the receiver.
    ///
    /// Returns `None` if the receiver has been dropped.
    fn deliver(&self, message: &dyn Any) -> Option<HandlerResult>;
}

impl<M: Message> ErasedReceiver for rc::Weak<dyn Receiver<M>> {
    #[inline]
    fn is_live(&self) -> bool {
        self.strong_count() > 0
    }

    fn deliver(&self, message: &dyn Any) -> Option<HandlerResult> {
        let message = message.downcast_ref::<M>()?;
        let receiver = self.upgrade()?;
        Some(receiver.handle(message))
    }
}

impl<M: Message> ErasedReceiver for sync::Weak<dyn Receiver<M> + Send + Sync> {
    #[inline]
    fn is_live(&self) -> bool {
        self.strong_count() > 0
    }

    fn deliver(&self, message: &dyn Any) -> Option<HandlerResult> {
        let message = message.downcast_ref::<M>()?;
        let receiver = self.upgrade()?;
        Some(receiver.handle(message))
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc, sync::Arc};

    use super::*;

    #[derive(crate::Message)]
    struct Ping(u32);

    #[derive(crate::Message)]
    struct Pong;

    struct Counter {
        total: Cell<u32>,
    }

    impl Receiver<Ping> for Counter {
        fn handle(&self, message: &Ping) -> HandlerResult {
            self.total.set(self.total.get() + message.0);
            Ok(())
        }
    }

    // ==================== Identity ====================

    #[test]
    fn clones_share_identity() {
        // Given
        let counter = Rc::new(Counter { total: Cell::new(0) });
        let clone = Rc::clone(&counter);

        // Then
        assert_eq!(ReceiverId::of(&counter), ReceiverId::of(&clone));
    }

    #[test]
    fn equal_contents_do_not_share_identity() {
        // Given
        let first = Rc::new(Counter { total: Cell::new(0) });
        let second = Rc::new(Counter { total: Cell::new(0) });

        // Then
        assert_ne!(ReceiverId::of(&first), ReceiverId::of(&second));
    }

    #[test]
    fn trait_object_handle_keeps_identity() {
        // Given
        let counter = Arc::new(|_: &Ping| -> HandlerResult { Ok(()) });
        let erased: Arc<dyn Receiver<Ping> + Send + Sync> = counter.clone();

        // Then
        assert_eq!(ReceiverId::of_shared(&counter), ReceiverId::of_shared(&erased));
    }

    // ==================== Erased Delivery ====================

    #[test]
    fn erased_receiver_delivers_matching_message() {
        // Given
        let counter = Rc::new(Counter { total: Cell::new(0) });
        let weak: rc::Weak<dyn Receiver<Ping>> = Rc::downgrade(&counter) as rc::Weak<Counter>;

        // When
        let outcome = weak.deliver(&Ping(3));

        // Then
        assert!(matches!(outcome, Some(Ok(()))));
        assert_eq!(counter.total.get(), 3);
    }

    #[test]
    fn erased_receiver_ignores_other_message_types() {
        // Given
        let counter = Rc::new(Counter { total: Cell::new(0) });
        let weak: rc::Weak<dyn Receiver<Ping>> = Rc::downgrade(&counter) as rc::Weak<Counter>;

        // When
        let outcome = weak.deliver(&Pong);

        // Then
        assert!(outcome.is_none());
        assert_eq!(counter.total.get(), 0);
    }

    #[test]
    fn dropped_receiver_is_not_live() {
        // Given
        let counter = Rc::new(Counter { total: Cell::new(0) });
        let weak: rc::Weak<dyn Receiver<Ping>> = Rc::downgrade(&counter) as rc::Weak<Counter>;
        assert!(weak.is_live());

        // When
        drop(counter);

        // Then
        assert!(!weak.is_live());
        assert!(weak.deliver(&Ping(1)).is_none());
    }

    #[test]
    fn closures_are_receivers() {
        // Given
        let seen = Arc::new(sync::atomic::AtomicU32::new(0));
        let sink = Arc::clone(&seen);
        let receiver = move |message: &Ping| -> HandlerResult {
            sink.fetch_add(message.0, sync::atomic::Ordering::Relaxed);
            Ok(())
        };

        // When
        receiver.handle(&Ping(7)).unwrap();

        // Then
        assert_eq!(seen.load(sync::atomic::Ordering::Relaxed), 7);
    }
}
