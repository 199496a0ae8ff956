use thiserror::Error;

use crate::{
    message::MessageType,
    receiver::{HandlerError, ReceiverId},
};

/// Errors reported by [`Bus`](crate::Bus) and [`SharedBus`](crate::SharedBus).
///
/// Whether misuse is reported at all depends on the bus's [`Config`](crate::Config).
/// Receiver failures are always reported.
#[derive(Debug, Error)]
pub enum BusError {
    /// Unsubscribe was called for a message type nobody is subscribed to.
    #[error("removing subscriber, but the message type `{message_type}` isn't registered")]
    UnknownMessageType { message_type: MessageType },

    /// Unsubscribe was called with a receiver that isn't subscribed to the message type.
    #[error(
        "removing subscriber, but {receiver} isn't subscribed to message type `{message_type}`"
    )]
    ReceiverNotSubscribed {
        message_type: MessageType,
        receiver: ReceiverId,
    },

    /// A message was dispatched but no receiver is subscribed to its type.
    #[error(
        "attempting to send message of type `{message_type}`, but no listener for this type has been found"
    )]
    NoListenerForType { message_type: MessageType },

    /// A receiver's handler returned an error.
    ///
    /// Receivers are notified in subscription order and dispatch stops at the first
    /// failure. `index` is the failing receiver's position and `skipped` counts the
    /// receivers after it that were not notified.
    #[error(
        "receiver #{index} failed to handle message of type `{message_type}`, {skipped} later receiver(s) not notified"
    )]
    ReceiverFailed {
        message_type: MessageType,
        index: usize,
        skipped: usize,
        source: HandlerError,
    },
}

impl BusError {
    /// The message type the failed operation was about.
    pub fn message_type(&self) -> MessageType {
        match self {
            BusError::UnknownMessageType { message_type }
            | BusError::ReceiverNotSubscribed { message_type, .. }
            | BusError::NoListenerForType { message_type }
            | BusError::ReceiverFailed { message_type, .. } => *message_type,
        }
    }

    /// Take the receiver's own error out of a [`BusError::ReceiverFailed`].
    pub fn into_handler_error(self) -> Option<HandlerError> {
        match self {
            BusError::ReceiverFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{error::Error as _, fmt};

    use super::*;

    #[derive(crate::Message)]
    struct Quaff;

    #[derive(Debug)]
    struct Spilled;

    impl fmt::Display for Spilled {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("spilled")
        }
    }

    impl std::error::Error for Spilled {}

    #[test]
    fn messages_name_the_message_type() {
        // Given
        let error = BusError::NoListenerForType {
            message_type: MessageType::of::<Quaff>(),
        };

        // Then
        assert!(error.to_string().contains("Quaff"));
        assert!(error.message_type().is::<Quaff>());
    }

    #[test]
    fn receiver_failure_exposes_handler_error() {
        // Given
        let error = BusError::ReceiverFailed {
            message_type: MessageType::of::<Quaff>(),
            index: 1,
            skipped: 2,
            source: Box::new(Spilled),
        };

        // Then
        assert!(error.to_string().contains("2 later receiver(s) not notified"));
        assert_eq!(error.source().map(|s| s.to_string()).as_deref(), Some("spilled"));

        let handler_error = error.into_handler_error().unwrap();
        assert!(handler_error.downcast_ref::<Spilled>().is_some());
    }

    #[test]
    fn misuse_has_no_handler_error() {
        // Given
        let error = BusError::UnknownMessageType {
            message_type: MessageType::of::<Quaff>(),
        };

        // Then
        assert!(error.source().is_none());
        assert!(error.into_handler_error().is_none());
    }
}
