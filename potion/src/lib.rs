//! Potion: a type-keyed, in-process message bus.
//!
//! Components that should not hold references to each other communicate through a bus:
//! receivers subscribe to a message type, and anything holding the bus dispatches values
//! of that type to every subscribed receiver, synchronously and in subscription order.
//!
//! - [`Bus`]: single-threaded bus.
//! - [`SharedBus`]: the same contract, shareable between threads.
//! - [`Receiver`]: implemented by anything that handles a message type.
//! - [`Config`]: whether misuse is reported as [`BusError`] or silently ignored.
//!
//! # Example
//!
//! ```rust,ignore
//! use potion::prelude::*;
//!
//! #[derive(Message)]
//! struct PotionBrewed { doses: u32 }
//!
//! let cauldron_watcher = Rc::new(|message: &PotionBrewed| -> HandlerResult {
//!     println!("{} doses ready", message.doses);
//!     Ok(())
//! });
//!
//! let mut bus = Bus::new();
//! cauldron_watcher.subscribe_to::<PotionBrewed>(&mut bus);
//! bus.dispatch(PotionBrewed { doses: 3 })?;
//! ```

extern crate self as potion;

pub mod bus;
pub mod config;
pub mod error;
pub mod ext;
pub mod logging;
pub mod message;
pub mod receiver;
pub mod shared;
pub(crate) mod subscribers;

pub use bus::Bus;
pub use config::Config;
pub use error::BusError;
pub use ext::{Subscribe, SubscribeShared};
pub use message::{Message, MessageType};
pub use potion_macros::Message;
pub use receiver::{HandlerError, HandlerResult, Receiver, ReceiverId};
pub use shared::SharedBus;

/// Everything needed to define receivers and drive a bus.
pub mod prelude {
    pub use crate::{
        Bus, BusError, Config, HandlerError, HandlerResult, Message, MessageType, Receiver,
        ReceiverId, SharedBus, Subscribe, SubscribeShared,
    };
}
