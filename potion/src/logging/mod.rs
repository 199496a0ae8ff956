//! Log capture for bus diagnostics.
//!
//! The bus reports through the [`log`] facade: `trace` for subscriptions and dispatches,
//! `debug` for misuse ignored under a lenient [`Config`](crate::Config), and `warn` for
//! dropped receivers skipped during dispatch. Any `log` backend works; [`ChannelLogger`]
//! is a small one that hands records to a channel so a host loop or a test can read them.

mod channel;

pub use channel::{ChannelLogger, LogRecord, install};
