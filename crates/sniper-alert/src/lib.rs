//! Alert delivery for the whale sniper.
//!
//! Sinks absorb their own delivery failures; the dispatcher tries every
//! registered sink for every alert and never reports an error upward.

pub mod dispatcher;
pub mod error;
pub mod sink;
pub mod telegram;

pub use dispatcher::AlertDispatcher;
pub use error::{AlertError, AlertResult};
pub use sink::{AlertSink, BoxFuture, DynAlertSink, RecordingSink};
pub use telegram::{TelegramConfig, TelegramSink};
