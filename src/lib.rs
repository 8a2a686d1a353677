//! Client for the legacy Google Cloud Messaging (GCM) HTTP API.
//!
//! One authenticated POST per [`Client::send`] call: the [`Message`] payload
//! is serialized to JSON, the HTTP status of the reply is classified into a
//! typed [`GcmError`] (carrying the raw `Retry-After` value on server
//! errors), and a successful reply is decoded into a [`Response`]. There is
//! no retry loop and no queueing; the caller decides whether and when to
//! retry.
//!
//! ```no_run
//! use gcm_client::{Client, Message};
//!
//! # async fn run() -> Result<(), gcm_client::GcmError> {
//! let client = Client::new("server-api-key")?;
//!
//! let mut message = Message::new();
//! message.add_registration_id("device-token")?;
//! message.set_time_to_live(3600);
//!
//! let response = client.send(&message).await?;
//! println!("delivered to {} recipient(s)", response.success_count());
//! # Ok(())
//! # }
//! ```
#![warn(rust_2018_idioms)]

#[macro_use]
extern crate slog_scope;

mod client;
mod error;
mod message;
mod response;

pub use client::{Client, ClientBuilder, SERVER_URI};
pub use error::{GcmError, ServerErrorKind};
pub use message::Message;
pub use response::{MessageResult, Response};
