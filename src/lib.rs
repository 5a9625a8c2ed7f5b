//! Recurring-poll HTTP client.
//!
//! A [`Poller`] fetches one endpoint, hands each decoded payload to a
//! callback, waits a fixed interval after the outcome, and repeats until
//! stopped or until one-shot mode has delivered once.
//!
//! ```no_run
//! use http_poller::{Payload, Poller};
//!
//! # async fn demo() -> Result<(), http_poller::ConfigError> {
//! let poller = Poller::builder()
//!     .endpoint("http://localhost:10246/api/status")
//!     .on_data(|payload: Payload| println!("{payload:?}"))
//!     .on_error(|err| eprintln!("poll failed: {err}"))
//!     .interval_ms(1000)
//!     .build()?;
//!
//! poller.start();
//! // ...
//! poller.stop();
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod poller;
pub mod transport;

pub use crate::core::error::{ConfigError, DecodeError, PollError, TransportError};
pub use crate::core::models::{Decode, Payload, Phase};
pub use crate::core::settings::Settings;
pub use crate::poller::{Poller, PollerBuilder};
pub use crate::transport::{HttpTransport, Response, Transport};
