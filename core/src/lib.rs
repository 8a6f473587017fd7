//! Blocking client for the Turing Pi 2 board management controller API.
//!
//! # Overview
//! Authenticates against the BMC (bearer token or HTTP basic credentials),
//! issues GET requests against the fixed `/api/bmc` endpoint family and
//! unwraps the `{"response":[{"result": ...}]}` envelope into typed values.
//!
//! # Design
//! - `BmcClient` authenticates once in its constructor and holds no mutable
//!   state afterwards.
//! - The HTTP stack sits behind the [`Transport`] trait and is supplied by
//!   the caller. With the default `ureq` feature, `ureq::Agent` implements it.
//! - Every operation is also exposed as a `build_*` / `parse_*` pair, so the
//!   round trip can be executed outside the client.
//! - The crate emits `tracing` events but never installs a subscriber.
//!
//! ```no_run
//! use bmc_core::{transport, BmcClient};
//!
//! let agent = transport::insecure_agent();
//! let bmc = BmcClient::connect("", "bearer", "root", "turing", agent)?;
//! println!("firmware {}", bmc.get_other()?.version);
//! # Ok::<(), bmc_core::Error>(())
//! ```

pub mod auth;
pub mod client;
pub mod envelope;
pub mod error;
pub mod http;
#[cfg(feature = "ureq")]
pub mod transport;
pub mod types;

pub use auth::{AuthType, Credentials, SessionToken};
pub use client::{BmcClient, DEFAULT_BASE_URL};
pub use envelope::{parse_object, parse_scalar};
pub use error::{Error, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};
pub use types::{Node, OtherInfo, PowerState, PowerStatus};
