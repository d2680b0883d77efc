//! # VaultSync Transport
//!
//! Protocol-agnostic remote transport layer for VaultSync.
//!
//! This crate provides:
//! - The [`Transport`] contract: `put`, `get`, `delete`, plus download
//!   conveniences that join locations and write temp files
//! - [`HttpTransport`]: `http`/`https` backend speaking the bespoke
//!   upload/delete script protocol with its sentinel response bodies
//! - [`WebdavTransport`]: `webdav`/`webdavs` backend rewriting schemes and
//!   transferring over plain HTTP PUT/GET
//! - [`transport_for_url`]: scheme-keyed factory, the sole entry point the
//!   rest of the application uses
//! - Externally supplied configuration: [`Credentials`], [`ProxyConfig`],
//!   [`TrustPolicy`]
//!
//! ## Architecture
//!
//! Backends are independent implementations of one capability trait,
//! selected by the factory on the URL's scheme prefix; no backend inherits
//! transfer mechanics from another. All calls are synchronous and blocking,
//! intended to run on the caller's worker thread. The layer moves bytes and
//! reports success or a classified [`TransportError`]; it never interprets
//! vault contents and never resolves conflicts.
//!
//! ## Key invariants
//!
//! - Directory-style locations get exactly one trailing separator before a
//!   filename is appended
//! - Credentials are attached preemptively whenever a username is supplied
//! - Every connection returns to the pool on every exit path
//! - Nothing is retried except the documented one-shot upload compensation

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod http;
mod location;
mod settings;
mod transport;
mod webdav;

pub use error::{TransportError, TransportResult};
pub use http::HttpTransport;
pub use location::{ensure_trailing_slash, Scheme};
pub use settings::{Credentials, ProxyConfig, TransportSettings, TrustPolicy};
pub use transport::{transport_for_url, Transport};
pub use webdav::WebdavTransport;
