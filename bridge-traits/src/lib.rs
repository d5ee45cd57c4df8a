//! # Host Bridge Traits
//!
//! Transport abstraction traits that the gateway core depends on.
//!
//! ## Overview
//!
//! This crate defines the contract between the gateway core and the
//! concrete transport. The core never talks to the network directly: the
//! Universer exchange client builds [`HttpRequest`](http::HttpRequest)s
//! and hands them to an injected [`HttpClient`](http::HttpClient).
//!
//! | Implementation | Crate |
//! |----------------|-------|
//! | reqwest        | `bridge-desktop` |
//! | mockall        | test modules |
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should distinguish transport failures (no response at all) from
//! operation failures (a response that could not be used).
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds so that one client can be
//! shared across concurrent import/export calls behind an `Arc`.

pub mod error;
pub mod http;

pub use error::BridgeError;

pub use http::{ByteStream, HttpBody, HttpClient, HttpMethod, HttpRequest, HttpResponse, MultipartFile};
