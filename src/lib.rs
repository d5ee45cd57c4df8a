//! Workspace umbrella crate.
//!
//! Re-exports the gateway crates behind the `desktop-shims` feature so host
//! applications can depend on `usip-workspace` alone instead of wiring
//! `core-service`, `core-exchange` and `core-library` individually.

#[cfg(feature = "desktop-shims")]
pub use core_exchange as exchange;
#[cfg(feature = "desktop-shims")]
pub use core_library as library;
#[cfg(feature = "desktop-shims")]
pub use core_service as service;

#[cfg(feature = "desktop-shims")]
pub use core_service::{CoreError, Directory, GatewayService};
