//! # Shield Preflight
//!
//! **A transport decorator that masks the start of a WireGuard-style tunnel.**
//!
//! [`PreflightBind`] wraps any [`Bind`] (the tunnel's packet transport). It
//! forwards every call unchanged, but when an outgoing batch contains a
//! handshake initiation it first fires a small, independent UDP datagram at
//! the same peer on a well-known port (443 by default). A passive observer
//! then sees the tunnel's first packet preceded by traffic that looks like
//! something else.
//!
//! - **Classifier**: structural check for handshake initiations
//!   (`type = 1`, zero reserved bytes, length ≥ 148)
//! - **Admission gate**: at most one probe per destination IP per interval
//! - **Probe dispatcher**: detached tokio task with 400 ms connect /
//!   200 ms write bounds; never blocks or fails the real send
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shield_preflight::{Bind, PreflightBind};
//! use std::time::Duration;
//!
//! # fn wrap<B: Bind>(udp_bind: B) -> Result<(), shield_preflight::PreflightError> {
//! let bind = PreflightBind::new(udp_bind, "0xc000000001", 443, Duration::from_secs(1))?;
//! // hand `bind` to the tunnel wherever it expects a `Bind`
//! # Ok(())
//! # }
//! ```
//!
//! `new` picks up the tokio runtime of the calling thread and returns
//! [`PreflightError::NoRuntime`] outside one. From a plain OS thread, pass a
//! runtime handle explicitly with [`PreflightBind::with_runtime`]:
//!
//! ```rust,no_run
//! use shield_preflight::{Bind, PreflightBind};
//! use std::time::Duration;
//!
//! # fn wrap<B: Bind>(udp_bind: B) -> Result<(), Box<dyn std::error::Error>> {
//! let runtime = tokio::runtime::Runtime::new()?;
//! let bind = PreflightBind::with_runtime(
//!     udp_bind,
//!     "0xc000000001",
//!     443,
//!     Duration::from_secs(1),
//!     runtime.handle().clone(),
//! )?;
//! // keep `runtime` alive for as long as `bind` sends
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`bind`] | `Bind` / `Endpoint` traits and the `PreflightBind` decorator |
//! | [`classifier`] | Message-type classification of outbound datagrams |
//! | [`limiter`] | Per-destination admission (`IntervalLimiter`, `LruIntervalLimiter`) |
//! | [`probe`] | Fire-and-forget UDP probe dispatch |
//! | [`config`] | `PreflightConfig` and hex payload decoding |

// Crate-level lint configuration: suppress stylistic warnings that don't affect correctness.
#![allow(clippy::empty_line_after_doc_comments, clippy::doc_lazy_continuation)]

// ── Public modules ──────────────────────────────────────────────────────────

/// Packet transport abstraction and the preflight decorator.
pub mod bind;

/// Handshake signature classifier.
pub mod classifier;

/// Preflight configuration and payload decoding.
pub mod config;

/// Error types.
pub mod error;

/// Per-destination rate limiting of probes.
pub mod limiter;

/// Decoy probe dispatch.
pub mod probe;

// ── Re-exports for convenience ──────────────────────────────────────────────

pub use bind::{Bind, Endpoint, PreflightBind, PreflightStats, ReceiveFn};
pub use classifier::{classify, is_handshake_initiation, MessageKind};
pub use config::{decode_payload, PreflightConfig};
pub use error::PreflightError;
pub use limiter::{AdmissionGate, IntervalLimiter, LruIntervalLimiter};
pub use probe::{ProbeDispatcher, ProbeOutcome};

// ── Library metadata ────────────────────────────────────────────────────────

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the crate version string.
pub fn version() -> &'static str {
    VERSION
}

// ── Tests ───────────────────────────────────────────────────────────────────
