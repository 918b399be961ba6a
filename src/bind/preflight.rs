//! Preflight bind: a [`Bind`] decorator that sends a decoy probe to a peer
//! whenever a handshake initiation is about to be sent to it.
//!
//! Flow of [`Bind::send`]:
//! 1. every buffer of the batch is run through the classifier;
//! 2. on a match, the destination IP is offered to the admission gate and,
//!    if admitted, a probe is launched on a detached task;
//! 3. the original batch goes to the inner bind unchanged and its result is
//!    returned as-is.
//!
//! The probe never delays, alters or fails the real send.

use super::{Bind, Endpoint, ReceiveFn};
use crate::classifier::batch_contains_initiation;
use crate::config::{decode_payload, PreflightConfig};
use crate::error::{PreflightError, Result};
use crate::limiter::{AdmissionGate, IntervalLimiter};
use crate::probe::ProbeDispatcher;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::runtime::Handle;

// ─── Statistics ──────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Counters {
    initiations_seen: AtomicU64,
    probes_launched: AtomicU64,
    probes_suppressed: AtomicU64,
}

/// Snapshot of a preflight bind's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreflightStats {
    /// Batches sent that contained a handshake initiation.
    pub initiations_seen: u64,
    /// Probes handed to the runtime.
    pub probes_launched: u64,
    /// Initiations for which the gate refused a probe.
    pub probes_suppressed: u64,
}

impl std::fmt::Display for PreflightStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Initiations: {} | Probes: {} launched, {} suppressed",
            self.initiations_seen, self.probes_launched, self.probes_suppressed,
        )
    }
}

// ─── Decorator ───────────────────────────────────────────────────────────────

/// Wraps a [`Bind`] and fires a preflight probe on handshake initiations.
pub struct PreflightBind<B, G = IntervalLimiter> {
    inner: B,
    dispatcher: ProbeDispatcher,
    gate: G,
    counters: Counters,
}

impl<B: Bind> PreflightBind<B> {
    /// Wrap `inner`, spawning probes on the current tokio runtime.
    ///
    /// `hex_payload` may carry a `0x` prefix. Fails with
    /// [`PreflightError::InvalidPayload`] if it is not valid hex, or
    /// [`PreflightError::NoRuntime`] when called outside a runtime.
    pub fn new(inner: B, hex_payload: &str, port: u16, min_interval: Duration) -> Result<Self> {
        let payload = decode_payload(hex_payload)?;
        let runtime = current_runtime()?;
        Ok(Self::build(inner, payload, port, min_interval, runtime))
    }

    /// Like [`PreflightBind::new`] with an explicit runtime for probe tasks.
    pub fn with_runtime(
        inner: B,
        hex_payload: &str,
        port: u16,
        min_interval: Duration,
        runtime: Handle,
    ) -> Result<Self> {
        let payload = decode_payload(hex_payload)?;
        Ok(Self::build(inner, payload, port, min_interval, runtime))
    }

    /// Build from a [`PreflightConfig`] on the current runtime.
    pub fn from_config(inner: B, config: &PreflightConfig) -> Result<Self> {
        let payload = config.payload()?;
        let runtime = current_runtime()?;
        Ok(Self::build_from_config(inner, payload, config, runtime))
    }

    /// Build from a [`PreflightConfig`] on an explicit runtime.
    pub fn from_config_with_runtime(
        inner: B,
        config: &PreflightConfig,
        runtime: Handle,
    ) -> Result<Self> {
        let payload = config.payload()?;
        Ok(Self::build_from_config(inner, payload, config, runtime))
    }

    fn build(
        inner: B,
        payload: Vec<u8>,
        port: u16,
        min_interval: Duration,
        runtime: Handle,
    ) -> Self {
        let dispatcher = ProbeDispatcher::new(payload, port, runtime);
        Self::with_gate(inner, dispatcher, IntervalLimiter::new(min_interval))
    }

    fn build_from_config(
        inner: B,
        payload: Vec<u8>,
        config: &PreflightConfig,
        runtime: Handle,
    ) -> Self {
        let dispatcher = ProbeDispatcher::new(payload, config.port, runtime)
            .with_timeouts(config.connect_timeout(), config.write_timeout());
        Self::with_gate(inner, dispatcher, IntervalLimiter::new(config.min_interval()))
    }
}

fn current_runtime() -> Result<Handle> {
    Handle::try_current().map_err(|_| PreflightError::NoRuntime)
}

impl<B: Bind, G: AdmissionGate> PreflightBind<B, G> {
    /// Assemble from parts, e.g. to share one gate across several binds.
    pub fn with_gate(inner: B, dispatcher: ProbeDispatcher, gate: G) -> Self {
        log::info!(
            "Preflight bind ready: probe port {}, payload {} bytes",
            dispatcher.port(),
            dispatcher.payload().len()
        );
        Self {
            inner,
            dispatcher,
            gate,
            counters: Counters::default(),
        }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    pub fn into_inner(self) -> B {
        self.inner
    }

    pub fn gate(&self) -> &G {
        &self.gate
    }

    pub fn dispatcher(&self) -> &ProbeDispatcher {
        &self.dispatcher
    }

    pub fn stats(&self) -> PreflightStats {
        PreflightStats {
            initiations_seen: self.counters.initiations_seen.load(Ordering::Relaxed),
            probes_launched: self.counters.probes_launched.load(Ordering::Relaxed),
            probes_suppressed: self.counters.probes_suppressed.load(Ordering::Relaxed),
        }
    }

    fn maybe_preflight(&self, bufs: &[Vec<u8>], ep: &B::Endpoint) {
        if !batch_contains_initiation(bufs) {
            return;
        }
        self.counters.initiations_seen.fetch_add(1, Ordering::Relaxed);

        let dst = ep.dst_ip();
        if !self.gate.admit(dst) {
            self.counters.probes_suppressed.fetch_add(1, Ordering::Relaxed);
            log::debug!("Preflight to {} suppressed by rate limit", dst);
            return;
        }

        log::debug!(
            "Handshake initiation to {}, launching preflight probe",
            ep.dst_to_string()
        );
        self.dispatcher.dispatch(dst);
        self.counters.probes_launched.fetch_add(1, Ordering::Relaxed);
    }
}

impl<B: Bind, G: AdmissionGate> Bind for PreflightBind<B, G> {
    type Endpoint = B::Endpoint;

    fn open(&self, port: u16) -> io::Result<(Vec<ReceiveFn<Self::Endpoint>>, u16)> {
        self.inner.open(port)
    }

    fn close(&self) -> io::Result<()> {
        self.inner.close()
    }

    fn set_mark(&self, mark: u32) -> io::Result<()> {
        self.inner.set_mark(mark)
    }

    fn parse_endpoint(&self, s: &str) -> io::Result<Self::Endpoint> {
        self.inner.parse_endpoint(s)
    }

    fn batch_size(&self) -> usize {
        self.inner.batch_size()
    }

    fn send(&self, bufs: &[Vec<u8>], ep: &Self::Endpoint) -> io::Result<()> {
        self.maybe_preflight(bufs, ep);
        self.inner.send(bufs, ep)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
