//! Structured-message control channel between a host and one sandbox.
//!
//! The two sides live in separate execution contexts and must never share
//! mutable state, so every message crosses the boundary as a serialized JSON
//! string. Unrecognized or malformed messages are ignored on receipt, never
//! fatal; there are no timeouts, and a response arriving after the peer has
//! been torn down is simply dropped along with the queue.

use std::sync::mpsc::{Receiver, Sender, channel};

use crate::engine::snapshot::Snapshot;
use crate::foundation::error::{VitrineError, VitrineResult};

/// Messages the host sends into a sandbox.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum HostMessage {
    /// Resume playback: discard any paused visual mask, restart animations
    /// from frame zero, resume continuous centering.
    #[serde(rename = "PLAY")]
    Play,
    /// Rasterize the current visual state, report it back, then suppress
    /// further visual updates.
    #[serde(rename = "CAPTURE_AND_STOP")]
    CaptureAndStop,
}

/// Messages a sandbox reports back to its host.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum SandboxMessage {
    /// A freshly captured raster of the sandbox's last rendered frame.
    #[serde(rename = "SNAPSHOT")]
    Snapshot {
        /// The captured image.
        image: Snapshot,
    },
}

/// Decode one wire message, ignoring anything unrecognized.
fn decode_lenient<T: serde::de::DeserializeOwned>(wire: &str) -> Option<T> {
    match serde_json::from_str::<T>(wire) {
        Ok(msg) => Some(msg),
        Err(err) => {
            tracing::debug!(%err, "ignoring unrecognized control message");
            None
        }
    }
}

fn encode<T: serde::Serialize>(msg: &T) -> VitrineResult<String> {
    serde_json::to_string(msg).map_err(|e| VitrineError::serde(e.to_string()))
}

/// The host's end of a control channel.
#[derive(Debug)]
pub struct HostEndpoint {
    tx: Sender<String>,
    rx: Receiver<String>,
}

impl HostEndpoint {
    /// Send a control message into the sandbox.
    ///
    /// A sandbox that was torn down mid-flight yields a channel error; the
    /// host treats that as a stale slot, not a failure of the page.
    pub fn send(&self, msg: HostMessage) -> VitrineResult<()> {
        let wire = encode(&msg)?;
        self.tx
            .send(wire)
            .map_err(|_| VitrineError::channel("sandbox endpoint dropped"))
    }

    /// Drain every sandbox message queued since the last call.
    pub fn drain(&self) -> Vec<SandboxMessage> {
        let mut out = Vec::new();
        while let Ok(wire) = self.rx.try_recv() {
            if let Some(msg) = decode_lenient(&wire) {
                out.push(msg);
            }
        }
        out
    }
}

/// The sandbox's end of a control channel.
#[derive(Debug)]
pub struct SandboxEndpoint {
    tx: Sender<String>,
    rx: Receiver<String>,
}

impl SandboxEndpoint {
    /// Report a message back to the host.
    ///
    /// A host that already dropped its endpoint is fine: the report is
    /// silently discarded, matching the "late snapshot is ignored"
    /// cancellation contract.
    pub fn send(&self, msg: &SandboxMessage) -> VitrineResult<()> {
        let wire = encode(msg)?;
        if self.tx.send(wire).is_err() {
            tracing::debug!("host endpoint gone, dropping sandbox report");
        }
        Ok(())
    }

    /// Drain every host control message queued since the last call.
    pub fn drain(&self) -> Vec<HostMessage> {
        let mut out = Vec::new();
        while let Ok(wire) = self.rx.try_recv() {
            if let Some(msg) = decode_lenient(&wire) {
                out.push(msg);
            }
        }
        out
    }
}

/// Create a connected host/sandbox endpoint pair.
pub fn endpoint_pair() -> (HostEndpoint, SandboxEndpoint) {
    let (host_tx, sandbox_rx) = channel();
    let (sandbox_tx, host_rx) = channel();
    (
        HostEndpoint {
            tx: host_tx,
            rx: host_rx,
        },
        SandboxEndpoint {
            tx: sandbox_tx,
            rx: sandbox_rx,
        },
    )
}

#[cfg(test)]
#[path = "../tests/unit/channel/wire.rs"]
mod tests;
