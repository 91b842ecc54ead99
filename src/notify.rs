use std::io::Write;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::info;

/// Minimum spacing between two successful sends.
pub const SEND_INTERVAL: Duration = Duration::from_secs(3);

/// How long to wait after opening the port before using it. Serial-to-USB
/// bridges reset the peer on open and drop bytes written immediately after.
const OPEN_SETTLE: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to open serial port {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },
    #[error("serial write failed: {0}")]
    Write(#[from] std::io::Error),
}

/// What happened to a single send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The label went out over the link.
    Sent,
    /// The previous send was less than [`SEND_INTERVAL`] ago.
    Throttled,
    /// No link is open; sending is skipped without error.
    Offline,
}

/// Minimum-interval gate. Advances only when told a send succeeded, so a
/// failed write retries on the next attempt instead of waiting out a fresh
/// window.
#[derive(Debug)]
pub struct SendGate {
    interval: Duration,
    last_sent: Option<Instant>,
}

impl SendGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_sent: None,
        }
    }

    /// Whether a send may go out at `now`. The first send is always due.
    pub fn due(&self, now: Instant) -> bool {
        self.last_sent
            .is_none_or(|last| now.duration_since(last) >= self.interval)
    }

    /// Record a successful send at `now`.
    pub fn advance(&mut self, now: Instant) {
        self.last_sent = Some(now);
    }
}

/// Write-only serial link to the microcontroller, gated to one message per
/// [`SEND_INTERVAL`].
///
/// The link is optional: an offline `SerialLink` accepts every call and does
/// nothing, so a missing device degrades the daemon instead of stopping it.
pub struct SerialLink {
    link: Option<Box<dyn Write + Send>>,
    gate: SendGate,
}

impl SerialLink {
    /// Open the serial device, then wait [`OPEN_SETTLE`] for the peer to come
    /// back up before the link is considered usable.
    pub fn open(port: &str, baud: u32, timeout: Duration) -> Result<Self, NotifyError> {
        let device = serialport::new(port, baud)
            .timeout(timeout)
            .open()
            .map_err(|source| NotifyError::Open {
                port: port.to_string(),
                source,
            })?;
        std::thread::sleep(OPEN_SETTLE);
        info!(%port, baud, "serial link open");
        Ok(Self::with_writer(Box::new(device)))
    }

    /// Open the device if one is configured, falling back to an offline link
    /// when it is absent or the open fails. The failure is logged, not raised.
    pub fn open_or_offline(port: Option<&str>, baud: u32, timeout: Duration) -> Self {
        let Some(port) = port else {
            info!("no serial port configured, notifications disabled");
            return Self::offline();
        };
        match Self::open(port, baud, timeout) {
            Ok(link) => link,
            Err(e) => {
                tracing::warn!(?e, "continuing without a serial link");
                Self::offline()
            }
        }
    }

    /// A link with no device behind it. Every send is skipped.
    pub fn offline() -> Self {
        Self {
            link: None,
            gate: SendGate::new(SEND_INTERVAL),
        }
    }

    /// Wrap an already-open writer. Lets tests and alternate transports stand
    /// in for a serial device.
    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            link: Some(writer),
            gate: SendGate::new(SEND_INTERVAL),
        }
    }

    pub fn is_open(&self) -> bool {
        self.link.is_some()
    }

    /// Send `<label>\n` if the link is open and the gate allows it.
    pub fn send(&mut self, label: &str) -> Result<SendOutcome, NotifyError> {
        self.send_at(label, Instant::now())
    }

    /// [`send`](Self::send) with the clock supplied by the caller.
    pub fn send_at(&mut self, label: &str, now: Instant) -> Result<SendOutcome, NotifyError> {
        if !self.gate.due(now) {
            return Ok(SendOutcome::Throttled);
        }
        let Some(link) = self.link.as_mut() else {
            return Ok(SendOutcome::Offline);
        };
        link.write_all(format!("{label}\n").as_bytes())?;
        link.flush()?;
        self.gate.advance(now);
        Ok(SendOutcome::Sent)
    }

    /// Drop the link, closing the device. Safe to call repeatedly or when the
    /// link never opened.
    pub fn close(&mut self) {
        if self.link.take().is_some() {
            info!("serial link closed");
        }
    }
}
