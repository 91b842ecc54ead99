pub mod config;
pub mod notify;
pub mod overlay;
pub mod palette;

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use image::{ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Mutex;
use tracing::{error, info, trace, warn};

use crate::notify::{SendOutcome, SerialLink};
use crate::overlay::Canvas;

/// One classifier reading for one emotion. Scores are conventionally 0–100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionScore {
    pub label: String,
    pub score: f32,
}

/// The entry with the highest score. Ties keep the earliest entry, so the
/// result is deterministic for a fixed input order. Empty input gives `None`.
pub fn dominant(scores: &[EmotionScore]) -> Option<&EmotionScore> {
    scores.iter().fold(None, |best, entry| match best {
        Some(current) if entry.score <= current.score => best,
        _ => Some(entry),
    })
}

/// Annotates one frame with its emotion scores.
#[async_trait]
pub trait Annotator: Send + Sync {
    /// Consume an encoded frame and return the annotated frame, PNG-encoded.
    async fn annotate(&self, scores: &[EmotionScore], frame: &[u8]) -> anyhow::Result<Vec<u8>>;
}

/// Overlays scores on each frame and forwards the dominant emotion over the
/// serial link. Send failures are logged and contained; the overlay is drawn
/// regardless of how the send went.
pub struct EmotionAnnotator {
    link: Mutex<SerialLink>,
}

impl EmotionAnnotator {
    pub fn new(link: SerialLink) -> Self {
        Self {
            link: Mutex::new(link),
        }
    }

    /// Notify-then-draw for one decoded frame, in place.
    pub async fn observe(&self, scores: &[EmotionScore], frame: &mut RgbImage) {
        if let Some(top) = dominant(scores) {
            match self.link.lock().await.send(&top.label) {
                Ok(SendOutcome::Sent) => info!(label = %top.label, "dominant emotion sent"),
                Ok(SendOutcome::Throttled) => trace!(label = %top.label, "send window closed"),
                Ok(SendOutcome::Offline) => trace!("serial link offline, send skipped"),
                Err(e) => warn!(?e, "serial send failed"),
            }
        }
        // infallible with a Canvas target, which drops out-of-bounds pixels
        let _ = overlay::draw_scores(&mut Canvas::new(frame), scores);
    }

    /// Close the serial link. Further frames are still annotated, with
    /// notifications skipped.
    pub async fn close(&self) {
        self.link.lock().await.close();
    }
}

#[async_trait]
impl Annotator for EmotionAnnotator {
    async fn annotate(&self, scores: &[EmotionScore], frame: &[u8]) -> anyhow::Result<Vec<u8>> {
        let mut img = image::load_from_memory(frame)?.to_rgb8();
        self.observe(scores, &mut img).await;
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png)?;
        Ok(out.into_inner())
    }
}

/// Header line preceding the frame bytes in a request.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FrameHeader {
    #[serde(default)]
    pub scores: Vec<EmotionScore>,
}

async fn handle_connection(stream: UnixStream, annotator: Arc<dyn Annotator>) -> anyhow::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    let mut header = String::new();
    reader.read_line(&mut header).await?;
    let header: FrameHeader = serde_json::from_str(header.trim())?;

    let mut frame = Vec::new();
    reader.read_to_end(&mut frame).await?;
    if frame.is_empty() {
        return Ok(());
    }

    let annotated = annotator.annotate(&header.scores, &frame).await?;
    writer.write_all(&annotated).await?;
    Ok(())
}

/// Run the emotion overlay daemon.
///
/// Each connection carries one request: a JSON header line with the scores,
/// then the frame bytes until EOF. The reply is the annotated frame as PNG.
pub async fn run(socket: PathBuf, annotator: Arc<dyn Annotator>) -> anyhow::Result<()> {
    if socket.exists() {
        tokio::fs::remove_file(&socket).await.ok();
    }
    let listener = UnixListener::bind(&socket)?;
    info!(?socket, "felt listening");
    loop {
        let (stream, _) = listener.accept().await?;
        let annotator = annotator.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, annotator).await {
                error!(?e, "connection error");
            }
        });
    }
}
