//! Pre-recorded clip playback.
//!
//! Clips are fetched whole at load so starts are instant and a bad URL
//! fails up front instead of mid-session. Each start decodes fresh from the
//! in-memory bytes, which is also how stop rewinds to the beginning.

use anyhow::{Context, Result};
use rodio::{Decoder, OutputStream, Sink};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

pub struct ClipPlayer {
    source: String,
    bytes: Vec<u8>,
    playback: Option<ClipPlayback>,
}

struct ClipPlayback {
    _stream: OutputStream,
    sink: Sink,
}

impl ClipPlayer {
    /// Fetch or read the clip bytes. `http(s)` sources go through a blocking
    /// fetch, anything else is a filesystem path.
    pub fn load(source: &str) -> Result<Self> {
        let bytes = if source.starts_with("http://") || source.starts_with("https://") {
            info!(url = source, "Fetching lesson clip");
            let response = reqwest::blocking::get(source)
                .with_context(|| format!("Failed to fetch clip from {source}"))?
                .error_for_status()
                .with_context(|| format!("Clip fetch from {source} was refused"))?;
            response
                .bytes()
                .with_context(|| format!("Failed to read clip body from {source}"))?
                .to_vec()
        } else {
            info!(path = source, "Reading lesson clip");
            fs::read(Path::new(source))
                .with_context(|| format!("Failed to read clip at {source}"))?
        };
        debug!(bytes = bytes.len(), "Clip loaded");
        Ok(ClipPlayer {
            source: source.to_string(),
            bytes,
            playback: None,
        })
    }

    /// Start from the top, replacing any current playback.
    pub fn start(&mut self) -> Result<()> {
        self.stop();
        let (_stream, handle) = OutputStream::try_default().context("Opening audio output")?;
        let sink = Sink::try_new(&handle).context("Creating sink")?;
        let decoded = Decoder::new(Cursor::new(self.bytes.clone()))
            .with_context(|| format!("Undecodable clip from {}", self.source))?;
        sink.append(decoded);
        sink.play();
        self.playback = Some(ClipPlayback { _stream, sink });
        Ok(())
    }

    pub fn pause(&self) {
        if let Some(playback) = &self.playback {
            debug!("Pausing clip");
            playback.sink.pause();
        }
    }

    pub fn resume(&self) {
        if let Some(playback) = &self.playback {
            debug!("Resuming clip");
            playback.sink.play();
        }
    }

    /// Stop and rewind; the sink is dropped and the next start decodes fresh.
    pub fn stop(&mut self) {
        if let Some(playback) = self.playback.take() {
            playback.sink.stop();
        }
    }

    /// True once a started clip has drained its sink.
    pub fn finished(&self) -> bool {
        self.playback.as_ref().is_some_and(|p| p.sink.empty())
    }
}
