//! Decoder capability. The QR decoding itself happens elsewhere (a camera
//! library in the webview, or a process printing one payload per line);
//! this module only models starting and stopping such a producer.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::io::{BufRead, ErrorKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::error::DecoderError;

pub type DecodeCallback = Box<dyn FnMut(String) + Send + 'static>;

/// Which camera the decoder should prefer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    #[default]
    Environment,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    pub fps: u32,
    /// Edge of the square scan region, in pixels.
    pub qrbox: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self { fps: 10, qrbox: 250 }
    }
}

pub trait ScanSource {
    fn start(
        &mut self,
        facing: FacingMode,
        config: &ScanConfig,
        on_decoded: DecodeCallback,
    ) -> Result<(), DecoderError>;

    fn stop(&mut self) -> Result<(), DecoderError>;
}

/// Stop `source`, logging instead of propagating any failure.
pub fn stop_quietly(source: &mut dyn ScanSource) {
    if let Err(e) = source.stop() {
        tracing::warn!(error = %e, "decoder stop failed");
    }
}

/// Reads decoded payloads line by line from any reader on a worker thread.
pub struct LineSource<R> {
    reader: Option<R>,
    stopped: Arc<AtomicBool>,
    worker: Option<JoinHandle<Result<usize, DecoderError>>>,
}

impl<R: BufRead + Send + 'static> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
            stopped: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    /// Wait for the reader to hit EOF (or `stop`). Returns the number of payloads delivered.
    pub fn join(&mut self) -> Result<usize, DecoderError> {
        let worker = self.worker.take().ok_or(DecoderError::NotRunning)?;
        worker.join().map_err(|_| DecoderError::WorkerPanicked)?
    }
}

impl<R: BufRead + Send + 'static> ScanSource for LineSource<R> {
    fn start(
        &mut self,
        facing: FacingMode,
        config: &ScanConfig,
        mut on_decoded: DecodeCallback,
    ) -> Result<(), DecoderError> {
        let reader = self.reader.take().ok_or(DecoderError::AlreadyRunning)?;
        tracing::debug!(?facing, fps = config.fps, qrbox = config.qrbox, "line source started");

        let stopped = Arc::clone(&self.stopped);
        self.worker = Some(std::thread::spawn(move || {
            let mut reader = reader;
            let mut buf = Vec::new();
            let mut delivered = 0usize;
            while !stopped.load(Ordering::SeqCst) {
                buf.clear();
                match reader.read_until(b'\n', &mut buf) {
                    Ok(0) => break,
                    Ok(_) => {}
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e.into()),
                }
                // Payload bytes are not validated; undecodable bytes become U+FFFD.
                let line = String::from_utf8_lossy(&buf);
                if let Cow::Owned(_) = line {
                    tracing::warn!("payload was not valid UTF-8, replaced invalid bytes");
                }
                let payload = line.trim_end_matches(['\r', '\n']);
                if payload.trim().is_empty() {
                    continue;
                }
                on_decoded(payload.to_string());
                delivered += 1;
            }
            Ok(delivered)
        }));
        Ok(())
    }

    /// Takes effect between reads: a worker blocked on a read stops once that read returns.
    /// Fails with `NotRunning` if the source was never started or has already finished.
    fn stop(&mut self) -> Result<(), DecoderError> {
        if !self.is_running() {
            return Err(DecoderError::NotRunning);
        }
        self.stopped.store(true, Ordering::SeqCst);
        Ok(())
    }
}
