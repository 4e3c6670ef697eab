use std::io::{BufRead, BufReader};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use chrono::{DateTime, Duration, Local};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{AttendError, Result};
use crate::roster::MarkOutcome;

/// Drops a repeat of the last accepted scan while the decoder keeps seeing
/// the same code. Holds one slot only: a different code replaces it at once.
#[derive(Debug, Clone)]
pub struct ScanDebouncer {
    window: Duration,
    last: Option<(String, DateTime<Local>)>,
}

impl ScanDebouncer {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// Returns true when `matric` should reach the marking routine, and
    /// records it as the last accepted scan.
    pub fn admit(&mut self, matric: &str, now: DateTime<Local>) -> bool {
        if let Some((last, expires_at)) = &self.last {
            if last == matric && now < *expires_at {
                debug!("Suppressed repeat scan of {}", matric);
                return false;
            }
        }

        self.last = Some((matric.to_string(), now + self.window));
        true
    }

    pub fn clear(&mut self) {
        self.last = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

/// Transient status line shown after each scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
    pub expires_at: DateTime<Local>,
}

impl Banner {
    pub fn for_outcome(outcome: &MarkOutcome, now: DateTime<Local>, lifetime: Duration) -> Self {
        Self {
            kind: if outcome.is_success() {
                BannerKind::Success
            } else {
                BannerKind::Error
            },
            message: outcome.message(),
            expires_at: now + lifetime,
        }
    }

    pub fn is_visible(&self, now: DateTime<Local>) -> bool {
        now < self.expires_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraFacing {
    /// Rear camera
    Environment,
    User,
}

/// Capture settings handed to the decoder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub fps: u32,
    pub region_width: u32,
    pub region_height: u32,
    pub aspect_ratio: f32,
    pub facing: CameraFacing,
    pub remember_last_camera: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            fps: 10,
            region_width: 250,
            region_height: 250,
            aspect_ratio: 1.0,
            facing: CameraFacing::Environment,
            remember_last_camera: true,
        }
    }
}

impl ScannerConfig {
    /// Environment passed to an external decoder process
    pub fn env(&self) -> Vec<(&'static str, String)> {
        let facing = match self.facing {
            CameraFacing::Environment => "environment",
            CameraFacing::User => "user",
        };
        vec![
            ("ATTENDSCAN_FPS", self.fps.to_string()),
            ("ATTENDSCAN_REGION", format!("{}x{}", self.region_width, self.region_height)),
            ("ATTENDSCAN_ASPECT_RATIO", self.aspect_ratio.to_string()),
            ("ATTENDSCAN_FACING", facing.to_string()),
            ("ATTENDSCAN_REMEMBER_CAMERA", self.remember_last_camera.to_string()),
        ]
    }
}

/// Something that produces decoded QR text. Decode failures stay inside the
/// service; only successfully decoded text reaches the receiver.
pub trait ScanService: Send {
    fn start(&mut self, config: &ScannerConfig) -> Result<Receiver<String>>;
    fn stop(&mut self) -> Result<()>;
}

impl<S: ScanService + ?Sized> ScanService for Box<S> {
    fn start(&mut self, config: &ScannerConfig) -> Result<Receiver<String>> {
        (**self).start(config)
    }

    fn stop(&mut self) -> Result<()> {
        (**self).stop()
    }
}

/// Forward every line of `reader` until EOF or a read error
fn pump_lines<R: BufRead>(reader: R, tx: Sender<String>) {
    for line in reader.lines() {
        match line {
            Ok(line) => {
                if tx.send(line).is_err() {
                    break;
                }
            }
            Err(e) => {
                debug!("Scanner input closed: {}", e);
                break;
            }
        }
    }
}

/// Reads decoded text one line at a time, e.g. a keyboard-wedge scanner on
/// stdin or the output of a decoder piped into the CLI.
pub struct LineScanner<R> {
    reader: Option<R>,
}

impl<R: BufRead + Send + 'static> LineScanner<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
        }
    }
}

impl<R: BufRead + Send + 'static> ScanService for LineScanner<R> {
    fn start(&mut self, _config: &ScannerConfig) -> Result<Receiver<String>> {
        let reader = self
            .reader
            .take()
            .ok_or_else(|| AttendError::Scanner("line scanner already started".to_string()))?;

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || pump_lines(reader, tx));
        Ok(rx)
    }

    fn stop(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Runs an external decoder (for example `zbarcam --raw`) and reads one
/// decoded code per line from its stdout.
pub struct CommandScanner {
    command_line: String,
    child: Option<Child>,
}

impl CommandScanner {
    pub fn new(command_line: impl Into<String>) -> Self {
        Self {
            command_line: command_line.into(),
            child: None,
        }
    }
}

impl ScanService for CommandScanner {
    fn start(&mut self, config: &ScannerConfig) -> Result<Receiver<String>> {
        let mut parts = self.command_line.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| AttendError::Scanner("empty scanner command".to_string()))?;

        let mut child = Command::new(program)
            .args(parts)
            .envs(config.env())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| AttendError::Scanner(format!("failed to start `{}`: {}", self.command_line, e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AttendError::Scanner("decoder has no stdout".to_string()))?;

        info!("Started decoder `{}` at {} fps", self.command_line, config.fps);

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || pump_lines(BufReader::new(stdout), tx));
        self.child = Some(child);
        Ok(rx)
    }

    fn stop(&mut self) -> Result<()> {
        if let Some(mut child) = self.child.take() {
            // kill fails if the decoder already exited; it still needs reaping
            if let Err(e) = child.kill() {
                debug!("Decoder `{}` was not killed: {}", self.command_line, e);
            }
            child.wait()?;
            info!("Stopped decoder `{}`", self.command_line);
        }
        Ok(())
    }
}

/// A running scanner. Dropping the guard stops the service; a failed stop
/// is logged and otherwise ignored.
pub struct ScanGuard<S: ScanService> {
    service: S,
    events: Receiver<String>,
}

impl<S: ScanService> ScanGuard<S> {
    pub fn start(mut service: S, config: &ScannerConfig) -> Result<Self> {
        let events = service.start(config)?;
        Ok(Self { service, events })
    }

    /// Everything decoded since the last poll, without blocking
    pub fn poll(&self) -> Vec<String> {
        self.events.try_iter().collect()
    }

    /// Block until the next decoded text. `None` once the source is exhausted.
    pub fn recv(&self) -> Option<String> {
        self.events.recv().ok()
    }
}

impl<S: ScanService> Drop for ScanGuard<S> {
    fn drop(&mut self) {
        if let Err(e) = self.service.stop() {
            debug!("Ignoring scanner teardown error: {}", e);
        }
    }
}
