//! Clipboard trigger: polls a text source and emits payloads copied by the user.
//!
//! The watcher only produces [`Payload`]s; what happens to them (prompting,
//! running the pipeline) is up to the receiver.

use std::process::{Command, Stdio};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::ClipboardConfig;
use crate::payload::{find_payload_json, Payload};

/// Something that can be polled for its current text (a clipboard).
pub trait TextSource: Send + 'static {
    /// Current text, or `None` when there is nothing to read. Blocking.
    fn read_text(&mut self) -> Result<Option<String>>;
}

/// Runs an external program and reads its stdout, e.g. `wl-paste --no-newline`
/// or `xclip -o -selection clipboard`.
#[derive(Debug, Clone)]
pub struct CommandSource {
    program: String,
    args: Vec<String>,
}

impl CommandSource {
    pub fn new(command: &[String]) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| anyhow!("clipboard command is empty"))?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    pub fn from_config(cfg: &ClipboardConfig) -> Result<Self> {
        Self::new(&cfg.command)
    }
}

impl TextSource for CommandSource {
    fn read_text(&mut self) -> Result<Option<String>> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .with_context(|| format!("run clipboard command {}", self.program))?;
        // wl-paste and xclip exit non-zero on an empty clipboard.
        if !output.status.success() {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()))
    }
}

/// Suppresses repeats: unchanged clipboard text is ignored, and so is a
/// payload identical to the last one emitted, even if other text was copied
/// in between.
#[derive(Debug, Default)]
pub struct Debounce {
    last_text: Option<String>,
    last_payload: Option<String>,
}

impl Debounce {
    pub fn observe(&mut self, text: &str) -> Option<Payload> {
        if self.last_text.as_deref() == Some(text) {
            return None;
        }
        self.last_text = Some(text.to_string());

        let json = find_payload_json(text)?;
        if self.last_payload.as_deref() == Some(json) {
            return None;
        }
        self.last_payload = Some(json.to_string());

        match Payload::parse(json) {
            Ok(payload) => Some(payload),
            Err(e) => {
                tracing::warn!("ignoring clipboard payload: {}", e);
                None
            }
        }
    }
}

/// Running clipboard poller. Dropping it without [`stop`](Self::stop) leaves
/// the task running until the receiver is dropped.
pub struct PayloadWatcher {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl PayloadWatcher {
    /// Poll `source` every `interval` and send each new payload to `tx`.
    /// Must be called within a tokio runtime.
    pub fn start<S: TextSource>(source: S, interval: Duration, tx: mpsc::Sender<Payload>) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(poll_loop(source, interval, tx, stop_rx));
        tracing::info!(interval_ms = interval.as_millis() as u64, "clipboard watcher started");
        Self { stop_tx, handle }
    }

    /// Signal the task to stop and wait for it.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.handle.await {
            tracing::warn!("clipboard watcher task failed: {}", e);
        }
        tracing::info!("clipboard watcher stopped");
    }
}

async fn poll_loop<S: TextSource>(
    mut source: S,
    interval: Duration,
    tx: mpsc::Sender<Payload>,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut debounce = Debounce::default();

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow() {
                    return;
                }
                continue;
            }
        }

        let read = tokio::task::spawn_blocking(move || {
            let text = source.read_text();
            (source, text)
        })
        .await;
        let text = match read {
            Ok((returned, text)) => {
                source = returned;
                text
            }
            Err(e) => {
                tracing::error!("clipboard read task failed: {}", e);
                return;
            }
        };

        let text = match text {
            Ok(Some(text)) => text,
            Ok(None) => continue,
            Err(e) => {
                tracing::debug!("clipboard read failed: {:#}", e);
                continue;
            }
        };
        if let Some(payload) = debounce.observe(&text) {
            tracing::info!(name = %payload.name, "payload copied to clipboard");
            if tx.send(payload).await.is_err() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAIR: &str = r#"unity-asset-payload::{"name":"Chair","downloadUrl":"https://x/chair.zip"}"#;
    const LAMP: &str = r#"unity-asset-payload::{"name":"Lamp","downloadUrl":"https://x/lamp.zip"}"#;

    struct Scripted {
        texts: Vec<&'static str>,
        next: usize,
    }

    impl TextSource for Scripted {
        fn read_text(&mut self) -> Result<Option<String>> {
            let text = self.texts.get(self.next).or(self.texts.last()).copied();
            self.next += 1;
            Ok(text.map(str::to_string))
        }
    }

    #[test]
    fn debounce_skips_unchanged_text_and_repeated_payloads() {
        let mut d = Debounce::default();
        assert!(d.observe("hello").is_none());
        assert_eq!(d.observe(CHAIR).map(|p| p.name), Some("Chair".to_string()));
        assert!(d.observe(CHAIR).is_none());
        assert!(d.observe("something else").is_none());
        assert!(d.observe(CHAIR).is_none(), "same payload again is not re-emitted");
        assert_eq!(d.observe(LAMP).map(|p| p.name), Some("Lamp".to_string()));
    }

    #[test]
    fn debounce_ignores_invalid_payloads() {
        let mut d = Debounce::default();
        assert!(d.observe(r#"unity-asset-payload::{"name":"x"}"#).is_none());
        assert!(d.observe(r#"unity-asset-payload::{"name":"x","downloadUrl":"file:///etc"}"#).is_none());
    }

    #[test]
    fn empty_command_is_rejected() {
        assert!(CommandSource::new(&[]).is_err());
        let source = CommandSource::new(&["xclip".to_string(), "-o".to_string()]).unwrap();
        assert_eq!(source.program, "xclip");
        assert_eq!(source.args, vec!["-o"]);
    }

    #[tokio::test]
    async fn watcher_emits_each_new_payload_once() {
        let source = Scripted {
            texts: vec!["noise", CHAIR, CHAIR, "noise", CHAIR, LAMP],
            next: 0,
        };
        let (tx, mut rx) = mpsc::channel(4);
        let watcher = PayloadWatcher::start(source, Duration::from_millis(5), tx);

        let first = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        let second = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.name, "Chair");
        assert_eq!(second.name, "Lamp");

        watcher.stop().await;
        assert!(rx.recv().await.is_none(), "sender dropped once the task ends");
    }
}
