use std::{
    path::Path,
    process::Stdio,
    sync::Mutex,
    time::Duration,
};

use futures::future::BoxFuture;
use tokio::{
    io::AsyncReadExt,
    process::{
        Child,
        Command,
    },
};
use tracing::{
    debug,
    warn,
};

use crate::{
    audio::{
        is_remote,
        LoadSignal,
        MediaBackend,
    },
    core::PointLearnError,
};

const HEAD_TIMEOUT_SECS: u64 = 5;

/// Plays sources through an external player process such as mpv.
pub struct ProcessPlayer {
    command: Vec<String>,
    client: reqwest::Client,
    current: Mutex<Option<Child>>,
}

impl ProcessPlayer {
    pub fn new(command: Vec<String>) -> Result<Self, PointLearnError> {
        if command.first().map(|program| program.trim().is_empty()).unwrap_or(true) {
            return Err(PointLearnError::Custom("Player command is empty".into()));
        }
        let client =
            reqwest::Client::builder().timeout(Duration::from_secs(HEAD_TIMEOUT_SECS)).build()?;
        Ok(Self { command, client, current: Mutex::new(None) })
    }

    pub fn is_playing(&self) -> bool {
        self.current
            .lock()
            .map(|mut current| match current.as_mut() {
                Some(child) => matches!(child.try_wait(), Ok(None)),
                None => false,
            })
            .unwrap_or(false)
    }

    async fn probe_remote(&self, url: &str) -> LoadSignal {
        match self.client.head(url).send().await {
            Ok(response) if response.status().is_success() => LoadSignal::Ready,
            Ok(response) => LoadSignal::Failed(format!("HTTP {}", response.status())),
            Err(e) => LoadSignal::Failed(e.to_string()),
        }
    }

    fn spawn(&self, source: &str) -> Result<Child, PointLearnError> {
        Command::new(&self.command[0])
            .args(&self.command[1..])
            .arg(source)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                PointLearnError::Audio(format!("Failed to start {}: {}", self.command[0], e))
            })
    }
}

impl MediaBackend for ProcessPlayer {
    fn load<'a>(&'a self, source: &'a str) -> BoxFuture<'a, LoadSignal> {
        Box::pin(async move {
            if is_remote(source) {
                self.probe_remote(source).await
            } else {
                probe_local(Path::new(source)).await
            }
        })
    }

    fn play<'a>(&'a self, source: &'a str) -> BoxFuture<'a, Result<(), PointLearnError>> {
        Box::pin(async move {
            self.stop();
            let child = self.spawn(source)?;
            debug!("Started player for {}", source);
            match self.current.lock() {
                Ok(mut current) => *current = Some(child),
                Err(_) => warn!("Player state poisoned; playback cannot be stopped"),
            }
            Ok(())
        })
    }

    fn stop(&self) {
        if let Ok(mut current) = self.current.lock() {
            if let Some(mut child) = current.take() {
                if let Err(e) = child.start_kill() {
                    debug!("Player already exited: {}", e);
                }
            }
        }
    }
}

async fn probe_local(path: &Path) -> LoadSignal {
    let mut file = match tokio::fs::File::open(path).await {
        Ok(file) => file,
        Err(e) => return LoadSignal::Failed(e.to_string()),
    };

    let mut header = [0u8; 4];
    match file.read(&mut header).await {
        Ok(n) if looks_like_audio(&header[..n]) => LoadSignal::Ready,
        Ok(_) => LoadSignal::Failed("unrecognised audio data".to_string()),
        Err(e) => LoadSignal::Failed(e.to_string()),
    }
}

/// MP3 (ID3 tag or MPEG frame sync), Ogg, WAV and FLAC signatures.
fn looks_like_audio(header: &[u8]) -> bool {
    header.starts_with(b"ID3")
        || header.starts_with(b"OggS")
        || header.starts_with(b"RIFF")
        || header.starts_with(b"fLaC")
        || (header.len() >= 2 && header[0] == 0xFF && header[1] & 0xE0 == 0xE0)
}
