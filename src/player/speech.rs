use std::{
    process::Stdio,
    sync::{
        atomic::{
            AtomicUsize,
            Ordering,
        },
        Arc,
        Mutex,
    },
};

use futures::future::BoxFuture;
use tokio::{
    process::Command,
    sync::{
        oneshot,
        Notify,
    },
};
use tracing::debug;

use crate::{
    audio::{
        SpeechSignal,
        SpeechSynthesizer,
        Utterance,
    },
    core::PointLearnError,
};

/// espeak's speed at rate 1.0.
const BASE_WORDS_PER_MINUTE: f32 = 175.0;

/// Speaks utterances through a command-line synthesizer such as espeak.
pub struct CommandSpeech {
    command: Vec<String>,
    active: Arc<AtomicUsize>,
    cancel: Mutex<Option<Arc<Notify>>>,
}

impl CommandSpeech {
    pub fn new(command: Vec<String>) -> Result<Self, PointLearnError> {
        if command.first().map(|program| program.trim().is_empty()).unwrap_or(true) {
            return Err(PointLearnError::Custom("Speech command is empty".into()));
        }
        Ok(Self { command, active: Arc::new(AtomicUsize::new(0)), cancel: Mutex::new(None) })
    }

    fn render_args(&self, utterance: &Utterance) -> Vec<String> {
        let wpm = words_per_minute(utterance.rate).to_string();
        let mut has_text = false;
        let mut args: Vec<String> = self.command[1..]
            .iter()
            .map(|arg| {
                has_text |= arg.contains("{text}");
                arg.replace("{text}", &utterance.text)
                    .replace("{wpm}", &wpm)
                    .replace("{lang}", &utterance.lang)
            })
            .collect();
        if !has_text {
            args.push(utterance.text.clone());
        }
        args
    }
}

impl SpeechSynthesizer for CommandSpeech {
    fn speak<'a>(&'a self, utterance: &'a Utterance) -> BoxFuture<'a, SpeechSignal> {
        Box::pin(async move {
            let mut child = match Command::new(&self.command[0])
                .args(self.render_args(utterance))
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
            {
                Ok(child) => child,
                Err(e) => {
                    return SpeechSignal::Failed(format!(
                        "Failed to start {}: {}",
                        self.command[0], e
                    ))
                }
            };

            let cancel = Arc::new(Notify::new());
            if let Ok(mut slot) = self.cancel.lock() {
                *slot = Some(cancel.clone());
            }

            self.active.fetch_add(1, Ordering::SeqCst);
            let active = self.active.clone();
            let (sender, receiver) = oneshot::channel();

            // The waiter owns the child so an abandoned caller still releases it.
            tokio::spawn(async move {
                let signal = tokio::select! {
                    status = child.wait() => match status {
                        Ok(status) if status.success() => SpeechSignal::Ended,
                        Ok(status) => SpeechSignal::Failed(format!("synthesizer exited with {}", status)),
                        Err(e) => SpeechSignal::Failed(e.to_string()),
                    },
                    _ = cancel.notified() => {
                        let _ = child.kill().await;
                        SpeechSignal::Failed("cancelled".to_string())
                    }
                };
                active.fetch_sub(1, Ordering::SeqCst);
                let _ = sender.send(signal);
            });

            receiver
                .await
                .unwrap_or_else(|_| SpeechSignal::Failed("speech task dropped".to_string()))
        })
    }

    fn is_speaking(&self) -> bool {
        self.active.load(Ordering::SeqCst) > 0
    }

    fn cancel(&self) {
        if let Ok(mut slot) = self.cancel.lock() {
            if let Some(cancel) = slot.take() {
                debug!("Cancelling speech");
                cancel.notify_one();
            }
        }
    }
}

pub fn words_per_minute(rate: f32) -> u32 {
    (BASE_WORDS_PER_MINUTE * rate.clamp(0.1, 4.0)).round() as u32
}
