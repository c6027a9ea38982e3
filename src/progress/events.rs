use std::sync::mpsc;

use crate::core::WordStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Updated { word: String, status: WordStatus },
    SceneReset { scene_id: String },
    Reset,
}

impl ProgressEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            ProgressEvent::Updated { .. } => "progress_updated",
            ProgressEvent::SceneReset { .. } => "scene_reset",
            ProgressEvent::Reset => "progress_reset",
        }
    }
}

/// Receives every store change synchronously, in registration order.
pub trait ProgressListener: Send {
    fn on_progress(&self, event: &ProgressEvent);
}

impl<F> ProgressListener for F
where
    F: Fn(&ProgressEvent) + Send,
{
    fn on_progress(&self, event: &ProgressEvent) {
        self(event)
    }
}

/// Forwards events into an mpsc channel for consumers that poll.
pub struct ChannelListener {
    sender: mpsc::Sender<ProgressEvent>,
}

impl ChannelListener {
    pub fn new() -> (Self, mpsc::Receiver<ProgressEvent>) {
        let (sender, receiver) = mpsc::channel();
        (Self { sender }, receiver)
    }
}

impl ProgressListener for ChannelListener {
    fn on_progress(&self, event: &ProgressEvent) {
        // A dropped receiver only means nobody is listening any more.
        let _ = self.sender.send(event.clone());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);
