use crate::audio::{
    Notice,
    Notifier,
};

/// Prints notices to stdout.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match notice {
            Notice::AudioUnavailable { word } => {
                println!("[Audio] No audio available for '{}'", word)
            }
        }
    }
}
