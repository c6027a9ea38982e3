pub mod console;
pub mod process;
pub mod speech;

use std::sync::Arc;

pub use console::ConsoleNotifier;
pub use process::ProcessPlayer;
pub use speech::CommandSpeech;

use crate::{
    audio::{
        AudioManifest,
        AudioResolver,
    },
    core::{
        AppConfig,
        PointLearnError,
    },
};

/// Wires the process-backed player, speech command and console notices into a resolver.
pub fn build_resolver(
    config: &AppConfig,
    manifest: AudioManifest,
) -> Result<AudioResolver, PointLearnError> {
    let media = Arc::new(ProcessPlayer::new(config.player_command.clone())?);
    let speech = Arc::new(CommandSpeech::new(config.speech_command.clone())?);

    Ok(AudioResolver::new(media, speech, Arc::new(ConsoleNotifier), config.timeouts.clone())
        .with_manifest(manifest)
        .with_audio_dir(config.audio_dir.clone(), config.guess_unmapped_audio)
        .with_voice(config.speech_rate, config.speech_lang.clone()))
}
