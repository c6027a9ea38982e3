use std::path::{
    Path,
    PathBuf,
};

use crate::core::utils::{
    capitalize_first,
    capitalize_tokens,
};

pub const MAX_CANDIDATES: usize = 12;
const EXTENSIONS: [&str; 2] = ["MP3", "mp3"];

/// Filename guesses for a word, most likely first, without duplicates.
///
/// Casing (original, lowercase, first letter capitalized, capitalized per token)
/// × separator (space, underscore) × extension (`.MP3`, `.mp3`), capped at
/// [`MAX_CANDIDATES`].
pub fn candidate_file_names(word: &str) -> Vec<String> {
    let word = word.trim();
    if word.is_empty() {
        return Vec::new();
    }

    let casings = [
        word.to_string(),
        word.to_lowercase(),
        capitalize_first(word),
        capitalize_tokens(word),
    ];
    let mut names: Vec<String> = Vec::with_capacity(MAX_CANDIDATES);

    for casing in &casings {
        for stem in [casing.clone(), casing.replace(' ', "_")] {
            for extension in EXTENSIONS {
                let name = format!("{}.{}", stem, extension);
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
    }

    names.truncate(MAX_CANDIDATES);
    names
}

pub fn candidate_paths(audio_dir: &Path, word: &str) -> Vec<PathBuf> {
    candidate_file_names(word).into_iter().map(|name| audio_dir.join(name)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_word_produces_twelve_variants() {
        let names = candidate_file_names("Washing machine");

        assert_eq!(names.len(), MAX_CANDIDATES);
        assert_eq!(names[0], "Washing machine.MP3");
        assert_eq!(names[1], "Washing machine.mp3");
        assert_eq!(names[2], "Washing_machine.MP3");
        assert!(names.contains(&"washing_machine.mp3".to_string()));
        assert!(names.contains(&"Washing_Machine.MP3".to_string()));
    }

    #[test]
    fn test_lowercase_word_tries_sentence_case() {
        let names = candidate_file_names("washing machine");

        assert_eq!(names.len(), MAX_CANDIDATES);
        assert_eq!(names[4], "Washing machine.MP3");
        assert_eq!(names[6], "Washing_machine.MP3");
        assert!(names.contains(&"Washing_Machine.mp3".to_string()));
    }

    #[test]
    fn test_mixed_casing_capped() {
        let names = candidate_file_names("kITCHEN island");

        assert_eq!(names.len(), MAX_CANDIDATES);
        assert_eq!(names[0], "kITCHEN island.MP3");
        assert_eq!(names[4], "kitchen island.MP3");
        assert_eq!(names[8], "Kitchen island.MP3");
    }

    #[test]
    fn test_duplicates_removed() {
        let names = candidate_file_names("oven");
        assert_eq!(names, vec!["oven.MP3", "oven.mp3", "Oven.MP3", "Oven.mp3"]);
    }

    #[test]
    fn test_empty_word() {
        assert!(candidate_file_names("   ").is_empty());
    }

    #[test]
    fn test_paths_join_directory() {
        let paths = candidate_paths(Path::new("assets/audio"), "rug");
        assert_eq!(paths[0], PathBuf::from("assets/audio/rug.MP3"));
    }
}
