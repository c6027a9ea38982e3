use std::{
    collections::{
        BTreeMap,
        HashMap,
    },
    fs,
    path::{
        Path,
        PathBuf,
    },
};

use serde::{
    Deserialize,
    Serialize,
};
use tracing::{
    debug,
    info,
    warn,
};

use super::candidates::candidate_file_names;
use crate::{
    catalog::SceneCatalog,
    core::{
        utils::word_key,
        PointLearnError,
    },
    persistence::{
        load_json,
        save_json,
    },
};

/// Word key to audio file, resolved once against the audio directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioManifest {
    entries: BTreeMap<String, PathBuf>,
}

/// Outcome of [`AudioManifest::build`]: the manifest and the words without audio.
#[derive(Debug, Default)]
pub struct ManifestReport {
    pub manifest: AudioManifest,
    pub unmapped: Vec<String>,
}

impl AudioManifest {
    /// Matches every catalog word against a single listing of `audio_dir`.
    ///
    /// The entry's authored reference wins when present; otherwise the first
    /// filename variant found is used. A final case-insensitive pass catches
    /// assets whose casing matches none of the variants.
    pub fn build(catalog: &SceneCatalog, audio_dir: &Path) -> ManifestReport {
        let listing = list_audio_dir(audio_dir);
        let folded: HashMap<String, &String> =
            listing.iter().map(|name| (name.to_lowercase(), name)).collect();

        let mut report = ManifestReport::default();
        for entry in catalog.entries() {
            let key = entry.key();
            if key.is_empty() || report.manifest.entries.contains_key(key) {
                continue;
            }

            let authored = Path::new(&entry.audio_ref)
                .file_name()
                .and_then(|name| name.to_str())
                .filter(|name| listing.iter().any(|file| file == name))
                .map(str::to_string);

            let found = authored
                .or_else(|| {
                    candidate_file_names(&entry.word)
                        .into_iter()
                        .find(|candidate| listing.iter().any(|file| file == candidate))
                })
                .or_else(|| {
                    candidate_file_names(&entry.word)
                        .iter()
                        .find_map(|candidate| folded.get(&candidate.to_lowercase()))
                        .map(|name| name.to_string())
                });

            match found {
                Some(file_name) => {
                    debug!("Mapped '{}' to {}", entry.word, file_name);
                    report.manifest.entries.insert(key.to_string(), audio_dir.join(file_name));
                }
                None => report.unmapped.push(entry.word.clone()),
            }
        }

        info!(
            "Audio manifest: {} mapped, {} without audio",
            report.manifest.len(),
            report.unmapped.len()
        );
        report
    }

    pub fn load(path: &Path) -> Result<Self, PointLearnError> {
        load_json(path)
    }

    pub fn save(&self, path: &Path) -> Result<(), PointLearnError> {
        save_json(self, path)
    }

    pub fn insert(&mut self, word: &str, path: impl Into<PathBuf>) {
        let key = word_key(word);
        if !key.is_empty() {
            self.entries.insert(key, path.into());
        }
    }

    pub fn lookup(&self, word: &str) -> Option<&Path> {
        self.entries.get(&word_key(word)).map(PathBuf::as_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries.iter().map(|(key, path)| (key.as_str(), path.as_path()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn list_audio_dir(audio_dir: &Path) -> Vec<String> {
    let read_dir = match fs::read_dir(audio_dir) {
        Ok(read_dir) => read_dir,
        Err(e) => {
            warn!("Cannot list audio directory {}: {}", audio_dir.display(), e);
            return Vec::new();
        }
    };

    read_dir
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|kind| kind.is_file()).unwrap_or(false))
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::test_catalog,
        persistence::test_dir,
    };

    fn audio_dir_with(files: &[&str]) -> PathBuf {
        let dir = test_dir();
        fs::create_dir_all(&dir).unwrap();
        for file in files {
            fs::write(dir.join(file), b"ID3").unwrap();
        }
        dir
    }

    #[test]
    fn test_build_prefers_authored_reference_then_variants() {
        let dir = audio_dir_with(&["oven.MP3", "Kitchen_Island.mp3", "Bench.MP3", "STOOL.MP3"]);
        let report = AudioManifest::build(&test_catalog(), &dir);
        let manifest = &report.manifest;

        assert_eq!(manifest.lookup("Oven"), Some(dir.join("oven.MP3").as_path()));
        assert_eq!(manifest.lookup("kitchen island"), Some(dir.join("Kitchen_Island.mp3").as_path()));
        assert_eq!(manifest.lookup("bench"), Some(dir.join("Bench.MP3").as_path()));
        // Found only by the case-insensitive pass.
        assert_eq!(manifest.lookup("stool"), Some(dir.join("STOOL.MP3").as_path()));
        assert!(manifest.lookup("stove").is_none());
        assert!(report.unmapped.contains(&"stove".to_string()));
        assert!(report.unmapped.contains(&"swing".to_string()));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_missing_directory_gives_empty_manifest() {
        let report = AudioManifest::build(&test_catalog(), Path::new("/definitely/not/here"));
        assert!(report.manifest.is_empty());
        assert_eq!(report.unmapped.len(), test_catalog().entries().count());
    }

    #[test]
    fn test_save_and_load() {
        let dir = test_dir();
        let path = dir.join("manifest.json");
        let mut manifest = AudioManifest::default();
        manifest.insert("Washing machine", "/srv/audio/washing_machine.MP3");
        manifest.save(&path).unwrap();

        let loaded = AudioManifest::load(&path).unwrap();
        assert_eq!(loaded, manifest);
        assert!(loaded.lookup("washing machine").is_some());

        fs::remove_dir_all(dir).unwrap();
    }
}
