//! Known glyph fingerprints per letter
//!
//! The corpus lives on disk as one JSON file per letter (`A.json` ..
//! `Z.json`), each an array of base64 fingerprints. It is loaded once and
//! only read afterwards, so a single `Arc<Corpus>` serves every decode.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CaptchaError;
use crate::fingerprint::Fingerprint;

/// Letters the captchas are drawn from, in lookup priority order
pub fn alphabet() -> impl Iterator<Item = char> {
    'A'..='Z'
}

/// Read-only letter → fingerprint mapping
#[derive(Debug, Default)]
pub struct Corpus {
    letters: BTreeMap<char, HashSet<Fingerprint>>,
    /// Flattened lookup; a fingerprint known under several letters maps to
    /// the alphabetically first one.
    index: HashMap<Fingerprint, char>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every letter file under `dir`.
    ///
    /// A missing or malformed letter file only means that letter has no
    /// known fingerprints; the directory itself must exist.
    pub fn load(dir: &Path) -> Result<Self, CaptchaError> {
        if !dir.is_dir() {
            return Err(CaptchaError::Corpus(format!(
                "{} is not a directory",
                dir.display()
            )));
        }

        let mut corpus = Self::new();
        for letter in alphabet() {
            for fingerprint in load_letter(&letter_path(dir, letter)) {
                corpus.add(letter, fingerprint);
            }
        }

        tracing::info!(
            "Loaded {} fingerprints for {} letters from {:?}",
            corpus.len(),
            corpus.letters.len(),
            dir
        );

        Ok(corpus)
    }

    /// Record a known fingerprint for `letter`
    pub fn insert(&mut self, letter: char, fingerprint: Fingerprint) -> Result<bool, CaptchaError> {
        if !letter.is_ascii_uppercase() {
            return Err(CaptchaError::InvalidConfig(format!(
                "Corpus letters must be A-Z, got {:?}",
                letter
            )));
        }
        Ok(self.add(letter, fingerprint))
    }

    fn add(&mut self, letter: char, fingerprint: Fingerprint) -> bool {
        self.index
            .entry(fingerprint.clone())
            .and_modify(|known| *known = (*known).min(letter))
            .or_insert(letter);
        self.letters.entry(letter).or_default().insert(fingerprint)
    }

    /// First letter, in alphabetical order, that knows this fingerprint
    pub fn lookup(&self, fingerprint: &Fingerprint) -> Option<char> {
        self.index.get(fingerprint).copied()
    }

    /// Known fingerprints for one letter
    pub fn fingerprints(&self, letter: char) -> impl Iterator<Item = &Fingerprint> {
        self.letters.get(&letter).into_iter().flatten()
    }

    /// Fingerprint count per letter, every letter included
    pub fn letter_counts(&self) -> BTreeMap<char, usize> {
        alphabet()
            .map(|letter| (letter, self.letters.get(&letter).map_or(0, HashSet::len)))
            .collect()
    }

    /// Total number of (letter, fingerprint) entries
    pub fn len(&self) -> usize {
        self.letters.values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    /// Write one letter's fingerprints in the on-disk format
    pub fn save_letter(&self, dir: &Path, letter: char) -> Result<(), CaptchaError> {
        let mut encoded: Vec<String> = self.fingerprints(letter).map(Fingerprint::to_base64).collect();
        encoded.sort();

        let json = serde_json::to_string_pretty(&encoded)
            .map_err(|e| CaptchaError::Internal(format!("Failed to encode corpus: {}", e)))?;
        fs::write(letter_path(dir, letter), json).map_err(|e| {
            CaptchaError::Corpus(format!("Failed to write corpus file for {}: {}", letter, e))
        })
    }
}

pub fn letter_path(dir: &Path, letter: char) -> PathBuf {
    dir.join(format!("{}.json", letter))
}

/// Fingerprints in one letter file, or none if it is missing or malformed
fn load_letter(path: &Path) -> HashSet<Fingerprint> {
    match read_letter(path) {
        Ok(fingerprints) => fingerprints,
        Err(LetterFileError::Missing) => {
            tracing::debug!("No corpus file at {:?}", path);
            HashSet::new()
        }
        Err(LetterFileError::Malformed(reason)) => {
            tracing::warn!("Ignoring malformed corpus file {:?}: {}", path, reason);
            HashSet::new()
        }
    }
}

enum LetterFileError {
    Missing,
    Malformed(String),
}

fn read_letter(path: &Path) -> Result<HashSet<Fingerprint>, LetterFileError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(LetterFileError::Missing),
        Err(e) => return Err(LetterFileError::Malformed(e.to_string())),
    };

    let entries: Vec<String> =
        serde_json::from_str(&text).map_err(|e| LetterFileError::Malformed(e.to_string()))?;

    entries
        .iter()
        .map(|entry| {
            Fingerprint::from_base64(entry).map_err(|e| LetterFileError::Malformed(e.to_string()))
        })
        .collect()
}
