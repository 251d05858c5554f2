use anyhow::{anyhow, Context, Result};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::background::SourceVideo;
use crate::pipeline::JobInput;
use crate::word_timing::{load_alignment, WordTiming};

// @module: File and directory utilities

static SCRIPT_MANIFEST: Lazy<Regex> = Lazy::new(|| Regex::new(r"^scripts_.*\.json$").unwrap());

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// Find files with a specific extension in a directory, sorted by path
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();
        let extension = extension.trim_start_matches('.');

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext.to_string_lossy().eq_ignore_ascii_case(extension) {
                        result.push(path.to_path_buf());
                    }
                }
            }
        }

        result.sort();
        Ok(result)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path).with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content).with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Script manifests (`scripts_*.json`) in a directory, sorted by name
    pub fn find_script_manifests<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let manifests = Self::find_files(dir, "json")?
            .into_iter()
            .filter(|path| {
                path.file_name()
                    .map(|name| SCRIPT_MANIFEST.is_match(&name.to_string_lossy()))
                    .unwrap_or(false)
            })
            .collect();
        Ok(manifests)
    }
}

/// One rewritten story from a script manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptEntry {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub script: String,
    #[serde(default)]
    pub subreddit: Option<String>,
}

impl ScriptEntry {
    /// Subreddit label for the title card, `r/` prefixed
    pub fn subreddit_label(&self) -> String {
        match self.subreddit.as_deref().map(str::trim) {
            Some(name) if name.starts_with("r/") => name.to_string(),
            Some(name) if !name.is_empty() => format!("r/{}", name),
            _ => String::new(),
        }
    }
}

/// Load every entry of a script manifest
pub fn load_script_manifest<P: AsRef<Path>>(path: P) -> Result<Vec<ScriptEntry>> {
    let content = FileManager::read_to_string(&path)?;
    serde_json::from_str(&content).with_context(|| format!("Invalid script manifest: {:?}", path.as_ref()))
}

/// The pipeline's data directory
///
/// ```text
/// data/
///   processed/scripts/scripts_*.json
///   audio/<id>.mp3, audio/<id>.json
///   videos/*.mp4
///   final/<id>.render.json
/// ```
#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    /// Layout rooted at `root`
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.root.join("processed").join("scripts")
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.root.join("audio")
    }

    pub fn videos_dir(&self) -> PathBuf {
        self.root.join("videos")
    }

    pub fn final_dir(&self) -> PathBuf {
        self.root.join("final")
    }

    pub fn audio_for(&self, id: &str) -> PathBuf {
        self.audio_dir().join(format!("{}.mp3", id))
    }

    pub fn alignment_for(&self, id: &str) -> PathBuf {
        self.audio_dir().join(format!("{}.json", id))
    }

    /// Background clips, sorted by name
    pub fn background_videos(&self) -> Result<Vec<PathBuf>> {
        if !FileManager::dir_exists(self.videos_dir()) {
            return Ok(Vec::new());
        }
        FileManager::find_files(self.videos_dir(), "mp4")
    }

    /// Script entries that have both audio and an alignment file
    pub fn discover_scripts(&self) -> Result<Vec<ScriptEntry>> {
        let scripts_dir = self.scripts_dir();
        if !FileManager::dir_exists(&scripts_dir) {
            return Err(anyhow!("Scripts directory not found: {:?}", scripts_dir));
        }

        let mut entries = Vec::new();
        for manifest in FileManager::find_script_manifests(&scripts_dir)? {
            for entry in load_script_manifest(&manifest)? {
                if !FileManager::file_exists(self.audio_for(&entry.id)) {
                    warn!("Skipping {}: no audio", entry.id);
                    continue;
                }
                if !FileManager::file_exists(self.alignment_for(&entry.id)) {
                    warn!("Skipping {}: no word timings", entry.id);
                    continue;
                }
                entries.push(entry);
            }
        }

        Ok(entries)
    }
}

/// A self-contained job description
#[derive(Debug, Clone, Deserialize)]
pub struct JobFile {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subreddit: String,
    /// Voice-over audio reference
    pub audio: String,
    /// Voice-over duration, probed when absent
    #[serde(default)]
    pub duration: Option<f64>,
    /// Inline word timings
    #[serde(default)]
    pub words: Option<Vec<WordTiming>>,
    /// Alignment file, relative to the job file
    #[serde(default)]
    pub words_path: Option<String>,
    /// Background descriptors
    #[serde(default)]
    pub backgrounds: Vec<SourceVideo>,
}

impl JobFile {
    /// Load a job file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = FileManager::read_to_string(&path)?;
        serde_json::from_str(&content).with_context(|| format!("Invalid job file: {:?}", path.as_ref()))
    }

    /// Resolve into pipeline input; `base_dir` anchors relative `words_path`
    pub fn into_input<P: AsRef<Path>>(self, base_dir: P) -> Result<JobInput> {
        let words = match (self.words, &self.words_path) {
            (Some(words), _) => words,
            (None, Some(words_path)) => load_alignment(base_dir.as_ref().join(words_path))?,
            (None, None) => return Err(anyhow!("Job {} has neither words nor words_path", self.id)),
        };

        Ok(JobInput {
            id: self.id,
            title: self.title,
            subreddit: self.subreddit,
            audio_path: self.audio,
            audio_duration: self.duration,
            words,
            backgrounds: self.backgrounds,
        })
    }
}
