// ============================================================
// Layer 6 - Kaggle Dataset Source
// ============================================================
// Downloads a Kaggle dataset archive over the public REST API
// and unpacks it into a local cache directory:
//
//   GET {api}/datasets/download/{owner}/{slug}   (zip)
//     → {cache}/datasets/{owner}/{slug}/*.csv
//
//   cache = --cache-dir | $KAGGLEHUB_CACHE | ~/.cache/kagglehub
//
// Credentials are read from KAGGLE_USERNAME / KAGGLE_KEY, then
// ~/.kaggle/kaggle.json. Without any, the request is sent
// anonymously, which works for public datasets.
//
// A cache folder that already holds the required CSV files is
// returned as-is unless a forced download was requested.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{
    env, fs,
    io::{self, Cursor},
    path::{Path, PathBuf},
    time::Duration,
};

use crate::data::loader::{TRAINING_FILE, VALIDATION_FILE};
use crate::domain::traits::DatasetSource;

/// Twitter Entity Sentiment Analysis on Kaggle
pub const DATASET_ID: &str = "jp797498e/twitter-entity-sentiment-analysis";

/// Files a usable dataset folder must contain
pub const REQUIRED_FILES: [&str; 2] = [TRAINING_FILE, VALIDATION_FILE];

const KAGGLE_API_BASE: &str = "https://www.kaggle.com/api/v1";

/// Names of the required files missing from `path` (empty means valid).
pub fn verify_dataset_folder(path: &Path) -> Vec<String> {
    REQUIRED_FILES
        .iter()
        .filter(|f| !path.join(f).is_file())
        .map(|f| f.to_string())
        .collect()
}

#[derive(Debug, Clone, Deserialize)]
pub struct KaggleCredentials {
    pub username: String,
    pub key:      String,
}

impl KaggleCredentials {
    /// Environment first, then ~/.kaggle/kaggle.json.
    pub fn discover() -> Option<Self> {
        if let (Ok(username), Ok(key)) = (env::var("KAGGLE_USERNAME"), env::var("KAGGLE_KEY")) {
            return Some(Self { username, key });
        }

        let path = home_dir()?.join(".kaggle").join("kaggle.json");
        let raw = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(creds) => Some(creds),
            Err(e) => {
                tracing::warn!("Ignoring malformed '{}': {}", path.display(), e);
                None
            }
        }
    }
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

/// Default cache root, mirroring the kagglehub layout.
pub fn default_cache_root() -> PathBuf {
    if let Some(dir) = env::var_os("KAGGLEHUB_CACHE") {
        return PathBuf::from(dir);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cache")
        .join("kagglehub")
}

pub struct KaggleDataset {
    owner:          String,
    slug:           String,
    cache_root:     PathBuf,
    force_download: bool,
    api_base:       String,
}

impl KaggleDataset {
    /// `dataset_id` has the form `owner/slug`.
    pub fn new(dataset_id: &str) -> Result<Self> {
        let (owner, slug) = match dataset_id.split_once('/') {
            Some((o, s)) if !o.is_empty() && !s.is_empty() && !s.contains('/') => (o, s),
            _ => bail!("invalid dataset id '{dataset_id}', expected 'owner/slug'"),
        };
        Ok(Self {
            owner:          owner.to_string(),
            slug:           slug.to_string(),
            cache_root:     default_cache_root(),
            force_download: false,
            api_base:       KAGGLE_API_BASE.to_string(),
        })
    }

    pub fn with_cache_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.cache_root = root.into();
        self
    }

    pub fn with_force_download(mut self, force: bool) -> Self {
        self.force_download = force;
        self
    }

    /// Folder the CSV files end up in
    pub fn target_dir(&self) -> PathBuf {
        self.cache_root
            .join("datasets")
            .join(&self.owner)
            .join(&self.slug)
    }

    fn download_url(&self) -> String {
        format!("{}/datasets/download/{}/{}", self.api_base, self.owner, self.slug)
    }

    fn download(&self) -> Result<Vec<u8>> {
        let url = self.download_url();
        tracing::info!("Downloading {}", url);

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(600))
            .build()
            .context("Cannot build HTTP client")?;

        let mut request = client.get(&url);
        match KaggleCredentials::discover() {
            Some(creds) => {
                tracing::debug!("Using Kaggle credentials for user '{}'", creds.username);
                request = request.basic_auth(creds.username, Some(creds.key));
            }
            None => tracing::info!("No Kaggle credentials found, trying anonymous download"),
        }

        let response = request
            .send()
            .with_context(|| format!("Request to '{url}' failed"))?;
        let status = response.status();
        if !status.is_success() {
            bail!("Kaggle returned {status} for '{url}'");
        }

        let bytes = response
            .bytes()
            .with_context(|| format!("Cannot read response body from '{url}'"))?;
        tracing::info!("Downloaded {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}

impl DatasetSource for KaggleDataset {
    fn fetch(&self) -> Result<PathBuf> {
        let target = self.target_dir();

        if !self.force_download && target.is_dir() && verify_dataset_folder(&target).is_empty() {
            tracing::info!("Using cached dataset at '{}'", target.display());
            return Ok(target);
        }

        let archive = self.download()?;
        if target.exists() {
            fs::remove_dir_all(&target)
                .with_context(|| format!("Cannot clear '{}'", target.display()))?;
        }
        extract_zip(&archive, &target)?;
        Ok(target)
    }

    fn describe(&self) -> String {
        format!("kaggle:{}/{}", self.owner, self.slug)
    }
}

/// Unpack a zip archive held in memory into `dest`.
pub fn extract_zip(bytes: &[u8], dest: &Path) -> Result<()> {
    fs::create_dir_all(dest)
        .with_context(|| format!("Cannot create '{}'", dest.display()))?;

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .context("Downloaded file is not a valid zip archive")?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        // enclosed_name rejects absolute paths and `..` components
        let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
            tracing::warn!("Skipping unsafe archive entry '{}'", entry.name());
            continue;
        };
        let out_path = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        // Streamed; the declared entry size is never trusted for allocation
        let mut file = fs::File::create(&out_path)
            .with_context(|| format!("Cannot write '{}'", out_path.display()))?;
        io::copy(&mut entry, &mut file)
            .with_context(|| format!("Cannot extract '{}'", out_path.display()))?;
    }

    tracing::info!("Extracted {} entries into '{}'", archive.len(), dest.display());
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("entity-sentiment-kaggle-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn zip_with(files: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in files {
            writer.start_file(*name, zip::write::FileOptions::default()).unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_verify_lists_missing_files() {
        let dir = temp_dir("verify");
        assert_eq!(verify_dataset_folder(&dir), vec![TRAINING_FILE, VALIDATION_FILE]);

        fs::write(dir.join(TRAINING_FILE), "").unwrap();
        assert_eq!(verify_dataset_folder(&dir), vec![VALIDATION_FILE]);

        fs::write(dir.join(VALIDATION_FILE), "").unwrap();
        assert!(verify_dataset_folder(&dir).is_empty());
    }

    #[test]
    fn test_dataset_id_parsing() {
        let ds = KaggleDataset::new(DATASET_ID).unwrap().with_cache_root("/cache");
        assert_eq!(
            ds.target_dir(),
            PathBuf::from("/cache/datasets/jp797498e/twitter-entity-sentiment-analysis")
        );
        assert!(ds.download_url().ends_with("/datasets/download/jp797498e/twitter-entity-sentiment-analysis"));
        assert!(KaggleDataset::new("no-slash").is_err());
        assert!(KaggleDataset::new("a/b/c").is_err());
    }

    #[test]
    fn test_cached_folder_is_reused() {
        let root = temp_dir("cache");
        let ds = KaggleDataset::new("owner/slug").unwrap().with_cache_root(&root);
        let target = ds.target_dir();
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join(TRAINING_FILE), "1,A,Positive,x\n").unwrap();
        fs::write(target.join(VALIDATION_FILE), "2,A,Negative,y\n").unwrap();

        // No network involved: the cache already satisfies the check
        assert_eq!(ds.fetch().unwrap(), target);
    }

    #[test]
    fn test_extract_zip() {
        let dir = temp_dir("extract");
        let archive = zip_with(&[
            (TRAINING_FILE, "1,A,Positive,x\n"),
            ("nested/readme.txt", "hi"),
        ]);
        extract_zip(&archive, &dir).unwrap();

        assert_eq!(fs::read_to_string(dir.join(TRAINING_FILE)).unwrap(), "1,A,Positive,x\n");
        assert_eq!(fs::read_to_string(dir.join("nested/readme.txt")).unwrap(), "hi");
    }

    #[test]
    fn test_extract_streams_large_entry_over_stale_file() {
        let dir = temp_dir("stream");
        fs::write(dir.join(VALIDATION_FILE), "stale content that is longer than nothing").unwrap();
        let big = "2,B,Negative,y\n".repeat(50_000);
        let archive = zip_with(&[(VALIDATION_FILE, big.as_str())]);
        extract_zip(&archive, &dir).unwrap();

        assert_eq!(fs::read_to_string(dir.join(VALIDATION_FILE)).unwrap(), big);
    }

    #[test]
    fn test_extract_rejects_garbage() {
        let dir = temp_dir("garbage");
        assert!(extract_zip(b"definitely not a zip", &dir).is_err());
    }
}
