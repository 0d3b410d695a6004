// ============================================================
// Layer 6 - .env File Editor
// ============================================================
// Creates or updates a single `NAME="value"` entry in a dotenv
// file, leaving every other line untouched. Used by
// `fetch-dataset --set-env` to record DATA_FOLDER.

use std::{fs, io, path::PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum EnvFileError {
    #[error("{name} already exists in {}. Use --overwrite to replace it.", path.display())]
    EntryExists { name: String, path: PathBuf },

    #[error("cannot access '{}'", path.display())]
    Io {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },
}

pub struct EnvFile {
    path: PathBuf,
}

impl EnvFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Set `name` to `value`. An existing entry is only replaced when
    /// `overwrite` is true. The file is created if it does not exist.
    pub fn set(&self, name: &str, value: &str, overwrite: bool) -> Result<(), EnvFileError> {
        let mut lines: Vec<String> = match fs::read_to_string(&self.path) {
            Ok(content) => content.lines().map(str::to_string).collect(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err(EnvFileError::Io { path: self.path.clone(), source }),
        };

        let prefix = format!("{name}=");
        let new_line = format!("{name}=\"{value}\"");

        match lines.iter().position(|l| l.starts_with(&prefix)) {
            Some(_) if !overwrite => {
                return Err(EnvFileError::EntryExists {
                    name: name.to_string(),
                    path: self.path.clone(),
                });
            }
            Some(i) => lines[i] = new_line,
            None => lines.push(new_line),
        }

        let mut content = lines.join("\n");
        if !lines.is_empty() {
            content.push('\n');
        }
        fs::write(&self.path, content)
            .map_err(|source| EnvFileError::Io { path: self.path.clone(), source })?;

        tracing::debug!("Set {} in '{}'", name, self.path.display());
        Ok(())
    }
}
