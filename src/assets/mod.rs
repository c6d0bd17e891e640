use crate::engine::{load_data_url, LoadError, ParsedAsset};
use base64::Engine as _;
use std::panic::UnwindSafe;
use std::path::Path;

/// A local model file read into memory as a data URL.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetPayload {
    name: String,
    data_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read model at {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl AssetPayload {
    pub fn from_bytes(name: &str, mime: &str, bytes: &[u8]) -> Self {
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        Self {
            name: name.to_string(),
            data_url: format!("data:{};base64,{}", mime, encoded),
        }
    }

    /// Wraps an existing data URL without inspecting it.
    #[cfg(test)]
    pub fn from_data_url(name: &str, data_url: String) -> Self {
        Self {
            name: name.to_string(),
            data_url,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    /// Hands the payload to the loader.
    pub fn parse(&self) -> Result<ParsedAsset, LoadError> {
        load_data_url(self.name(), self.data_url())
    }
}

pub fn mime_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|value| value.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("glb") => "model/gltf-binary",
        Some("gltf") => "model/gltf+json",
        Some("obj") => "model/obj",
        _ => "application/octet-stream",
    }
}

pub fn read_file_as_data_url(path: &Path) -> Result<AssetPayload, AssetError> {
    let bytes = std::fs::read(path).map_err(|source| AssetError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let name = path
        .file_name()
        .and_then(|value| value.to_str())
        .unwrap_or("model")
        .to_string();
    Ok(AssetPayload::from_bytes(&name, mime_for_path(path), &bytes))
}

/// Outcome of reading and decoding a file off the UI thread.
#[derive(Debug)]
pub enum LoadOutcome {
    Parsed(ParsedAsset),
    ReadFailed(AssetError),
    Rejected { name: String, error: LoadError },
    /// The decoder panicked; nothing was produced.
    Panicked { name: String },
}

pub fn parse_payload(payload: &AssetPayload) -> LoadOutcome {
    match payload.parse() {
        Ok(asset) => LoadOutcome::Parsed(asset),
        Err(error) => LoadOutcome::Rejected {
            name: payload.name().to_string(),
            error,
        },
    }
}

pub fn read_and_parse(path: &Path) -> LoadOutcome {
    match read_file_as_data_url(path) {
        Ok(payload) => parse_payload(&payload),
        Err(err) => LoadOutcome::ReadFailed(err),
    }
}

/// Runs `load`, turning a panic into [`LoadOutcome::Panicked`] so a worker
/// thread always has something to report.
pub fn catch_load_panic<F>(name: &str, load: F) -> LoadOutcome
where
    F: FnOnce() -> LoadOutcome + UnwindSafe,
{
    std::panic::catch_unwind(load).unwrap_or_else(|panic| {
        let message = panic
            .downcast_ref::<&str>()
            .map(|message| message.to_string())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_default();
        log::error!("Loader panicked on {}: {}", name, message);
        LoadOutcome::Panicked {
            name: name.to_string(),
        }
    })
}
