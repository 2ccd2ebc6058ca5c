use std::fmt;

use chrono::Utc;
use rand::Rng;

use super::error::StorageError;

/// URL prefix under which stored blobs are served.
pub const UPLOAD_URL_PREFIX: &str = "/uploads";

const MAX_EXTENSION_LEN: usize = 16;

/// Reference to a stored blob by its generated flat file name.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BlobRef(String);

impl BlobRef {
    /// Wrap an already generated blob name.
    pub fn from_name(name: &str) -> Result<Self, StorageError> {
        validate_flat_filename(name)
            .map(|n| Self(n.to_string()))
            .map_err(|e| StorageError::InvalidReference(format!("{name}: {}", e.message())))
    }

    /// Parse a public reference such as `/uploads/1700000000000-42.png`.
    pub fn parse(reference: &str) -> Result<Self, StorageError> {
        let trimmed = reference.trim_start_matches('/');
        let prefix = UPLOAD_URL_PREFIX.trim_start_matches('/');
        let name = trimmed
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| StorageError::InvalidReference(reference.to_string()))?;
        Self::from_name(name)
    }

    /// File name within the upload directory.
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Public URL for this blob.
    pub fn url(&self) -> String {
        format!("{UPLOAD_URL_PREFIX}/{}", self.0)
    }
}

impl fmt::Debug for BlobRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlobRef({})", self.0)
    }
}

impl fmt::Display for BlobRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Generate a blob name `<unix millis>-<random 0..1e9><ext>` for an uploaded file.
///
/// Only the extension of the original name survives, after whitespace runs
/// have been collapsed to `_`.
pub fn generate_blob_name(original_name: &str) -> String {
    let clean = sanitize_filename(original_name);
    let random: u32 = rand::rng().random_range(0..1_000_000_000);
    let ext = extension_of(&clean)
        .map(|e| format!(".{e}"))
        .unwrap_or_default();
    format!("{}-{}{}", Utc::now().timestamp_millis(), random, ext)
}

/// Replace every run of whitespace with a single `_`.
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_space = false;
    for c in name.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Extension of the last path component, without the dot.
///
/// Dotfiles have no extension. Anything that is not a short alphanumeric
/// token is dropped so it can never smuggle separators into a blob name.
fn extension_of(name: &str) -> Option<&str> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let (stem, ext) = base.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.len() > MAX_EXTENSION_LEN {
        return None;
    }
    ext.chars().all(|c| c.is_ascii_alphanumeric()).then_some(ext)
}

/// Result of validating a flat filename.
#[derive(Debug)]
pub enum FilenameError {
    /// Filename is empty or whitespace-only.
    Empty,
    /// Filename contains path separators (`/` or `\`).
    ContainsPathSeparator,
    /// Filename is `..`.
    PathTraversal,
    /// Filename contains null bytes.
    NullByte,
    /// Filename starts with a dot (hidden file).
    Hidden,
    /// Filename contains control characters.
    ControlCharacter,
}

impl FilenameError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "filename cannot be empty",
            Self::ContainsPathSeparator => "path separators are not allowed",
            Self::PathTraversal => "'..' is not allowed",
            Self::NullByte => "null bytes are not allowed",
            Self::Hidden => "hidden files are not allowed",
            Self::ControlCharacter => "control characters are not allowed",
        }
    }
}

/// Validates a flat filename (no directory components allowed).
pub fn validate_flat_filename(filename: &str) -> Result<&str, FilenameError> {
    if filename.trim().is_empty() {
        return Err(FilenameError::Empty);
    }

    if filename.contains('\0') {
        return Err(FilenameError::NullByte);
    }

    if filename.chars().any(|c| c.is_ascii_control()) {
        return Err(FilenameError::ControlCharacter);
    }

    if filename.contains('/') || filename.contains('\\') {
        return Err(FilenameError::ContainsPathSeparator);
    }

    if filename == ".." {
        return Err(FilenameError::PathTraversal);
    }

    if filename.starts_with('.') {
        return Err(FilenameError::Hidden);
    }

    Ok(filename)
}
