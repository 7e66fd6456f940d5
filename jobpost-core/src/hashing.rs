//! Hashing System - SHA-256 for Manifests and Renders
//!
//! Provides deterministic, reproducible hashes so identical requests can be
//! recognized and identical renders compared byte-for-byte.
//!
//! All digests are lowercase hex SHA-256.
//!
//! - `image_digest`: width and height as big-endian `u32`, then the raw
//!   row-major RGB bytes of the canvas. PNG encoder settings do not affect it.
//! - `compute_job_hash`: `"{template_id}:{template_version}:{request}:{engine_version}"`
//!   where `request` is the canonical JSON of the `RenderRequest` (company,
//!   title, details, template id). Identical requests against the same
//!   template and engine hash the same; `id` and `created_at` are not inputs.
//! - `compute_manifest_hash`: canonical JSON of the manifest with an empty
//!   `manifest_hash` field.

use image::RgbImage;
use sha2::{Sha256, Digest};
use serde::Serialize;
use serde_json::{Value, to_string};

/// Compute SHA-256 hash of bytes, return hex string
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Digest of raw pixels plus dimensions; independent of PNG encoder settings.
pub fn image_digest(image: &RgbImage) -> String {
    let mut hasher = Sha256::new();
    hasher.update(image.width().to_be_bytes());
    hasher.update(image.height().to_be_bytes());
    hasher.update(image.as_raw());
    hex::encode(hasher.finalize())
}

/// Canonical JSON of `value`: object keys sorted at every depth, no whitespace.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    to_string(&sorted(serde_json::to_value(value)?))
}

fn sorted(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().map(|(k, v)| (k, sorted(v))).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sorted).collect()),
        other => other,
    }
}

/// Compute manifest hash for a rendered post
pub fn compute_manifest_hash<T: Serialize>(manifest: &T) -> Result<String, serde_json::Error> {
    let canonical = canonical_json(manifest)?;
    Ok(sha256_hex(canonical.as_bytes()))
}

/// Identity of a render request; see the module docs for the exact input string.
pub fn compute_job_hash(
    template_id: &str,
    template_version: &str,
    payload: &impl Serialize,
    engine_version: &str,
) -> Result<String, serde_json::Error> {
    let request = canonical_json(payload)?;
    let input = format!("{template_id}:{template_version}:{request}:{engine_version}");
    Ok(sha256_hex(input.as_bytes()))
}
