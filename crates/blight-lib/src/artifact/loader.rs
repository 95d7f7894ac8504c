//! Ordered model loading with per-candidate fallback
//!
//! Each candidate is tried in turn; a failure is logged and the next one is
//! attempted. Running out of candidates yields `None`, which each pipeline
//! interprets on its own terms.

use super::locator::{ArtifactCandidate, ArtifactFormat};
use super::{ArtifactDecoder, ModelArtifact};
use anyhow::{Context, Result};
use base64::Engine as _;
use std::fs;
use tracing::{debug, info};

/// A model together with the candidate that produced it
pub struct LoadedArtifact {
    pub model: Box<dyn ModelArtifact>,
    pub candidate: ArtifactCandidate,
}

/// Loads the first decodable candidate
pub struct ModelLoader<D> {
    decoder: D,
}

impl<D: ArtifactDecoder> ModelLoader<D> {
    pub fn new(decoder: D) -> Self {
        Self { decoder }
    }

    /// Try every candidate in priority order
    pub fn load(&self, candidates: &[ArtifactCandidate]) -> Option<LoadedArtifact> {
        for candidate in candidates {
            match self.try_candidate(candidate) {
                Ok(model) => {
                    info!(
                        path = %candidate.path.display(),
                        format = candidate.format.tag(),
                        "Model artifact loaded"
                    );
                    return Some(LoadedArtifact {
                        model,
                        candidate: candidate.clone(),
                    });
                }
                Err(e) => {
                    debug!(
                        path = %candidate.path.display(),
                        format = candidate.format.tag(),
                        error = %format!("{:#}", e),
                        "Artifact candidate rejected, trying next"
                    );
                }
            }
        }
        None
    }

    fn try_candidate(&self, candidate: &ArtifactCandidate) -> Result<Box<dyn ModelArtifact>> {
        let raw = fs::read(&candidate.path)
            .with_context(|| format!("Failed to read {}", candidate.path.display()))?;

        let bytes = match &candidate.format {
            ArtifactFormat::Direct => raw,
            ArtifactFormat::EmbeddedBlob { field } => extract_blob(&raw, field)?,
        };

        self.decoder.decode(&bytes)
    }
}

/// Pull the base64 payload stored under `field` out of a JSON container
fn extract_blob(container: &[u8], field: &str) -> Result<Vec<u8>> {
    let doc: serde_json::Value =
        serde_json::from_slice(container).context("Container is not valid JSON")?;
    let encoded = doc
        .get(field)
        .and_then(|v| v.as_str())
        .with_context(|| format!("Container has no string field {:?}", field))?;
    base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .context("Embedded model is not valid base64")
}
