//! JSON capture documents: one pipeline snapshot plus the frame's resource catalog.
//!
//! ```json
//! {
//!   "snapshot": { "pixel": { "shader": 12, "resource_views": [{ "resource": 3 }] } },
//!   "catalog": { "textures": [{ "id": 3, "name": "albedo", "kind": "Texture2D" }] }
//! }
//! ```

use std::io::Read;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{CatalogConflict, ResourceCatalog};
use crate::model::{PipelineSnapshot, ResourceId};
use crate::resolve::{resolve_pipeline, ResolvedPipeline};
use crate::visibility::VisibilityPolicy;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid capture JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("resource {id} appears in both the texture and buffer tables")]
    AmbiguousResource { id: ResourceId },
    #[error("resource {id} appears more than once in the {table} table")]
    DuplicateResource { id: ResourceId, table: &'static str },
}

impl From<CatalogConflict> for CaptureError {
    fn from(conflict: CatalogConflict) -> Self {
        match conflict {
            CatalogConflict::Ambiguous(id) => CaptureError::AmbiguousResource { id },
            CatalogConflict::Duplicate { id, table } => {
                CaptureError::DuplicateResource { id, table }
            }
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineCapture {
    pub snapshot: PipelineSnapshot,
    pub catalog: ResourceCatalog,
}

impl PipelineCapture {
    pub fn from_json_str(json: &str) -> Result<Self, CaptureError> {
        let capture: PipelineCapture = serde_json::from_str(json)?;
        capture.validate()?;
        Ok(capture)
    }

    /// Reads the whole document before parsing, so read failures surface as
    /// [`CaptureError::Io`] rather than JSON errors.
    pub fn from_reader(mut reader: impl Read) -> Result<Self, CaptureError> {
        let mut json = String::new();
        reader.read_to_string(&mut json)?;
        Self::from_json_str(&json)
    }

    /// Rejects catalogs where an id could resolve to more than one entry.
    pub fn validate(&self) -> Result<(), CaptureError> {
        match self.catalog.first_conflict() {
            Some(conflict) => Err(conflict.into()),
            None => {
                debug!(
                    textures = self.catalog.textures.len(),
                    buffers = self.catalog.buffers.len(),
                    "capture catalog validated"
                );
                Ok(())
            }
        }
    }

    pub fn resolve(&self, policy: VisibilityPolicy) -> ResolvedPipeline {
        resolve_pipeline(&self.snapshot, &self.catalog, policy)
    }
}
