//! Scene import
//!
//! Importers turn an external scene description into engine [`Scene`]s
//! built through the regular node factory.

use thiserror::Error;

use crate::render::backend::SharedContext;
use crate::render::RenderError;
use crate::scene::{Scene, SceneError};

/// Asset import errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// Source description is malformed or unsupported
    #[error("Import failed: {0}")]
    Import(String),

    /// Building the scene graph failed
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Creating GPU resources failed
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

/// Produces scenes bound to a drawing context
pub trait SceneImporter {
    /// Build every scene described by this importer's source
    ///
    /// # Errors
    /// Fails if the source cannot be read or a scene cannot be assembled.
    fn import(&mut self, context: &SharedContext) -> Result<Vec<Scene>, AssetError>;
}
