//! YAML tree definitions
//!
//! A definition file holds a single root node. Every node is a mapping
//! tagged by `type`:
//!
//! ```yaml
//! type: suite
//! name: deploy
//! meta:
//!   requires: [host]
//! children:
//!   - type: retry
//!     tries: 5
//!     delay: 2s
//!     child:
//!       type: sh
//!       name: health
//!       cmd: curl -sf {{host}}/health
//! ```

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub mod node;

pub use node::{CaptureDef, KvDef, NodeDef};

use crate::component::Node;
use crate::error::{ErrorCode, TrellisError};

#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0}")]
    Invalid(String),
}

impl DefinitionError {
    pub fn code(&self) -> u16 {
        match self {
            Self::Io { .. } => ErrorCode::DEFINITION_NOT_FOUND,
            Self::Yaml(_) => ErrorCode::DEFINITION_INVALID_YAML,
            Self::Invalid(_) => ErrorCode::DEFINITION_INVALID_NODE,
        }
    }
}

impl From<DefinitionError> for TrellisError {
    fn from(err: DefinitionError) -> Self {
        let path = match &err {
            DefinitionError::Io { path, .. } => Some(path.clone()),
            _ => None,
        };
        TrellisError::definition_with_code(err.code(), err.to_string(), path).with_source(err)
    }
}

pub fn parse(text: &str) -> Result<NodeDef, DefinitionError> {
    Ok(serde_yaml::from_str(text)?)
}

/// Read, parse and build the tree stored at `path`
pub fn load(path: &Path) -> Result<Node, DefinitionError> {
    debug!("Loading tree definition from {}", path.display());
    let text = std::fs::read_to_string(path).map_err(|source| DefinitionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text)?.build()
}
