//! Access resolution for ownership-scoped resources.
//!
//! # Data Flow
//! ```text
//! handler (Identity, resource id)
//!     → resolver.rs (load resource, classify caller as owner/grantee/stranger)
//!     → AccessPolicy decides
//!     → resource returned to the handler, or NotFound / Forbidden
//! ```
//!
//! # Design Decisions
//! - Read paths answer NotFound for invisible resources so existence is
//!   never leaked; mutations answer Forbidden
//! - Policy switches default to the historical behavior: any grant allows
//!   deletes, and writes into a list only need the parent to exist

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::Resource;
use crate::store::StoreError;

pub mod resolver;

pub use resolver::{AccessResolver, Relation};

/// Explicit switches for the two contested authorization rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AccessPolicy {
    /// Grantees may delete lists, todos and comments like the owner.
    pub grants_allow_delete: bool,

    /// Creating todos and comments requires visibility on the list.
    pub require_list_access_for_writes: bool,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            grants_allow_delete: true,
            require_list_access_for_writes: false,
        }
    }
}

impl AccessPolicy {
    /// Owner-only deletes, and writes limited to visible lists.
    pub fn strict() -> Self {
        Self {
            grants_allow_delete: false,
            require_list_access_for_writes: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("{0} not found")]
    NotFound(Resource),

    #[error("access to {0} denied")]
    Forbidden(Resource),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type AccessResult<T> = Result<T, AccessError>;
