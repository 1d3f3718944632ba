//! Privilege gate subsystem.
//!
//! # Data Flow
//! ```text
//! request headers (set by the trusted upstream authenticator)
//!     → identity.rs (x-user-id, x-user-role, x-user-privilege → Identity)
//!     → gate.rs (route capability ∈ Identity.privileges?)
//!     → Identity inserted into request extensions
//!     → handler receives Extension<Identity>
//! ```
//!
//! # Design Decisions
//! - Headers are trusted verbatim; signature checks belong upstream
//! - Missing or malformed metadata is 400, missing capability is 403
//! - The gate is a route layer, so it runs before body extraction

pub mod capability;
pub mod gate;
pub mod identity;

pub use gate::{privilege_gate, PrivilegeGate};
pub use identity::{identity_from_headers, parse_privileges, Identity};
