//! Route handlers.
//!
//! Each handler validates the request shape, asks the access resolver for
//! the target resource, performs one store operation and maps the outcome.
//! The caller's identity arrives as `Extension<Identity>`, inserted by the
//! privilege gate route layer.

pub mod comments;
pub mod grants;
pub mod todolists;
pub mod todos;

/// Field length limits, in characters.
mod limits {
    pub const LIST_TITLE_MAX: usize = 100;
    pub const TODO_TITLE_MAX: usize = 200;
    pub const TODO_DESCRIPTION_MAX: usize = 1000;
    pub const COMMENT_TEXT_MAX: usize = 500;
    pub const USER_ID_MAX: usize = 200;
}
