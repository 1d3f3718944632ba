//! Capability tokens bound to routes.

pub const TODOLIST_CREATE: &str = "todolist:create";
pub const TODOLIST_READ: &str = "todolist:read";
pub const TODOLIST_DELETE: &str = "todolist:delete";
pub const TODOLIST_COMMENT: &str = "todolist:comment";
pub const TODOLIST_SHARE: &str = "todolist:share";
pub const TODO_UPDATE: &str = "todo:update";
pub const TODO_DELETE: &str = "todo:delete";
pub const COMMENT_DELETE: &str = "comment:delete";

/// Every capability checked by the API.
pub const ALL: &[&str] = &[
    TODOLIST_CREATE,
    TODOLIST_READ,
    TODOLIST_DELETE,
    TODOLIST_COMMENT,
    TODOLIST_SHARE,
    TODO_UPDATE,
    TODO_DELETE,
    COMMENT_DELETE,
];
