//! Ownership and grant checks for lists, todos and comments.

use std::sync::Arc;
use uuid::Uuid;

use crate::access::{AccessError, AccessPolicy, AccessResult};
use crate::auth::Identity;
use crate::error::Resource;
use crate::model::{Comment, Todo, TodoList};
use crate::store::{StoreResult, TodoStore};

/// How the caller relates to a todo list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Owner,
    Grantee,
    Stranger,
}

impl Relation {
    pub fn can_view(self) -> bool {
        matches!(self, Relation::Owner | Relation::Grantee)
    }

    pub fn can_delete(self, policy: &AccessPolicy) -> bool {
        match self {
            Relation::Owner => true,
            Relation::Grantee => policy.grants_allow_delete,
            Relation::Stranger => false,
        }
    }
}

/// Decides whether a caller may act on a specific resource.
#[derive(Clone)]
pub struct AccessResolver {
    store: Arc<dyn TodoStore>,
    policy: AccessPolicy,
}

impl AccessResolver {
    pub fn new(store: Arc<dyn TodoStore>, policy: AccessPolicy) -> Self {
        Self { store, policy }
    }

    pub async fn relation(&self, who: &Identity, list: &TodoList) -> StoreResult<Relation> {
        if list.owner_id == who.user_id {
            return Ok(Relation::Owner);
        }
        if self.store.has_grant(list.id, &who.user_id).await? {
            return Ok(Relation::Grantee);
        }
        Ok(Relation::Stranger)
    }

    async fn load_list(&self, list_id: Uuid) -> AccessResult<TodoList> {
        self.store
            .find_list(list_id)
            .await?
            .ok_or(AccessError::NotFound(Resource::TodoList))
    }

    async fn load_todo(&self, todo_id: Uuid) -> AccessResult<Todo> {
        self.store
            .find_todo(todo_id)
            .await?
            .ok_or(AccessError::NotFound(Resource::Todo))
    }

    /// Lists owned by or shared with the caller.
    pub async fn visible_lists(&self, who: &Identity) -> AccessResult<Vec<TodoList>> {
        Ok(self.store.lists_visible_to(&who.user_id).await?)
    }

    /// A list the caller may read. Invisible lists are reported as absent.
    pub async fn readable_list(&self, who: &Identity, list_id: Uuid) -> AccessResult<TodoList> {
        let list = self.load_list(list_id).await?;
        if !self.relation(who, &list).await?.can_view() {
            return Err(AccessError::NotFound(Resource::TodoList));
        }
        Ok(list)
    }

    pub async fn deletable_list(&self, who: &Identity, list_id: Uuid) -> AccessResult<TodoList> {
        let list = self.load_list(list_id).await?;
        if !self.relation(who, &list).await?.can_delete(&self.policy) {
            return Err(AccessError::Forbidden(Resource::TodoList));
        }
        Ok(list)
    }

    /// A list whose grants the caller may manage. Only the owner qualifies.
    pub async fn shareable_list(&self, who: &Identity, list_id: Uuid) -> AccessResult<TodoList> {
        let list = self.load_list(list_id).await?;
        match self.relation(who, &list).await? {
            Relation::Owner => Ok(list),
            Relation::Grantee => Err(AccessError::Forbidden(Resource::TodoList)),
            Relation::Stranger => Err(AccessError::NotFound(Resource::TodoList)),
        }
    }

    /// A list the caller may add todos to.
    pub async fn writable_list(&self, who: &Identity, list_id: Uuid) -> AccessResult<TodoList> {
        if self.policy.require_list_access_for_writes {
            return self.readable_list(who, list_id).await;
        }
        self.load_list(list_id).await
    }

    pub async fn readable_todo(&self, who: &Identity, todo_id: Uuid) -> AccessResult<Todo> {
        let todo = self.load_todo(todo_id).await?;
        let visible = match self.store.find_list(todo.todo_list_id).await? {
            Some(list) => self.relation(who, &list).await?.can_view(),
            None => false,
        };
        if !visible {
            return Err(AccessError::NotFound(Resource::Todo));
        }
        Ok(todo)
    }

    pub async fn updatable_todo(&self, who: &Identity, todo_id: Uuid) -> AccessResult<Todo> {
        self.readable_todo(who, todo_id).await
    }

    pub async fn deletable_todo(&self, who: &Identity, todo_id: Uuid) -> AccessResult<Todo> {
        let todo = self.load_todo(todo_id).await?;
        let allowed = match self.store.find_list(todo.todo_list_id).await? {
            Some(list) => self.relation(who, &list).await?.can_delete(&self.policy),
            None => false,
        };
        if !allowed {
            return Err(AccessError::Forbidden(Resource::Todo));
        }
        Ok(todo)
    }

    /// A todo the caller may comment on.
    pub async fn commentable_todo(&self, who: &Identity, todo_id: Uuid) -> AccessResult<Todo> {
        if self.policy.require_list_access_for_writes {
            return self.readable_todo(who, todo_id).await;
        }
        self.load_todo(todo_id).await
    }

    /// Authors may always delete their comments; otherwise the decision
    /// follows the caller's relation to the grandparent list.
    pub async fn deletable_comment(&self, who: &Identity, comment_id: Uuid) -> AccessResult<Comment> {
        let comment = self
            .store
            .find_comment(comment_id)
            .await?
            .ok_or(AccessError::NotFound(Resource::Comment))?;
        if comment.author_id == who.user_id {
            return Ok(comment);
        }

        let Some(todo) = self.store.find_todo(comment.todo_id).await? else {
            return Err(AccessError::Forbidden(Resource::Comment));
        };
        let allowed = match self.store.find_list(todo.todo_list_id).await? {
            Some(list) => self.relation(who, &list).await?.can_delete(&self.policy),
            None => false,
        };
        if !allowed {
            return Err(AccessError::Forbidden(Resource::Comment));
        }
        Ok(comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use std::collections::BTreeSet;

    fn user(id: &str) -> Identity {
        Identity {
            user_id: id.to_string(),
            role: None,
            privileges: BTreeSet::new(),
        }
    }

    struct Fixture {
        store: Arc<SqliteStore>,
        list: TodoList,
        todo: Todo,
        comment: Comment,
    }

    /// alice owns the list, bob holds a grant, carol wrote the comment.
    async fn fixture() -> Fixture {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let list = store.create_list("alice", "Shared").await.unwrap();
        store.grant_access(list.id, "bob").await.unwrap();
        let todo = store.create_todo(list.id, "Task", "").await.unwrap();
        let comment = store.create_comment(todo.id, "carol", "note").await.unwrap();
        Fixture { store, list, todo, comment }
    }

    fn resolver(fx: &Fixture, policy: AccessPolicy) -> AccessResolver {
        AccessResolver::new(fx.store.clone(), policy)
    }

    #[tokio::test]
    async fn test_relation_classification() {
        let fx = fixture().await;
        let r = resolver(&fx, AccessPolicy::default());
        assert_eq!(r.relation(&user("alice"), &fx.list).await.unwrap(), Relation::Owner);
        assert_eq!(r.relation(&user("bob"), &fx.list).await.unwrap(), Relation::Grantee);
        assert_eq!(r.relation(&user("dave"), &fx.list).await.unwrap(), Relation::Stranger);
    }

    #[tokio::test]
    async fn test_read_hides_invisible_list() {
        let fx = fixture().await;
        let r = resolver(&fx, AccessPolicy::default());

        assert!(r.readable_list(&user("alice"), fx.list.id).await.is_ok());
        assert!(r.readable_list(&user("bob"), fx.list.id).await.is_ok());
        assert!(matches!(
            r.readable_list(&user("dave"), fx.list.id).await,
            Err(AccessError::NotFound(Resource::TodoList))
        ));
        assert!(matches!(
            r.readable_todo(&user("dave"), fx.todo.id).await,
            Err(AccessError::NotFound(Resource::Todo))
        ));
    }

    #[tokio::test]
    async fn test_delete_list_default_policy() {
        let fx = fixture().await;
        let r = resolver(&fx, AccessPolicy::default());

        assert!(r.deletable_list(&user("bob"), fx.list.id).await.is_ok());
        assert!(matches!(
            r.deletable_list(&user("dave"), fx.list.id).await,
            Err(AccessError::Forbidden(Resource::TodoList))
        ));
        assert!(matches!(
            r.deletable_list(&user("alice"), Uuid::new_v4()).await,
            Err(AccessError::NotFound(Resource::TodoList))
        ));
    }

    #[tokio::test]
    async fn test_strict_policy_limits_grantees() {
        let fx = fixture().await;
        let r = resolver(&fx, AccessPolicy::strict());

        assert!(r.deletable_list(&user("alice"), fx.list.id).await.is_ok());
        assert!(matches!(
            r.deletable_list(&user("bob"), fx.list.id).await,
            Err(AccessError::Forbidden(_))
        ));
        assert!(matches!(
            r.deletable_todo(&user("bob"), fx.todo.id).await,
            Err(AccessError::Forbidden(Resource::Todo))
        ));
        assert!(matches!(
            r.deletable_comment(&user("bob"), fx.comment.id).await,
            Err(AccessError::Forbidden(Resource::Comment))
        ));
        // grantees can still read
        assert!(r.readable_todo(&user("bob"), fx.todo.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_writes_only_need_existence_by_default() {
        let fx = fixture().await;
        let r = resolver(&fx, AccessPolicy::default());

        assert!(r.writable_list(&user("dave"), fx.list.id).await.is_ok());
        assert!(r.commentable_todo(&user("dave"), fx.todo.id).await.is_ok());
        assert!(matches!(
            r.writable_list(&user("dave"), Uuid::new_v4()).await,
            Err(AccessError::NotFound(Resource::TodoList))
        ));
        assert!(matches!(
            r.commentable_todo(&user("dave"), Uuid::new_v4()).await,
            Err(AccessError::NotFound(Resource::Todo))
        ));
    }

    #[tokio::test]
    async fn test_strict_writes_require_visibility() {
        let fx = fixture().await;
        let r = resolver(&fx, AccessPolicy::strict());

        assert!(matches!(
            r.writable_list(&user("dave"), fx.list.id).await,
            Err(AccessError::NotFound(Resource::TodoList))
        ));
        assert!(matches!(
            r.commentable_todo(&user("dave"), fx.todo.id).await,
            Err(AccessError::NotFound(Resource::Todo))
        ));
        assert!(r.writable_list(&user("bob"), fx.list.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_comment_delete_rules() {
        let fx = fixture().await;
        let r = resolver(&fx, AccessPolicy::default());

        assert!(r.deletable_comment(&user("carol"), fx.comment.id).await.is_ok());
        assert!(r.deletable_comment(&user("alice"), fx.comment.id).await.is_ok());
        assert!(r.deletable_comment(&user("bob"), fx.comment.id).await.is_ok());
        assert!(matches!(
            r.deletable_comment(&user("dave"), fx.comment.id).await,
            Err(AccessError::Forbidden(Resource::Comment))
        ));
        assert!(matches!(
            r.deletable_comment(&user("carol"), Uuid::new_v4()).await,
            Err(AccessError::NotFound(Resource::Comment))
        ));
    }

    #[tokio::test]
    async fn test_author_keeps_delete_under_strict_policy() {
        let fx = fixture().await;
        let r = resolver(&fx, AccessPolicy::strict());
        assert!(r.deletable_comment(&user("carol"), fx.comment.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_only_owner_manages_grants() {
        let fx = fixture().await;
        let r = resolver(&fx, AccessPolicy::default());

        assert!(r.shareable_list(&user("alice"), fx.list.id).await.is_ok());
        assert!(matches!(
            r.shareable_list(&user("bob"), fx.list.id).await,
            Err(AccessError::Forbidden(Resource::TodoList))
        ));
        assert!(matches!(
            r.shareable_list(&user("dave"), fx.list.id).await,
            Err(AccessError::NotFound(Resource::TodoList))
        ));
    }
}
