use std::sync::Arc;

use models::{post, Post, Visibility};
use tracing::{info, instrument};
use uuid::Uuid;

use super::errors::PostError;
use super::rules;
use crate::auth::Identity;
use crate::pagination::Pagination;
use crate::storage::Collection;

/// Post workflows over a post collection.
pub struct PostService<C: Collection<Post>> {
    posts: Arc<C>,
}

impl<C: Collection<Post>> PostService<C> {
    pub fn new(posts: Arc<C>) -> Self {
        Self { posts }
    }

    /// Create a post owned by the caller.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use models::Role;
    /// use service::auth::Identity;
    /// use service::post::PostService;
    /// use service::storage::MemoryCollection;
    ///
    /// let svc = PostService::new(Arc::new(MemoryCollection::new("posts")));
    /// let me = Identity { user_id: uuid::Uuid::new_v4(), role: Role::User };
    /// let post = tokio_test::block_on(svc.create_post(&me, "hello", None)).unwrap();
    /// assert_eq!(post.likes, 0);
    /// assert!(post.comments.is_empty());
    /// ```
    #[instrument(skip(self, content), fields(user_id = %caller.user_id))]
    pub async fn create_post(
        &self,
        caller: &Identity,
        content: &str,
        visibility: Option<Visibility>,
    ) -> Result<Post, PostError> {
        let created = rules::new_post(caller.user_id, content, visibility)?;
        let stored = created.clone();
        self.posts
            .update(move |posts| {
                posts.push(stored);
                Ok::<_, PostError>(())
            })
            .await?;
        info!(post_id = %created.id, visibility = %created.visibility, "post_created");
        Ok(created)
    }

    /// Posts visible to the caller, in stored order, optionally paged.
    pub async fn list_posts(&self, caller: &Identity, page: Option<Pagination>) -> Result<Vec<Post>, PostError> {
        let posts = self.posts.load().await?;
        Ok(rules::paginate(rules::visible_to(posts, caller.user_id), page))
    }

    pub async fn get_post(&self, caller: &Identity, id: Uuid) -> Result<Post, PostError> {
        let posts = self.posts.load().await?;
        rules::find_visible(&posts, id, caller).cloned()
    }

    #[instrument(skip(self), fields(user_id = %caller.user_id))]
    pub async fn like_post(&self, caller: &Identity, id: Uuid) -> Result<Post, PostError> {
        let liked = self
            .posts
            .update(|posts| {
                let target = rules::find_visible_mut(posts, id, caller)?;
                rules::like(target);
                Ok::<_, PostError>(target.clone())
            })
            .await?;
        info!(post_id = %id, likes = liked.likes, "post_liked");
        Ok(liked)
    }

    /// Append a comment. Blank text is rejected before the post is looked up.
    #[instrument(skip(self, text), fields(user_id = %caller.user_id))]
    pub async fn comment_on_post(
        &self,
        caller: &Identity,
        id: Uuid,
        text: &str,
        parent_id: Option<u64>,
    ) -> Result<Post, PostError> {
        post::validate_comment(text)?;
        let (comment_id, commented) = self
            .posts
            .update(|posts| {
                let target = rules::find_visible_mut(posts, id, caller)?;
                let comment_id = rules::add_comment(target, caller.user_id, text, parent_id)?;
                Ok::<_, PostError>((comment_id, target.clone()))
            })
            .await?;
        info!(post_id = %id, comment_id, "post_commented");
        Ok(commented)
    }

    /// Delete a post. Only its author or an admin may do so.
    #[instrument(skip(self), fields(user_id = %caller.user_id))]
    pub async fn delete_post(&self, caller: &Identity, id: Uuid) -> Result<(), PostError> {
        self.posts
            .update(|posts| rules::remove(posts, id, caller).map(|_| ()))
            .await?;
        info!(post_id = %id, "post_deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{JsonFileCollection, MemoryCollection};
    use models::Role;

    fn svc() -> (PostService<MemoryCollection<Post>>, Arc<MemoryCollection<Post>>) {
        let posts = Arc::new(MemoryCollection::new("posts"));
        (PostService::new(posts.clone()), posts)
    }

    fn user() -> Identity {
        Identity { user_id: Uuid::new_v4(), role: Role::User }
    }

    #[tokio::test]
    async fn create_persists_with_defaults() {
        let (svc, store) = svc();
        let alice = user();
        let p = svc.create_post(&alice, "first", None).await.unwrap();
        assert_eq!(p.author, alice.user_id);
        assert_eq!(p.visibility, Visibility::Public);
        assert_eq!(store.load().await.unwrap(), vec![p]);

        let err = svc.create_post(&alice, "   ", None).await.unwrap_err();
        assert_eq!(err.to_string(), "content is required");
        assert_eq!(store.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn like_increments_by_exactly_one() {
        let (svc, store) = svc();
        let alice = user();
        let bob = user();
        let p = svc.create_post(&alice, "x", None).await.unwrap();
        assert_eq!(svc.like_post(&bob, p.id).await.unwrap().likes, 1);
        assert_eq!(svc.like_post(&alice, p.id).await.unwrap().likes, 2);
        assert_eq!(store.load().await.unwrap()[0].likes, 2);
    }

    #[tokio::test]
    async fn private_post_guard_applies_to_all_reads_and_writes() {
        let (svc, store) = svc();
        let alice = user();
        let bob = user();
        let secret = svc.create_post(&alice, "secret", Some(Visibility::Private)).await.unwrap();
        svc.create_post(&alice, "open", None).await.unwrap();

        assert_eq!(svc.list_posts(&alice, None).await.unwrap().len(), 2);
        assert_eq!(svc.list_posts(&bob, None).await.unwrap().len(), 1);
        assert!(matches!(svc.get_post(&bob, secret.id).await, Err(PostError::Forbidden(_))));
        assert!(matches!(svc.like_post(&bob, secret.id).await, Err(PostError::Forbidden(_))));
        assert!(matches!(
            svc.comment_on_post(&bob, secret.id, "hi", None).await,
            Err(PostError::Forbidden(_))
        ));

        let stored = store.load().await.unwrap();
        assert_eq!(stored[0].likes, 0);
        assert!(stored[0].comments.is_empty());

        // the author is unaffected
        assert_eq!(svc.like_post(&alice, secret.id).await.unwrap().likes, 1);
    }

    #[tokio::test]
    async fn missing_post_is_not_found() {
        let (svc, _) = svc();
        let me = user();
        let id = Uuid::new_v4();
        assert!(matches!(svc.get_post(&me, id).await, Err(PostError::NotFound(_))));
        assert!(matches!(svc.like_post(&me, id).await, Err(PostError::NotFound(_))));
        assert!(matches!(svc.delete_post(&me, id).await, Err(PostError::NotFound(_))));
    }

    #[tokio::test]
    async fn blank_comment_checked_before_lookup() {
        let (svc, _) = svc();
        let err = svc.comment_on_post(&user(), Uuid::new_v4(), "  ", None).await.unwrap_err();
        assert!(matches!(err, PostError::Validation(ref m) if m == "comment cannot be empty"));
    }

    #[tokio::test]
    async fn comments_append_with_post_scoped_ids() {
        let (svc, _) = svc();
        let alice = user();
        let bob = user();
        let a = svc.create_post(&alice, "a", None).await.unwrap();
        let b = svc.create_post(&alice, "b", None).await.unwrap();

        svc.comment_on_post(&bob, a.id, "one", None).await.unwrap();
        let a = svc.comment_on_post(&alice, a.id, "reply", Some(1)).await.unwrap();
        let b = svc.comment_on_post(&bob, b.id, "first on b", None).await.unwrap();

        assert_eq!(a.comments.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(a.comments[1].parent_id, Some(1));
        assert_eq!(a.comments[0].author, bob.user_id);
        assert_eq!(b.comments[0].id, 1);
    }

    #[tokio::test]
    async fn delete_by_author_or_admin_only() {
        let (svc, store) = svc();
        let alice = user();
        let bob = user();
        let admin = Identity { user_id: Uuid::new_v4(), role: Role::Admin };
        let p1 = svc.create_post(&alice, "1", None).await.unwrap();
        let p2 = svc.create_post(&alice, "2", None).await.unwrap();

        assert!(matches!(svc.delete_post(&bob, p1.id).await, Err(PostError::Forbidden(_))));
        svc.delete_post(&alice, p1.id).await.unwrap();
        svc.delete_post(&admin, p2.id).await.unwrap();
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_pages_after_filtering() {
        let (svc, _) = svc();
        let alice = user();
        let bob = user();
        svc.create_post(&alice, "hidden", Some(Visibility::Private)).await.unwrap();
        let visible: Vec<Post> = {
            let mut out = Vec::new();
            for i in 0..3 {
                out.push(svc.create_post(&alice, &format!("p{i}"), None).await.unwrap());
            }
            out
        };
        let page = svc.list_posts(&bob, Some(Pagination { page: 2, per_page: 2 })).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, visible[2].id);
    }

    #[tokio::test]
    async fn corrupt_store_surfaces_as_storage_error() -> Result<(), anyhow::Error> {
        let dir = std::env::temp_dir().join(format!("post_service_{}", Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join("posts.json"), b"[{]").await?;
        let svc = PostService::new(Arc::new(JsonFileCollection::<Post>::open(&dir, "posts")));

        let err = svc.list_posts(&user(), None).await.unwrap_err();
        assert!(matches!(err, PostError::Storage(_)));
        let err = svc.create_post(&user(), "x", None).await.unwrap_err();
        assert!(matches!(err, PostError::Storage(_)));

        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }
}
