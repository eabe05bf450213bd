//! Pure post rules over an in-memory collection.

use chrono::Utc;
use models::{post, Comment, Post, Visibility};
use uuid::Uuid;

use super::errors::PostError;
use crate::auth::Identity;
use crate::pagination::Pagination;

/// Build a fresh post: zero likes, no comments.
pub fn new_post(author: Uuid, content: &str, visibility: Option<Visibility>) -> Result<Post, PostError> {
    post::validate_content(content)?;
    Ok(Post {
        id: Uuid::new_v4(),
        content: content.trim().to_string(),
        author,
        visibility: visibility.unwrap_or_default(),
        likes: 0,
        comments: Vec::new(),
        created_at: Some(Utc::now()),
    })
}

/// Posts the caller may see, in stored order.
pub fn visible_to(posts: Vec<Post>, user_id: Uuid) -> Vec<Post> {
    posts.into_iter().filter(|p| p.is_visible_to(user_id)).collect()
}

/// Slice an already filtered listing. `None` returns everything.
pub fn paginate(posts: Vec<Post>, page: Option<Pagination>) -> Vec<Post> {
    let Some(page) = page else { return posts };
    let (skip, take) = page.window();
    posts.into_iter().skip(skip).take(take).collect()
}

/// Find a post and apply the visibility guard.
pub fn find_visible<'a>(posts: &'a [Post], id: Uuid, caller: &Identity) -> Result<&'a Post, PostError> {
    let found = posts.iter().find(|p| p.id == id).ok_or(PostError::NotFound(id))?;
    guard_visible(found, caller)?;
    Ok(found)
}

/// Mutable variant of [`find_visible`].
pub fn find_visible_mut<'a>(posts: &'a mut [Post], id: Uuid, caller: &Identity) -> Result<&'a mut Post, PostError> {
    let found = posts.iter_mut().find(|p| p.id == id).ok_or(PostError::NotFound(id))?;
    guard_visible(found, caller)?;
    Ok(found)
}

fn guard_visible(post: &Post, caller: &Identity) -> Result<(), PostError> {
    if post.is_visible_to(caller.user_id) {
        Ok(())
    } else {
        Err(PostError::Forbidden("this post is private".into()))
    }
}

pub fn like(post: &mut Post) {
    post.likes = post.likes.saturating_add(1);
}

/// Next comment id within one post; `None` once `u64::MAX` is taken.
pub fn next_comment_id(post: &Post) -> Option<u64> {
    match post.comments.iter().map(|c| c.id).max() {
        Some(max) => max.checked_add(1),
        None => Some(1),
    }
}

/// Append a comment and return its id. `parent_id` is stored as given.
pub fn add_comment(post: &mut Post, author: Uuid, text: &str, parent_id: Option<u64>) -> Result<u64, PostError> {
    let id = next_comment_id(post)
        .ok_or_else(|| PostError::Validation("post cannot accept more comments".into()))?;
    post.comments.push(Comment {
        id,
        text: text.trim().to_string(),
        author,
        parent_id,
        created_at: Some(Utc::now()),
    });
    Ok(id)
}

/// Remove a post if the caller authored it or is an admin.
pub fn remove(posts: &mut Vec<Post>, id: Uuid, caller: &Identity) -> Result<Post, PostError> {
    let idx = posts.iter().position(|p| p.id == id).ok_or(PostError::NotFound(id))?;
    if posts[idx].author != caller.user_id && !caller.is_admin() {
        return Err(PostError::Forbidden("only the author or an admin can delete this post".into()));
    }
    Ok(posts.remove(idx))
}
