// src/services/reply_service.rs
// DOCUMENTATION: Business logic for threaded replies
// PURPOSE: Moderation checks, cooldown, threading rules and tree assembly

use std::collections::{HashMap, HashSet};

use sqlx::SqlitePool;

use crate::auth::AuthUser;
use crate::db::{ReactionRepository, ReactionTarget, ReplyRepository, ReviewRepository};
use crate::errors::HubError;
use crate::models::{
    CreateReplyRequest, Reaction, Reply, ReplyNode, ReplyReactionResponse, ReplyThreadResponse,
    ReplyView, UpdateReplyRequest,
};
use crate::services::{moderation, ReplyCooldown};

pub const REPLY_MAX_CHARS: usize = 1000;
/// Deepest allowed nesting; top-level replies are depth 1
pub const MAX_REPLY_DEPTH: i64 = 5;

/// Nest a flat, oldest-first reply list under their parents.
/// Replies whose parent is not in the list become roots.
pub fn build_tree(replies: Vec<ReplyView>) -> Vec<ReplyNode> {
    let ids: HashSet<i64> = replies.iter().map(|r| r.id).collect();

    let mut groups: HashMap<Option<i64>, Vec<ReplyView>> = HashMap::new();
    for reply in replies {
        let key = reply.parent_reply_id.filter(|p| ids.contains(p));
        groups.entry(key).or_default().push(reply);
    }

    attach(None, &mut groups)
}

fn attach(parent: Option<i64>, groups: &mut HashMap<Option<i64>, Vec<ReplyView>>) -> Vec<ReplyNode> {
    let siblings = groups.remove(&parent).unwrap_or_default();
    siblings
        .into_iter()
        .map(|reply| {
            let children = attach(Some(reply.id), groups);
            ReplyNode { reply, children }
        })
        .collect()
}

/// Clean reply text and run it through the spam filter
fn checked_content(raw: &str) -> Result<String, HubError> {
    let content = moderation::clean_text(raw, "content", 1, REPLY_MAX_CHARS)?;
    moderation::check_spam(&content)?;
    Ok(content)
}

pub struct ReplyService;

impl ReplyService {
    pub async fn thread(
        pool: &SqlitePool,
        review_id: i64,
        viewer_id: Option<i64>,
    ) -> Result<ReplyThreadResponse, HubError> {
        ReviewRepository::get_by_id(pool, review_id).await?;

        let replies = ReplyRepository::list_by_review(pool, review_id, viewer_id).await?;
        let total_count = replies.len();

        Ok(ReplyThreadResponse {
            review_id,
            total_count,
            replies: build_tree(replies),
        })
    }

    pub async fn create_reply(
        pool: &SqlitePool,
        cooldown: &ReplyCooldown,
        user: &AuthUser,
        review_id: i64,
        req: CreateReplyRequest,
    ) -> Result<ReplyView, HubError> {
        user.ensure_not_banned()?;
        ReviewRepository::get_by_id(pool, review_id).await?;

        let content = checked_content(&req.content)?;

        // Admins skip the cooldown. The slot is claimed here and handed back
        // if any later check or the insert fails.
        let cooling = !user.is_admin;
        if cooling {
            if let Err(wait) = cooldown.try_acquire(user.id).await {
                log::warn!("Reply cooldown hit by user {} ({}s left)", user.id, wait);
                return Err(HubError::RateLimitExceeded(format!(
                    "Please wait {} seconds before replying again",
                    wait
                )));
            }
        }

        let reply = match Self::insert_reply(pool, user.id, review_id, req.parent_reply_id, &content)
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                if cooling {
                    cooldown.release(user.id).await;
                }
                return Err(e);
            }
        };

        ReplyRepository::get_view(pool, reply.id, Some(user.id)).await
    }

    /// Threading checks, then the insert
    async fn insert_reply(
        pool: &SqlitePool,
        user_id: i64,
        review_id: i64,
        parent_reply_id: Option<i64>,
        content: &str,
    ) -> Result<Reply, HubError> {
        if let Some(parent_id) = parent_reply_id {
            let parent = ReplyRepository::find_by_id(pool, parent_id)
                .await?
                .filter(|p| p.review_id == review_id)
                .ok_or_else(|| {
                    HubError::InvalidInput(
                        "parent_reply_id does not belong to this review".to_string(),
                    )
                })?;

            if ReplyRepository::depth(pool, parent.id).await? >= MAX_REPLY_DEPTH {
                return Err(HubError::InvalidInput(format!(
                    "Replies cannot be nested more than {} levels deep",
                    MAX_REPLY_DEPTH
                )));
            }
        }

        ReplyRepository::create_reply(pool, review_id, user_id, parent_reply_id, content).await
    }

    pub async fn update_reply(
        pool: &SqlitePool,
        user: &AuthUser,
        reply_id: i64,
        req: UpdateReplyRequest,
    ) -> Result<ReplyView, HubError> {
        user.ensure_not_banned()?;

        let reply = ReplyRepository::get_by_id(pool, reply_id).await?;
        if reply.user_id != user.id {
            return Err(HubError::Forbidden(
                "You can only edit your own replies".to_string(),
            ));
        }

        let content = checked_content(&req.content)?;
        ReplyRepository::update_content(pool, reply_id, &content).await?;

        ReplyRepository::get_view(pool, reply_id, Some(user.id)).await
    }

    pub async fn delete_reply(
        pool: &SqlitePool,
        user: &AuthUser,
        reply_id: i64,
    ) -> Result<(), HubError> {
        let reply = ReplyRepository::get_by_id(pool, reply_id).await?;
        if !user.can_moderate(reply.user_id) {
            return Err(HubError::Forbidden(
                "You can only delete your own replies".to_string(),
            ));
        }

        if reply.user_id != user.id {
            log::info!("Admin {} removed reply {}", user.id, reply_id);
        }
        ReplyRepository::delete_reply(pool, reply_id).await
    }

    pub async fn react(
        pool: &SqlitePool,
        user: &AuthUser,
        reply_id: i64,
        like_type: Reaction,
    ) -> Result<ReplyReactionResponse, HubError> {
        user.ensure_not_banned()?;
        ReplyRepository::get_by_id(pool, reply_id).await?;

        let counts =
            ReactionRepository::toggle(pool, ReactionTarget::Reply, reply_id, user.id, like_type)
                .await?;

        Ok(ReplyReactionResponse { reply_id, counts })
    }
}
