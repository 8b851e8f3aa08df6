//! Feedback service.
//!
//! Accepts short text feedback, lists it, and lets an administrator reply to
//! or soft-delete entries. Storage is pluggable through [`FeedbackStore`].

mod rate_limit;
mod store;
pub mod validate;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub use rate_limit::{RateLimiter, DEFAULT_RATE_LIMIT_MAX, DEFAULT_RATE_LIMIT_WINDOW};
pub use store::{FeedbackStore, MemoryListStore};

/// Most entries returned by one listing.
pub const LIST_LIMIT: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    #[error("invalid feedback: {0}")]
    Validation(String),

    #[error("too many requests, please wait a moment")]
    RateLimited,

    #[error("unauthorized")]
    Unauthorized,

    #[error("feedback not found: {0}")]
    NotFound(String),

    #[error("feedback store failed: {0}")]
    Store(String),
}

/// A stored feedback entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: String,
    pub content: String,
    pub username: String,
    pub timestamp: DateTime<Utc>,
    pub url: String,
    pub user_agent: String,
    pub reply: Option<String>,
    pub deleted: bool,
}

/// What a client sends.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub content: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Submission {
    pub fn new(content: &str) -> Self {
        Self {
            content: content.to_string(),
            ..Self::default()
        }
    }
}

/// Listing entry. `deleted` is only reported to administrators.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackView {
    pub id: String,
    pub content: String,
    pub username: String,
    pub timestamp: DateTime<Utc>,
    pub reply: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackListing {
    pub feedback: Vec<FeedbackView>,
    pub is_admin: bool,
}

/// Generates `fb_<unix millis>_<9 random chars>`.
fn generate_id() -> String {
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("fb_{}_{}", Utc::now().timestamp_millis(), &random[..9])
}

pub struct FeedbackService {
    store: Arc<dyn FeedbackStore>,
    limiter: RateLimiter,
    admin_token: Option<String>,
}

impl std::fmt::Debug for FeedbackService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedbackService")
            .field("limiter", &self.limiter)
            .field("admin_configured", &self.admin_token.is_some())
            .finish_non_exhaustive()
    }
}

impl FeedbackService {
    /// An empty `admin_token` counts as unconfigured.
    pub fn new(store: Arc<dyn FeedbackStore>, limiter: RateLimiter, admin_token: Option<String>) -> Self {
        Self {
            store,
            limiter,
            admin_token: admin_token.filter(|t| !t.is_empty()),
        }
    }

    /// In-memory service with default limits.
    pub fn in_memory(admin_token: Option<String>) -> Self {
        Self::new(Arc::new(MemoryListStore::new()), RateLimiter::default(), admin_token)
    }

    /// True only when a token is configured and `token` equals it.
    pub fn is_admin(&self, token: Option<&str>) -> bool {
        match (&self.admin_token, token) {
            (Some(expected), Some(given)) => expected == given,
            _ => false,
        }
    }

    /// Stores a submission from `client`. Returns the new entry's id.
    pub fn submit(&self, client: &str, submission: Submission) -> Result<String, FeedbackError> {
        if !self.limiter.check(client) {
            warn!(client, "feedback rate limit exceeded");
            return Err(FeedbackError::RateLimited);
        }
        let content = validate::validate_content(&submission.content).map_err(|reason| {
            debug!(client, %reason, "feedback rejected");
            FeedbackError::Validation(reason)
        })?;

        let feedback = Feedback {
            id: generate_id(),
            content,
            username: validate::normalize_username(submission.username.as_deref()),
            timestamp: submission.timestamp.unwrap_or_else(Utc::now),
            url: validate::truncate_chars(
                submission.url.as_deref().unwrap_or_default(),
                validate::MAX_CONTEXT_CHARS,
            ),
            user_agent: validate::truncate_chars(
                submission.user_agent.as_deref().unwrap_or_default(),
                validate::MAX_CONTEXT_CHARS,
            ),
            reply: None,
            deleted: false,
        };
        let id = feedback.id.clone();
        self.store.prepend(feedback).map_err(FeedbackError::Store)?;
        info!(id = %id, "feedback received");
        Ok(id)
    }

    /// Newest-first listing. Soft-deleted entries are visible to admins only.
    pub fn list(&self, admin_token: Option<&str>) -> Result<FeedbackListing, FeedbackError> {
        let is_admin = self.is_admin(admin_token);
        let feedback = self
            .store
            .list(LIST_LIMIT)
            .map_err(FeedbackError::Store)?
            .into_iter()
            .filter(|f| is_admin || !f.deleted)
            .map(|f| FeedbackView {
                id: f.id,
                content: f.content,
                username: f.username,
                timestamp: f.timestamp,
                reply: f.reply,
                deleted: is_admin.then_some(f.deleted),
            })
            .collect();
        Ok(FeedbackListing { feedback, is_admin })
    }

    /// Sets or clears the admin reply on `id`.
    pub fn reply(&self, admin_token: Option<&str>, id: &str, reply: Option<&str>) -> Result<(), FeedbackError> {
        self.authorize(admin_token)?;
        let reply = validate::normalize_reply(reply);
        self.modify(id, &mut |f| f.reply = reply.clone())?;
        info!(id, "feedback reply updated");
        Ok(())
    }

    /// Marks `id` deleted. The entry stays in the store.
    pub fn delete(&self, admin_token: Option<&str>, id: &str) -> Result<(), FeedbackError> {
        self.authorize(admin_token)?;
        self.modify(id, &mut |f| f.deleted = true)?;
        info!(id, "feedback soft-deleted");
        Ok(())
    }

    fn authorize(&self, token: Option<&str>) -> Result<(), FeedbackError> {
        if self.is_admin(token) {
            Ok(())
        } else {
            warn!("feedback admin action without a valid token");
            Err(FeedbackError::Unauthorized)
        }
    }

    fn modify(&self, id: &str, edit: &mut dyn FnMut(&mut Feedback)) -> Result<(), FeedbackError> {
        if id.is_empty() {
            return Err(FeedbackError::Validation("feedback id is required".to_string()));
        }
        if self.store.modify(id, edit).map_err(FeedbackError::Store)? {
            Ok(())
        } else {
            Err(FeedbackError::NotFound(id.to_string()))
        }
    }
}
