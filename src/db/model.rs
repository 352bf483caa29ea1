//! View models returned by repositories.
//!
//! Keep these structs focused on the data returned by queries.

use chrono::NaiveDateTime;

/// Post row without its content, used by the admin listing.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PostSummary {
    pub post_name: String,
    pub updated_at: NaiveDateTime,
}
