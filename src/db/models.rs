use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered account. Corresponds to the `users` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A recorded football match. Corresponds to the `matches` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Match {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub date: Option<NaiveDate>,
    pub opponent: Option<String>,
    pub result: Option<String>,
    pub location: Option<String>,
    pub custom_category: Option<String>,
    pub owner_id: i64, // Foreign key to User
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing row: a match joined with its owner's username.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MatchSummary {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub date: Option<NaiveDate>,
    pub opponent: Option<String>,
    pub result: Option<String>,
    pub location: Option<String>,
    pub owner_id: i64,
    pub owner_username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MatchWithOwner {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub match_info: Match,
    pub owner_username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Corresponds to the `comments` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub match_id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CommentWithAuthor {
    pub id: i64,
    pub match_id: i64,
    pub user_id: i64,
    pub username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Validated column values for inserting or replacing a match row.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchFields {
    pub title: String,
    pub description: String,
    pub date: Option<NaiveDate>,
    pub opponent: Option<String>,
    pub result: Option<String>,
    pub location: Option<String>,
    pub custom_category: Option<String>,
}

// --- Composite views ---

#[derive(Debug, Clone, Serialize)]
pub struct MatchDetail {
    #[serde(flatten)]
    pub match_info: MatchWithOwner,
    pub categories: Vec<Category>,
    pub comments: Vec<CommentWithAuthor>,
}

/// What an owner needs to render the edit form.
#[derive(Debug, Clone, Serialize)]
pub struct MatchEditView {
    #[serde(rename = "match")]
    pub match_info: Match,
    pub categories: Vec<Category>,
    pub selected_category_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchPage {
    pub matches: Vec<MatchSummary>,
    pub q: Option<String>,
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub match_count: i64,
    pub matches: Vec<MatchSummary>,
}
