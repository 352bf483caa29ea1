use super::model::PostSummary;
use crate::model::Post;
use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::str::FromStr;
use tracing::instrument;

pub type Pool = SqlitePool;

pub async fn init_pool(database_url: &str) -> Result<Pool> {
    let normalized = prepare_sqlite_url(database_url);
    let options = SqliteConnectOptions::from_str(&normalized)
        .with_context(|| format!("invalid database url: {normalized}"))?
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .context("failed to open database")?;
    // WAL lets page reads proceed while an admin action writes.
    sqlx::query("PRAGMA journal_mode=WAL;")
        .execute(&pool)
        .await?;
    Ok(pool)
}

/// If using a file-backed SQLite URL, expand a leading `~/` and ensure the parent
/// directory exists. Leaves in-memory URLs untouched. Returns possibly-updated URL.
fn prepare_sqlite_url(url: &str) -> String {
    if !url.starts_with("sqlite:") || url.starts_with("sqlite::memory") {
        return url.to_string();
    }

    let rest = &url["sqlite:".len()..];
    let path_with_query = rest.strip_prefix("//").unwrap_or(rest);

    let (path_part, query_part) = match path_with_query.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (path_with_query, None),
    };

    if path_part.is_empty() {
        return url.to_string();
    }

    let expanded_path = match (path_part.strip_prefix("~/"), std::env::var("HOME")) {
        (Some(rest), Ok(home)) => format!("{}/{}", home.trim_end_matches('/'), rest),
        _ => path_part.to_string(),
    };

    if let Some(parent) = std::path::Path::new(&expanded_path).parent() {
        if !parent.as_os_str().is_empty() {
            let _ = std::fs::create_dir_all(parent);
        }
    }

    let mut rebuilt = String::from("sqlite://");
    rebuilt.push_str(&expanded_path);
    if let Some(q) = query_part {
        rebuilt.push('?');
        rebuilt.push_str(q);
    }
    rebuilt
}

pub async fn run_migrations(pool: &Pool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

#[instrument(skip_all)]
pub async fn get_post(pool: &Pool, post_name: &str) -> Result<Option<Post>> {
    let post = sqlx::query_as::<_, Post>(
        "SELECT post_name, content, updated_at FROM posts WHERE post_name = ?",
    )
    .bind(post_name)
    .fetch_optional(pool)
    .await?;
    Ok(post)
}

#[instrument(skip_all)]
pub async fn list_post_names(pool: &Pool) -> Result<Vec<String>> {
    let names = sqlx::query_scalar::<_, String>("SELECT post_name FROM posts ORDER BY post_name")
        .fetch_all(pool)
        .await?;
    Ok(names)
}

#[instrument(skip_all)]
pub async fn list_posts(pool: &Pool) -> Result<Vec<PostSummary>> {
    let rows = sqlx::query_as::<_, PostSummary>(
        "SELECT post_name, updated_at FROM posts ORDER BY post_name",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[instrument(skip_all)]
pub async fn count_posts(pool: &Pool) -> Result<i64> {
    let cnt: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
        .fetch_one(pool)
        .await?;
    Ok(cnt)
}

/// Insert a post or replace the content of an existing one.
#[instrument(skip_all, fields(post_name = %post_name))]
pub async fn upsert_post(pool: &Pool, post_name: &str, content: &str) -> Result<()> {
    sqlx::query(
        "INSERT INTO posts (post_name, content, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP) \
         ON CONFLICT(post_name) DO UPDATE SET content = excluded.content, updated_at = CURRENT_TIMESTAMP",
    )
    .bind(post_name)
    .bind(content)
    .execute(pool)
    .await?;
    Ok(())
}

/// Delete a post; returns whether a row existed.
#[instrument(skip_all, fields(post_name = %post_name))]
pub async fn delete_post(pool: &Pool, post_name: &str) -> Result<bool> {
    let res = sqlx::query("DELETE FROM posts WHERE post_name = ?")
        .bind(post_name)
        .execute(pool)
        .await?;
    Ok(res.rows_affected() > 0)
}

/// Delete every post whose name is not in `keep`, as one statement.
/// An empty `keep` clears the table.
#[instrument(skip_all, fields(keep = keep.len()))]
pub async fn delete_posts_not_in(pool: &Pool, keep: &[String]) -> Result<u64> {
    if keep.is_empty() {
        let res = sqlx::query("DELETE FROM posts").execute(pool).await?;
        return Ok(res.rows_affected());
    }

    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new("DELETE FROM posts WHERE post_name NOT IN (");
    let mut names = qb.separated(", ");
    for name in keep {
        names.push_bind(name.as_str());
    }
    names.push_unseparated(")");
    let res = qb.build().execute(pool).await?;
    Ok(res.rows_affected())
}
