//! SQLite persistence for posts and their social variants
//!
//! The pipeline drives the post lifecycle through the `PostStore` trait;
//! the SQLite implementation owns one connection behind a mutex, so every
//! update statement runs serialized. Combined with partial-field UPDATEs
//! (content, cover_image, audio_url each have their own statement), two
//! side-pipelines finishing at the same time can never lose each other's
//! writes.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Local};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::PathBuf;
use std::sync::Mutex;
use uuid::Uuid;

use crate::models::{Post, PostStatus, SocialPlatform, SocialPost, Tone};

pub trait PostStore: Send + Sync {
    fn create_post(&self, post: &Post) -> Result<()>;
    fn get_post(&self, id: &Uuid, owner_id: &str) -> Result<Option<Post>>;
    fn list_posts(&self, owner_id: &str, limit: usize, offset: usize) -> Result<Vec<Post>>;

    /// Replace the post's content (draft → refined → optimized)
    fn update_content(&self, id: &Uuid, owner_id: &str, content: &str) -> Result<bool>;
    fn set_status(&self, id: &Uuid, owner_id: &str, status: PostStatus) -> Result<bool>;
    fn set_cover_image(&self, id: &Uuid, owner_id: &str, reference: &str) -> Result<bool>;
    fn set_audio_url(&self, id: &Uuid, owner_id: &str, url: &str) -> Result<bool>;
    fn set_schema_markup(&self, id: &Uuid, owner_id: &str, markup: &str) -> Result<bool>;

    /// Insert or replace the variant for (post, platform)
    fn upsert_social_post(&self, social: &SocialPost) -> Result<()>;
    fn get_social_posts(&self, post_id: &Uuid) -> Result<Vec<SocialPost>>;
}

pub struct SqlitePostStore {
    conn: Mutex<Connection>,
}

impl SqlitePostStore {
    /// Open (or create) the database at the specified path
    pub fn new(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// In-memory database for tests
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<()> {
        let conn = self.lock();
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS posts (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                topic TEXT NOT NULL,
                content TEXT NOT NULL,
                tone TEXT NOT NULL,
                status TEXT NOT NULL,
                cover_image TEXT,
                audio_url TEXT,
                schema_markup TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_posts_owner ON posts(owner_id);
            CREATE INDEX IF NOT EXISTS idx_posts_status ON posts(status);

            CREATE TABLE IF NOT EXISTS social_posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                post_id TEXT NOT NULL,
                platform TEXT NOT NULL,
                content TEXT NOT NULL,
                hashtags TEXT NOT NULL,
                created_at TEXT NOT NULL,

                FOREIGN KEY(post_id) REFERENCES posts(id) ON DELETE CASCADE,
                UNIQUE(post_id, platform)
            );

            CREATE INDEX IF NOT EXISTS idx_social_post_id ON social_posts(post_id);
            "#,
        )?;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        // Poisoning only happens if a holder panicked mid-statement
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn update_field(&self, id: &Uuid, owner_id: &str, sql: &str, value: &str) -> Result<bool> {
        let updated_at = Local::now().to_rfc3339();
        let conn = self.lock();
        let changed = conn.execute(
            sql,
            params![value, updated_at, id.to_string(), owner_id],
        )?;
        Ok(changed > 0)
    }
}

impl PostStore for SqlitePostStore {
    fn create_post(&self, post: &Post) -> Result<()> {
        let conn = self.lock();
        conn.execute(
            r#"
            INSERT INTO posts (
                id, owner_id, topic, content, tone, status,
                cover_image, audio_url, schema_markup, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                post.id.to_string(),
                post.owner_id,
                post.topic,
                post.content,
                post.tone.as_str(),
                post.status.as_str(),
                post.cover_image,
                post.audio_url,
                post.schema_markup,
                post.created_at.to_rfc3339(),
                post.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn get_post(&self, id: &Uuid, owner_id: &str) -> Result<Option<Post>> {
        let conn = self.lock();
        let result = conn
            .query_row(
                r#"
                SELECT id, owner_id, topic, content, tone, status,
                       cover_image, audio_url, schema_markup, created_at, updated_at
                FROM posts
                WHERE id = ?1 AND owner_id = ?2
                "#,
                params![id.to_string(), owner_id],
                map_post_row,
            )
            .optional()?;
        Ok(result)
    }

    fn list_posts(&self, owner_id: &str, limit: usize, offset: usize) -> Result<Vec<Post>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            r#"
            SELECT id, owner_id, topic, content, tone, status,
                   cover_image, audio_url, schema_markup, created_at, updated_at
            FROM posts
            WHERE owner_id = ?1
            ORDER BY created_at DESC
            LIMIT ?2 OFFSET ?3
            "#,
        )?;
        let posts = stmt
            .query_map(params![owner_id, limit, offset], map_post_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(posts)
    }

    fn update_content(&self, id: &Uuid, owner_id: &str, content: &str) -> Result<bool> {
        self.update_field(
            id,
            owner_id,
            "UPDATE posts SET content = ?1, updated_at = ?2 WHERE id = ?3 AND owner_id = ?4",
            content,
        )
    }

    fn set_status(&self, id: &Uuid, owner_id: &str, status: PostStatus) -> Result<bool> {
        self.update_field(
            id,
            owner_id,
            "UPDATE posts SET status = ?1, updated_at = ?2 WHERE id = ?3 AND owner_id = ?4",
            status.as_str(),
        )
    }

    fn set_cover_image(&self, id: &Uuid, owner_id: &str, reference: &str) -> Result<bool> {
        self.update_field(
            id,
            owner_id,
            "UPDATE posts SET cover_image = ?1, updated_at = ?2 WHERE id = ?3 AND owner_id = ?4",
            reference,
        )
    }

    fn set_audio_url(&self, id: &Uuid, owner_id: &str, url: &str) -> Result<bool> {
        self.update_field(
            id,
            owner_id,
            "UPDATE posts SET audio_url = ?1, updated_at = ?2 WHERE id = ?3 AND owner_id = ?4",
            url,
        )
    }

    fn set_schema_markup(&self, id: &Uuid, owner_id: &str, markup: &str) -> Result<bool> {
        self.update_field(
            id,
            owner_id,
            "UPDATE posts SET schema_markup = ?1, updated_at = ?2 WHERE id = ?3 AND owner_id = ?4",
            markup,
        )
    }

    fn upsert_social_post(&self, social: &SocialPost) -> Result<()> {
        let hashtags = serde_json::to_string(&social.hashtags)?;
        let conn = self.lock();
        conn.execute(
            r#"
            INSERT INTO social_posts (post_id, platform, content, hashtags, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(post_id, platform)
            DO UPDATE SET content = excluded.content,
                          hashtags = excluded.hashtags,
                          created_at = excluded.created_at
            "#,
            params![
                social.post_id.to_string(),
                social.platform.as_str(),
                social.content,
                hashtags,
                social.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn get_social_posts(&self, post_id: &Uuid) -> Result<Vec<SocialPost>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            r#"
            SELECT post_id, platform, content, hashtags, created_at
            FROM social_posts
            WHERE post_id = ?1
            ORDER BY platform ASC
            "#,
        )?;
        let rows = stmt
            .query_map(params![post_id.to_string()], map_social_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

// Helper functions for mapping between database and Rust types

fn string_to_tone(s: &str) -> Result<Tone> {
    match s {
        "professional" => Ok(Tone::Professional),
        "friendly" => Ok(Tone::Friendly),
        "witty" => Ok(Tone::Witty),
        _ => Err(anyhow!("Unknown tone: {}", s)),
    }
}

fn string_to_status(s: &str) -> Result<PostStatus> {
    match s {
        "DRAFT" => Ok(PostStatus::Draft),
        "COMPLETED" => Ok(PostStatus::Completed),
        _ => Err(anyhow!("Unknown post status: {}", s)),
    }
}

fn string_to_platform(s: &str) -> Result<SocialPlatform> {
    match s {
        "twitter" => Ok(SocialPlatform::Twitter),
        "linkedin" => Ok(SocialPlatform::Linkedin),
        "facebook" => Ok(SocialPlatform::Facebook),
        _ => Err(anyhow!("Unknown platform: {}", s)),
    }
}

fn conversion_err(idx: usize, e: impl std::error::Error + Send + Sync + 'static) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
}

fn parse_local_datetime(idx: usize, s: &str) -> rusqlite::Result<DateTime<Local>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Local))
        .map_err(|e| conversion_err(idx, e))
}

fn map_post_row(row: &Row) -> rusqlite::Result<Post> {
    let id_str: String = row.get(0)?;
    let tone_str: String = row.get(4)?;
    let status_str: String = row.get(5)?;
    let created_str: String = row.get(9)?;
    let updated_str: String = row.get(10)?;

    let id = Uuid::parse_str(&id_str).map_err(|e| conversion_err(0, e))?;
    let tone = string_to_tone(&tone_str).map_err(|_| rusqlite::Error::InvalidQuery)?;
    let status = string_to_status(&status_str).map_err(|_| rusqlite::Error::InvalidQuery)?;

    Ok(Post {
        id,
        owner_id: row.get(1)?,
        topic: row.get(2)?,
        content: row.get(3)?,
        tone,
        status,
        cover_image: row.get(6)?,
        audio_url: row.get(7)?,
        schema_markup: row.get(8)?,
        created_at: parse_local_datetime(9, &created_str)?,
        updated_at: parse_local_datetime(10, &updated_str)?,
    })
}

fn map_social_row(row: &Row) -> rusqlite::Result<SocialPost> {
    let post_id_str: String = row.get(0)?;
    let platform_str: String = row.get(1)?;
    let hashtags_str: String = row.get(3)?;
    let created_str: String = row.get(4)?;

    let post_id = Uuid::parse_str(&post_id_str).map_err(|e| conversion_err(0, e))?;
    let platform =
        string_to_platform(&platform_str).map_err(|_| rusqlite::Error::InvalidQuery)?;
    let hashtags: Vec<String> =
        serde_json::from_str(&hashtags_str).map_err(|e| conversion_err(3, e))?;

    Ok(SocialPost {
        post_id,
        platform,
        content: row.get(2)?,
        hashtags,
        created_at: parse_local_datetime(4, &created_str)?,
    })
}
