//! Content item repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over `content_items` storage.
//! - Keep SQL and JSON column encoding inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `ContentItem::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - `kind` is never rewritten by an update.

use crate::db::DbError;
use crate::model::item::{ContentItem, ContentItemId, ContentItemValidationError};
use crate::model::kind::{ContentKind, ContentSource, ContentStatus};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const ITEM_SELECT_SQL: &str = "SELECT
    uuid,
    kind,
    status,
    title,
    summary,
    body,
    raw_input,
    structured,
    source,
    cadence_target,
    topics,
    related_slugs,
    attachments,
    created_at,
    updated_at
FROM content_items";

const REQUIRED_COLUMNS: [&str; 15] = [
    "uuid",
    "kind",
    "status",
    "title",
    "summary",
    "body",
    "raw_input",
    "structured",
    "source",
    "cadence_target",
    "topics",
    "related_slugs",
    "attachments",
    "created_at",
    "updated_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for content persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ContentItemValidationError),
    Db(DbError),
    NotFound(ContentItemId),
    /// An update tried to change the kind of an existing item.
    KindImmutable(ContentItemId),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "content item not found: {id}"),
            Self::KindImmutable(id) => write!(f, "content item kind cannot change: {id}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted content data: {message}")
            }
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ContentItemValidationError> for RepoError {
    fn from(value: ContentItemValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing content items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentListQuery {
    pub kind: Option<ContentKind>,
    pub status: Option<ContentStatus>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for content item persistence.
pub trait ContentRepository {
    fn create_item(&self, item: &ContentItem) -> RepoResult<ContentItemId>;
    /// Replaces every mutable column of an existing item.
    fn update_item(&self, item: &ContentItem) -> RepoResult<()>;
    fn update_status(
        &self,
        id: ContentItemId,
        status: ContentStatus,
        updated_at: i64,
    ) -> RepoResult<()>;
    fn get_item(&self, id: ContentItemId) -> RepoResult<Option<ContentItem>>;
    /// Lists items sorted by `updated_at DESC, uuid ASC`.
    fn list_items(&self, query: &ContentListQuery) -> RepoResult<Vec<ContentItem>>;
}

/// SQLite-backed content repository.
pub struct SqliteContentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteContentRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// Fails fast when the schema is missing instead of erroring on first use.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ContentRepository for SqliteContentRepository<'_> {
    fn create_item(&self, item: &ContentItem) -> RepoResult<ContentItemId> {
        item.validate()?;

        self.conn.execute(
            "INSERT INTO content_items (
                uuid,
                kind,
                status,
                title,
                summary,
                body,
                raw_input,
                structured,
                source,
                cadence_target,
                topics,
                related_slugs,
                attachments,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15);",
            params![
                item.id.to_string(),
                item.kind.as_str(),
                item.status.as_str(),
                item.title.as_deref(),
                item.summary.as_deref(),
                item.body.as_deref(),
                item.raw_input.as_deref(),
                item.structured.as_ref().map(encode_json).transpose()?,
                item.source.as_str(),
                item.cadence_target.as_deref(),
                encode_json(&item.topics)?,
                encode_json(&item.related_slugs)?,
                encode_json(&item.attachments)?,
                item.created_at,
                item.updated_at,
            ],
        )?;

        Ok(item.id)
    }

    fn update_item(&self, item: &ContentItem) -> RepoResult<()> {
        item.validate()?;

        let changed = self.conn.execute(
            "UPDATE content_items
             SET
                status = ?1,
                title = ?2,
                summary = ?3,
                body = ?4,
                raw_input = ?5,
                structured = ?6,
                source = ?7,
                cadence_target = ?8,
                topics = ?9,
                related_slugs = ?10,
                attachments = ?11,
                updated_at = ?12
             WHERE uuid = ?13
               AND kind = ?14;",
            params![
                item.status.as_str(),
                item.title.as_deref(),
                item.summary.as_deref(),
                item.body.as_deref(),
                item.raw_input.as_deref(),
                item.structured.as_ref().map(encode_json).transpose()?,
                item.source.as_str(),
                item.cadence_target.as_deref(),
                encode_json(&item.topics)?,
                encode_json(&item.related_slugs)?,
                encode_json(&item.attachments)?,
                item.updated_at,
                item.id.to_string(),
                item.kind.as_str(),
            ],
        )?;

        if changed == 0 {
            return Err(if self.item_exists(item.id)? {
                RepoError::KindImmutable(item.id)
            } else {
                RepoError::NotFound(item.id)
            });
        }

        Ok(())
    }

    fn update_status(
        &self,
        id: ContentItemId,
        status: ContentStatus,
        updated_at: i64,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE content_items
             SET
                status = ?1,
                updated_at = MAX(?2, created_at)
             WHERE uuid = ?3;",
            params![status.as_str(), updated_at, id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn get_item(&self, id: ContentItemId) -> RepoResult<Option<ContentItem>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_item_row(row)?));
        }

        Ok(None)
    }

    fn list_items(&self, query: &ContentListQuery) -> RepoResult<Vec<ContentItem>> {
        let mut sql = format!("{ITEM_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(kind) = query.kind {
            sql.push_str(" AND kind = ?");
            bind_values.push(Value::Text(kind.as_str().to_string()));
        }

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }

        sql.push_str(" ORDER BY updated_at DESC, uuid ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut items = Vec::new();

        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }

        Ok(items)
    }
}

impl SqliteContentRepository<'_> {
    fn item_exists(&self, id: ContentItemId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM content_items WHERE uuid = ?1);",
            [id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<ContentItem> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid uuid value `{uuid_text}` in content_items.uuid"
        ))
    })?;

    let kind_text: String = row.get("kind")?;
    let kind = ContentKind::parse(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid kind `{kind_text}` in content_items.kind"))
    })?;

    let status_text: String = row.get("status")?;
    let status = ContentStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid status `{status_text}` in content_items.status"
        ))
    })?;

    let source_text: String = row.get("source")?;
    let source = ContentSource::parse(&source_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid source `{source_text}` in content_items.source"
        ))
    })?;

    let structured = match row.get::<_, Option<String>>("structured")? {
        Some(text) => Some(decode_json(&text, "structured")?),
        None => None,
    };

    let item = ContentItem {
        id,
        kind,
        status,
        title: row.get("title")?,
        summary: row.get("summary")?,
        body: row.get("body")?,
        raw_input: row.get("raw_input")?,
        structured,
        source,
        cadence_target: row.get("cadence_target")?,
        topics: decode_json(&row.get::<_, String>("topics")?, "topics")?,
        related_slugs: decode_json(&row.get::<_, String>("related_slugs")?, "related_slugs")?,
        attachments: decode_json(&row.get::<_, String>("attachments")?, "attachments")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    item.validate()?;
    Ok(item)
}

fn encode_json<T: Serialize + ?Sized>(value: &T) -> RepoResult<String> {
    serde_json::to_string(value)
        .map_err(|err| RepoError::InvalidData(format!("failed to encode json column: {err}")))
}

fn decode_json<T: DeserializeOwned>(text: &str, column: &'static str) -> RepoResult<T> {
    serde_json::from_str(text).map_err(|err| {
        RepoError::InvalidData(format!("invalid json in content_items.{column}: {err}"))
    })
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    if !table_exists(conn, "content_items")? {
        return Err(RepoError::MissingRequiredTable("content_items"));
    }

    for column in REQUIRED_COLUMNS {
        if !table_has_column(conn, "content_items", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "content_items",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
