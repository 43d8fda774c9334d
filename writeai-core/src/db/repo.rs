//! Database repository layer
//!
//! Provides query and insert operations for profiles, projects, the usage
//! ledger, audio generations, and templates.

use crate::error::{Error, Result};
use crate::text::{count_chars, count_words};
use crate::types::*;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::PathBuf;
use std::sync::Mutex;

/// Sort key for project list views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectSort {
    /// Most recently modified first (the default)
    #[default]
    Updated,
    /// Lexicographic by title
    Title,
    /// Highest word count first
    Words,
}

/// Status filter for project list views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Draft,
    Completed,
}

/// Filter and ordering for [`Database::list_projects`].
#[derive(Debug, Clone, Default)]
pub struct ProjectQuery {
    pub status: StatusFilter,
    /// Case-insensitive substring match over title and content
    pub search: Option<String>,
    pub sort: ProjectSort,
}

/// Database handle with connection pooling (single connection for now)
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &PathBuf) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable foreign keys and WAL mode for better concurrency
        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        super::schema::run_migrations(&conn)
    }

    /// Get the underlying connection (for advanced use)
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }

    // ============================================
    // Profile operations
    // ============================================

    /// Get a profile by id
    pub fn get_profile(&self, id: &str) -> Result<Option<Profile>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT * FROM profiles WHERE id = ?", [id], |row| {
            Self::row_to_profile(row)
        })
        .optional()
        .map_err(Error::from)
    }

    /// Get a profile, creating a free-plan row with the given monthly word
    /// limit if none exists yet.
    pub fn get_or_create_profile(&self, id: &str, default_limit: i64) -> Result<Profile> {
        if let Some(profile) = self.get_profile(id)? {
            return Ok(profile);
        }

        let now = Utc::now();
        {
            let conn = self.conn.lock().unwrap();
            conn.execute(
                r#"
                INSERT INTO profiles (id, plan_type, api_usage_count, monthly_usage_limit, created_at, updated_at)
                VALUES (?1, 'free', 0, ?2, ?3, ?3)
                "#,
                params![id, default_limit, now.to_rfc3339()],
            )?;
        }

        self.get_profile(id)?
            .ok_or_else(|| Error::ProfileNotFound(id.to_string()))
    }

    /// Add generated words to the running usage counter.
    ///
    /// The counter only ever grows in normal flow; billing rollover goes
    /// through [`Database::reset_api_usage`].
    pub fn add_api_usage(&self, id: &str, words: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE profiles SET api_usage_count = api_usage_count + ?1, updated_at = ?2 WHERE id = ?3",
            params![words.max(0), Utc::now().to_rfc3339(), id],
        )?;
        if updated == 0 {
            return Err(Error::ProfileNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Zero the usage counter at a billing-period rollover.
    pub fn reset_api_usage(&self, id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE profiles SET api_usage_count = 0, updated_at = ?1 WHERE id = ?2",
            params![Utc::now().to_rfc3339(), id],
        )?;
        if updated == 0 {
            return Err(Error::ProfileNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Change a profile's plan and optionally its monthly limit.
    pub fn set_plan(&self, id: &str, plan: PlanKind, limit: Option<i64>) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let updated = match limit {
            Some(limit) => conn.execute(
                "UPDATE profiles SET plan_type = ?1, monthly_usage_limit = ?2, updated_at = ?3 WHERE id = ?4",
                params![plan.as_str(), limit, Utc::now().to_rfc3339(), id],
            )?,
            None => conn.execute(
                "UPDATE profiles SET plan_type = ?1, updated_at = ?2 WHERE id = ?3",
                params![plan.as_str(), Utc::now().to_rfc3339(), id],
            )?,
        };
        if updated == 0 {
            return Err(Error::ProfileNotFound(id.to_string()));
        }
        Ok(())
    }

    fn row_to_profile(row: &Row) -> rusqlite::Result<Profile> {
        let plan_str: String = row.get("plan_type")?;
        Ok(Profile {
            id: row.get("id")?,
            email: row.get("email")?,
            full_name: row.get("full_name")?,
            plan: plan_str.parse().unwrap_or(PlanKind::Free),
            api_usage_count: row.get("api_usage_count")?,
            monthly_usage_limit: row.get("monthly_usage_limit")?,
            subscription_end_date: Self::opt_timestamp(row, "subscription_end_date")?,
            created_at: Self::timestamp(row, "created_at")?,
            updated_at: Self::timestamp(row, "updated_at")?,
        })
    }

    // ============================================
    // Project operations
    // ============================================

    /// Create a new draft project with empty content.
    pub fn create_project(
        &self,
        user_id: &str,
        title: &str,
        tool: &ToolKind,
        language: &str,
    ) -> Result<Project> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();

        {
            let conn = self.conn.lock().unwrap();
            conn.execute(
                r#"
                INSERT INTO projects (id, user_id, title, content, tool_type, status,
                                      word_count, character_count, language, created_at, updated_at)
                VALUES (?1, ?2, ?3, '', ?4, 'draft', 0, 0, ?5, ?6, ?6)
                "#,
                params![id, user_id, title, tool.as_str(), language, now.to_rfc3339()],
            )?;
        }

        self.get_project(user_id, &id)?
            .ok_or_else(|| Error::ProjectNotFound(id))
    }

    /// Get one of the owner's projects by ID.
    ///
    /// Rows are owner-scoped: another user's project id resolves to `None`.
    pub fn get_project(&self, user_id: &str, id: &str) -> Result<Option<Project>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT * FROM projects WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
            |row| Self::row_to_project(row),
        )
        .optional()
        .map_err(Error::from)
    }

    /// Apply a partial update to one of the owner's projects.
    ///
    /// When `content` is part of the update, `word_count` and
    /// `character_count` are recomputed from the new content so the
    /// denormalized counters can never go stale. Only the owning user can
    /// mutate a row; anyone else gets `ProjectNotFound`.
    pub fn update_project(
        &self,
        user_id: &str,
        id: &str,
        update: &ProjectUpdate,
    ) -> Result<Project> {
        let mut project = self
            .get_project(user_id, id)?
            .ok_or_else(|| Error::ProjectNotFound(id.to_string()))?;

        if let Some(title) = &update.title {
            project.title = title.clone();
        }
        if let Some(content) = &update.content {
            project.content = content.clone();
            project.word_count = count_words(content);
            project.character_count = count_chars(content);
        }
        if let Some(tool) = &update.tool {
            project.tool = tool.clone();
        }
        if let Some(prompt) = &update.prompt {
            project.prompt = Some(prompt.clone());
        }
        if let Some(status) = update.status {
            project.status = status;
        }
        if let Some(language) = &update.language {
            project.language = language.clone();
        }
        project.updated_at = Utc::now();

        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            UPDATE projects SET
                title = ?1, content = ?2, tool_type = ?3, prompt = ?4, status = ?5,
                word_count = ?6, character_count = ?7, language = ?8, updated_at = ?9
            WHERE id = ?10 AND user_id = ?11
            "#,
            params![
                project.title,
                project.content,
                project.tool.as_str(),
                project.prompt,
                project.status.as_str(),
                project.word_count,
                project.character_count,
                project.language,
                project.updated_at.to_rfc3339(),
                id,
                user_id,
            ],
        )?;

        Ok(project)
    }

    /// Delete one of the owner's projects by ID.
    pub fn delete_project(&self, user_id: &str, id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            "DELETE FROM projects WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        if deleted == 0 {
            return Err(Error::ProjectNotFound(id.to_string()));
        }
        Ok(())
    }

    /// List one owner's projects with filtering and sorting.
    pub fn list_projects(&self, user_id: &str, query: &ProjectQuery) -> Result<Vec<Project>> {
        let mut sql = String::from("SELECT * FROM projects WHERE user_id = ?1");

        match query.status {
            StatusFilter::All => {}
            StatusFilter::Draft => sql.push_str(" AND status = 'draft'"),
            StatusFilter::Completed => sql.push_str(" AND status = 'completed'"),
        }

        let search = query.search.as_deref().unwrap_or("");
        if !search.is_empty() {
            sql.push_str(" AND (title LIKE '%' || ?2 || '%' OR content LIKE '%' || ?2 || '%')");
        }

        sql.push_str(match query.sort {
            ProjectSort::Updated => " ORDER BY updated_at DESC",
            ProjectSort::Title => " ORDER BY title COLLATE NOCASE ASC",
            ProjectSort::Words => " ORDER BY word_count DESC",
        });

        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&sql)?;

        let rows = if search.is_empty() {
            stmt.query_map(params![user_id], Self::row_to_project)?
                .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
            stmt.query_map(params![user_id, search], Self::row_to_project)?
                .collect::<rusqlite::Result<Vec<_>>>()?
        };

        Ok(rows)
    }

    fn row_to_project(row: &Row) -> rusqlite::Result<Project> {
        let tool_str: String = row.get("tool_type")?;
        let status_str: String = row.get("status")?;

        Ok(Project {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            title: row.get("title")?,
            content: row.get("content")?,
            tool: ToolKind::from(tool_str),
            prompt: row.get("prompt")?,
            status: status_str.parse().unwrap_or(ProjectStatus::Draft),
            word_count: row.get("word_count")?,
            character_count: row.get("character_count")?,
            language: row.get("language")?,
            created_at: Self::timestamp(row, "created_at")?,
            updated_at: Self::timestamp(row, "updated_at")?,
        })
    }

    // ============================================
    // Usage ledger operations
    // ============================================

    /// Append one entry to the usage ledger.
    pub fn log_usage(&self, user_id: &str, action: &ActionKind, delta: &UsageDelta) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO usage_events (user_id, action_type, tool_used, words_generated,
                                      characters_generated, audio_seconds_generated, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                user_id,
                action.as_str(),
                delta.tool_used.as_ref().map(|t| t.as_str().to_string()),
                delta.words_generated.max(0),
                delta.characters_generated.max(0),
                delta.audio_seconds_generated.max(0),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Aggregate the ledger for one owner since a point in time, optionally
    /// restricted to one action type.
    pub fn usage_since(
        &self,
        user_id: &str,
        action: Option<&ActionKind>,
        since: DateTime<Utc>,
    ) -> Result<UsageTotals> {
        let conn = self.conn.lock().unwrap();

        let map = |row: &Row| -> rusqlite::Result<UsageTotals> {
            Ok(UsageTotals {
                events: row.get(0)?,
                words: row.get::<_, Option<i64>>(1)?.unwrap_or(0),
                characters: row.get::<_, Option<i64>>(2)?.unwrap_or(0),
                audio_seconds: row.get::<_, Option<i64>>(3)?.unwrap_or(0),
            })
        };

        let totals = match action {
            Some(action) => conn.query_row(
                r#"
                SELECT COUNT(*), SUM(words_generated), SUM(characters_generated), SUM(audio_seconds_generated)
                FROM usage_events
                WHERE user_id = ?1 AND action_type = ?2 AND created_at >= ?3
                "#,
                params![user_id, action.as_str(), since.to_rfc3339()],
                map,
            )?,
            None => conn.query_row(
                r#"
                SELECT COUNT(*), SUM(words_generated), SUM(characters_generated), SUM(audio_seconds_generated)
                FROM usage_events
                WHERE user_id = ?1 AND created_at >= ?2
                "#,
                params![user_id, since.to_rfc3339()],
                map,
            )?,
        };

        Ok(totals)
    }

    /// List ledger entries for one owner since a point in time, newest first.
    pub fn list_usage_events(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<UsageEvent>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM usage_events
            WHERE user_id = ?1 AND created_at >= ?2
            ORDER BY created_at DESC
            "#,
        )?;

        let rows = stmt
            .query_map(
                params![user_id, since.to_rfc3339()],
                Self::row_to_usage_event,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    fn row_to_usage_event(row: &Row) -> rusqlite::Result<UsageEvent> {
        let action_str: String = row.get("action_type")?;
        let tool_str: Option<String> = row.get("tool_used")?;

        Ok(UsageEvent {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            action: ActionKind::from(action_str),
            tool_used: tool_str.map(ToolKind::from),
            words_generated: row.get("words_generated")?,
            characters_generated: row.get("characters_generated")?,
            audio_seconds_generated: row.get("audio_seconds_generated")?,
            created_at: Self::timestamp(row, "created_at")?,
        })
    }

    // ============================================
    // Audio generation operations
    // ============================================

    /// Insert an audio generation row.
    pub fn insert_audio_generation(&self, audio: &AudioGeneration) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO audio_generations (id, user_id, project_id, text_content, voice_id,
                                           voice_name, stability, similarity_boost, style,
                                           audio_url, duration_seconds, file_size_bytes,
                                           status, error_message, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
            params![
                audio.id,
                audio.user_id,
                audio.project_id,
                audio.text_content,
                audio.voice_id,
                audio.voice_name,
                audio.settings.stability,
                audio.settings.similarity_boost,
                audio.settings.style,
                audio.audio_url,
                audio.duration_seconds,
                audio.file_size_bytes,
                audio.status.as_str(),
                audio.error_message,
                audio.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// List one owner's audio generations, newest first.
    pub fn list_audio_generations(&self, user_id: &str) -> Result<Vec<AudioGeneration>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT * FROM audio_generations WHERE user_id = ?1 ORDER BY created_at DESC",
        )?;

        let rows = stmt
            .query_map([user_id], Self::row_to_audio)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    /// Count one owner's audio generations (completed only).
    pub fn count_audio_generations(&self, user_id: &str) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let count = conn.query_row(
            "SELECT COUNT(*) FROM audio_generations WHERE user_id = ?1 AND status = 'completed'",
            [user_id],
            |r| r.get(0),
        )?;
        Ok(count)
    }

    fn row_to_audio(row: &Row) -> rusqlite::Result<AudioGeneration> {
        let status_str: String = row.get("status")?;

        Ok(AudioGeneration {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            project_id: row.get("project_id")?,
            text_content: row.get("text_content")?,
            voice_id: row.get("voice_id")?,
            voice_name: row.get("voice_name")?,
            settings: VoiceSettings {
                stability: row.get("stability")?,
                similarity_boost: row.get("similarity_boost")?,
                style: row.get("style")?,
            },
            audio_url: row.get("audio_url")?,
            duration_seconds: row.get("duration_seconds")?,
            file_size_bytes: row.get("file_size_bytes")?,
            status: status_str.parse().unwrap_or(AudioStatus::Pending),
            error_message: row.get("error_message")?,
            created_at: Self::timestamp(row, "created_at")?,
        })
    }

    // ============================================
    // Template operations
    // ============================================

    /// Create a new template.
    pub fn create_template(
        &self,
        user_id: &str,
        name: &str,
        description: Option<&str>,
        category: &str,
        content: &str,
        is_public: bool,
    ) -> Result<Template> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();

        {
            let conn = self.conn.lock().unwrap();
            conn.execute(
                r#"
                INSERT INTO templates (id, user_id, name, description, category, content,
                                       is_public, usage_count, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, ?8)
                "#,
                params![
                    id,
                    user_id,
                    name,
                    description,
                    category,
                    content,
                    is_public,
                    now.to_rfc3339()
                ],
            )?;
        }

        self.get_template(&id)?
            .ok_or_else(|| Error::TemplateNotFound(id))
    }

    /// Get a template by ID
    pub fn get_template(&self, id: &str) -> Result<Option<Template>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT * FROM templates WHERE id = ?", [id], |row| {
            Self::row_to_template(row)
        })
        .optional()
        .map_err(Error::from)
    }

    /// List one owner's templates, newest first.
    pub fn list_user_templates(&self, user_id: &str) -> Result<Vec<Template>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT * FROM templates WHERE user_id = ?1 ORDER BY created_at DESC")?;

        let rows = stmt
            .query_map([user_id], Self::row_to_template)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    /// List public templates, most used first.
    pub fn list_public_templates(&self) -> Result<Vec<Template>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT * FROM templates WHERE is_public = 1 ORDER BY usage_count DESC")?;

        let rows = stmt
            .query_map([], Self::row_to_template)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    /// Bump a template's usage counter.
    pub fn touch_template(&self, id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE templates SET usage_count = usage_count + 1, updated_at = ?1 WHERE id = ?2",
            params![Utc::now().to_rfc3339(), id],
        )?;
        if updated == 0 {
            return Err(Error::TemplateNotFound(id.to_string()));
        }
        Ok(())
    }

    fn row_to_template(row: &Row) -> rusqlite::Result<Template> {
        Ok(Template {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            category: row.get("category")?,
            content: row.get("content")?,
            is_public: row.get("is_public")?,
            usage_count: row.get("usage_count")?,
            created_at: Self::timestamp(row, "created_at")?,
            updated_at: Self::timestamp(row, "updated_at")?,
        })
    }

    // ============================================
    // Shared row helpers
    // ============================================

    // An unparsable stored timestamp is a conversion error, never silently
    // replaced by the current time.
    fn parse_timestamp(value: &str) -> rusqlite::Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })
    }

    fn timestamp(row: &Row, column: &str) -> rusqlite::Result<DateTime<Utc>> {
        let value: String = row.get(column)?;
        Self::parse_timestamp(&value)
    }

    fn opt_timestamp(row: &Row, column: &str) -> rusqlite::Result<Option<DateTime<Utc>>> {
        let value: Option<String> = row.get(column)?;
        value.as_deref().map(Self::parse_timestamp).transpose()
    }
}
