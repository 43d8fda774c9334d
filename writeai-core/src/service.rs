//! High-level generation workflows.
//!
//! [`Studio`] ties the pieces together: it resolves the profile, enforces the
//! free-plan quota, calls the configured provider, persists the result, and
//! appends to the usage ledger. Ledger writes are best-effort and only logged
//! on failure; project and profile writes are not.

use std::path::PathBuf;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::catalog;
use crate::config::Config;
use crate::db::{Database, ProjectQuery};
use crate::error::{Error, Result};
use crate::providers::{elevenlabs, TextClient, TextGeneration, VoiceClient};
use crate::quota::{self, QuotaDecision};
use crate::stats::{self, DashboardStats, StatsOptions};
use crate::types::{
    ActionKind, AudioGeneration, AudioStatus, Profile, Project, ProjectUpdate, ToolKind,
    UsageDelta, VoiceSettings,
};

/// Facade over storage, quota, and the generation providers.
///
/// Providers are optional: a `Studio` built from a config without an
/// `[openai]` or `[elevenlabs]` section still serves every local operation,
/// and the corresponding generate call fails with a configuration error.
pub struct Studio {
    db: Database,
    text: Option<TextClient>,
    voice: Option<VoiceClient>,
    default_monthly_words: i64,
    audio_dir: PathBuf,
}

impl Studio {
    /// Build a studio from configuration and an opened database.
    pub fn new(config: &Config, db: Database) -> Result<Self> {
        let text = match &config.openai {
            Some(openai) => Some(TextClient::new(openai.clone())?),
            None => None,
        };
        let voice = match &config.elevenlabs {
            Some(elevenlabs) => Some(VoiceClient::new(elevenlabs.clone())?),
            None => None,
        };

        Ok(Self {
            db,
            text,
            voice,
            default_monthly_words: config.quota.free_monthly_words,
            audio_dir: Config::audio_dir(),
        })
    }

    /// Override where synthesized audio files are written.
    pub fn with_audio_dir(mut self, dir: PathBuf) -> Self {
        self.audio_dir = dir;
        self
    }

    /// Direct access to the repository, for read paths the facade does not
    /// wrap (templates, raw event listings).
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Resolve the profile, creating a free-plan row on first contact.
    pub fn profile(&self, user_id: &str) -> Result<Profile> {
        self.db
            .get_or_create_profile(user_id, self.default_monthly_words)
    }

    /// Create an empty draft project and record it in the ledger.
    pub fn create_project(
        &self,
        user_id: &str,
        title: &str,
        tool: &ToolKind,
        language: &str,
    ) -> Result<Project> {
        self.profile(user_id)?;
        let project = self.db.create_project(user_id, title, tool, language)?;
        info!(project_id = %project.id, tool = %tool, "created project");

        self.log_usage_best_effort(
            user_id,
            &ActionKind::ProjectCreated,
            &UsageDelta {
                tool_used: Some(tool.clone()),
                ..Default::default()
            },
        );

        Ok(project)
    }

    /// Generate content for a prompt and persist it.
    ///
    /// The free-plan quota is checked against the profile counter before the
    /// provider is called. On success the content lands in `project_id` (or a
    /// new project titled from the prompt), a ledger entry is appended, and
    /// the generated word count is added to the usage counter. There is no
    /// rollback: once the provider has produced words they count, even if the
    /// ledger write fails.
    pub async fn generate_text(
        &self,
        user_id: &str,
        project_id: Option<&str>,
        prompt: &str,
        tool: &ToolKind,
        language: &str,
        max_tokens: Option<u32>,
    ) -> Result<Project> {
        let client = self.checked_text_client(user_id)?;
        let generation = client.generate(prompt, tool, language, max_tokens).await?;
        info!(
            user_id,
            tool = %tool,
            words = generation.word_count,
            "generated content"
        );

        let update = ProjectUpdate {
            content: Some(generation.content.clone()),
            prompt: Some(prompt.to_string()),
            tool: Some(tool.clone()),
            ..Default::default()
        };

        let project = match project_id {
            Some(id) => self.db.update_project(user_id, id, &update)?,
            None => {
                let created =
                    self.db
                        .create_project(user_id, &title_from_prompt(prompt), tool, language)?;
                self.db.update_project(user_id, &created.id, &update)?
            }
        };

        self.log_usage_best_effort(
            user_id,
            &ActionKind::ContentGenerated,
            &UsageDelta {
                tool_used: Some(tool.clone()),
                words_generated: generation.word_count,
                characters_generated: generation.character_count,
                ..Default::default()
            },
        );

        self.db.add_api_usage(user_id, generation.word_count)?;

        Ok(project)
    }

    /// One chat turn with the assistant persona.
    ///
    /// Quota-gated and metered like any other generation, but the reply is
    /// ephemeral: nothing is saved as a project.
    pub async fn chat(
        &self,
        user_id: &str,
        message: &str,
        language: &str,
    ) -> Result<TextGeneration> {
        let client = self.checked_text_client(user_id)?;
        let generation = client
            .generate(message, &ToolKind::Chat, language, None)
            .await?;
        info!(user_id, words = generation.word_count, "chat reply");

        self.log_usage_best_effort(
            user_id,
            &ActionKind::ContentGenerated,
            &UsageDelta {
                tool_used: Some(ToolKind::Chat),
                words_generated: generation.word_count,
                characters_generated: generation.character_count,
                ..Default::default()
            },
        );

        self.db.add_api_usage(user_id, generation.word_count)?;

        Ok(generation)
    }

    /// Synthesize speech for a text and persist the result.
    ///
    /// A failed synthesis still leaves a `failed` row behind so the history
    /// view can show what went wrong; the original error is returned.
    pub async fn generate_audio(
        &self,
        user_id: &str,
        project_id: Option<&str>,
        text: &str,
        voice_id: &str,
        settings: VoiceSettings,
    ) -> Result<AudioGeneration> {
        self.profile(user_id)?;

        let client = self.voice.as_ref().ok_or_else(|| {
            Error::Config(
                "voice synthesis is not configured (add an [elevenlabs] section)".to_string(),
            )
        })?;

        let voice_name = catalog::find_voice(voice_id)
            .map(|voice| voice.name.to_string())
            .unwrap_or_else(|| voice_id.to_string());

        let now = Utc::now();
        let mut audio = AudioGeneration {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            project_id: project_id.map(str::to_string),
            text_content: text.to_string(),
            voice_id: voice_id.to_string(),
            voice_name,
            settings: settings.clamped(),
            audio_url: None,
            duration_seconds: None,
            file_size_bytes: None,
            status: AudioStatus::Pending,
            error_message: None,
            created_at: now,
        };

        let bytes = match client.synthesize(text, voice_id, settings).await {
            Ok(bytes) => bytes,
            Err(e) => {
                audio.status = AudioStatus::Failed;
                audio.error_message = Some(e.to_string());
                if let Err(db_err) = self.db.insert_audio_generation(&audio) {
                    warn!(error = %db_err, "failed to record failed audio generation");
                }
                return Err(e);
            }
        };

        std::fs::create_dir_all(&self.audio_dir)?;
        let file_name = format!("audio_{}_{}.mp3", now.timestamp_millis(), voice_id);
        let file_path = self.audio_dir.join(&file_name);
        std::fs::write(&file_path, &bytes)?;

        audio.status = AudioStatus::Completed;
        audio.audio_url = Some(file_path.to_string_lossy().into_owned());
        audio.duration_seconds = Some(elevenlabs::estimate_duration_secs(text));
        audio.file_size_bytes = Some(bytes.len() as i64);
        self.db.insert_audio_generation(&audio)?;

        info!(
            user_id,
            voice_id,
            seconds = audio.duration_seconds,
            "generated audio"
        );

        self.log_usage_best_effort(
            user_id,
            &ActionKind::AudioGenerated,
            &UsageDelta {
                tool_used: Some(ToolKind::Tts),
                audio_seconds_generated: audio.duration_seconds.unwrap_or(0),
                ..Default::default()
            },
        );

        Ok(audio)
    }

    /// Compute the dashboard for one owner from live data.
    pub fn dashboard(&self, user_id: &str, opts: StatsOptions) -> Result<DashboardStats> {
        let projects = self.db.list_projects(user_id, &ProjectQuery::default())?;
        let audio_count = self.db.count_audio_generations(user_id)?;
        Ok(stats::compute(&projects, audio_count, Utc::now(), opts))
    }

    /// Resolve profile and quota before handing out the text client.
    fn checked_text_client(&self, user_id: &str) -> Result<&TextClient> {
        let profile = self.profile(user_id)?;

        if let QuotaDecision::Denied { used, limit } = quota::check_profile(&profile) {
            debug!(user_id, used, limit, "generation blocked by quota");
            return Err(Error::QuotaExceeded { used, limit });
        }

        self.text.as_ref().ok_or_else(|| {
            Error::Config("text generation is not configured (add an [openai] section)".to_string())
        })
    }

    fn log_usage_best_effort(&self, user_id: &str, action: &ActionKind, delta: &UsageDelta) {
        if let Err(e) = self.db.log_usage(user_id, action, delta) {
            warn!(user_id, action = %action, error = %e, "failed to append usage event");
        }
    }
}

/// Derive a project title from the prompt: the first 60 characters, with an
/// ellipsis when truncated.
fn title_from_prompt(prompt: &str) -> String {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return "Untitled".to_string();
    }
    let truncated: String = trimmed.chars().take(60).collect();
    if truncated.chars().count() < trimmed.chars().count() {
        format!("{}...", truncated)
    } else {
        truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PlanKind;

    fn test_studio() -> Studio {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        Studio::new(&Config::default(), db).unwrap()
    }

    #[test]
    fn test_title_from_prompt() {
        assert_eq!(title_from_prompt("Write about cats"), "Write about cats");
        assert_eq!(title_from_prompt("   "), "Untitled");

        let long = "x".repeat(80);
        let title = title_from_prompt(&long);
        assert_eq!(title.chars().count(), 63);
        assert!(title.ends_with("..."));
    }

    #[test]
    fn test_create_project_appends_ledger_entry() {
        let studio = test_studio();
        let project = studio
            .create_project("owner", "Draft one", &ToolKind::Article, "en")
            .unwrap();
        assert_eq!(project.title, "Draft one");

        let since = Utc::now() - chrono::Duration::hours(1);
        let totals = studio
            .database()
            .usage_since("owner", Some(&ActionKind::ProjectCreated), since)
            .unwrap();
        assert_eq!(totals.events, 1);
    }

    #[tokio::test]
    async fn test_generate_text_blocked_by_quota() {
        let studio = test_studio();
        let profile = studio.profile("owner").unwrap();
        assert_eq!(profile.plan, PlanKind::Free);

        studio
            .database()
            .add_api_usage("owner", profile.monthly_usage_limit)
            .unwrap();

        let err = studio
            .generate_text("owner", None, "write something", &ToolKind::Article, "en", None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::QuotaExceeded { used: 10_000, limit: 10_000 }));
    }

    #[tokio::test]
    async fn test_generate_text_requires_provider_config() {
        let studio = test_studio();
        let err = studio
            .generate_text("owner", None, "write something", &ToolKind::Article, "en", None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_chat_is_quota_gated() {
        let studio = test_studio();
        let profile = studio.profile("owner").unwrap();
        studio
            .database()
            .add_api_usage("owner", profile.monthly_usage_limit)
            .unwrap();

        let err = studio.chat("owner", "hello", "en").await.unwrap_err();
        assert!(matches!(err, Error::QuotaExceeded { .. }));
    }

    #[tokio::test]
    async fn test_generate_audio_requires_provider_config() {
        let studio = test_studio();
        let err = studio
            .generate_audio("owner", None, "read this", "en-us-ana", VoiceSettings::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_dashboard_over_live_data() {
        let studio = test_studio();
        studio
            .create_project("owner", "One", &ToolKind::Article, "en")
            .unwrap();
        studio
            .create_project("owner", "Two", &ToolKind::Email, "en")
            .unwrap();

        let dashboard = studio.dashboard("owner", StatsOptions::default()).unwrap();
        assert_eq!(dashboard.total_projects, 2);
        assert_eq!(dashboard.weekly_projects, 2);
        assert_eq!(dashboard.audio_generations, 0);
        assert_eq!(dashboard.top_tools.len(), 2);
    }
}
