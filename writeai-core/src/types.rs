//! Core domain types for writeai
//!
//! These types represent the canonical data model behind the writing
//! assistant: profiles (plan + quota), writing projects, the append-only
//! usage ledger, audio generations, and reusable templates.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Profile** | An account row carrying plan tier and the running word-usage counter |
//! | **Project** | A writing artifact (title + content) produced or edited with a tool |
//! | **Tool** | A generation persona/template (article, email, rewrite, ...) |
//! | **Usage event** | One immutable ledger entry recording a trackable action |
//! | **Audio generation** | A persisted text-to-speech result referencing an audio file |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================
// Tools
// ============================================

/// Which generation persona produced or edits a project.
///
/// The set is closed at the UI boundary, but rows written by older builds may
/// carry tags we no longer ship, so unknown tags round-trip via `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ToolKind {
    Rewrite,
    Article,
    Email,
    Social,
    Product,
    Correction,
    Chat,
    Tts,
    Audiobook,
    /// Unrecognized tag, preserved verbatim
    Other(String),
}

impl ToolKind {
    pub fn as_str(&self) -> &str {
        match self {
            ToolKind::Rewrite => "rewrite",
            ToolKind::Article => "article",
            ToolKind::Email => "email",
            ToolKind::Social => "social",
            ToolKind::Product => "product",
            ToolKind::Correction => "correction",
            ToolKind::Chat => "chat",
            ToolKind::Tts => "tts",
            ToolKind::Audiobook => "audiobook",
            ToolKind::Other(tag) => tag,
        }
    }

    /// Human-friendly name for dashboards and list views.
    pub fn display_name(&self) -> &str {
        match self {
            ToolKind::Rewrite => "Smart Rewrite",
            ToolKind::Article => "Articles",
            ToolKind::Email => "Emails",
            ToolKind::Social => "Social Posts",
            ToolKind::Product => "Product Copy",
            ToolKind::Correction => "Proofreading",
            ToolKind::Chat => "AI Chat",
            ToolKind::Tts => "Text-to-Speech",
            ToolKind::Audiobook => "Audiobooks",
            ToolKind::Other(tag) => tag,
        }
    }
}

impl From<String> for ToolKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "rewrite" => ToolKind::Rewrite,
            "article" => ToolKind::Article,
            "email" => ToolKind::Email,
            "social" => ToolKind::Social,
            "product" => ToolKind::Product,
            "correction" => ToolKind::Correction,
            "chat" => ToolKind::Chat,
            "tts" => ToolKind::Tts,
            "audiobook" => ToolKind::Audiobook,
            _ => ToolKind::Other(s),
        }
    }
}

impl From<&str> for ToolKind {
    fn from(s: &str) -> Self {
        ToolKind::from(s.to_string())
    }
}

impl From<ToolKind> for String {
    fn from(tool: ToolKind) -> Self {
        tool.as_str().to_string()
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================
// Profile / Plan
// ============================================

/// Subscription tier controlling quota enforcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanKind {
    Free,
    Premium,
    Enterprise,
}

impl PlanKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanKind::Free => "free",
            PlanKind::Premium => "premium",
            PlanKind::Enterprise => "enterprise",
        }
    }
}

impl std::str::FromStr for PlanKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(PlanKind::Free),
            "premium" => Ok(PlanKind::Premium),
            "enterprise" => Ok(PlanKind::Enterprise),
            _ => Err(format!("unknown plan type: {}", s)),
        }
    }
}

/// An account profile.
///
/// `api_usage_count` is the running total of words produced by successful
/// text generations. It is never decremented by normal flow; billing-period
/// rollover is an explicit operation (`Database::reset_api_usage`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub plan: PlanKind,
    /// Words consumed against the monthly quota
    pub api_usage_count: i64,
    /// Quota ceiling, enforced only for the free plan
    pub monthly_usage_limit: i64,
    pub subscription_end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================
// Projects
// ============================================

/// Lifecycle status of a writing project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Draft,
    Completed,
    Archived,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Draft => "draft",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Archived => "archived",
        }
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ProjectStatus::Draft),
            "completed" => Ok(ProjectStatus::Completed),
            "archived" => Ok(ProjectStatus::Archived),
            _ => Err(format!("unknown project status: {}", s)),
        }
    }
}

/// A writing artifact owned by one profile.
///
/// `word_count` and `character_count` are derivable from `content` and are
/// recomputed on every content write; they are denormalized so list views
/// and aggregation never re-scan bodies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub tool: ToolKind,
    /// The prompt that produced the current content, if any
    pub prompt: Option<String>,
    pub status: ProjectStatus,
    pub word_count: i64,
    pub character_count: i64,
    /// BCP-47-ish language tag used for generation ("en", "pt-BR", ...)
    pub language: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update for a project. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProjectUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tool: Option<ToolKind>,
    pub prompt: Option<String>,
    pub status: Option<ProjectStatus>,
    pub language: Option<String>,
}

// ============================================
// Usage ledger
// ============================================

/// What a ledger entry records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionKind {
    ProjectCreated,
    ContentGenerated,
    AudioGenerated,
    /// Unrecognized action tag, preserved verbatim
    Other(String),
}

impl ActionKind {
    pub fn as_str(&self) -> &str {
        match self {
            ActionKind::ProjectCreated => "project_created",
            ActionKind::ContentGenerated => "content_generated",
            ActionKind::AudioGenerated => "audio_generated",
            ActionKind::Other(tag) => tag,
        }
    }
}

impl From<String> for ActionKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "project_created" => ActionKind::ProjectCreated,
            "content_generated" => ActionKind::ContentGenerated,
            "audio_generated" => ActionKind::AudioGenerated,
            _ => ActionKind::Other(s),
        }
    }
}

impl From<ActionKind> for String {
    fn from(action: ActionKind) -> Self {
        action.as_str().to_string()
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable ledger entry. Appended after successful actions, read only
/// in aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageEvent {
    pub id: i64,
    pub user_id: String,
    pub action: ActionKind,
    pub tool_used: Option<ToolKind>,
    pub words_generated: i64,
    pub characters_generated: i64,
    pub audio_seconds_generated: i64,
    pub created_at: DateTime<Utc>,
}

/// Deltas for a new ledger entry. Zero fields mean "not applicable".
#[derive(Debug, Clone, Default)]
pub struct UsageDelta {
    pub tool_used: Option<ToolKind>,
    pub words_generated: i64,
    pub characters_generated: i64,
    pub audio_seconds_generated: i64,
}

/// Aggregate read over the ledger for one owner and time window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageTotals {
    pub events: i64,
    pub words: i64,
    pub characters: i64,
    pub audio_seconds: i64,
}

// ============================================
// Audio generations
// ============================================

/// Lifecycle status of a text-to-speech request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl AudioStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioStatus::Pending => "pending",
            AudioStatus::Processing => "processing",
            AudioStatus::Completed => "completed",
            AudioStatus::Failed => "failed",
        }
    }
}

impl std::str::FromStr for AudioStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AudioStatus::Pending),
            "processing" => Ok(AudioStatus::Processing),
            "completed" => Ok(AudioStatus::Completed),
            "failed" => Ok(AudioStatus::Failed),
            _ => Err(format!("unknown audio status: {}", s)),
        }
    }
}

/// Synthesis knobs forwarded to the voice provider. Each value is in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    pub stability: f64,
    pub similarity_boost: f64,
    pub style: f64,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.5,
            similarity_boost: 0.75,
            style: 0.3,
        }
    }
}

impl VoiceSettings {
    /// Clamp every knob into the provider's accepted [0, 1] range.
    pub fn clamped(self) -> Self {
        Self {
            stability: self.stability.clamp(0.0, 1.0),
            similarity_boost: self.similarity_boost.clamp(0.0, 1.0),
            style: self.style.clamp(0.0, 1.0),
        }
    }
}

/// A persisted text-to-speech result. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioGeneration {
    pub id: String,
    pub user_id: String,
    pub project_id: Option<String>,
    pub text_content: String,
    pub voice_id: String,
    pub voice_name: String,
    pub settings: VoiceSettings,
    /// Path or URL of the stored audio file, once completed
    pub audio_url: Option<String>,
    pub duration_seconds: Option<i64>,
    pub file_size_bytes: Option<i64>,
    pub status: AudioStatus,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ============================================
// Templates
// ============================================

/// A reusable content template with `{variable}` placeholders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub content: String,
    pub is_public: bool,
    pub usage_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_kind_round_trip() {
        assert_eq!(ToolKind::from("article"), ToolKind::Article);
        assert_eq!(ToolKind::Article.as_str(), "article");

        let unknown = ToolKind::from("screenplay");
        assert_eq!(unknown, ToolKind::Other("screenplay".to_string()));
        assert_eq!(unknown.as_str(), "screenplay");
        assert_eq!(unknown.display_name(), "screenplay");
    }

    #[test]
    fn test_action_kind_round_trip() {
        assert_eq!(
            ActionKind::from("content_generated".to_string()),
            ActionKind::ContentGenerated
        );
        assert_eq!(
            ActionKind::from("export_pdf".to_string()).as_str(),
            "export_pdf"
        );
    }

    #[test]
    fn test_plan_kind_parse() {
        assert_eq!("premium".parse::<PlanKind>().unwrap(), PlanKind::Premium);
        assert!("platinum".parse::<PlanKind>().is_err());
    }

    #[test]
    fn test_voice_settings_clamped() {
        let settings = VoiceSettings {
            stability: 1.7,
            similarity_boost: -0.2,
            style: 0.3,
        }
        .clamped();
        assert_eq!(settings.stability, 1.0);
        assert_eq!(settings.similarity_boost, 0.0);
        assert_eq!(settings.style, 0.3);
    }
}
