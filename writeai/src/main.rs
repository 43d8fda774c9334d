//! writeai - AI Writing Assistant
//!
//! This tool provides commands for:
//! - Managing writing projects (create, list, show, delete)
//! - Generating content and speech through the configured providers
//! - Inspecting usage, quota, and dashboard statistics
//!
//! Uses XDG Base Directory specification for file locations:
//! - Database: $XDG_DATA_HOME/writeai/data.db (~/.local/share/writeai/data.db)
//! - Config: $XDG_CONFIG_HOME/writeai/config.toml (~/.config/writeai/config.toml)

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use writeai_core::catalog::{self, ToolCategory, VoiceTier};
use writeai_core::db::{ProjectQuery, ProjectSort, StatusFilter};
use writeai_core::format;
use writeai_core::stats::StatsOptions;
use writeai_core::types::{PlanKind, ProjectStatus, ProjectUpdate, ToolKind, VoiceSettings};
use writeai_core::{Config, Database, Studio};

#[derive(Parser)]
#[command(name = "writeai")]
#[command(about = "AI writing assistant")]
#[command(version)]
struct Args {
    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Profile to operate on
    #[arg(short, long, default_value = "default", global = true)]
    user: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List projects
    List {
        /// Filter by status (all, draft, completed)
        #[arg(short, long, default_value = "all")]
        status: String,

        /// Case-insensitive search over title and content
        #[arg(short = 'q', long)]
        search: Option<String>,

        /// Sort order (date, title, words)
        #[arg(long, default_value = "date")]
        sort: String,
    },

    /// Create an empty draft project
    New {
        /// Project title
        title: String,

        /// Writing tool (article, email, rewrite, ...)
        #[arg(short, long, default_value = "article")]
        tool: String,

        /// Output language tag
        #[arg(short, long, default_value = "en")]
        language: String,
    },

    /// Show one project in full
    Show {
        /// Project id
        id: String,
    },

    /// Edit a project's title, content, status, or language
    Edit {
        /// Project id
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// Replacement content (word counts are recomputed)
        #[arg(long)]
        content: Option<String>,

        /// New status (draft, completed, archived)
        #[arg(long)]
        status: Option<String>,

        /// New language tag
        #[arg(long)]
        language: Option<String>,
    },

    /// Delete a project
    Rm {
        /// Project id
        id: String,
    },

    /// Generate content for a prompt
    Generate {
        /// The prompt to generate from
        prompt: String,

        /// Writing tool persona (article, email, rewrite, ...)
        #[arg(short, long, default_value = "article")]
        tool: String,

        /// Output language tag
        #[arg(short, long, default_value = "en")]
        language: String,

        /// Save into an existing project instead of creating one
        #[arg(short, long)]
        project: Option<String>,

        /// Token ceiling for this generation
        #[arg(long)]
        max_tokens: Option<u32>,
    },

    /// Synthesize speech for a text
    Tts {
        /// The text to read aloud
        text: String,

        /// Voice id (see `writeai voices`)
        #[arg(long, default_value = "en-us-ana")]
        voice: String,

        /// Voice stability, 0.0 to 1.0
        #[arg(long, default_value_t = 0.5)]
        stability: f64,

        /// Voice similarity boost, 0.0 to 1.0
        #[arg(long, default_value_t = 0.75)]
        similarity: f64,

        /// Style exaggeration, 0.0 to 1.0
        #[arg(long, default_value_t = 0.3)]
        style: f64,

        /// Attach the result to an existing project
        #[arg(short, long)]
        project: Option<String>,
    },

    /// Ask the assistant a question without saving a project
    Chat {
        /// The message to send
        message: String,

        /// Reply language tag
        #[arg(short, long, default_value = "en")]
        language: String,
    },

    /// Show the dashboard statistics
    Stats,

    /// Show usage totals and quota state
    Usage {
        /// Trailing window in days
        #[arg(short, long, default_value_t = 30)]
        days: i64,
    },

    /// Zero the usage counter at a billing rollover
    ResetUsage,

    /// List templates
    Templates {
        /// Show public templates instead of your own
        #[arg(short, long)]
        public: bool,
    },

    /// Create a template with {variable} placeholders
    NewTemplate {
        /// Template name
        name: String,

        /// Template body
        content: String,

        /// Category label (email, social, ...)
        #[arg(short, long, default_value = "general")]
        category: String,

        /// One-line description
        #[arg(short, long)]
        description: Option<String>,

        /// Make the template visible to everyone
        #[arg(long)]
        public: bool,
    },

    /// Render a template with variables
    Render {
        /// Template id
        id: String,

        /// Variables as key=value pairs
        #[arg(long = "var")]
        vars: Vec<String>,
    },

    /// List the built-in writing tools
    Tools,

    /// List the built-in voices
    Voices,

    /// Show configuration and provider status
    Status,
}

/// Returns $HOME or panics
fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .expect("HOME environment variable not set")
}

/// Sets XDG environment variables to ensure the core library uses XDG paths
fn ensure_xdg_env() {
    let home = home_dir();

    if std::env::var("XDG_DATA_HOME").is_err() {
        std::env::set_var("XDG_DATA_HOME", home.join(".local/share"));
    }

    if std::env::var("XDG_STATE_HOME").is_err() {
        std::env::set_var("XDG_STATE_HOME", home.join(".local/state"));
    }

    if std::env::var("XDG_CONFIG_HOME").is_err() {
        std::env::set_var("XDG_CONFIG_HOME", home.join(".config"));
    }
}

fn open_studio(config: &Config) -> Result<Studio> {
    let db_path = Config::database_path();
    let db = Database::open(&db_path).context("failed to open database")?;
    db.migrate().context("failed to run database migrations")?;
    Studio::new(config, db).context("failed to initialize providers")
}

fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());
    bar.set_message(message.to_string());
    bar.enable_steady_tick(std::time::Duration::from_millis(100));
    bar
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    ensure_xdg_env();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging if verbose
    let _log_guard = if args.verbose {
        Some(
            writeai_core::logging::init(&config.logging)
                .context("failed to initialize logging")?,
        )
    } else {
        None
    };

    tracing::info!("writeai starting up");

    let user = args.user.as_str();

    match args.command {
        Command::List {
            status,
            search,
            sort,
        } => cmd_list(&config, user, &status, search, &sort),
        Command::New {
            title,
            tool,
            language,
        } => cmd_new(&config, user, &title, &tool, &language),
        Command::Show { id } => cmd_show(&config, user, &id),
        Command::Edit {
            id,
            title,
            content,
            status,
            language,
        } => cmd_edit(&config, user, &id, title, content, status, language),
        Command::Rm { id } => cmd_rm(&config, user, &id),
        Command::Generate {
            prompt,
            tool,
            language,
            project,
            max_tokens,
        } => {
            cmd_generate(
                &config,
                user,
                &prompt,
                &tool,
                &language,
                project.as_deref(),
                max_tokens,
            )
            .await
        }
        Command::Tts {
            text,
            voice,
            stability,
            similarity,
            style,
            project,
        } => {
            let settings = VoiceSettings {
                stability,
                similarity_boost: similarity,
                style,
            };
            cmd_tts(&config, user, &text, &voice, settings, project.as_deref()).await
        }
        Command::Chat { message, language } => cmd_chat(&config, user, &message, &language).await,
        Command::Stats => cmd_stats(&config, user),
        Command::Usage { days } => cmd_usage(&config, user, days),
        Command::ResetUsage => cmd_reset_usage(&config, user),
        Command::Templates { public } => cmd_templates(&config, user, public),
        Command::NewTemplate {
            name,
            content,
            category,
            description,
            public,
        } => cmd_new_template(
            &config,
            user,
            &name,
            &content,
            &category,
            description.as_deref(),
            public,
        ),
        Command::Render { id, vars } => cmd_render(&config, &id, &vars),
        Command::Tools => cmd_tools(),
        Command::Voices => cmd_voices(),
        Command::Status => cmd_status(&config),
    }
}

fn parse_status_filter(status: &str) -> Result<StatusFilter> {
    match status {
        "all" => Ok(StatusFilter::All),
        "draft" => Ok(StatusFilter::Draft),
        "completed" => Ok(StatusFilter::Completed),
        other => bail!("unknown status filter: {} (use all, draft, completed)", other),
    }
}

fn parse_sort(sort: &str) -> Result<ProjectSort> {
    match sort {
        "date" => Ok(ProjectSort::Updated),
        "title" => Ok(ProjectSort::Title),
        "words" => Ok(ProjectSort::Words),
        other => bail!("unknown sort order: {} (use date, title, words)", other),
    }
}

fn cmd_list(
    config: &Config,
    user: &str,
    status: &str,
    search: Option<String>,
    sort: &str,
) -> Result<()> {
    let studio = open_studio(config)?;

    let query = ProjectQuery {
        status: parse_status_filter(status)?,
        search,
        sort: parse_sort(sort)?,
    };

    let projects = studio.database().list_projects(user, &query)?;

    if projects.is_empty() {
        println!("No projects found.");
        return Ok(());
    }

    println!(
        "{:<36} {:<24} {:<12} {:>7} {:>12}",
        "ID", "Title", "Tool", "Words", "Updated"
    );
    println!("{:-<95}", "");

    for project in &projects {
        let title = if project.title.chars().count() > 22 {
            let truncated: String = project.title.chars().take(19).collect();
            format!("{}...", truncated)
        } else {
            project.title.clone()
        };

        println!(
            "{:<36} {:<24} {:<12} {:>7} {:>12}",
            project.id,
            title,
            project.tool.as_str(),
            project.word_count,
            format::relative_time(project.updated_at)
        );
    }

    println!();
    println!("{} project(s)", projects.len());

    Ok(())
}

fn cmd_new(config: &Config, user: &str, title: &str, tool: &str, language: &str) -> Result<()> {
    let studio = open_studio(config)?;
    let tool = ToolKind::from(tool);

    let project = studio.create_project(user, title, &tool, language)?;

    println!("Created project {}", project.id);
    println!("  Title:    {}", project.title);
    println!("  Tool:     {}", project.tool.display_name());
    println!("  Language: {}", project.language);

    Ok(())
}

fn cmd_show(config: &Config, user: &str, id: &str) -> Result<()> {
    let studio = open_studio(config)?;

    let project = studio
        .database()
        .get_project(user, id)?
        .with_context(|| format!("project not found: {}", id))?;

    println!("{}", project.title);
    println!("{:=<width$}", "", width = project.title.chars().count().max(8));
    println!();
    println!("Tool:       {}", project.tool.display_name());
    println!("Status:     {}", project.status.as_str());
    println!("Language:   {}", project.language);
    println!("Words:      {}", project.word_count);
    println!("Characters: {}", project.character_count);
    println!("Created:    {}", format::relative_time(project.created_at));
    println!("Updated:    {}", format::relative_time(project.updated_at));

    if let Some(prompt) = &project.prompt {
        println!();
        println!("Prompt: {}", prompt);
    }

    if !project.content.is_empty() {
        println!();
        println!("{}", project.content);
    }

    Ok(())
}

fn cmd_edit(
    config: &Config,
    user: &str,
    id: &str,
    title: Option<String>,
    content: Option<String>,
    status: Option<String>,
    language: Option<String>,
) -> Result<()> {
    if title.is_none() && content.is_none() && status.is_none() && language.is_none() {
        bail!("nothing to change (use --title, --content, --status, or --language)");
    }

    let status = match status {
        Some(s) => Some(
            s.parse::<ProjectStatus>()
                .map_err(|e| anyhow::anyhow!(e))?,
        ),
        None => None,
    };

    let studio = open_studio(config)?;

    let update = ProjectUpdate {
        title,
        content,
        status,
        language,
        ..Default::default()
    };
    let project = studio.database().update_project(user, id, &update)?;

    println!("Updated project {}", project.id);
    println!("  Title:  {}", project.title);
    println!("  Status: {}", project.status.as_str());
    println!("  Words:  {}", project.word_count);

    Ok(())
}

fn cmd_rm(config: &Config, user: &str, id: &str) -> Result<()> {
    let studio = open_studio(config)?;
    studio.database().delete_project(user, id)?;
    println!("Deleted project {}", id);
    Ok(())
}

async fn cmd_generate(
    config: &Config,
    user: &str,
    prompt: &str,
    tool: &str,
    language: &str,
    project_id: Option<&str>,
    max_tokens: Option<u32>,
) -> Result<()> {
    let studio = open_studio(config)?;
    let tool = ToolKind::from(tool);

    let bar = spinner("Generating...");
    let result = studio
        .generate_text(user, project_id, prompt, &tool, language, max_tokens)
        .await;
    bar.finish_and_clear();

    let project = result?;

    println!("{}", project.content);
    println!();
    println!(
        "Saved to project {} ({} words, {} characters)",
        project.id, project.word_count, project.character_count
    );

    Ok(())
}

async fn cmd_tts(
    config: &Config,
    user: &str,
    text: &str,
    voice: &str,
    settings: VoiceSettings,
    project_id: Option<&str>,
) -> Result<()> {
    let studio = open_studio(config)?;

    let bar = spinner("Synthesizing...");
    let result = studio
        .generate_audio(user, project_id, text, voice, settings)
        .await;
    bar.finish_and_clear();

    let audio = result?;

    println!("Generated audio with voice {}", audio.voice_name);
    if let Some(path) = &audio.audio_url {
        println!("  File:     {}", path);
    }
    if let Some(duration) = audio.duration_seconds {
        println!("  Duration: {}", format::audio_duration(duration));
    }
    if let Some(size) = audio.file_size_bytes {
        println!("  Size:     {}", format::human_bytes(size));
    }

    Ok(())
}

async fn cmd_chat(config: &Config, user: &str, message: &str, language: &str) -> Result<()> {
    let studio = open_studio(config)?;

    let bar = spinner("Thinking...");
    let result = studio.chat(user, message, language).await;
    bar.finish_and_clear();

    let reply = result?;

    println!("{}", reply.content);

    Ok(())
}

fn cmd_stats(config: &Config, user: &str) -> Result<()> {
    let studio = open_studio(config)?;
    let stats = studio.dashboard(user, StatsOptions::default())?;

    println!("Dashboard");
    println!("=========");
    println!();
    println!("Projects:       {} total, {} completed, {} drafts",
        stats.total_projects, stats.completed_projects, stats.draft_projects
    );
    println!("Words:          {} total, {} this month", stats.total_words, stats.monthly_words);
    println!("Audio:          {} generation(s)", stats.audio_generations);
    println!("This week:      {} project(s)", stats.weekly_projects);
    println!("Avg words:      {} per project", stats.average_words_per_project);
    println!("Productivity:   {}/100", stats.productivity_score);

    if !stats.top_tools.is_empty() {
        println!();
        println!("Top tools:");
        for usage in &stats.top_tools {
            println!(
                "  {:<16} {:>4} project(s)  {:>3}%",
                usage.tool.display_name(),
                usage.count,
                usage.percentage
            );
        }
    }

    if !stats.recent_activity.is_empty() {
        println!();
        println!("Recent activity:");
        for recent in &stats.recent_activity {
            println!(
                "  {:<24} {:<12} {:<10} {}",
                recent.title,
                recent.tool.as_str(),
                recent.status.as_str(),
                recent.time
            );
        }
    }

    println!();
    println!("Last 7 days:");
    for day in &stats.weekly_activity {
        println!(
            "  {:<4} {:>3} project(s) {:>6} words",
            day.day, day.projects, day.words
        );
    }

    Ok(())
}

fn cmd_usage(config: &Config, user: &str, days: i64) -> Result<()> {
    let studio = open_studio(config)?;
    let profile = studio.profile(user)?;

    let since = chrono::Utc::now() - chrono::Duration::days(days);
    let totals = studio.database().usage_since(user, None, since)?;

    println!("Usage for the last {} day(s)", days);
    println!("============================");
    println!();
    println!("Events:          {}", totals.events);
    println!("Words:           {}", totals.words);
    println!("Characters:      {}", totals.characters);
    println!("Audio seconds:   {}", totals.audio_seconds);
    println!();
    println!("Plan:            {}", profile.plan.as_str());

    if profile.plan == PlanKind::Free {
        println!(
            "Quota:           {}/{} words used",
            profile.api_usage_count, profile.monthly_usage_limit
        );
        let remaining = (profile.monthly_usage_limit - profile.api_usage_count).max(0);
        println!("Remaining:       {} words", remaining);
    } else {
        println!("Quota:           unlimited");
    }

    Ok(())
}

fn cmd_reset_usage(config: &Config, user: &str) -> Result<()> {
    let studio = open_studio(config)?;
    studio.profile(user)?;
    studio.database().reset_api_usage(user)?;
    println!("Usage counter reset for {}", user);
    Ok(())
}

fn cmd_templates(config: &Config, user: &str, public: bool) -> Result<()> {
    let studio = open_studio(config)?;

    let templates = if public {
        studio.database().list_public_templates()?
    } else {
        studio.database().list_user_templates(user)?
    };

    if templates.is_empty() {
        println!("No templates found.");
        return Ok(());
    }

    println!(
        "{:<36} {:<20} {:<12} {:>6}",
        "ID", "Name", "Category", "Uses"
    );
    println!("{:-<78}", "");

    for template in &templates {
        println!(
            "{:<36} {:<20} {:<12} {:>6}",
            template.id, template.name, template.category, template.usage_count
        );
    }

    Ok(())
}

fn cmd_new_template(
    config: &Config,
    user: &str,
    name: &str,
    content: &str,
    category: &str,
    description: Option<&str>,
    public: bool,
) -> Result<()> {
    let studio = open_studio(config)?;
    studio.profile(user)?;

    let template = studio
        .database()
        .create_template(user, name, description, category, content, public)?;

    println!("Created template {}", template.id);
    Ok(())
}

fn cmd_render(config: &Config, id: &str, vars: &[String]) -> Result<()> {
    let studio = open_studio(config)?;

    let template = studio
        .database()
        .get_template(id)?
        .with_context(|| format!("template not found: {}", id))?;

    let mut variables = HashMap::new();
    for pair in vars {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("invalid variable (expected key=value): {}", pair);
        };
        variables.insert(key.to_string(), value.to_string());
    }

    println!("{}", catalog::render_template(&template.content, &variables));

    studio.database().touch_template(id)?;

    Ok(())
}

fn cmd_tools() -> Result<()> {
    println!("{:<12} {:<22} {:<8} Description", "Tool", "Name", "Kind");
    println!("{:-<90}", "");

    for tool in catalog::writing_tools() {
        let kind = match tool.category {
            ToolCategory::Writing => "text",
            ToolCategory::Audio => "audio",
        };
        println!(
            "{:<12} {:<22} {:<8} {}",
            tool.tool.as_str(),
            tool.name,
            kind,
            tool.description
        );
    }

    Ok(())
}

fn cmd_voices() -> Result<()> {
    println!("{:<14} {:<10} {:<14} Tier", "Voice ID", "Name", "Language");
    println!("{:-<50}", "");

    for voice in catalog::voices() {
        let tier = match voice.tier {
            VoiceTier::Standard => "standard",
            VoiceTier::Premium => "premium",
        };
        println!(
            "{:<14} {:<10} {:<14} {}",
            voice.id, voice.name, voice.language, tier
        );
    }

    Ok(())
}

fn cmd_status(config: &Config) -> Result<()> {
    println!("WriteAI Configuration");
    println!("=====================");
    println!();
    println!("Config:    {}", Config::config_path().display());
    println!("Database:  {}", Config::database_path().display());
    println!("Audio:     {}", Config::audio_dir().display());
    println!("Logs:      {}", Config::log_path().display());
    println!();

    match &config.openai {
        Some(openai) => {
            println!("Text provider:   configured");
            println!("  Model:         {}", openai.model);
            println!("  Endpoint:      {}", openai.endpoint);
            println!(
                "  API key:       {}",
                if openai.resolved_api_key().is_ok() {
                    "<set>"
                } else {
                    "<not set>"
                }
            );
        }
        None => {
            println!("Text provider:   not configured");
            println!();
            println!("Enable it in config.toml:");
            println!();
            println!("  [openai]");
            println!("  api_key = \"sk-xxxxxxxxxxxx\"");
        }
    }

    println!();

    match &config.elevenlabs {
        Some(elevenlabs) => {
            println!("Voice provider:  configured");
            println!("  Model:         {}", elevenlabs.model);
            println!("  Endpoint:      {}", elevenlabs.endpoint);
            println!(
                "  API key:       {}",
                if elevenlabs.resolved_api_key().is_ok() {
                    "<set>"
                } else {
                    "<not set>"
                }
            );
        }
        None => {
            println!("Voice provider:  not configured");
            println!();
            println!("Enable it in config.toml:");
            println!();
            println!("  [elevenlabs]");
            println!("  api_key = \"el-xxxxxxxxxxxx\"");
        }
    }

    println!();
    println!(
        "Free plan quota: {} words/month",
        config.quota.free_monthly_words
    );

    Ok(())
}
