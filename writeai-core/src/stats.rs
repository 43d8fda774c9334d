//! Dashboard statistics.
//!
//! Aggregates a snapshot of one owner's projects and audio generations into
//! the metrics the dashboard shows: totals, trailing windows, per-tool
//! distribution, a heuristic productivity score, and a 7-day activity series.
//!
//! Two different "weekly" notions coexist on purpose:
//! - [`DashboardStats::weekly_projects`] uses a rolling 7x24h window
//!   (`created_at >= now - 7d`),
//! - [`DashboardStats::weekly_activity`] buckets by UTC calendar date, one
//!   bucket per day from six days ago through today.
//!
//! They can disagree around midnight boundaries. The dashboard has always
//! shown both this way, so the two computations stay separately named and
//! must not be unified.

use chrono::{DateTime, Datelike, Duration, Utc};

use crate::format::relative_time_at;
use crate::types::{Project, ProjectStatus, ToolKind};

/// Saturation point for the writing-velocity term: words/day at or above
/// this contribute the full 30 points.
const VELOCITY_CAP_WORDS_PER_DAY: f64 = 100.0;
/// Saturation point for the cadence term: projects in the trailing week at
/// or above this contribute the full 30 points.
const CADENCE_CAP_PROJECTS_PER_WEEK: f64 = 5.0;

/// Truncation limits for the ranked lists.
#[derive(Debug, Clone, Copy)]
pub struct StatsOptions {
    /// How many entries `top_tools` keeps
    pub top_tools: usize,
    /// How many entries `recent_activity` keeps
    pub recent: usize,
}

impl Default for StatsOptions {
    fn default() -> Self {
        Self {
            top_tools: 5,
            recent: 10,
        }
    }
}

/// One entry in the per-tool usage distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolUsage {
    pub tool: ToolKind,
    /// Number of projects produced with this tool
    pub count: i64,
    /// `round(100 * count / total_projects)`
    pub percentage: i64,
}

/// One recently-updated project, ready for display.
#[derive(Debug, Clone)]
pub struct RecentProject {
    pub id: String,
    pub tool: ToolKind,
    pub title: String,
    /// Relative timestamp of the last update ("2h ago")
    pub time: String,
    pub status: ProjectStatus,
}

/// One calendar-day bucket of the 7-day activity series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayActivity {
    /// Weekday label ("Sun" through "Sat")
    pub day: &'static str,
    /// Projects created on that date
    pub projects: i64,
    /// Words across those projects
    pub words: i64,
}

/// Dashboard metrics for one owner.
#[derive(Debug, Clone)]
pub struct DashboardStats {
    pub total_projects: i64,
    pub total_words: i64,
    pub completed_projects: i64,
    pub draft_projects: i64,
    pub audio_generations: i64,
    /// Projects created within the trailing 7x24h window (inclusive bound)
    pub weekly_projects: i64,
    /// Words across projects created within the trailing 30 days
    pub monthly_words: i64,
    pub average_words_per_project: i64,
    /// Heuristic 0-100 composite, see [`productivity_score`]
    pub productivity_score: i64,
    pub top_tools: Vec<ToolUsage>,
    pub recent_activity: Vec<RecentProject>,
    /// Calendar-day buckets, oldest first, last entry is today
    pub weekly_activity: [DayActivity; 7],
}

/// Compute dashboard metrics from a snapshot of one owner's data.
///
/// Pure and synchronous: `now` is passed in so the aggregation is
/// deterministic under test. `audio_count` comes from the audio-generations
/// table, everything else derives from `projects`.
pub fn compute(
    projects: &[Project],
    audio_count: i64,
    now: DateTime<Utc>,
    opts: StatsOptions,
) -> DashboardStats {
    let one_week_ago = now - Duration::days(7);
    let one_month_ago = now - Duration::days(30);

    let total_projects = projects.len() as i64;
    let total_words: i64 = projects.iter().map(|p| p.word_count).sum();
    let completed_projects = projects
        .iter()
        .filter(|p| p.status == ProjectStatus::Completed)
        .count() as i64;
    let draft_projects = projects
        .iter()
        .filter(|p| p.status == ProjectStatus::Draft)
        .count() as i64;

    let weekly_projects = projects
        .iter()
        .filter(|p| p.created_at >= one_week_ago)
        .count() as i64;
    let monthly_words: i64 = projects
        .iter()
        .filter(|p| p.created_at >= one_month_ago)
        .map(|p| p.word_count)
        .sum();

    let average_words_per_project = if total_projects > 0 {
        (total_words as f64 / total_projects as f64).round() as i64
    } else {
        0
    };

    let productivity_score = productivity_score(
        total_projects,
        completed_projects,
        monthly_words,
        weekly_projects,
    );

    DashboardStats {
        total_projects,
        total_words,
        completed_projects,
        draft_projects,
        audio_generations: audio_count,
        weekly_projects,
        monthly_words,
        average_words_per_project,
        productivity_score,
        top_tools: top_tools(projects, opts.top_tools),
        recent_activity: recent_activity(projects, now, opts.recent),
        weekly_activity: weekly_activity(projects, now),
    }
}

/// Heuristic 0-100 productivity composite.
///
/// `0.4 * completion_rate + 30 * min(words_per_day / 100, 1)
///  + 30 * min(weekly_projects / 5, 1)`, rounded and capped at 100.
///
/// The weights and caps are a product contract: 40% completion ratio, 30%
/// writing velocity saturating at 100 words/day, 30% weekly cadence
/// saturating at 5 projects/week.
pub fn productivity_score(
    total_projects: i64,
    completed_projects: i64,
    monthly_words: i64,
    weekly_projects: i64,
) -> i64 {
    let completion_rate = if total_projects > 0 {
        completed_projects as f64 / total_projects as f64 * 100.0
    } else {
        0.0
    };
    let words_per_day = monthly_words as f64 / 30.0;

    let velocity = (words_per_day / VELOCITY_CAP_WORDS_PER_DAY).min(1.0);
    let cadence = (weekly_projects as f64 / CADENCE_CAP_PROJECTS_PER_WEEK).min(1.0);

    let score = (completion_rate * 0.4 + velocity * 30.0 + cadence * 30.0).round() as i64;
    score.min(100)
}

/// Per-tool project counts, sorted by count descending.
///
/// The sort is stable, so tools tied on count keep their first-encounter
/// order from the input slice.
fn top_tools(projects: &[Project], limit: usize) -> Vec<ToolUsage> {
    let total = projects.len() as i64;
    if total == 0 {
        return Vec::new();
    }

    // Vec keeps encounter order; the tool set per owner is small
    let mut counts: Vec<(ToolKind, i64)> = Vec::new();
    for project in projects {
        match counts.iter_mut().find(|(tool, _)| *tool == project.tool) {
            Some((_, count)) => *count += 1,
            None => counts.push((project.tool.clone(), 1)),
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(limit);

    counts
        .into_iter()
        .map(|(tool, count)| ToolUsage {
            tool,
            count,
            percentage: (count as f64 / total as f64 * 100.0).round() as i64,
        })
        .collect()
}

/// The most-recently-updated projects, newest first.
fn recent_activity(projects: &[Project], now: DateTime<Utc>, limit: usize) -> Vec<RecentProject> {
    let mut sorted: Vec<&Project> = projects.iter().collect();
    sorted.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

    sorted
        .into_iter()
        .take(limit)
        .map(|p| RecentProject {
            id: p.id.clone(),
            tool: p.tool.clone(),
            title: p.title.clone(),
            time: relative_time_at(p.updated_at, now),
            status: p.status,
        })
        .collect()
}

const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Seven calendar-day buckets, from six days ago through today.
///
/// Projects match a bucket by UTC date equality of `created_at`, not by a
/// rolling 24h window.
fn weekly_activity(projects: &[Project], now: DateTime<Utc>) -> [DayActivity; 7] {
    std::array::from_fn(|i| {
        let date = (now - Duration::days(6 - i as i64)).date_naive();
        let day = WEEKDAY_LABELS[date.weekday().num_days_from_sunday() as usize];

        let mut count = 0;
        let mut words = 0;
        for project in projects {
            if project.created_at.date_naive() == date {
                count += 1;
                words += project.word_count;
            }
        }

        DayActivity {
            day,
            projects: count,
            words,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn project(
        id: &str,
        tool: ToolKind,
        status: ProjectStatus,
        words: i64,
        created_at: DateTime<Utc>,
    ) -> Project {
        Project {
            id: id.to_string(),
            user_id: "owner".to_string(),
            title: format!("project {}", id),
            content: String::new(),
            tool,
            prompt: None,
            status,
            word_count: words,
            character_count: words * 6,
            language: "en".to_string(),
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn test_empty_snapshot_has_no_divide_by_zero() {
        let stats = compute(&[], 0, fixed_now(), StatsOptions::default());

        assert_eq!(stats.total_projects, 0);
        assert_eq!(stats.average_words_per_project, 0);
        assert_eq!(stats.productivity_score, 0);
        assert!(stats.top_tools.is_empty());
        assert!(stats.recent_activity.is_empty());
    }

    #[test]
    fn test_worked_example_three_projects_today() {
        // 3 projects created today, word counts [100, 250, 0], 1 completed
        let now = fixed_now();
        let projects = vec![
            project("a", ToolKind::Article, ProjectStatus::Completed, 100, now),
            project("b", ToolKind::Email, ProjectStatus::Draft, 250, now),
            project("c", ToolKind::Article, ProjectStatus::Draft, 0, now),
        ];

        let stats = compute(&projects, 0, now, StatsOptions::default());

        assert_eq!(stats.total_words, 350);
        assert_eq!(stats.average_words_per_project, 117); // round(350 / 3)
        assert_eq!(stats.completed_projects, 1);
        assert_eq!(stats.draft_projects, 2);
        assert_eq!(stats.weekly_projects, 3);
        assert_eq!(stats.monthly_words, 350);
    }

    #[test]
    fn test_weekly_window_is_rolling() {
        let now = fixed_now();
        let projects = vec![
            project("in", ToolKind::Article, ProjectStatus::Draft, 10, now - Duration::days(6)),
            project("edge", ToolKind::Article, ProjectStatus::Draft, 10, now - Duration::days(7)),
            project("out", ToolKind::Article, ProjectStatus::Draft, 10, now - Duration::days(8)),
        ];

        let stats = compute(&projects, 0, now, StatsOptions::default());
        // Lower bound is inclusive: exactly 7 days old still counts
        assert_eq!(stats.weekly_projects, 2);
    }

    #[test]
    fn test_monthly_words_window() {
        let now = fixed_now();
        let projects = vec![
            project("in", ToolKind::Article, ProjectStatus::Draft, 500, now - Duration::days(29)),
            project("out", ToolKind::Article, ProjectStatus::Draft, 900, now - Duration::days(31)),
        ];

        let stats = compute(&projects, 0, now, StatsOptions::default());
        assert_eq!(stats.monthly_words, 500);
        assert_eq!(stats.total_words, 1400);
    }

    #[test]
    fn test_productivity_score_terms() {
        // All caps hit: 100% completion, >=100 words/day, >=5 weekly projects
        assert_eq!(productivity_score(10, 10, 3000, 5), 100);

        // No projects at all
        assert_eq!(productivity_score(0, 0, 0, 0), 0);

        // Velocity only: 50 words/day -> 0.5 * 30 = 15
        assert_eq!(productivity_score(1, 0, 1500, 0), 15);
    }

    #[test]
    fn test_productivity_score_monotone_in_weekly_projects() {
        let mut last = 0;
        for weekly in 0..=8 {
            let score = productivity_score(10, 3, 900, weekly);
            assert!(score >= last, "score decreased at weekly={}", weekly);
            last = score;
        }
        // Saturates at 5 projects/week
        assert_eq!(
            productivity_score(10, 3, 900, 5),
            productivity_score(10, 3, 900, 50)
        );
    }

    #[test]
    fn test_productivity_score_velocity_saturates() {
        // 100 words/day and beyond contribute the same 30 points
        assert_eq!(
            productivity_score(10, 3, 3000, 2),
            productivity_score(10, 3, 30_000, 2)
        );
    }

    #[test]
    fn test_top_tools_percentages_and_truncation() {
        let now = fixed_now();
        let mut projects = Vec::new();
        for i in 0..5 {
            projects.push(project(&format!("a{}", i), ToolKind::Article, ProjectStatus::Draft, 0, now));
        }
        for i in 0..2 {
            projects.push(project(&format!("e{}", i), ToolKind::Email, ProjectStatus::Draft, 0, now));
        }
        projects.push(project("s", ToolKind::Social, ProjectStatus::Draft, 0, now));

        let stats = compute(&projects, 0, now, StatsOptions { top_tools: 2, recent: 10 });

        assert_eq!(stats.top_tools.len(), 2);
        assert_eq!(stats.top_tools[0].tool, ToolKind::Article);
        assert_eq!(stats.top_tools[0].count, 5);
        assert_eq!(stats.top_tools[0].percentage, 63); // round(5/8 * 100)
        assert_eq!(stats.top_tools[1].tool, ToolKind::Email);
        assert_eq!(stats.top_tools[1].percentage, 25);

        let sum: i64 = stats.top_tools.iter().map(|t| t.percentage).sum();
        assert!(sum <= 100);
    }

    #[test]
    fn test_top_tools_ties_keep_encounter_order() {
        let now = fixed_now();
        let projects = vec![
            project("1", ToolKind::Social, ProjectStatus::Draft, 0, now),
            project("2", ToolKind::Email, ProjectStatus::Draft, 0, now),
            project("3", ToolKind::Social, ProjectStatus::Draft, 0, now),
            project("4", ToolKind::Email, ProjectStatus::Draft, 0, now),
        ];

        let stats = compute(&projects, 0, now, StatsOptions::default());
        assert_eq!(stats.top_tools[0].tool, ToolKind::Social);
        assert_eq!(stats.top_tools[1].tool, ToolKind::Email);
    }

    #[test]
    fn test_recent_activity_sorted_and_truncated() {
        let now = fixed_now();
        let mut old = project("old", ToolKind::Article, ProjectStatus::Draft, 0, now - Duration::days(3));
        old.updated_at = now - Duration::days(3);
        let mut fresh = project("fresh", ToolKind::Email, ProjectStatus::Completed, 0, now - Duration::days(2));
        fresh.updated_at = now - Duration::hours(2);

        let stats = compute(
            &[old, fresh],
            0,
            now,
            StatsOptions { top_tools: 5, recent: 1 },
        );

        assert_eq!(stats.recent_activity.len(), 1);
        assert_eq!(stats.recent_activity[0].id, "fresh");
        assert_eq!(stats.recent_activity[0].time, "2h ago");
    }

    #[test]
    fn test_weekly_activity_buckets_by_calendar_date() {
        // Noon "now"; a project created 18 hours earlier falls on yesterday's
        // calendar date even though it is within a rolling 24h window.
        let now = fixed_now();
        let yesterday_evening = now - Duration::hours(18);
        let projects = vec![
            project("y", ToolKind::Article, ProjectStatus::Draft, 120, yesterday_evening),
            project("t", ToolKind::Email, ProjectStatus::Draft, 80, now),
        ];

        let activity = weekly_activity(&projects, now);

        // Last bucket is today, second-to-last is yesterday
        assert_eq!(activity[6].projects, 1);
        assert_eq!(activity[6].words, 80);
        assert_eq!(activity[5].projects, 1);
        assert_eq!(activity[5].words, 120);
        assert_eq!(activity[0].projects, 0);

        // 2025-06-15 is a Sunday
        assert_eq!(activity[6].day, "Sun");
        assert_eq!(activity[5].day, "Sat");
    }
}
