//! Report data shaping.
//!
//! Pure functions that project slices of the domain model into flat text
//! blocks ready to embed into a prompt. None of them ever fail on missing
//! optional data: dangling references render as `"N/A"`, `"Unassigned"`,
//! or the raw id, and enumeration follows storage order except where an
//! explicit sort is called out.

use crate::types::{
    HealthStatus, Meeting, Note, NoteBlockType, Project, Task, TaskStatus, Team, User,
    WeeklyReport,
};

/// Character budget applied to free-text context fields in the risk
/// digest. Bounds prompt size when reports carry long narratives.
pub const RISK_CONTEXT_BUDGET: usize = 500;

/// How many weekly reports the portfolio digest includes.
pub const PORTFOLIO_RECENT_REPORTS: usize = 10;

/// Completed/total ratio for a project's tasks, 0.0 for an empty project.
pub fn completion_ratio(project: &Project) -> f64 {
    if project.tasks.is_empty() {
        return 0.0;
    }
    let done = project
        .tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Done)
        .count();
    done as f64 / project.tasks.len() as f64
}

fn blocked_count(project: &Project) -> usize {
    project
        .tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Blocked)
        .count()
}

/// Resolve a user id to "First Last", or `None` when it dangles.
fn resolve_name(users: &[User], id: &str) -> Option<String> {
    users.iter().find(|u| u.id == id).map(User::display_name)
}

fn owner_label(users: &[User], assignee_id: Option<&str>) -> String {
    match assignee_id {
        Some(id) => resolve_name(users, id).unwrap_or_else(|| id.to_string()),
        None => "Unassigned".to_string(),
    }
}

fn health_label(health: Option<HealthStatus>) -> &'static str {
    health.map(|h| h.as_str()).unwrap_or("N/A")
}

/// Truncate to `budget` characters, appending an ellipsis when content was
/// dropped. Operates on characters, never splits a code point.
fn truncate_context(text: &str, budget: usize) -> String {
    if text.chars().count() <= budget {
        return text.to_string();
    }
    let mut out: String = text.chars().take(budget).collect();
    out.push('…');
    out
}

fn task_line(task: &Task, users: &[User]) -> String {
    format!(
        "- [{}] {} (due {}, {})",
        task.status,
        task.title,
        if task.eta.is_empty() { "N/A" } else { &task.eta },
        owner_label(users, task.assignee_id.as_deref()),
    )
}

// =============================================================================
// Team status
// =============================================================================

/// Flatten one team into a status digest: per-project progress counts,
/// per-task lines, and the project's free-text context layers.
pub fn shape_team(team: &Team, users: &[User]) -> String {
    let manager = resolve_name(users, &team.manager_id).unwrap_or_else(|| "N/A".to_string());

    let mut out = String::new();
    out.push_str(&format!("Team: {}\n", team.name));
    out.push_str(&format!("Manager: {}\n", manager));

    for project in &team.projects {
        let total = project.tasks.len();
        let done = project
            .tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Done)
            .count();
        let blocked = blocked_count(project);

        out.push('\n');
        out.push_str(&format!("Project: {} [{}]\n", project.name, project.status));
        if !project.deadline.is_empty() {
            out.push_str(&format!("Deadline: {}\n", project.deadline));
        }
        out.push_str(&format!(
            "Progress: {}/{} tasks done ({:.0}%), {} blocked\n",
            done,
            total,
            completion_ratio(project) * 100.0,
            blocked,
        ));
        for task in &project.tasks {
            out.push_str(&task_line(task, users));
            out.push('\n');
        }
        if !project.additional_descriptions.is_empty() {
            out.push_str("Context:\n");
            for layer in &project.additional_descriptions {
                out.push_str(&format!("- {}\n", layer));
            }
        }
    }

    out
}

// =============================================================================
// Meeting minutes
// =============================================================================

/// Flatten a meeting: attendees and action-item owners resolved to display
/// names, falling back to the raw id when a reference dangles.
pub fn shape_meeting(meeting: &Meeting, team: Option<&Team>, users: &[User]) -> String {
    let attendees: Vec<String> = meeting
        .attendees
        .iter()
        .map(|id| resolve_name(users, id).unwrap_or_else(|| id.clone()))
        .collect();

    let mut out = String::new();
    out.push_str(&format!("Meeting: {}\n", meeting.title));
    out.push_str(&format!("Date: {}\n", meeting.date));
    out.push_str(&format!(
        "Team: {}\n",
        team.map(|t| t.name.as_str()).unwrap_or("N/A")
    ));
    out.push_str(&format!("Attendees: {}\n", attendees.join(", ")));
    out.push_str("Minutes:\n");
    out.push_str(&meeting.minutes);
    out.push('\n');

    if !meeting.action_items.is_empty() {
        out.push_str("Action items:\n");
        for item in &meeting.action_items {
            let owner =
                resolve_name(users, &item.owner_id).unwrap_or_else(|| item.owner_id.clone());
            out.push_str(&format!(
                "- {} (owner: {}, due: {}, {})\n",
                item.description, owner, item.due_date, item.status,
            ));
        }
    }

    out
}

// =============================================================================
// Weekly report
// =============================================================================

/// Emit a weekly report's RAG health fields and free-text sections verbatim.
pub fn shape_weekly_report(report: &WeeklyReport, user: Option<&User>) -> String {
    let name = user
        .map(User::display_name)
        .unwrap_or_else(|| "Employee".to_string());

    let mut out = String::new();
    out.push_str(&format!(
        "Weekly report — {} — week of {}\n",
        name, report.week_of
    ));
    out.push_str(&format!("Team health: {}\n", health_label(report.team_health)));
    out.push_str(&format!(
        "Project health: {}\n",
        health_label(report.project_health)
    ));
    out.push_str(&format!("Main success: {}\n", report.main_success));
    out.push_str(&format!("Main issue: {}\n", report.main_issue));
    out.push_str(&format!("Incident: {}\n", report.incident));
    out.push_str(&format!("Organization: {}\n", report.orga_point));
    if let Some(ref other) = report.other_section {
        out.push_str(&format!("Other: {}\n", other));
    }
    if let Some(ref note) = report.manager_annotation {
        out.push_str(&format!("Manager note: {}\n", note));
    }

    out
}

// =============================================================================
// Portfolio digest
// =============================================================================

/// Management view across all teams: headline counts plus the most recent
/// weekly reports, sorted descending by week label.
pub fn shape_portfolio(teams: &[Team], reports: &[WeeklyReport], users: &[User]) -> String {
    let total_projects: usize = teams.iter().map(|t| t.projects.len()).sum();

    let mut recent: Vec<&WeeklyReport> = reports.iter().collect();
    recent.sort_by(|a, b| b.week_of.cmp(&a.week_of));
    recent.truncate(PORTFOLIO_RECENT_REPORTS);

    let mut out = String::new();
    out.push_str(&format!("Teams: {}\n", teams.len()));
    out.push_str(&format!("Projects: {}\n", total_projects));
    out.push_str("Recent reports:\n");
    for report in recent {
        let author = resolve_name(users, &report.user_id)
            .unwrap_or_else(|| report.user_id.clone());
        out.push_str(&format!(
            "- {} | {} | success: {} | issue: {} | health: team {}, project {}\n",
            report.week_of,
            author,
            report.main_success,
            report.main_issue,
            health_label(report.team_health),
            health_label(report.project_health),
        ));
    }

    out
}

// =============================================================================
// Risk digest
// =============================================================================

/// Risk view: every project with at least one blocked task, and every
/// report carrying a Red team or project health. Free-text context is
/// truncated to [`RISK_CONTEXT_BUDGET`] characters.
pub fn shape_risk(teams: &[Team], reports: &[WeeklyReport]) -> String {
    let mut out = String::new();

    out.push_str("Projects with blocked tasks:\n");
    let mut any_blocked = false;
    for team in teams {
        for project in &team.projects {
            let blocked = blocked_count(project);
            if blocked == 0 {
                continue;
            }
            any_blocked = true;
            out.push_str(&format!(
                "- {} / {} [{}] — {} blocked task(s)\n",
                team.name, project.name, project.status, blocked,
            ));
        }
    }
    if !any_blocked {
        out.push_str("- none\n");
    }

    out.push_str("Red-health reports:\n");
    let red: Vec<&WeeklyReport> = reports
        .iter()
        .filter(|r| {
            r.team_health == Some(HealthStatus::Red)
                || r.project_health == Some(HealthStatus::Red)
        })
        .collect();
    if red.is_empty() {
        out.push_str("- none\n");
    }
    for report in red {
        out.push_str(&format!(
            "- week {} | issue: {} | incident: {}\n",
            report.week_of,
            truncate_context(&report.main_issue, RISK_CONTEXT_BUDGET),
            truncate_context(&report.incident, RISK_CONTEXT_BUDGET),
        ));
    }

    out
}

// =============================================================================
// Notes
// =============================================================================

/// Flatten a note canvas to its text blocks; image blocks become a marker
/// line when `include_images` is set and are skipped otherwise. Shape
/// blocks (rectangles, lines, ...) never contribute text.
pub fn shape_note(note: &Note, include_images: bool) -> String {
    note.blocks
        .iter()
        .filter_map(|b| match b.block_type {
            NoteBlockType::Text => b.content.clone(),
            NoteBlockType::Image if include_images => Some("[image attached]".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}
