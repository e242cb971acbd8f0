//! Domain model and the persisted application state.
//!
//! Every record here is a plain serde type with no behavior beyond display
//! helpers. Cross-entity references (`manager_id`, `assignee_id`, ...) are
//! loose string identifiers with no referential-integrity enforcement:
//! resolution happens at display time and degrades to a placeholder when a
//! reference dangles.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default chat-completion endpoint of the local bridge (Ollama-style).
pub const DEFAULT_CHAT_ENDPOINT: &str = "http://127.0.0.1:11434/v1/chat/completions";

/// Default model identifier sent to the local bridge.
pub const DEFAULT_MODEL: &str = "llama3";

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    Admin,
    Manager,
    Employee,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "Admin",
            UserRole::Manager => "Manager",
            UserRole::Employee => "Employee",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An account. `uid` is the login handle typed at the sign-in form; `id` is
/// the internal identifier other records point at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub uid: String,
    pub first_name: String,
    pub last_name: String,
    pub function_title: String,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Plaintext by design of the original product. Compared exactly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl User {
    /// "First Last" display form used everywhere a name is rendered.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// =============================================================================
// Tasks & projects
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Todo,
    Ongoing,
    Blocked,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "Todo",
            TaskStatus::Ongoing => "Ongoing",
            TaskStatus::Blocked => "Blocked",
            TaskStatus::Done => "Done",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "Low",
            TaskPriority::Medium => "Medium",
            TaskPriority::High => "High",
            TaskPriority::Urgent => "Urgent",
        }
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Red/Amber/Green indicator shared by reports, projects, and external
/// dependencies. Serialized exactly as `"Green"` / `"Amber"` / `"Red"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Green,
    Amber,
    Red,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Green => "Green",
            HealthStatus::Amber => "Amber",
            HealthStatus::Red => "Red",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
    pub done: bool,
}

/// A dependency on something outside the team's control, tracked with its
/// own RAG status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalDependency {
    pub id: String,
    pub label: String,
    pub status: HealthStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
    /// Due date (ISO date string).
    pub eta: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub external_dependencies: Vec<ExternalDependency>,
    pub weight: u32,
    pub is_important: bool,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    /// Manual ordering key within the project board.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    Planning,
    Active,
    Paused,
    Done,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Planning => "Planning",
            ProjectStatus::Active => "Active",
            ProjectStatus::Paused => "Paused",
            ProjectStatus::Done => "Done",
        }
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectRole {
    Owner,
    Lead,
    Contributor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMember {
    pub user_id: String,
    pub role: ProjectRole,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<String>,
    /// ISO date string.
    pub deadline: String,
    #[serde(default)]
    pub members: Vec<ProjectMember>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    pub is_important: bool,
    #[serde(default)]
    pub doc_urls: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub external_dependencies: Vec<ExternalDependency>,
    /// Free-text context layers appended to generated reports.
    #[serde(default)]
    pub additional_descriptions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    pub manager_id: String,
    #[serde(default)]
    pub projects: Vec<Project>,
}

// =============================================================================
// Meetings
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionItemStatus {
    Open,
    InProgress,
    Completed,
}

impl ActionItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionItemStatus::Open => "Open",
            ActionItemStatus::InProgress => "InProgress",
            ActionItemStatus::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for ActionItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A follow-up recorded against a meeting, with an owner and a due date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionItem {
    pub id: String,
    pub description: String,
    pub owner_id: String,
    pub due_date: String,
    pub status: ActionItemStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub id: String,
    pub team_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub date: String,
    pub title: String,
    /// Attendee user ids; resolved to names at display time.
    #[serde(default)]
    pub attendees: Vec<String>,
    pub minutes: String,
    #[serde(default)]
    pub action_items: Vec<ActionItem>,
}

// =============================================================================
// Weekly reports
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyReport {
    pub id: String,
    pub user_id: String,
    /// Week label, e.g. "2026-W14" or an ISO Monday date. Compared
    /// lexicographically when sorting most-recent-first.
    pub week_of: String,
    pub main_success: String,
    pub main_issue: String,
    pub incident: String,
    pub orga_point: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_health: Option<HealthStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_health: Option<HealthStatus>,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_check: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_annotation: Option<String>,
}

// =============================================================================
// Notes
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteBlockType {
    Text,
    Image,
    Rectangle,
    Circle,
    Line,
    Drawing,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteBlockStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A positioned block on a note canvas. Text blocks carry their content;
/// image blocks carry a base64 payload in `content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteBlock {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: NoteBlockType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<NoteBlockStyle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
    pub is_archived: bool,
    #[serde(default)]
    pub blocks: Vec<NoteBlock>,
}

// =============================================================================
// LLM configuration & chat
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    LocalHttp,
}

/// Connection settings for the locally hosted chat-completion endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmConfig {
    pub provider: LlmProvider,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::LocalHttp,
            base_url: Some(DEFAULT_CHAT_ENDPOINT.to_string()),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    /// Upper-case tag used when flattening history into a prompt.
    pub fn as_tag(&self) -> &'static str {
        match self {
            ChatRole::User => "USER",
            ChatRole::Assistant => "ASSISTANT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatAttachment {
    pub name: String,
    /// MIME type of the attachment.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<ChatAttachment>,
    pub timestamp: DateTime<Utc>,
}

// =============================================================================
// Aggregate state
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// The full application state. This is the sole persisted unit: it is
/// loaded whole and saved whole, with no partial writes.
///
/// `llm_config` and `prompts` were added after the first stored-blob
/// revision and are back-filled through `serde(default)` when absent; any
/// other shape mismatch fails the load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub users: Vec<User>,
    pub teams: Vec<Team>,
    pub meetings: Vec<Meeting>,
    pub weekly_reports: Vec<WeeklyReport>,
    pub notes: Vec<Note>,
    pub current_user: Option<User>,
    pub theme: Theme,
    #[serde(default)]
    pub llm_config: LlmConfig,
    /// Per-deployment prompt overrides, keyed by template name.
    #[serde(default)]
    pub prompts: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(serde_json::to_string(&TaskStatus::Todo).unwrap(), "\"Todo\"");
        assert_eq!(serde_json::to_string(&HealthStatus::Amber).unwrap(), "\"Amber\"");
        assert_eq!(
            serde_json::to_string(&LlmProvider::LocalHttp).unwrap(),
            "\"local_http\""
        );
        assert_eq!(serde_json::to_string(&Theme::Dark).unwrap(), "\"dark\"");
        assert_eq!(
            serde_json::to_string(&NoteBlockType::Rectangle).unwrap(),
            "\"rectangle\""
        );
    }

    #[test]
    fn test_app_state_backfills_llm_config_and_prompts() {
        // A v1-era blob predating llmConfig/prompts still loads.
        let json = r#"{
            "users": [],
            "teams": [],
            "meetings": [],
            "weeklyReports": [],
            "notes": [],
            "currentUser": null,
            "theme": "light"
        }"#;
        let state: AppState = serde_json::from_str(json).unwrap();
        assert_eq!(state.llm_config, LlmConfig::default());
        assert!(state.prompts.is_empty());
    }

    #[test]
    fn test_app_state_rejects_missing_collections() {
        // Anything beyond the two back-filled fields fails closed.
        let json = r#"{ "teams": [], "theme": "light" }"#;
        assert!(serde_json::from_str::<AppState>(json).is_err());
    }

    #[test]
    fn test_task_optional_lists_default_empty() {
        let json = r#"{
            "id": "tk1",
            "title": "Setup repo",
            "description": "",
            "status": "Done",
            "priority": "High",
            "eta": "2026-01-15",
            "weight": 1,
            "isImportant": false
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert!(task.checklist.is_empty());
        assert!(task.dependencies.is_empty());
        assert_eq!(task.order, None);
    }

    #[test]
    fn test_display_name() {
        let user = User {
            id: "u2".into(),
            uid: "MGR001".into(),
            first_name: "Alice".into(),
            last_name: "Dubois".into(),
            function_title: "Head of Engineering".into(),
            role: UserRole::Manager,
            manager_id: Some("u1".into()),
            avatar_url: None,
            password: None,
            location: None,
        };
        assert_eq!(user.display_name(), "Alice Dubois");
    }
}
