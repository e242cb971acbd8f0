//! State container and reducer.
//!
//! All mutations flow through [`reduce`], a pure function from a state and
//! an [`Action`] to the next state, with no ambient globals. [`App`] couples
//! the in-memory state with its [`StateStore`] and persists the whole blob
//! after every dispatch (synchronous, last-writer-wins).
//!
//! Actions that insert records carry complete values; the `Action`
//! constructors mint missing ids and stamp timestamps so the reducer
//! itself stays deterministic.

use chrono::Utc;
use uuid::Uuid;

use crate::error::StorageError;
use crate::storage::{self, StateStore};
use crate::types::{
    AppState, LlmConfig, Meeting, Note, Project, Task, Team, Theme, User, WeeklyReport,
};

/// A state transition. Apply with [`reduce`].
#[derive(Debug, Clone)]
pub enum Action {
    SetCurrentUser(Option<User>),
    SetTheme(Theme),
    SetLlmConfig(LlmConfig),
    SetPromptOverride { name: String, template: String },
    ResetPromptOverride { name: String },
    UpsertUser(User),
    SetPassword { user_id: String, password: String },
    UpsertTeam(Team),
    UpsertProject { team_id: String, project: Project },
    UpsertTask { team_id: String, project_id: String, task: Task },
    AddMeeting(Meeting),
    SubmitWeeklyReport(WeeklyReport),
    ReviewWeeklyReport { report_id: String, checked: bool, annotation: Option<String> },
    UpsertNote(Note),
    SetNoteArchived { note_id: String, archived: bool },
    /// Wholesale replacement, used by import. Destructive.
    ReplaceState(AppState),
}

fn ensure_id(id: String) -> String {
    if id.is_empty() {
        Uuid::new_v4().to_string()
    } else {
        id
    }
}

impl Action {
    /// Submit a weekly report: mints the id when absent and stamps
    /// `updated_at`, then wraps into [`Action::SubmitWeeklyReport`].
    pub fn submit_weekly_report(mut report: WeeklyReport) -> Self {
        report.id = ensure_id(report.id);
        report.updated_at = Utc::now().to_rfc3339();
        Action::SubmitWeeklyReport(report)
    }

    /// Record a meeting, minting the id when absent.
    pub fn add_meeting(mut meeting: Meeting) -> Self {
        meeting.id = ensure_id(meeting.id);
        Action::AddMeeting(meeting)
    }

    /// Create or update a note, minting the id and stamping timestamps.
    pub fn upsert_note(mut note: Note) -> Self {
        note.id = ensure_id(note.id);
        let now = Utc::now().to_rfc3339();
        if note.created_at.is_empty() {
            note.created_at = now.clone();
        }
        note.updated_at = now;
        Action::UpsertNote(note)
    }
}

fn upsert_where<T>(items: &mut Vec<T>, item: T, same_id: impl Fn(&T) -> bool) {
    match items.iter_mut().find(|existing| same_id(existing)) {
        Some(slot) => *slot = item,
        None => items.push(item),
    }
}

/// Pure reducer: `(state, action) → state`.
///
/// Actions referencing a missing team/project/record are no-ops: loose
/// ids degrade rather than fail, matching the rest of the model.
pub fn reduce(mut state: AppState, action: Action) -> AppState {
    match action {
        Action::SetCurrentUser(user) => state.current_user = user,
        Action::SetTheme(theme) => state.theme = theme,
        Action::SetLlmConfig(config) => state.llm_config = config,
        Action::SetPromptOverride { name, template } => {
            state.prompts.insert(name, template);
        }
        Action::ResetPromptOverride { name } => {
            state.prompts.remove(&name);
        }
        Action::UpsertUser(user) => {
            let id = user.id.clone();
            upsert_where(&mut state.users, user, |u| u.id == id);
        }
        Action::SetPassword { user_id, password } => {
            if let Some(user) = state.users.iter_mut().find(|u| u.id == user_id) {
                user.password = Some(password.clone());
            }
            if let Some(ref mut current) = state.current_user {
                if current.id == user_id {
                    current.password = Some(password);
                }
            }
        }
        Action::UpsertTeam(team) => {
            let id = team.id.clone();
            upsert_where(&mut state.teams, team, |t| t.id == id);
        }
        Action::UpsertProject { team_id, project } => {
            if let Some(team) = state.teams.iter_mut().find(|t| t.id == team_id) {
                let id = project.id.clone();
                upsert_where(&mut team.projects, project, |p| p.id == id);
            }
        }
        Action::UpsertTask {
            team_id,
            project_id,
            task,
        } => {
            if let Some(project) = state
                .teams
                .iter_mut()
                .find(|t| t.id == team_id)
                .and_then(|t| t.projects.iter_mut().find(|p| p.id == project_id))
            {
                let id = task.id.clone();
                upsert_where(&mut project.tasks, task, |t| t.id == id);
            }
        }
        Action::AddMeeting(meeting) => state.meetings.push(meeting),
        Action::SubmitWeeklyReport(report) => {
            let id = report.id.clone();
            upsert_where(&mut state.weekly_reports, report, |r| r.id == id);
        }
        Action::ReviewWeeklyReport {
            report_id,
            checked,
            annotation,
        } => {
            if let Some(report) = state
                .weekly_reports
                .iter_mut()
                .find(|r| r.id == report_id)
            {
                report.manager_check = Some(checked);
                report.manager_annotation = annotation;
            }
        }
        Action::UpsertNote(note) => {
            let id = note.id.clone();
            upsert_where(&mut state.notes, note, |n| n.id == id);
        }
        Action::SetNoteArchived { note_id, archived } => {
            if let Some(note) = state.notes.iter_mut().find(|n| n.id == note_id) {
                note.is_archived = archived;
            }
        }
        Action::ReplaceState(new_state) => state = new_state,
    }
    state
}

/// The running application: in-memory state plus its store.
pub struct App {
    pub state: AppState,
    store: StateStore,
}

impl App {
    /// Load (or seed) the state behind `store`.
    pub fn load(store: StateStore) -> Result<Self, StorageError> {
        let state = store.load()?;
        Ok(Self { state, store })
    }

    /// Apply an action and persist the whole state.
    pub fn dispatch(&mut self, action: Action) -> Result<(), StorageError> {
        let current = std::mem::take(&mut self.state);
        self.state = reduce(current, action);
        self.store.save(&self.state)
    }

    /// Authenticate and record the session user.
    pub fn login(&mut self, uid: &str, password: &str) -> Result<User, String> {
        let user = crate::auth::authenticate(&self.state.users, uid, password)
            .map_err(|e| e.to_string())?
            .clone();
        self.dispatch(Action::SetCurrentUser(Some(user.clone())))
            .map_err(|e| e.to_string())?;
        Ok(user)
    }

    pub fn logout(&mut self) -> Result<(), StorageError> {
        self.dispatch(Action::SetCurrentUser(None))
    }

    /// Wipe the stored blob and reseed. Destructive; the calling surface
    /// confirms with the user first.
    pub fn reset(&mut self) -> Result<(), StorageError> {
        self.store.clear()?;
        self.state = self.store.load()?;
        self.store.save(&self.state)
    }

    /// Import a previously exported document. Returns `false` when the
    /// document fails the minimal shape check and was ignored.
    pub fn import(&mut self, raw: &str) -> Result<bool, StorageError> {
        match storage::import_state(raw)? {
            Some(imported) => {
                self.dispatch(Action::ReplaceState(imported))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Export payload: `(file name, pretty JSON)`.
    pub fn export(&self) -> Result<(String, String), StorageError> {
        storage::export_state(&self.state)
    }
}
