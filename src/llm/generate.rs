//! Generation orchestrators: shape domain data, resolve and fill the
//! template, send one gateway call.
//!
//! Each function mirrors one "Generate with AI" action in the dashboard.
//! `overrides` is the deployment's `AppState.prompts` map; every
//! orchestrator consults it so any template can be customized by name.

use std::collections::HashMap;

use crate::error::LlmError;
use crate::reports;
use crate::types::{LlmConfig, Meeting, Note, Team, User, WeeklyReport};

use super::client;
use super::prompts;

type Overrides = HashMap<String, String>;

/// Status report for one team: per-project progress, task lines, context
/// layers.
pub async fn generate_team_report(
    team: &Team,
    users: &[User],
    config: &LlmConfig,
    overrides: &Overrides,
) -> Result<String, LlmError> {
    let data = reports::shape_team(team, users);
    let template = prompts::resolve_template(prompts::TEAM_REPORT, overrides)?;
    let prompt = prompts::fill_template(&template, &[("DATA", data.as_str())]);
    client::call_model(&prompt, config, &[]).await
}

/// Email-ready minutes for a meeting.
pub async fn generate_meeting_summary(
    meeting: &Meeting,
    team: Option<&Team>,
    users: &[User],
    config: &LlmConfig,
    overrides: &Overrides,
) -> Result<String, LlmError> {
    let data = reports::shape_meeting(meeting, team, users);
    let template = prompts::resolve_template(prompts::MEETING_SUMMARY, overrides)?;
    let prompt = prompts::fill_template(
        &template,
        &[("DATA", data.as_str()), ("TITLE", meeting.title.as_str())],
    );
    client::call_model(&prompt, config, &[]).await
}

/// Weekly status email draft for one report.
pub async fn generate_weekly_report_summary(
    report: &WeeklyReport,
    user: Option<&User>,
    config: &LlmConfig,
    overrides: &Overrides,
) -> Result<String, LlmError> {
    let data = reports::shape_weekly_report(report, user);
    let name = user
        .map(User::display_name)
        .unwrap_or_else(|| "Employee".to_string());
    let template = prompts::resolve_template(prompts::WEEKLY_EMAIL, overrides)?;
    let prompt = prompts::fill_template(
        &template,
        &[
            ("DATA", data.as_str()),
            ("NAME", name.as_str()),
            ("WEEK", report.week_of.as_str()),
        ],
    );
    client::call_model(&prompt, config, &[]).await
}

/// Portfolio-level strategic view across all teams and recent reports.
pub async fn generate_management_insight(
    teams: &[Team],
    reports_in: &[WeeklyReport],
    users: &[User],
    config: &LlmConfig,
    overrides: &Overrides,
) -> Result<String, LlmError> {
    let data = reports::shape_portfolio(teams, reports_in, users);
    let template = prompts::resolve_template(prompts::MANAGEMENT_INSIGHT, overrides)?;
    let prompt = prompts::fill_template(&template, &[("DATA", data.as_str())]);
    client::call_model(&prompt, config, &[]).await
}

/// Risk assessment over blocked projects and Red-health reports.
pub async fn generate_risk_assessment(
    teams: &[Team],
    reports_in: &[WeeklyReport],
    config: &LlmConfig,
    overrides: &Overrides,
) -> Result<String, LlmError> {
    let data = reports::shape_risk(teams, reports_in);
    let template = prompts::resolve_template(prompts::RISK_ASSESSMENT, overrides)?;
    let prompt = prompts::fill_template(&template, &[("DATA", data.as_str())]);
    client::call_model(&prompt, config, &[]).await
}

/// Synthesis of a note canvas.
pub async fn generate_note_summary(
    note: &Note,
    include_images: bool,
    config: &LlmConfig,
    overrides: &Overrides,
) -> Result<String, LlmError> {
    let data = reports::shape_note(note, include_images);
    let template = prompts::resolve_template(prompts::NOTE_SUMMARY, overrides)?;
    let prompt = prompts::fill_template(&template, &[("DATA", data.as_str())]);
    client::call_model(&prompt, config, &[]).await
}

/// Synthesis of an arbitrary document excerpt.
pub async fn generate_document_synthesis(
    content: &str,
    config: &LlmConfig,
    overrides: &Overrides,
) -> Result<String, LlmError> {
    let template = prompts::resolve_template(prompts::DOC_SYNTHESIS, overrides)?;
    let prompt = prompts::fill_template(&template, &[("DATA", content)]);
    client::call_model(&prompt, config, &[]).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HealthStatus, UserRole};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// One-shot endpoint that captures the request body and echoes a fixed
    /// completion, so orchestrator tests can assert on the outbound prompt.
    async fn capture_endpoint() -> (
        std::net::SocketAddr,
        tokio::sync::oneshot::Receiver<String>,
    ) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 256 * 1024];
            let mut read = 0usize;
            loop {
                let n = socket.read(&mut buf[read..]).await.unwrap();
                if n == 0 {
                    break;
                }
                read += n;
                let window = &buf[..read];
                if let Some(end) = window.windows(4).position(|w| w == b"\r\n\r\n") {
                    let headers = String::from_utf8_lossy(&window[..end]).to_lowercase();
                    let content_length = headers
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if read >= end + 4 + content_length {
                        let body =
                            String::from_utf8_lossy(&window[end + 4..end + 4 + content_length])
                                .to_string();
                        let _ = tx.send(body);
                        break;
                    }
                }
            }
            let body = r#"{"choices":[{"message":{"content":"generated"}}]}"#;
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });
        (addr, rx)
    }

    fn config_for(addr: std::net::SocketAddr) -> LlmConfig {
        LlmConfig {
            base_url: Some(format!("http://{}/v1/chat/completions", addr)),
            ..LlmConfig::default()
        }
    }

    fn sample_team() -> Team {
        Team {
            id: "t1".into(),
            name: "Engineering Alpha".into(),
            manager_id: "u2".into(),
            projects: vec![],
        }
    }

    #[tokio::test]
    async fn test_team_report_embeds_shaped_data_in_prompt() {
        let (addr, rx) = capture_endpoint().await;
        let out = generate_team_report(
            &sample_team(),
            &[],
            &config_for(addr),
            &HashMap::new(),
        )
        .await
        .unwrap();
        assert_eq!(out, "generated");

        let body = rx.await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        let prompt = value["messages"][0]["content"].as_str().unwrap();
        assert!(prompt.contains("Team: Engineering Alpha"));
        // The {{DATA}} placeholder was consumed.
        assert!(!prompt.contains("{{DATA}}"));
    }

    #[tokio::test]
    async fn test_weekly_summary_fills_name_and_week() {
        let (addr, rx) = capture_endpoint().await;
        let author = User {
            id: "u3".into(),
            uid: "PM001".into(),
            first_name: "Eve".into(),
            last_name: "Morel".into(),
            function_title: "Product Owner".into(),
            role: UserRole::Employee,
            manager_id: None,
            avatar_url: None,
            password: None,
            location: None,
        };
        let report = WeeklyReport {
            id: "r1".into(),
            user_id: "u3".into(),
            week_of: "2026-W14".into(),
            main_success: "launched".into(),
            main_issue: String::new(),
            incident: String::new(),
            orga_point: String::new(),
            other_section: None,
            team_health: Some(HealthStatus::Green),
            project_health: None,
            updated_at: String::new(),
            manager_check: None,
            manager_annotation: None,
        };
        generate_weekly_report_summary(&report, Some(&author), &config_for(addr), &HashMap::new())
            .await
            .unwrap();

        let body = rx.await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        let prompt = value["messages"][0]["content"].as_str().unwrap();
        assert!(prompt.contains("Eve Morel"));
        assert!(prompt.contains("2026-W14"));
    }

    #[tokio::test]
    async fn test_override_replaces_default_template() {
        let (addr, rx) = capture_endpoint().await;
        let mut overrides = HashMap::new();
        overrides.insert(
            prompts::TEAM_REPORT.to_string(),
            "CUSTOM\n{{DATA}}".to_string(),
        );
        generate_team_report(&sample_team(), &[], &config_for(addr), &overrides)
            .await
            .unwrap();

        let body = rx.await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        let prompt = value["messages"][0]["content"].as_str().unwrap();
        assert!(prompt.starts_with("CUSTOM"));
        assert!(prompt.contains("Team: Engineering Alpha"));
    }
}
