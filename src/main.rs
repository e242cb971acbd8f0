//! Operational CLI for the DOINg core.
//!
//! `doing status` prints a one-screen summary of the stored state;
//! `doing report <team-id>` assembles a team status report and sends it
//! through the configured model endpoint.

use std::env;
use std::error::Error;
use std::process;

use doing::llm::generate;
use doing::reports;
use doing::storage::StateStore;

fn usage() {
    eprintln!("usage: doing [status | report <team-id>]");
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let result = match args.first().map(String::as_str) {
        None | Some("status") => status(),
        Some("report") => match args.get(1) {
            Some(team_id) => report(team_id).await,
            None => {
                usage();
                process::exit(2);
            }
        },
        Some(other) => {
            eprintln!("unknown command: {}", other);
            usage();
            process::exit(2);
        }
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn status() -> Result<(), Box<dyn Error>> {
    let store = StateStore::open_default();
    let state = store.load()?;

    let total_projects: usize = state.teams.iter().map(|t| t.projects.len()).sum();
    println!("state: {}", store.path().display());
    println!(
        "users: {}  teams: {}  projects: {}  meetings: {}  reports: {}  notes: {}",
        state.users.len(),
        state.teams.len(),
        total_projects,
        state.meetings.len(),
        state.weekly_reports.len(),
        state.notes.len(),
    );
    if !state.weekly_reports.is_empty() {
        println!();
        print!(
            "{}",
            reports::shape_portfolio(&state.teams, &state.weekly_reports, &state.users)
        );
    }
    Ok(())
}

async fn report(team_id: &str) -> Result<(), Box<dyn Error>> {
    let store = StateStore::open_default();
    let state = store.load()?;

    let team = state
        .teams
        .iter()
        .find(|t| t.id == team_id)
        .ok_or_else(|| format!("no team with id {}", team_id))?;

    log::info!("generating status report for team {}", team.name);
    let summary = generate::generate_team_report(
        team,
        &state.users,
        &state.llm_config,
        &state.prompts,
    )
    .await?;
    println!("{}", summary);
    Ok(())
}
