use chore_cli::cli::{Cli, Command, collect_config_overrides};
use chore_core::assignee;
use chore_core::completion::{self, CompletionEvent, Decision, SkipEvent};
use chore_core::config::{self, Config};
use chore_core::error::AppError;
use chore_core::model::{Chore, HistoryRecord, UserId};
use chore_core::storage;
use clap::Parser;
use clap::error::ErrorKind;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::Path;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};
use tracing_subscriber::EnvFilter;

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "performed at")]
    performed_at: String,
    #[tabled(rename = "due")]
    due_date: String,
    #[tabled(rename = "by")]
    completed_by: String,
    #[tabled(rename = "assigned")]
    assigned_to: String,
    status: String,
    note: String,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

fn format_local(moment: Option<OffsetDateTime>) -> Result<String, AppError> {
    let Some(moment) = moment else {
        return Ok("-".to_string());
    };
    let format = format_description!(
        "[year]-[month]-[day] [hour]:[minute] [offset_hour sign:mandatory]:[offset_minute]"
    );
    moment
        .to_offset(local_offset())
        .format(format)
        .map_err(|err| AppError::invalid_data(err.to_string()))
}

fn format_user(user: Option<UserId>) -> String {
    user.map_or_else(|| "-".to_string(), |id| id.to_string())
}

fn parse_event_time(raw: Option<&str>) -> Result<OffsetDateTime, AppError> {
    match raw {
        Some(value) => OffsetDateTime::parse(value.trim(), &Rfc3339)
            .map_err(|_| AppError::invalid_input(format!("invalid --at timestamp: {value}"))),
        None => Ok(OffsetDateTime::now_utc()),
    }
}

fn load_settings(cli: &Cli) -> Result<Config, AppError> {
    let overrides =
        collect_config_overrides(&cli.config_override).map_err(AppError::invalid_input)?;
    let loaded = config::load_config_with_fallback();
    if let Some(err) = loaded.error.as_ref() {
        tracing::warn!(error = %err, "could not read config, using defaults");
    }
    Ok(config::merge_overrides(&loaded.config, &overrides))
}

fn seeded_rng(config: &Config) -> StdRng {
    match config.random_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn print_decision(
    verb: &str,
    chore: &Chore,
    decision: &Decision,
    applied: bool,
    json: bool,
) -> Result<(), AppError> {
    if json {
        let payload = serde_json::json!({
            "chore_id": chore.id,
            "applied": applied,
            "decision": decision,
        });
        println!("{payload}");
        return Ok(());
    }

    println!("{verb} chore: {} ({})", chore.name, chore.id);
    println!("Status: {}", decision.status.as_str());
    println!("Next due: {}", format_local(decision.next_due_date)?);
    println!("Next assignee: {}", format_user(decision.next_assignee));
    if decision.becomes_dormant {
        println!("Chore has no further occurrence and is now inactive");
    }
    if !applied {
        println!("Dry run, pass --apply to save");
    }
    Ok(())
}

fn print_snapshot(chore: &Chore, history: &[HistoryRecord], json: bool) -> Result<(), AppError> {
    if json {
        let payload = serde_json::json!({
            "chore": chore,
            "history": history,
        });
        println!("{payload}");
        return Ok(());
    }

    let schedule = if chore.frequency_type.is_one_shot() {
        "one-shot"
    } else if chore.is_rolling {
        "rolling"
    } else {
        "fixed"
    };
    let assignees = chore
        .assignees
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    println!("{} ({})", chore.name, chore.id);
    println!("Frequency: {} ({schedule})", chore.frequency_type);
    println!("Next due: {}", format_local(chore.next_due_date)?);
    println!("Assigned to: {}", format_user(chore.assigned_to));
    println!("Assignees: {}", if assignees.is_empty() { "-" } else { assignees.as_str() });
    println!("Strategy: {}", chore.assign_strategy);
    println!("Active: {}", if chore.is_active { "yes" } else { "no" });

    if history.is_empty() {
        println!("No history yet");
        return Ok(());
    }

    let rows = history
        .iter()
        .map(|record| {
            Ok(HistoryRow {
                performed_at: format_local(record.performed_at)?,
                due_date: format_local(record.due_date)?,
                completed_by: format_user(record.completed_by),
                assigned_to: format_user(record.assigned_to),
                status: record.status.as_str().to_string(),
                note: record.note.clone().unwrap_or_default(),
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;
    let mut table = Table::new(rows);
    table.with(Style::psql());
    println!("{table}");
    Ok(())
}

fn save_if(apply: bool, path: &Path, snapshot: &storage::ChoreSnapshot) -> Result<(), AppError> {
    if apply {
        storage::save_snapshot(path, snapshot)?;
        tracing::info!(path = %path.display(), "saved chore snapshot");
    }
    Ok(())
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn run_command(cli: Cli) -> Result<(), AppError> {
    let config = load_settings(&cli)?;
    let mut rng = seeded_rng(&config);

    match cli.command {
        Command::Complete {
            file,
            performed_by,
            at,
            note,
            apply,
        } => {
            let mut snapshot = storage::load_snapshot(&file)?;
            let event = CompletionEvent {
                performed_by,
                performed_at: parse_event_time(at.as_deref())?,
            };
            let decision = completion::complete(
                &snapshot.chore,
                &snapshot.history,
                &event,
                &config.completion_options(),
                &mut rng,
            )?;

            if apply {
                storage::apply_decision(
                    &mut snapshot,
                    &decision,
                    event.performed_by,
                    event.performed_at,
                    note,
                );
            }
            save_if(apply, &file, &snapshot)?;
            print_decision("Completed", &snapshot.chore, &decision, apply, cli.json)?;
        }
        Command::Skip {
            file,
            performed_by,
            at,
            rotate,
            apply,
        } => {
            let mut snapshot = storage::load_snapshot(&file)?;
            let event = SkipEvent {
                performed_by,
                performed_at: parse_event_time(at.as_deref())?,
                rotate_assignee: rotate,
            };
            let decision = completion::skip(&snapshot.chore, &snapshot.history, &event, &mut rng)?;

            if apply {
                storage::apply_decision(
                    &mut snapshot,
                    &decision,
                    event.performed_by,
                    event.performed_at,
                    None,
                );
            }
            save_if(apply, &file, &snapshot)?;
            print_decision("Skipped", &snapshot.chore, &decision, apply, cli.json)?;
        }
        Command::Unassign { file, user, apply } => {
            let mut snapshot = storage::load_snapshot(&file)?;
            if !snapshot.chore.assignees.contains(&user) {
                return Err(AppError::invalid_input(format!(
                    "user {user} is not an assignee"
                )));
            }

            let assigned_to = assignee::reassign_after_removal(&mut snapshot.chore, user, &mut rng);
            save_if(apply, &file, &snapshot)?;

            if cli.json {
                let payload = serde_json::json!({
                    "chore_id": snapshot.chore.id,
                    "applied": apply,
                    "assignees": snapshot.chore.assignees,
                    "assigned_to": assigned_to,
                });
                println!("{payload}");
            } else {
                println!(
                    "Removed user {user} from chore: {} ({})",
                    snapshot.chore.name, snapshot.chore.id
                );
                println!("Assigned to: {}", format_user(assigned_to));
                if !apply {
                    println!("Dry run, pass --apply to save");
                }
            }
        }
        Command::Show { file } => {
            let snapshot = storage::load_snapshot(&file)?;
            print_snapshot(&snapshot.chore, &snapshot.history, cli.json)?;
        }
    }

    Ok(())
}

fn main() {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(cli) {
        tracing::debug!(code = err.code(), "command failed");
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
