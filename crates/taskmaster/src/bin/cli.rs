//! Taskmaster CLI - personal task manager with AI prioritization.

#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::disallowed_macros)]
#![allow(clippy::uninlined_format_args)]

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use tracing_subscriber::EnvFilter;

use taskmaster::ai::anthropic::AnthropicProvider;
use taskmaster::ai::schemas::{response_json_schema, PrioritizationRequest};
use taskmaster::entities::{parse_due_date, TaskDraft, TaskEffort, TaskStatus, TaskmasterConfig};
use taskmaster::{ui, PrioritizationService, StatusFilter, TaskFilter, TasksDomain};

#[derive(Parser)]
#[command(name = "taskmaster")]
#[command(about = "Manage your tasks with intelligence", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to .taskmaster/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Model provider (anthropic, openai)
    #[arg(long, global = true, env = "TASKMASTER_PROVIDER")]
    provider: Option<String>,

    /// Model ID
    #[arg(long, global = true, env = "TASKMASTER_MODEL")]
    model: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive session (tasks live until you quit)
    Session,

    /// Prioritize a request file and print the response JSON
    Prioritize {
        /// Request JSON file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: String,
    },

    /// Print the prompt a request would produce, without calling a model
    Render {
        /// Request JSON file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: String,
    },

    /// Print the JSON Schema of the prioritization response
    Schema,
}

fn load_config(cli: &Cli) -> Result<TaskmasterConfig> {
    let path = cli
        .config
        .clone()
        .unwrap_or_else(TaskmasterConfig::default_path);
    let mut config = TaskmasterConfig::load_with_env(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;

    if let Some(provider) = &cli.provider {
        config.model.set_provider(provider.clone());
    }
    if let Some(model) = &cli.model {
        config.model.model_id.clone_from(model);
    }
    Ok(config)
}

fn init_logging(verbose: bool, config: &TaskmasterConfig) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.global.log_level))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_request(input: &str) -> Result<serde_json::Value> {
    let content = if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read request from stdin")?;
        buf
    } else {
        std::fs::read_to_string(Path::new(input))
            .with_context(|| format!("Failed to read request file {input}"))?
    };
    serde_json::from_str(&content).context("Request is not valid JSON")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(cli.verbose, &config);

    match &cli.command {
        Commands::Session => run_session(&config).await,
        Commands::Prioritize { input } => {
            let body = read_request(input)?;
            let service = PrioritizationService::from_config(&config)?;
            let response = service.prioritize_value(body).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Commands::Render { input } => {
            let request = PrioritizationRequest::from_value(read_request(input)?)?;
            // Rendering never reaches the backend, so any provider will do
            let service = PrioritizationService::new(
                Arc::new(AnthropicProvider::from_env()),
                config.model.model_id.clone(),
            );
            for message in service.render_prompt(&request.tasks)? {
                println!("{}", format!("[{:?}]", message.role).cyan().bold());
                println!("{}\n", message.content);
            }
            Ok(())
        }
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&response_json_schema()?)?);
            Ok(())
        }
    }
}

const MENU: &[&str] = &[
    "New task",
    "Edit task",
    "Delete task",
    "Toggle status",
    "Show task",
    "Filter by status",
    "Search",
    "Get AI suggestions",
    "Quit",
];

async fn run_session(config: &TaskmasterConfig) -> Result<()> {
    let theme = ColorfulTheme::default();
    let mut tasks = TasksDomain::in_memory();
    let mut filter = TaskFilter::default();

    // The session still works without a model; only prioritization needs one
    let service = match PrioritizationService::from_config(config) {
        Ok(service) => Some(service),
        Err(e) => {
            ui::print_warning(&format!("AI suggestions unavailable: {e}"));
            None
        }
    };

    println!("{}", "TaskMaster".cyan().bold());
    println!("{}", "Manage your tasks with intelligence.".dimmed());

    loop {
        let visible = tasks.list_tasks(&filter);
        println!();
        if visible.is_empty() {
            ui::print_info("No tasks found.");
        } else {
            println!("{}", ui::task_table(&visible));
        }
        let visible_ids: Vec<String> = visible.iter().map(|t| t.id.clone()).collect();

        let choice = Select::with_theme(&theme)
            .with_prompt("What next?")
            .items(MENU)
            .default(0)
            .interact()?;

        match MENU[choice] {
            "New task" => {
                let draft = prompt_draft(&theme, None)?;
                match tasks.add_task(draft) {
                    Ok(_) => ui::print_success("Task added successfully!"),
                    Err(e) => ui::print_error(&e.to_string()),
                }
            }
            "Edit task" => {
                if let Some(id) = pick_task(&theme, &tasks, &visible_ids)? {
                    let current = TaskDraft::from(tasks.get_task(&id)?);
                    let draft = prompt_draft(&theme, Some(&current))?;
                    match tasks.update_task(&id, draft) {
                        Ok(_) => ui::print_success("Task updated successfully!"),
                        Err(e) => ui::print_error(&e.to_string()),
                    }
                }
            }
            "Delete task" => {
                if let Some(id) = pick_task(&theme, &tasks, &visible_ids)? {
                    let confirmed = Confirm::with_theme(&theme)
                        .with_prompt("Delete this task?")
                        .default(false)
                        .interact()?;
                    if confirmed {
                        tasks.delete_task(&id)?;
                        ui::print_warning("Task deleted.");
                    }
                }
            }
            "Toggle status" => {
                if let Some(id) = pick_task(&theme, &tasks, &visible_ids)? {
                    let status = tasks.toggle_status(&id)?;
                    ui::print_success(&format!("Marked as {}", ui::status_colored(status)));
                }
            }
            "Show task" => {
                if let Some(id) = pick_task(&theme, &tasks, &visible_ids)? {
                    ui::display_task_details(tasks.get_task(&id)?);
                }
            }
            "Filter by status" => {
                let options = ["all", "pending", "completed"];
                let idx = Select::with_theme(&theme)
                    .with_prompt("Show")
                    .items(&options)
                    .default(0)
                    .interact()?;
                filter.status = options[idx].parse::<StatusFilter>()?;
            }
            "Search" => {
                let term: String = Input::with_theme(&theme)
                    .with_prompt("Search tasks (empty to clear)")
                    .allow_empty(true)
                    .interact_text()?;
                filter.search = Some(term.trim().to_string()).filter(|t| !t.is_empty());
            }
            "Get AI suggestions" => match &service {
                Some(service) => {
                    let spinner = ui::spinner("Asking the model for prioritization...");
                    let result = service.prioritize_tasks(&mut tasks).await;
                    spinner.finish_and_clear();
                    match result {
                        Ok(report) => ui::print_merge_report(&report),
                        Err(e) => {
                            tracing::error!(error = %e, "AI prioritization failed");
                            ui::print_error(
                                "Could not retrieve prioritization suggestions. Please try again.",
                            );
                        }
                    }
                }
                None => ui::print_error("No AI provider is configured."),
            },
            _ => break,
        }
    }

    Ok(())
}

fn pick_task(
    theme: &ColorfulTheme,
    tasks: &TasksDomain,
    visible_ids: &[String],
) -> Result<Option<String>> {
    if visible_ids.is_empty() {
        ui::print_info("No tasks to choose from.");
        return Ok(None);
    }
    let labels: Vec<String> = visible_ids
        .iter()
        .filter_map(|id| tasks.get_task(id).ok())
        .map(|t| format!("{} [{}]", t.title, t.status))
        .collect();
    let idx = Select::with_theme(theme)
        .with_prompt("Task")
        .items(&labels)
        .default(0)
        .interact_opt()?;
    Ok(idx.map(|i| visible_ids[i].clone()))
}

fn prompt_draft(theme: &ColorfulTheme, current: Option<&TaskDraft>) -> Result<TaskDraft> {
    let title: String = Input::with_theme(theme)
        .with_prompt("Title")
        .with_initial_text(current.map(|c| c.title.clone()).unwrap_or_default())
        .interact_text()?;

    let description: String = Input::with_theme(theme)
        .with_prompt("Description (optional)")
        .with_initial_text(
            current
                .and_then(|c| c.description.clone())
                .unwrap_or_default(),
        )
        .allow_empty(true)
        .interact_text()?;

    let due: String = Input::with_theme(theme)
        .with_prompt("Due date YYYY-MM-DD (optional)")
        .with_initial_text(
            current
                .and_then(|c| c.due_date)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        )
        .allow_empty(true)
        .validate_with(|input: &String| -> Result<(), String> {
            if input.trim().is_empty() {
                return Ok(());
            }
            parse_due_date(input).map(|_| ()).map_err(|e| e.to_string())
        })
        .interact_text()?;

    let efforts = ["none", "low", "medium", "high"];
    let current_effort = current
        .and_then(|c| c.estimated_effort)
        .map_or(0, |e| match e {
            TaskEffort::Low => 1,
            TaskEffort::Medium => 2,
            TaskEffort::High => 3,
        });
    let effort_idx = Select::with_theme(theme)
        .with_prompt("Estimated effort")
        .items(&efforts)
        .default(current_effort)
        .interact()?;

    let statuses = ["pending", "completed"];
    let current_status = usize::from(current.is_some_and(|c| c.status == TaskStatus::Completed));
    let status_idx = Select::with_theme(theme)
        .with_prompt("Status")
        .items(&statuses)
        .default(current_status)
        .interact()?;

    let mut draft = TaskDraft::new(title).with_status(statuses[status_idx].parse()?);
    if !description.trim().is_empty() {
        draft = draft.with_description(description);
    }
    if !due.trim().is_empty() {
        draft = draft.with_due_date(parse_due_date(&due)?);
    }
    if effort_idx > 0 {
        draft = draft.with_effort(efforts[effort_idx].parse::<TaskEffort>()?);
    }
    Ok(draft)
}
