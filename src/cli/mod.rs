//! Non-interactive subcommands for scripting.
//!
//! Each command makes one or two API calls and prints either a table or,
//! with `--json`, the raw objects.

pub mod table;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::api::ApiClient;
use crate::models::{CallLogQuery, CustomVoiceRequest};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage voice agents
    #[command(subcommand)]
    Agents(AgentsCommand),
    /// Manage phone numbers
    #[command(subcommand)]
    Phones(PhonesCommand),
    /// Browse call history
    #[command(subcommand)]
    Calls(CallsCommand),
    /// List tools and integrations
    #[command(subcommand)]
    Tools(ToolsCommand),
    /// Manage knowledge-base files
    #[command(subcommand)]
    Knowledge(KnowledgeCommand),
    /// Browse and add voices
    #[command(subcommand)]
    Voices(VoicesCommand),
    /// Show the signed-in account
    Whoami(OutputArgs),
}

#[derive(Args, Debug, Clone, Copy, Default)]
pub struct OutputArgs {
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum AgentsCommand {
    /// List agents
    List(OutputArgs),
    /// Print one agent as JSON
    Show { id: String },
    /// Delete an agent
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum PhonesCommand {
    /// List phone numbers
    List(OutputArgs),
    /// Route a number to an agent (omit --agent to unassign)
    Assign {
        id: String,
        #[arg(long)]
        agent: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum CallsCommand {
    /// List one page of calls
    List {
        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Only calls handled by this agent
        #[arg(long)]
        agent: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Print one call with its transcript
    Show { id: String },
}

#[derive(Subcommand, Debug)]
pub enum ToolsCommand {
    /// List tools
    List(OutputArgs),
    /// List connected calendars
    Calendars(OutputArgs),
}

#[derive(Subcommand, Debug)]
pub enum KnowledgeCommand {
    /// List uploaded files
    List(OutputArgs),
    /// Upload a local file
    Upload { path: PathBuf },
    /// Delete a file
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum VoicesCommand {
    /// List available voices
    List(OutputArgs),
    /// Register a provider voice under a name
    Add {
        #[arg(long)]
        provider: String,
        #[arg(long)]
        voice_id: String,
        #[arg(long)]
        name: String,
    },
}

/// Execute a subcommand against the API.
pub async fn run(command: Command, client: &ApiClient, page_size: usize) -> Result<()> {
    match command {
        Command::Agents(cmd) => agents(cmd, client).await,
        Command::Phones(cmd) => phones(cmd, client).await,
        Command::Calls(cmd) => calls(cmd, client, page_size).await,
        Command::Tools(cmd) => tools(cmd, client).await,
        Command::Knowledge(cmd) => knowledge(cmd, client).await,
        Command::Voices(cmd) => voices(cmd, client).await,
        Command::Whoami(out) => {
            let user = client.refresh_current_user().await?;
            if out.json {
                return print_json(&user);
            }
            println!("{} <{}>", user.display_name(), user.email);
            println!("Credits: {:.2}", user.credits);
            match &user.payment_method {
                Some(pm) => println!("Card:    {}", pm.summary()),
                None => println!("Card:    none"),
            }
            Ok(())
        }
    }
}

async fn agents(cmd: AgentsCommand, client: &ApiClient) -> Result<()> {
    match cmd {
        AgentsCommand::List(out) => {
            let agents = client.list_agents().await?;
            if out.json {
                return print_json(&agents);
            }
            let rows = agents
                .iter()
                .map(|a| {
                    vec![
                        a.id.clone(),
                        a.name.clone(),
                        a.config.language.clone(),
                        a.config.enabled_features().join(","),
                    ]
                })
                .collect::<Vec<_>>();
            print!("{}", table::render(&["ID", "NAME", "LANGUAGE", "FEATURES"], &rows));
        }
        AgentsCommand::Show { id } => {
            let agent = client
                .get_agent(&id)
                .await
                .with_context(|| format!("Failed to fetch agent {}", id))?;
            print_json(&agent)?;
        }
        AgentsCommand::Delete { id } => {
            client.delete_agent(&id).await?;
            println!("Deleted agent {}", id);
        }
    }
    Ok(())
}

async fn phones(cmd: PhonesCommand, client: &ApiClient) -> Result<()> {
    match cmd {
        PhonesCommand::List(out) => {
            let phones = client.list_phones().await?;
            if out.json {
                return print_json(&phones);
            }
            let rows = phones
                .iter()
                .map(|p| {
                    vec![
                        p.id.clone(),
                        p.number.clone(),
                        p.provider.display_name().to_string(),
                        p.agent_id.clone().unwrap_or_else(|| "-".to_string()),
                    ]
                })
                .collect::<Vec<_>>();
            print!("{}", table::render(&["ID", "NUMBER", "PROVIDER", "AGENT"], &rows));
        }
        PhonesCommand::Assign { id, agent } => {
            let phone = client.assign_phone_agent(&id, agent.as_deref()).await?;
            match phone.agent_id {
                Some(agent) => println!("{} now routes to {}", phone.number, agent),
                None => println!("{} is unassigned", phone.number),
            }
        }
    }
    Ok(())
}

async fn calls(cmd: CallsCommand, client: &ApiClient, page_size: usize) -> Result<()> {
    match cmd {
        CallsCommand::List {
            page,
            agent,
            output,
        } => {
            let query = CallLogQuery {
                page: page.max(1),
                page_size,
                agent_id: agent,
            };
            let logs = client.list_call_logs(&query).await?;
            if output.json {
                return print_json(&logs);
            }
            let rows = logs
                .iter()
                .map(|c| {
                    vec![
                        c.id.clone(),
                        c.started_at
                            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                            .unwrap_or_default(),
                        c.direction.to_string(),
                        c.counterpart().to_string(),
                        c.duration_display(),
                        c.status.clone(),
                    ]
                })
                .collect::<Vec<_>>();
            print!(
                "{}",
                table::render(&["ID", "STARTED", "DIR", "NUMBER", "TIME", "STATUS"], &rows)
            );
            if logs.len() >= page_size {
                println!("(more: --page {})", query.page + 1);
            }
        }
        CallsCommand::Show { id } => {
            let log = client.get_call_log(&id).await?;
            print_json(&log)?;
        }
    }
    Ok(())
}

async fn tools(cmd: ToolsCommand, client: &ApiClient) -> Result<()> {
    match cmd {
        ToolsCommand::List(out) => {
            let tools = client.list_tools().await?;
            if out.json {
                return print_json(&tools);
            }
            let rows = tools
                .iter()
                .map(|t| vec![t.id.clone(), t.name.clone(), t.kind_label().to_string()])
                .collect::<Vec<_>>();
            print!("{}", table::render(&["ID", "NAME", "KIND"], &rows));
        }
        ToolsCommand::Calendars(out) => {
            let calendars = client.list_calendars().await?;
            if out.json {
                return print_json(&calendars);
            }
            let rows = calendars
                .iter()
                .map(|c| vec![c.id.clone(), c.name.clone(), c.provider.clone()])
                .collect::<Vec<_>>();
            print!("{}", table::render(&["ID", "NAME", "PROVIDER"], &rows));
        }
    }
    Ok(())
}

async fn knowledge(cmd: KnowledgeCommand, client: &ApiClient) -> Result<()> {
    match cmd {
        KnowledgeCommand::List(out) => {
            let files = client.list_knowledge_files().await?;
            if out.json {
                return print_json(&files);
            }
            let rows = files
                .iter()
                .map(|f| {
                    vec![
                        f.id.clone(),
                        f.name.clone(),
                        f.size_display(),
                        f.status.clone().unwrap_or_default(),
                    ]
                })
                .collect::<Vec<_>>();
            print!("{}", table::render(&["ID", "NAME", "SIZE", "STATUS"], &rows));
        }
        KnowledgeCommand::Upload { path } => {
            let file = client.upload_knowledge_file(&path).await?;
            println!("Uploaded {} ({})", file.name, file.id);
        }
        KnowledgeCommand::Delete { id } => {
            client.delete_knowledge_file(&id).await?;
            println!("Deleted file {}", id);
        }
    }
    Ok(())
}

async fn voices(cmd: VoicesCommand, client: &ApiClient) -> Result<()> {
    match cmd {
        VoicesCommand::List(out) => {
            let voices = client.list_voices().await?;
            if out.json {
                return print_json(&voices);
            }
            let rows = voices
                .iter()
                .map(|v| {
                    vec![
                        v.id.clone(),
                        v.name.clone(),
                        v.provider.clone(),
                        v.language.clone().unwrap_or_default(),
                        if v.custom { "custom" } else { "" }.to_string(),
                    ]
                })
                .collect::<Vec<_>>();
            print!(
                "{}",
                table::render(&["ID", "NAME", "PROVIDER", "LANGUAGE", ""], &rows)
            );
        }
        VoicesCommand::Add {
            provider,
            voice_id,
            name,
        } => {
            let voice = client
                .add_custom_voice(&CustomVoiceRequest {
                    provider,
                    voice_id,
                    name,
                })
                .await?;
            println!("Added voice {}", voice.picker_label());
        }
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
