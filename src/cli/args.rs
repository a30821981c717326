// src/cli/args.rs
use crate::domain::record::parse_timestamp;
use crate::domain::{CardDraft, CardState, CardUpdate, Priority};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)] // Read from `Cargo.toml`
#[command(arg_required_else_help = true, disable_help_subcommand = true)]
pub struct Args {
    /// Path to the SQLite database (optional)
    #[arg(short, long, value_name = "DATABASE", global = true)]
    pub database: Option<PathBuf>,

    /// Path to a TOML config file (optional)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Print JSON on a single line
    #[arg(long, global = true)]
    pub compact: bool,

    /// Verbosity level (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create missing tables and columns; run after upgrading
    SyncSchema,

    /// Write a config file with default values to --config or the platform
    /// config directory
    InitConfig,

    /// Register a user that can own or join cards
    AddUser {
        #[arg(value_name = "USERNAME")]
        username: String,

        #[arg(long)]
        email: Option<String>,
    },

    /// Create a board
    AddBoard {
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Delete a board and all of its cards
    DeleteBoard {
        #[arg(value_name = "BOARD_ID")]
        board_id: i64,
    },

    /// Create a card and print it as JSON
    Add(AddArgs),

    /// Print a card as JSON
    Show {
        #[arg(value_name = "CARD_ID")]
        card_id: i64,
    },

    /// List cards as JSON, optionally filtered
    List {
        #[arg(long, value_name = "BOARD_ID")]
        board: Option<i64>,

        #[arg(long)]
        state: Option<CardState>,

        /// Only cards this user is a member of
        #[arg(long, value_name = "USER_ID")]
        member: Option<i64>,
    },

    /// Change fields of a card
    Update(UpdateArgs),

    /// Delete a card
    Delete {
        #[arg(value_name = "CARD_ID")]
        card_id: i64,
    },

    /// Add a user to a card's members
    AddMember {
        #[arg(value_name = "CARD_ID")]
        card_id: i64,
        #[arg(value_name = "USER_ID")]
        user_id: i64,
    },

    /// Remove a user from a card's members
    RemoveMember {
        #[arg(value_name = "CARD_ID")]
        card_id: i64,
        #[arg(value_name = "USER_ID")]
        user_id: i64,
    },
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct AddArgs {
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long, value_name = "BOARD_ID")]
    pub board: Option<i64>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long, value_name = "USER_ID")]
    pub responsible: Option<i64>,

    #[arg(long, value_parser = parse_timestamp_arg)]
    pub begin: Option<NaiveDateTime>,

    #[arg(long, value_parser = parse_timestamp_arg)]
    pub due: Option<NaiveDateTime>,

    #[arg(long)]
    pub state: Option<CardState>,

    /// Baja, Media or Alta
    #[arg(long)]
    pub priority: Option<String>,

    /// Repeat for several tags; order is kept
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Repeat for several members
    #[arg(long = "member", value_name = "USER_ID")]
    pub members: Vec<i64>,

    /// Read card fields from a JSON file; flags take precedence
    #[arg(long, value_name = "FILE")]
    pub from_json: Option<PathBuf>,
}

impl AddArgs {
    /// Fields given as flags. `--from-json` is merged in by the caller.
    pub fn to_draft(&self) -> CardDraft {
        CardDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            responsible_id: self.responsible,
            creation_date: None,
            begin_date: self.begin,
            due_date: self.due,
            state: self.state,
            board_id: self.board,
            priority: self.priority.clone(),
            tags: (!self.tags.is_empty()).then(|| self.tags.clone()),
            members: self.members.clone(),
        }
    }
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct UpdateArgs {
    #[arg(value_name = "CARD_ID")]
    pub card_id: i64,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long, conflicts_with = "clear_description")]
    pub description: Option<String>,
    #[arg(long)]
    pub clear_description: bool,

    #[arg(long, value_name = "USER_ID", conflicts_with = "clear_responsible")]
    pub responsible: Option<i64>,
    #[arg(long)]
    pub clear_responsible: bool,

    #[arg(long, value_parser = parse_timestamp_arg, conflicts_with = "clear_begin")]
    pub begin: Option<NaiveDateTime>,
    #[arg(long)]
    pub clear_begin: bool,

    #[arg(long, value_parser = parse_timestamp_arg, conflicts_with = "clear_due")]
    pub due: Option<NaiveDateTime>,
    #[arg(long)]
    pub clear_due: bool,

    #[arg(long)]
    pub state: Option<CardState>,

    #[arg(long, conflicts_with = "clear_priority")]
    pub priority: Option<Priority>,
    #[arg(long)]
    pub clear_priority: bool,

    /// Replaces all tags; repeat for several
    #[arg(long = "tag", value_name = "TAG", conflicts_with = "clear_tags")]
    pub tags: Vec<String>,
    #[arg(long)]
    pub clear_tags: bool,
}

impl UpdateArgs {
    pub fn to_update(&self) -> CardUpdate {
        CardUpdate {
            title: self.title.clone(),
            description: nullable(self.description.clone(), self.clear_description),
            responsible_id: nullable(self.responsible, self.clear_responsible),
            begin_date: nullable(self.begin, self.clear_begin),
            due_date: nullable(self.due, self.clear_due),
            state: self.state,
            priority: nullable(self.priority, self.clear_priority),
            tags: nullable(
                (!self.tags.is_empty()).then(|| self.tags.clone()),
                self.clear_tags,
            ),
        }
    }
}

fn nullable<T>(value: Option<T>, clear: bool) -> Option<Option<T>> {
    if clear {
        Some(None)
    } else {
        value.map(Some)
    }
}

fn parse_timestamp_arg(raw: &str) -> Result<NaiveDateTime, String> {
    parse_timestamp(raw).map_err(|e| e.to_string())
}
