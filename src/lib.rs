// src/lib.rs
pub mod application;
pub mod cli;
pub mod constants;
pub mod domain;
pub mod infrastructure;
pub mod ports;
pub mod util;

use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use application::{
    CardCreator, CardDeleter, CardFilter, CardLister, CardUpdater, CardViewer, MemberManager,
};
use domain::CardDraft;
use infrastructure::{Config, SqliteCardRepository};
use ports::JsonPresenter;
use serde_json::json;
use tracing::{debug, info};
use crate::cli::args::{AddArgs, Args, Command};

pub fn run(args: Args) -> Result<()> {
    debug!(?args, "Starting boardcards with arguments");

    let presenter = if args.compact {
        JsonPresenter::compact()
    } else {
        JsonPresenter::new()
    };

    if let Command::InitConfig = args.command {
        let config_path = find_config_path(args.config.as_deref())?;
        Config::create_default(&config_path)?;
        info!(?config_path, "Wrote default config");
        println!(
            "{}",
            presenter.render(&json!({ "configPath": config_path.display().to_string() }))?
        );
        return Ok(());
    }

    let config = Config::load_or_default(args.config.as_deref())?;
    let database_path = find_database_path(args.database.as_deref(), &config)?;
    let busy_timeout = config.database.busy_timeout();

    let output = match args.command {
        Command::SyncSchema => {
            let repository = SqliteCardRepository::connect(&database_path, busy_timeout)?;
            let report = repository.sync_schema()?;
            info!(?database_path, ?report, "Schema synchronised");
            presenter.render_schema_report(&report)?
        }
        command => {
            let repository = SqliteCardRepository::open(&database_path, busy_timeout)?;
            execute(command, repository, &config, presenter)?
        }
    };

    println!("{output}");
    Ok(())
}

/// Run a card command against an opened repository and render its output
fn execute(
    command: Command,
    mut repository: SqliteCardRepository,
    config: &Config,
    presenter: JsonPresenter,
) -> Result<String> {
    let output = match command {
        Command::SyncSchema => presenter.render_schema_report(&repository.sync_schema()?)?,
        Command::InitConfig => anyhow::bail!("init-config does not open a database"),
        Command::AddUser { username, email } => {
            let user = repository.create_user(&username, email.as_deref())?;
            presenter.render(&user.serialize())?
        }
        Command::AddBoard { name } => {
            let board = repository.create_board(&name)?;
            presenter.render(&board)?
        }
        Command::DeleteBoard { board_id } => {
            let cards_deleted = repository.delete_board(board_id)?;
            presenter.render(&json!({ "boardId": board_id, "cardsDeleted": cards_deleted }))?
        }
        Command::Add(add) => {
            let draft = read_draft(&add)?;
            let mut creator = CardCreator::new(repository)
                .with_default_state(config.cards.default_state);
            let card = creator.create_card(draft)?;
            presenter.render_card(&card)?
        }
        Command::Show { card_id } => {
            let mut viewer = CardViewer::new(repository);
            let card = viewer.view_card(card_id)?;
            presenter.render_card(&card)?
        }
        Command::List { board, state, member } => {
            let filter = CardFilter {
                board_id: board,
                state,
                member_id: member,
            };
            let mut lister = CardLister::new(repository);
            let cards = lister.list_cards(&filter)?;
            info!(count = cards.len(), "Listed cards");
            presenter.render_cards(&cards)?
        }
        Command::Update(update) => {
            let mut updater = CardUpdater::new(repository);
            let card = updater.update_card(update.card_id, &update.to_update())?;
            presenter.render_card(&card)?
        }
        Command::Delete { card_id } => {
            let mut deleter = CardDeleter::new(repository);
            let memberships = deleter.delete_card(card_id)?;
            presenter.render(&json!({ "cardId": card_id, "membershipsRemoved": memberships }))?
        }
        Command::AddMember { card_id, user_id } => {
            let mut manager = MemberManager::new(repository);
            let card = manager.add_member(card_id, user_id)?;
            presenter.render_card(&card)?
        }
        Command::RemoveMember { card_id, user_id } => {
            let mut manager = MemberManager::new(repository);
            let card = manager.remove_member(card_id, user_id)?;
            presenter.render_card(&card)?
        }
    };
    Ok(output)
}

/// Combine `add` flags with an optional JSON file; flags win
fn read_draft(add: &AddArgs) -> Result<CardDraft> {
    let flags = add.to_draft();
    let Some(path) = &add.from_json else {
        return Ok(flags);
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read card file: {}", path.display()))?;
    let from_file: CardDraft = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse card file: {}", path.display()))?;
    Ok(flags.or(from_file))
}

/// Resolve the database location: explicit flag, config file, then the
/// platform data directory.
pub fn find_database_path(cli_path: Option<&Path>, config: &Config) -> Result<PathBuf> {
    if let Some(path) = cli_path {
        debug!(?path, "Using provided database path");
        return Ok(path.to_path_buf());
    }

    if let Some(path) = config.database.path() {
        debug!(?path, "Using database path from config");
        return Ok(path);
    }

    let data_dir = dirs::data_dir().context("Could not find data directory")?;
    Ok(data_dir
        .join(constants::DATA_DIR_NAME)
        .join(constants::DATABASE_FILE_NAME))
}

/// Where `init-config` writes: explicit flag, then the platform config directory.
pub fn find_config_path(cli_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = cli_path {
        return Ok(path.to_path_buf());
    }

    let config_dir = dirs::config_dir().context("Could not find config directory")?;
    Ok(config_dir
        .join(constants::DATA_DIR_NAME)
        .join(constants::CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing;

    #[ctor::ctor]
    fn init() {
        testing::init_test_setup().expect("Failed to initialize test setup");
    }

    #[test]
    fn given_cli_path_when_resolving_database_then_cli_wins() {
        let mut config = Config::default();
        config.database.path = "/from/config.db".to_string();

        let path = find_database_path(Some(Path::new("/from/cli.db")), &config).unwrap();

        assert_eq!(path, PathBuf::from("/from/cli.db"));
    }

    #[test]
    fn given_config_path_when_resolving_database_then_uses_config() {
        let mut config = Config::default();
        config.database.path = "/from/config.db".to_string();

        let path = find_database_path(None, &config).unwrap();

        assert_eq!(path, PathBuf::from("/from/config.db"));
    }
}
