// src/application/mod.rs
pub mod card_creator;
pub mod card_deleter;
pub mod card_lister;
pub mod card_updater;
pub mod card_viewer;
pub mod member_manager;

pub use card_creator::CardCreator;
pub use card_deleter::CardDeleter;
pub use card_lister::{CardFilter, CardLister};
pub use card_updater::CardUpdater;
pub use card_viewer::{CardRepository, CardViewer};
pub use member_manager::MemberManager;
