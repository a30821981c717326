// src/domain/mod.rs
pub mod board;
pub mod card;
pub mod error;
pub mod priority;
pub mod record;
pub mod state;
pub mod user;

pub use board::Board;
pub use card::{Card, CardDraft, CardMember, CardUpdate, NewCard};
pub use error::DomainError;
pub use priority::Priority;
pub use record::{CardRecord, UserRecord};
pub use state::CardState;
pub use user::User;
