// src/domain/user.rs
use crate::domain::record::UserRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
}

impl User {
    pub fn serialize(&self) -> UserRecord {
        UserRecord {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}
