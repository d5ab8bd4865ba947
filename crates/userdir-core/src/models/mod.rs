//! Data models for the user directory.
//!
//! - `UserRecord`: the flattened person stored locally and rendered as a card
//! - `RandomUser`, `RandomUserResponse`: the randomuser.me wire shape

pub mod user;

pub use user::{RandomUser, RandomUserResponse, ResponseInfo, UserRecord};

#[cfg(test)]
pub(crate) fn sample_user(id: &str) -> UserRecord {
    UserRecord {
        id: id.to_string(),
        first_name: format!("First{}", id),
        last_name: format!("Last{}", id),
        email: format!("{}@example.com", id.to_lowercase()),
        phone: "(555) 010-0000".to_string(),
        image: format!("https://randomuser.me/api/portraits/lego/{}.jpg", id.len()),
    }
}
