use serde::{Deserialize, Serialize};

/// A person as stored in the local table and shown in the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub email: String,
    pub phone: String,
    /// Portrait URL
    pub image: String,
}

impl UserRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

// API Response wrappers (randomuser.me)
#[derive(Debug, Clone, Deserialize)]
pub struct RandomUserResponse {
    pub results: Vec<RandomUser>,
    pub info: Option<ResponseInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseInfo {
    pub seed: Option<String>,
    pub results: Option<u32>,
    pub page: Option<u32>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RandomUser {
    pub login: Login,
    pub name: Name,
    pub email: String,
    pub phone: String,
    pub picture: Picture,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Login {
    pub uuid: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Name {
    pub title: Option<String>,
    pub first: String,
    pub last: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Picture {
    pub large: String,
    pub medium: Option<String>,
    pub thumbnail: Option<String>,
}

/// Flatten the nested API record into the stored shape
impl From<RandomUser> for UserRecord {
    fn from(user: RandomUser) -> Self {
        UserRecord {
            id: user.login.uuid,
            first_name: user.name.first,
            last_name: user.name.last,
            email: user.email,
            phone: user.phone,
            image: user.picture.large,
        }
    }
}
