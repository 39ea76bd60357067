use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AfkEntry {
    pub user_id: u64,
    pub reason: String,
    pub since: u64,
}
