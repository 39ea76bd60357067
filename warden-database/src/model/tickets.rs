pub const STATUS_OPEN: &str = "open";
pub const STATUS_CLOSED: &str = "closed";

#[derive(Clone, Debug)]
pub struct Ticket {
    pub id: u64,
    pub guild_id: u64,
    pub channel_id: u64,
    pub owner_user_id: u64,
    pub reason: Option<String>,
    pub status: String,
    pub created_at: u64,
    pub closed_at: Option<u64>,
    pub closed_by_user_id: Option<u64>,
}

impl Ticket {
    pub fn is_open(&self) -> bool {
        self.status == STATUS_OPEN
    }
}
