#[derive(Clone, Debug)]
pub struct CaseSummary {
    pub case_number: u64,
    pub case_code: String,
    pub action_case_number: u64,
    pub target_user_id: Option<u64>,
    pub moderator_user_id: u64,
    pub action: String,
    pub reason: String,
    pub duration_seconds: Option<u64>,
    pub created_at: u64,
}
