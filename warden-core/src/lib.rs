use std::sync::Arc;

use tokio::sync::Mutex;
use warden_database::Database;
use warden_database::impls::guild_config::get_guild_config;

pub mod slowmode;

use slowmode::{SlowmodeController, SlowmodeSettings};

pub type Error = anyhow::Error;

/// Ticket settings used when a guild has not configured its own.
#[derive(Clone, Debug)]
pub struct TicketDefaults {
    pub staff_role_id: Option<u64>,
    pub category_name: String,
    pub channel_prefix: String,
}

#[derive(Clone, Debug)]
pub struct Data {
    pub db: Database,
    pub ticket_defaults: TicketDefaults,
    pub slowmode: Arc<Mutex<SlowmodeController>>,
}

impl Data {
    pub fn new(db: Database, ticket_defaults: TicketDefaults) -> Self {
        Self {
            db,
            ticket_defaults,
            slowmode: Arc::new(Mutex::new(SlowmodeController::default())),
        }
    }

    /// Auto-slowmode settings for a guild, loaded on first use and cached in the controller.
    pub async fn slowmode_settings(&self, guild_id: u64) -> anyhow::Result<Option<SlowmodeSettings>> {
        if let Some(cached) = self.slowmode.lock().await.guild_settings(guild_id) {
            return Ok(cached);
        }

        self.reload_slowmode_settings(guild_id).await
    }

    /// Re-read the guild's slowmode row and replace the controller's cached copy.
    pub async fn reload_slowmode_settings(
        &self,
        guild_id: u64,
    ) -> anyhow::Result<Option<SlowmodeSettings>> {
        let config = get_guild_config(&self.db, guild_id).await?;
        let settings = SlowmodeSettings::from_config(&config.slowmode)?;
        self.slowmode
            .lock()
            .await
            .update_guild_settings(guild_id, settings);
        Ok(settings)
    }
}

pub type Context<'a> = poise::Context<'a, Data, Error>;
