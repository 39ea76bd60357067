use std::sync::Arc;
use std::time::Instant;

use poise::serenity_prelude as serenity;
use tracing::{debug, error, info, warn};

use warden_core::Data;
use warden_core::slowmode::{SWEEP_INTERVAL, SlowmodeChange};
use warden_utils::permissions::is_missing_permissions_error;

/// Count a guild message towards its channel's traffic and apply any resulting change.
pub async fn handle_message_slowmode(
    ctx: &serenity::Context,
    data: &Data,
    message: &serenity::Message,
) {
    if message.author.bot || message.webhook_id.is_some() {
        return;
    }
    let Some(guild_id) = message.guild_id else {
        return;
    };

    let settings = match data.slowmode_settings(guild_id.get()).await {
        Ok(Some(settings)) => settings,
        Ok(None) => return,
        Err(source) => {
            error!(?source, guild_id = guild_id.get(), "failed to load slowmode settings");
            return;
        }
    };

    let change = data.slowmode.lock().await.record(
        guild_id.get(),
        message.channel_id.get(),
        Instant::now(),
        &settings,
    );

    if let Some(change) = change {
        apply_change(&ctx.http, data, guild_id.get(), message.channel_id.get(), change).await;
    }
}

/// Release slowmode on channels whose traffic has died down, every [`SWEEP_INTERVAL`].
pub fn spawn_slowmode_sweeper(http: Arc<serenity::Http>, data: Data) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let releases = data.slowmode.lock().await.sweep_cached(Instant::now());
            for (guild_id, channel_id) in releases {
                apply_change(&http, &data, guild_id, channel_id, SlowmodeChange::Release).await;
            }
        }
    });
    info!("Slowmode sweeper started.");
}

async fn apply_change(
    http: &serenity::Http,
    data: &Data,
    guild_id: u64,
    channel_id: u64,
    change: SlowmodeChange,
) {
    let seconds = match change {
        SlowmodeChange::Engage(seconds) => seconds,
        SlowmodeChange::Release => 0,
    };

    let edit = serenity::EditChannel::new()
        .rate_limit_per_user(seconds)
        .audit_log_reason("Automatic slowmode");
    match serenity::ChannelId::new(channel_id).edit(http, edit).await {
        Ok(_) => {
            debug!(guild_id, channel_id, seconds, "slowmode updated");
        }
        Err(source) => {
            if is_missing_permissions_error(&source) {
                warn!(guild_id, channel_id, "missing permissions to change slowmode");
            } else {
                error!(?source, guild_id, channel_id, "failed to change slowmode");
            }
            data.slowmode.lock().await.rollback(guild_id, channel_id, change);
        }
    }
}
