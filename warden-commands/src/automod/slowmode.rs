use tracing::{info, warn};

use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::usage_message;
use crate::moderation::guild_with_permission;
use warden_core::slowmode::{DELAY_SECONDS_RANGE, SlowmodeSettings};
use warden_core::{Context, Error};
use warden_database::impls::guild_config::{
    get_guild_config, set_slowmode_enabled, set_slowmode_params,
};
use warden_database::model::guild_config::SlowmodeConfig;
use warden_utils::embed::titled_embed;
use warden_utils::formatting::format_compact_duration;
use warden_utils::parse::{parse_duration_seconds, parse_toggle};
use warden_utils::permissions::is_missing_permissions_error;

pub const META: CommandMeta = CommandMeta {
    name: "slowmode",
    desc: "Traffic-based automatic slowmode and manual channel slowmode.",
    category: "automod",
    usage: "!slowmode [auto <on|off>|config <window> <high> <low> <delay>|set <duration|off>]",
};

/// Parse a manual slowmode value: `off`/`0` clears, otherwise a compact duration.
fn parse_manual_delay(raw: &str) -> Option<u16> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("off") || raw == "0" {
        return Some(0);
    }

    parse_duration_seconds(raw)
        .filter(|seconds| *seconds <= u64::from(DELAY_SECONDS_RANGE.1))
        .and_then(|seconds| u16::try_from(seconds).ok())
}

fn status_description(config: &SlowmodeConfig, current_delay: Option<u16>) -> String {
    let mut lines = vec![
        format!(
            "**Auto slowmode :** {}",
            if config.enabled { "Enabled" } else { "Disabled" }
        ),
        format!("**Window :** {}s", config.window_seconds),
        format!(
            "**Engage at :** {} message(s) per window",
            config.high_threshold
        ),
        format!("**Release at :** {} message(s) or fewer", config.low_threshold),
        format!(
            "**Delay :** {}",
            format_compact_duration(u64::from(config.delay_seconds))
        ),
    ];

    if let Some(delay) = current_delay {
        let current = if delay == 0 {
            "Off".to_owned()
        } else {
            format_compact_duration(u64::from(delay))
        };
        lines.push(format!("**This channel :** {current}"));
    }

    lines.join("\n")
}

#[poise::command(
    prefix_command,
    slash_command,
    category = "Automod",
    subcommands("auto", "config", "set")
)]
pub async fn slowmode(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = guild_with_permission(&ctx, serenity::Permissions::MANAGE_CHANNELS).await?
    else {
        return Ok(());
    };

    let config = get_guild_config(&ctx.data().db, guild_id.get()).await?;
    let current_delay = match ctx.guild_channel().await {
        Some(channel) => channel.rate_limit_per_user,
        None => None,
    };

    let embed = titled_embed("Slowmode", status_description(&config.slowmode, current_delay))
        .footer(serenity::CreateEmbedFooter::new("Subcommands: auto, config, set"));
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Switch traffic-based slowmode on or off for this server.
#[poise::command(prefix_command, slash_command, category = "Automod")]
pub async fn auto(
    ctx: Context<'_>,
    #[description = "on or off"] state: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = guild_with_permission(&ctx, serenity::Permissions::MANAGE_CHANNELS).await?
    else {
        return Ok(());
    };

    let Some(enabled) = state.as_deref().and_then(parse_toggle) else {
        ctx.say(usage_message("!slowmode auto <on|off>")).await?;
        return Ok(());
    };

    set_slowmode_enabled(&ctx.data().db, guild_id.get(), enabled).await?;
    ctx.data().reload_slowmode_settings(guild_id.get()).await?;
    info!(guild_id = guild_id.get(), enabled, "auto slowmode toggled");

    ctx.say(if enabled {
        "Auto slowmode **enabled**."
    } else {
        "Auto slowmode **disabled**. Channels it slowed down are released shortly."
    })
    .await?;
    Ok(())
}

/// Tune the traffic thresholds.
#[poise::command(prefix_command, slash_command, category = "Automod")]
pub async fn config(
    ctx: Context<'_>,
    #[description = "Window in seconds (1-300)"] window: Option<u32>,
    #[description = "Messages per window that engage slowmode (2-100)"] high: Option<u32>,
    #[description = "Messages per window that release it (below high)"] low: Option<u32>,
    #[description = "Slowmode delay in seconds (1-21600)"] delay: Option<u32>,
) -> Result<(), Error> {
    let Some(guild_id) = guild_with_permission(&ctx, serenity::Permissions::MANAGE_CHANNELS).await?
    else {
        return Ok(());
    };

    let (Some(window), Some(high), Some(low), Some(delay)) = (window, high, low, delay) else {
        ctx.say(usage_message("!slowmode config <window> <high> <low> <delay>"))
            .await?;
        return Ok(());
    };

    if let Err(source) = SlowmodeSettings::new(window, high, low, delay) {
        ctx.say(format!("Invalid slowmode settings: {source}.")).await?;
        return Ok(());
    }

    set_slowmode_params(
        &ctx.data().db,
        guild_id.get(),
        SlowmodeConfig {
            enabled: true,
            window_seconds: window,
            high_threshold: high,
            low_threshold: low,
            delay_seconds: delay,
        },
    )
    .await?;
    let active = ctx.data().reload_slowmode_settings(guild_id.get()).await?;

    let mut reply = format!(
        "Slowmode engages at **{high}** messages per **{window}s** (delay {}), and releases at **{low}** or fewer.",
        format_compact_duration(u64::from(delay))
    );
    if active.is_none() {
        reply.push_str(" Auto slowmode is currently off; enable it with `!slowmode auto on`.");
    }
    ctx.say(reply).await?;
    Ok(())
}

/// Set or clear slowmode on this channel by hand.
#[poise::command(prefix_command, slash_command, category = "Automod")]
pub async fn set(
    ctx: Context<'_>,
    #[description = "Delay such as 30s or 2m, or 'off'"] duration: Option<String>,
) -> Result<(), Error> {
    let Some(_guild_id) = guild_with_permission(&ctx, serenity::Permissions::MANAGE_CHANNELS).await?
    else {
        return Ok(());
    };

    let Some(delay) = duration.as_deref().and_then(parse_manual_delay) else {
        ctx.say(format!(
            "{} (max {})",
            usage_message("!slowmode set <duration|off>"),
            format_compact_duration(u64::from(DELAY_SECONDS_RANGE.1))
        ))
        .await?;
        return Ok(());
    };

    let channel_id = ctx.channel_id();
    let edit = serenity::EditChannel::new()
        .rate_limit_per_user(delay)
        .audit_log_reason("Manual slowmode");
    if let Err(source) = channel_id.edit(ctx.http(), edit).await {
        if !is_missing_permissions_error(&source) {
            warn!(?source, channel_id = channel_id.get(), "manual slowmode edit failed");
        }
        ctx.say("I couldn't change slowmode here. I need the 'Manage Channel' permission.")
            .await?;
        return Ok(());
    }

    ctx.data().slowmode.lock().await.forget_channel(channel_id.get());

    let reply = if delay == 0 {
        "Slowmode disabled for this channel.".to_owned()
    } else {
        format!(
            "Slowmode set to {} for this channel.",
            format_compact_duration(u64::from(delay))
        )
    };
    ctx.say(reply).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_delay_parsing() {
        assert_eq!(parse_manual_delay("off"), Some(0));
        assert_eq!(parse_manual_delay("0"), Some(0));
        assert_eq!(parse_manual_delay("30s"), Some(30));
        assert_eq!(parse_manual_delay("2m"), Some(120));
        assert_eq!(parse_manual_delay("6h"), Some(21_600));
        assert_eq!(parse_manual_delay("7h"), None);
        assert_eq!(parse_manual_delay("soon"), None);
    }

    #[test]
    fn status_mentions_channel_delay_when_known() {
        let config = SlowmodeConfig::default();
        let text = status_description(&config, Some(0));
        assert!(text.starts_with("**Auto slowmode :** Disabled"));
        assert!(text.ends_with("**This channel :** Off"));
        assert!(!status_description(&config, None).contains("This channel"));
    }
}
