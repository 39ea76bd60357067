use warden_core::{Context, Error};

use crate::CommandMeta;

pub const META: CommandMeta = CommandMeta {
    name: "ping",
    desc: "Check that the bot is responsive.",
    category: "utility",
    usage: "!ping",
};

#[poise::command(prefix_command, slash_command, category = "Utility")]
pub async fn ping(ctx: Context<'_>) -> Result<(), Error> {
    let latency = ctx.ping().await;
    let reply = if latency.is_zero() {
        "Pong!".to_owned()
    } else {
        format!("Pong! Gateway latency: {} ms", latency.as_millis())
    };
    ctx.say(reply).await?;
    Ok(())
}
