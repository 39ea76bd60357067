use warden_core::{Context, Error};

use crate::moderation::embeds::usage_message;
use crate::{COMMANDS, CommandMeta};

pub const META: CommandMeta = CommandMeta {
    name: "usage",
    desc: "Show the syntax of a command.",
    category: "utility",
    usage: "!usage <command>",
};

fn find_command(raw: &str) -> Option<&'static CommandMeta> {
    let name = raw.trim().trim_start_matches(warden_utils::COMMAND_PREFIX);
    COMMANDS
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}

#[poise::command(prefix_command, slash_command, category = "Utility")]
pub async fn usage(
    ctx: Context<'_>,
    #[description = "Command name"] command: Option<String>,
) -> Result<(), Error> {
    let Some(raw) = command.as_deref().filter(|raw| !raw.trim().is_empty()) else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    let reply = match find_command(raw) {
        Some(command) => format!("{}\n{}", usage_message(command.usage), command.desc),
        None => format!("No command named `{}`. See `!help`.", raw.trim()),
    };
    ctx.say(reply).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::find_command;

    #[test]
    fn finds_commands_with_or_without_prefix() {
        assert_eq!(find_command("!Ban").map(|command| command.name), Some("ban"));
        assert_eq!(find_command(" ticket ").map(|command| command.name), Some("ticket"));
        assert!(find_command("nope").is_none());
    }
}
