use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::usage_message;
use crate::moderation::guild_with_permission;
use warden_core::{Context, Error};
use warden_database::impls::guild_config::{clear_welcome, get_guild_config, set_welcome};
use warden_database::model::guild_config::GuildConfig;
use warden_utils::parse::parse_channel_id;
use warden_utils::text::{WelcomeVars, render_welcome_template, sanitize_mentions, truncate_chars};

pub const META: CommandMeta = CommandMeta {
    name: "welcome",
    desc: "Configure the message posted when someone joins.",
    category: "community",
    usage: "!welcome [#channel] [template] | !welcome clear",
};

pub const WELCOME_TEMPLATE_LIMIT: usize = 1500;

#[derive(Debug, PartialEq, Eq)]
enum WelcomeAction<'a> {
    Show,
    Clear,
    Set {
        channel_id: u64,
        template: Option<&'a str>,
    },
    Invalid,
}

fn parse_welcome_action(input: Option<&str>) -> WelcomeAction<'_> {
    let Some(input) = input.map(str::trim).filter(|input| !input.is_empty()) else {
        return WelcomeAction::Show;
    };
    if input.eq_ignore_ascii_case("clear") {
        return WelcomeAction::Clear;
    }

    let (channel, rest) = input.split_once(char::is_whitespace).unwrap_or((input, ""));
    match parse_channel_id(channel) {
        Some(channel_id) => {
            let template = Some(rest.trim()).filter(|template| !template.is_empty());
            WelcomeAction::Set {
                channel_id,
                template,
            }
        }
        None => WelcomeAction::Invalid,
    }
}

/// Channel and rendered text to post for a new member, if welcomes are configured.
pub fn welcome_message(
    config: &GuildConfig,
    user: &serenity::User,
    server_name: &str,
    member_count: u64,
) -> Option<(serenity::ChannelId, String)> {
    let channel_id = config.welcome_channel_id?;
    let mention = format!("<@{}>", user.id.get());
    let username = sanitize_mentions(&user.name);
    let server = sanitize_mentions(server_name);
    let vars = WelcomeVars {
        user_mention: &mention,
        username: &username,
        server: &server,
        member_count,
    };
    let text = render_welcome_template(config.welcome_template_or_default(), &vars);
    Some((serenity::ChannelId::new(channel_id), text))
}

#[poise::command(prefix_command, slash_command, category = "Community")]
pub async fn welcome(
    ctx: Context<'_>,
    #[description = "#channel [template], or 'clear'"]
    #[rest]
    input: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = guild_with_permission(&ctx, serenity::Permissions::MANAGE_GUILD).await?
    else {
        return Ok(());
    };
    let db = &ctx.data().db;

    match parse_welcome_action(input.as_deref()) {
        WelcomeAction::Show => {
            let config = get_guild_config(db, guild_id.get()).await?;
            let reply = match config.welcome_channel_id {
                Some(channel_id) => format!(
                    "Welcome messages go to <#{channel_id}> with template:\n```\n{}\n```",
                    config.welcome_template_or_default()
                ),
                None => "Welcome messages are not configured.".to_owned(),
            };
            ctx.say(reply).await?;
        }
        WelcomeAction::Clear => {
            clear_welcome(db, guild_id.get()).await?;
            ctx.say("Welcome messages disabled.").await?;
        }
        WelcomeAction::Set {
            channel_id,
            template,
        } => {
            let template = template.map(|template| truncate_chars(template, WELCOME_TEMPLATE_LIMIT));
            set_welcome(db, guild_id.get(), Some(channel_id), template).await?;
            ctx.say(format!("Welcome messages will be posted in <#{channel_id}>."))
                .await?;
        }
        WelcomeAction::Invalid => {
            ctx.say(usage_message(META.usage)).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_actions() {
        assert_eq!(parse_welcome_action(None), WelcomeAction::Show);
        assert_eq!(parse_welcome_action(Some(" CLEAR ")), WelcomeAction::Clear);
        assert_eq!(
            parse_welcome_action(Some("<#42>")),
            WelcomeAction::Set {
                channel_id: 42,
                template: None
            }
        );
        assert_eq!(
            parse_welcome_action(Some("42   Hi {user}!")),
            WelcomeAction::Set {
                channel_id: 42,
                template: Some("Hi {user}!")
            }
        );
        assert_eq!(parse_welcome_action(Some("general hi")), WelcomeAction::Invalid);
    }

    #[test]
    fn renders_default_template() {
        let mut config = GuildConfig::empty(1);
        let mut user = serenity::User::default();
        user.id = serenity::UserId::new(7);
        user.name = "alice".to_owned();

        assert!(welcome_message(&config, &user, "Rustaceans", 3).is_none());

        config.welcome_channel_id = Some(9);
        let (channel, text) = welcome_message(&config, &user, "Rustaceans", 3).expect("configured");
        assert_eq!(channel.get(), 9);
        assert_eq!(text, "Welcome to Rustaceans, <@7>!");

        config.welcome_template = Some("{username} is member #{member_count}".to_owned());
        let (_, text) = welcome_message(&config, &user, "Rustaceans", 3).expect("configured");
        assert_eq!(text, "alice is member #3");
    }
}
