pub mod automod;
pub mod community;
pub mod moderation;
pub mod tickets;
pub mod utility;

use warden_core::{Data, Error};

/// Static description of a command, used by `help` and `usage`.
pub struct CommandMeta {
    pub name: &'static str,
    pub desc: &'static str,
    pub category: &'static str,
    pub usage: &'static str,
}

pub const COMMANDS: &[CommandMeta] = &[
    utility::ping::META,
    utility::help::META,
    utility::usage::META,
    moderation::ban::META,
    moderation::unban::META,
    moderation::kick::META,
    moderation::timeout::META,
    moderation::untimeout::META,
    moderation::warn::META,
    moderation::warnings::META,
    moderation::unwarn::META,
    moderation::purge::META,
    moderation::notes::META,
    moderation::modlogs::META,
    moderation::modlogchannel::META,
    automod::wordfilter::META,
    automod::slowmode::META,
    tickets::ticket::META,
    tickets::close_ticket::META,
    tickets::ticketconfig::META,
    community::afk::META,
    community::premium::META,
    community::welcome::META,
];

pub fn commands() -> Vec<poise::Command<Data, Error>> {
    vec![
        utility::ping::ping(),
        utility::help::help(),
        utility::usage::usage(),
        moderation::ban::ban(),
        moderation::unban::unban(),
        moderation::kick::kick(),
        moderation::timeout::timeout(),
        moderation::untimeout::untimeout(),
        moderation::warn::warn(),
        moderation::warnings::warnings(),
        moderation::unwarn::unwarn(),
        moderation::purge::purge(),
        moderation::notes::notes(),
        moderation::modlogs::modlogs(),
        moderation::modlogchannel::modlogchannel(),
        automod::wordfilter::wordfilter(),
        automod::slowmode::slowmode(),
        tickets::ticket::ticket(),
        tickets::close_ticket::close_ticket(),
        tickets::ticketconfig::ticketconfig(),
        community::afk::afk(),
        community::premium::premium(),
        community::welcome::welcome(),
    ]
}

#[cfg(test)]
mod tests {
    use super::{COMMANDS, commands};

    #[test]
    fn metadata_matches_registered_commands() {
        let registered = commands();
        assert_eq!(registered.len(), COMMANDS.len());
        for meta in COMMANDS {
            assert!(
                registered.iter().any(|command| command.name == meta.name),
                "no command registered for {}",
                meta.name
            );
        }
    }
}
