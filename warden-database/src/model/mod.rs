pub mod afk;
pub mod cases;
pub mod guild_config;
pub mod notes;
pub mod premium;
pub mod tickets;
pub mod warnings;
pub mod word_filter;
