pub mod afk;
pub mod slowmode;
pub mod tickets;
pub mod welcome;
pub mod word_filter;
