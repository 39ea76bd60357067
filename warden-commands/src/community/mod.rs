pub mod afk;
pub mod premium;
pub mod welcome;
