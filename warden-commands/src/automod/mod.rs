pub mod slowmode;
pub mod wordfilter;
