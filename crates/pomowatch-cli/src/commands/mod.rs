pub mod config;
pub mod dial;
pub mod run;
pub mod simulate;
