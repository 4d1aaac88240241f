//! End-to-end behaviour of the playback loop

pub mod player_scenarios;
