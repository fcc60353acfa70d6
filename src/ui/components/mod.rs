pub mod content;
pub mod menu;
pub mod overlay;
pub mod pulse;
pub mod status;
