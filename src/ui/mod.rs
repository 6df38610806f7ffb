pub mod live_edit;
pub mod state;
pub mod styles;
