pub mod entities;
pub mod live_edit;
