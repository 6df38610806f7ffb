pub mod change_request;
pub mod dataset;
pub mod edit;
pub mod rule;
pub mod validation;
