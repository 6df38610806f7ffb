pub mod approval_service;
pub mod edit_service;
pub mod import_service;
pub mod query_service;
pub mod session_service;
