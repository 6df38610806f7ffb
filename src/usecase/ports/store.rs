#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Message(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Message(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for StoreError {}

pub const AUTH_TOKEN_KEY: &str = "auth_token";
pub const DISPLAY_NAME_KEY: &str = "display_name";
pub const API_BASE_URL_KEY: &str = "api_base_url";

/// Client-side key/value storage that survives restarts.
pub trait LocalStore: Send + Sync {
    fn init(&self) -> Result<(), StoreError>;
    fn load_setting(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn save_setting(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn delete_setting(&self, key: &str) -> Result<(), StoreError>;
}
