use serde::Serialize;

#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Plain `{status, message}` body returned by delete endpoints and errors.
#[derive(Serialize, Debug, Clone)]
pub struct StatusMessage {
    pub status: &'static str,
    pub message: String,
}

impl StatusMessage {
    pub fn success(message: impl Into<String>) -> Self {
        Self { status: "success", message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { status: "error", message: message.into() }
    }
}
