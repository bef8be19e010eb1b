use thiserror::Error;

use crate::query::Slot;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// No HTTP response was obtained (DNS, connect, timeout).
    #[error("no response from {slot} service: {detail}")]
    Transport { slot: Slot, detail: String },
    #[error("{slot} service responded with HTTP {status}")]
    Service {
        slot: Slot,
        status: u16,
        message: Option<String>,
    },
    #[error("unexpected payload from {slot} service (HTTP {status}): {detail}")]
    Decode {
        slot: Slot,
        status: u16,
        detail: String,
    },
}

impl QueryError {
    pub fn slot(&self) -> Slot {
        match self {
            QueryError::Transport { slot, .. }
            | QueryError::Service { slot, .. }
            | QueryError::Decode { slot, .. } => *slot,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, QueryError::Transport { .. })
    }

    pub fn user_message(&self) -> String {
        match self {
            QueryError::Transport { slot, .. } => format!(
                "Unable to reach the {} service. Check your connection and try again.",
                slot.service_label()
            ),
            QueryError::Service {
                message: Some(message),
                ..
            } => message.clone(),
            QueryError::Service {
                slot,
                status,
                message: None,
            } => format!("{} service error (HTTP {status}).", capitalize(slot.service_label())),
            QueryError::Decode { slot, status, .. } => format!(
                "Unexpected response from the {} service (HTTP {status}).",
                slot.service_label()
            ),
        }
    }
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("select a city and a course before searching")]
    MissingCityAndCourse,
    #[error("select a city before searching")]
    MissingCity,
    #[error("select a course before searching")]
    MissingCourse,
}
