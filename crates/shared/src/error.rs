use serde::{Deserialize, Serialize};

/// Body of a failed response from the ranking backend. Only the message is
/// of interest; anything else the service sends is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceErrorBody {
    #[serde(default)]
    pub mensagem: Option<String>,
}

impl ServiceErrorBody {
    pub fn message_from_bytes(body: &[u8]) -> Option<String> {
        serde_json::from_slice::<ServiceErrorBody>(body)
            .ok()
            .and_then(|body| body.mensagem)
            .map(|message| message.trim().to_string())
            .filter(|message| !message.is_empty())
    }
}
