use serde::{ Serialize, Deserialize };

/// Busy gate of a coordinator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinatorState {
    Idle,
    Busy,
}

/// What the rendering layer is told about. The coordinator never touches
/// presentation itself; it only publishes these.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChatEvent {
    #[serde(rename = "state")] State {
        state: CoordinatorState,
    },
    #[serde(rename = "user")] User {
        content: String,
        timestamp: i64,
    },
    #[serde(rename = "response")] Response {
        content: String,
        timestamp: i64,
    },
    #[serde(rename = "error")] Error {
        message: String,
    },
}
