//! Serializer for checkpoint state (state <-> bytes), used by persistent checkpointers.

use crate::memory::checkpointer::CheckpointError;

/// Serializes and deserializes state for checkpoint storage.
///
/// `MemorySaver` keeps `Checkpoint<S>` values as they are and needs no serializer.
pub trait Serializer<S>: Send + Sync
where
    S: Clone + Send + Sync + 'static,
{
    fn serialize(&self, state: &S) -> Result<Vec<u8>, CheckpointError>;
    fn deserialize(&self, bytes: &[u8]) -> Result<S, CheckpointError>;
}

/// JSON serializer for any serde state.
pub struct JsonSerializer;

impl<S> Serializer<S> for JsonSerializer
where
    S: Clone + Send + Sync + 'static + serde::Serialize + serde::de::DeserializeOwned,
{
    fn serialize(&self, state: &S) -> Result<Vec<u8>, CheckpointError> {
        serde_json::to_vec(state).map_err(|e| CheckpointError::Serialization(e.to_string()))
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<S, CheckpointError> {
        serde_json::from_slice(bytes).map_err(|e| CheckpointError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;
    use crate::state::ChatState;

    #[test]
    fn chat_state_survives_json() {
        let state = ChatState::new(vec![Message::user("Hi"), Message::tool("c1", "t", "r")]);
        let bytes = Serializer::<ChatState>::serialize(&JsonSerializer, &state).unwrap();
        let back: ChatState = JsonSerializer.deserialize(&bytes).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn garbage_is_a_serialization_error() {
        let err = Serializer::<ChatState>::deserialize(&JsonSerializer, b"not json").unwrap_err();
        assert!(matches!(err, CheckpointError::Serialization(_)));
    }
}
