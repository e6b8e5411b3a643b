use serde::{Deserialize, Serialize};

/// Progress of one exchange as seen by the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExchangeEvent {
    /// Coalesced chunk of answer text, in arrival order.
    Increment { content: String },

    /// The answer finished and was stored as an assistant turn.
    Complete { content: String },

    /// The transport failed. `partial` is shown with the error but not stored.
    Failed { partial: String, message: String },

    /// The exchange was abandoned; its output should be discarded.
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let json = serde_json::to_value(ExchangeEvent::Increment {
            content: "A cat".to_string(),
        })
        .unwrap();
        assert_eq!(json["type"], "increment");
        assert_eq!(json["content"], "A cat");

        let json = serde_json::to_value(ExchangeEvent::Cancelled).unwrap();
        assert_eq!(json, serde_json::json!({"type": "cancelled"}));
    }

    #[test]
    fn failed_event_round_trips() {
        let event = ExchangeEvent::Failed {
            partial: "Par".to_string(),
            message: "connection reset".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"failed""#));
        assert_eq!(serde_json::from_str::<ExchangeEvent>(&json).unwrap(), event);
    }
}
