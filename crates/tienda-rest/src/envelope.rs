//! The backend's response envelope.

use serde::Deserialize;

/// `{success, message, data, timestamp}` wrapper used by most endpoints.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    pub data: T,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// A body that is either enveloped or the payload itself.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MaybeEnveloped<T> {
    Enveloped(Envelope<T>),
    Bare(T),
}

impl<T> MaybeEnveloped<T> {
    pub fn into_inner(self) -> T {
        match self {
            MaybeEnveloped::Enveloped(envelope) => envelope.data,
            MaybeEnveloped::Bare(data) => data,
        }
    }
}

/// Envelope for collections; a missing or null `data` reads as empty.
#[derive(Debug, Deserialize)]
pub struct ListEnvelope<T> {
    pub data: Option<Vec<T>>,
}

impl<T> ListEnvelope<T> {
    pub fn into_items(self) -> Vec<T> {
        self.data.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn envelope_metadata_is_optional() {
        let envelope: Envelope<u32> = serde_json::from_value(json!({"data": 3})).unwrap();
        assert_eq!(envelope.data, 3);
        assert!(envelope.success.is_none());
    }

    #[test]
    fn maybe_enveloped_prefers_data() {
        let body = json!({
            "success": true,
            "message": "ok",
            "data": {"a": 1},
            "timestamp": "2024-05-01T10:00:00Z"
        });
        let value: MaybeEnveloped<serde_json::Value> = serde_json::from_value(body).unwrap();
        assert_eq!(value.into_inner(), json!({"a": 1}));
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Named {
        name: String,
    }

    #[test]
    fn list_items_need_only_deserialize() {
        let list: ListEnvelope<Named> =
            serde_json::from_value(json!({"data": [{"name": "Norte"}]})).unwrap();
        assert_eq!(
            list.into_items(),
            vec![Named {
                name: "Norte".to_string()
            }]
        );

        let list: ListEnvelope<Named> = serde_json::from_value(json!({"success": true})).unwrap();
        assert!(list.into_items().is_empty());
    }

    #[test]
    fn list_without_data_is_empty() {
        let list: ListEnvelope<u32> = serde_json::from_value(json!({"success": false})).unwrap();
        assert!(list.into_items().is_empty());

        let list: ListEnvelope<u32> = serde_json::from_value(json!({"data": null})).unwrap();
        assert!(list.into_items().is_empty());
    }
}
