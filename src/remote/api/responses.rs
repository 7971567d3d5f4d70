use serde::{Deserialize, Serialize};

/// Envelope wrapping every list returned by the search service.
#[derive(Debug, Deserialize)]
pub struct Content<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
}

/// Body of `POST /downloads` on animuxd.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RequestFilePayload {
    pub bot_nick: String,
    pub package_number: i64,
    pub file_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Package;

    #[test]
    fn unwraps_search_envelope() {
        let raw = r#"{"status":"OK","content":[{
            "botId": 1, "number": 1337, "name": "f0o 01", "size": "100M",
            "sizekbits": 102400, "episodeNumber": 1,
            "lastModified": "2020-02-20 21:37:00"
        }]}"#;
        let envelope: Content<Package> = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.content.len(), 1);
        assert_eq!(envelope.content[0].name, "f0o 01");
    }

    #[test]
    fn missing_content_is_empty() {
        let envelope: Content<Package> = serde_json::from_str("{}").unwrap();
        assert!(envelope.content.is_empty());
    }

    #[test]
    fn request_payload_uses_camel_case_keys() {
        let payload = RequestFilePayload {
            bot_nick: "fo0b0t".to_string(),
            package_number: 1337,
            file_name: "f0o 01".to_string(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["botNick"], "fo0b0t");
        assert_eq!(json["packageNumber"], 1337);
        assert_eq!(json["fileName"], "f0o 01");
    }
}
