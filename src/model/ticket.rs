use serde::{Deserialize, Serialize};

/// Tracker-agnostic ticket discovered on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRecord {
    pub id: String,
    pub title: String,
    /// Canonical issue link, independent of the page URL it was found on.
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl TicketRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: url.into(),
            description: None,
            kind: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_are_omitted_not_null() {
        let record = TicketRecord::new("TT-0", "S", "https://h/issue/TT-0");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "TT-0", "title": "S", "url": "https://h/issue/TT-0"})
        );
    }

    #[test]
    fn kind_serializes_as_type() {
        let mut record = TicketRecord::new("TT-5", "Test type", "https://h/issue/TT-5");
        record.kind = Some("task".into());
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains(r#""type":"task""#));
        assert!(!json.contains("description"));
    }
}
