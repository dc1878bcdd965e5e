//! Heartbeat payload decoding.
//!
//! Stagers publish a JSON body on the advertise subject:
//!
//! ```json
//! {"id": "stager-1", "stacks": ["cflinuxfs3"],
//!  "available_memory": 4096, "available_disk": 8192}
//! ```
//!
//! Unknown fields are ignored so newer stagers can add to the message.

use serde::{Deserialize, Serialize};

use crate::error::{AdvertError, AdvertResult};
use crate::types::Advertisement;

/// A decoded stager heartbeat, before an expiry has been attached.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StagerHeartbeat {
    pub id: String,
    pub stacks: Vec<String>,
    pub available_memory: i64,
    pub available_disk: i64,
}

impl StagerHeartbeat {
    /// Decode and validate a raw heartbeat payload.
    pub fn from_slice(raw: &[u8]) -> AdvertResult<Self> {
        let heartbeat: StagerHeartbeat = serde_json::from_slice(raw)?;
        heartbeat.validate()?;
        Ok(heartbeat)
    }

    /// Decode and validate a heartbeat that was already parsed as JSON.
    pub fn from_value(value: serde_json::Value) -> AdvertResult<Self> {
        let heartbeat: StagerHeartbeat = serde_json::from_value(value)?;
        heartbeat.validate()?;
        Ok(heartbeat)
    }

    /// Reject payloads that decode but cannot describe a real stager.
    pub fn validate(&self) -> AdvertResult<()> {
        if self.id.trim().is_empty() {
            return Err(AdvertError::MissingStagerId);
        }
        for (field, value) in [
            ("available_memory", self.available_memory),
            ("available_disk", self.available_disk),
        ] {
            if value < 0 {
                return Err(AdvertError::NegativeCapacity {
                    stager_id: self.id.clone(),
                    field,
                    value,
                });
            }
        }
        if self.stacks.iter().any(|s| s.is_empty()) {
            return Err(AdvertError::EmptyStack(self.id.clone()));
        }
        Ok(())
    }

    /// Attach an absolute expiry and produce the stored snapshot.
    pub fn into_advertisement(self, expires_at: u64) -> Advertisement {
        Advertisement {
            stager_id: self.id,
            available_memory: self.available_memory,
            available_disk: self.available_disk,
            stacks: self.stacks.into_iter().collect(),
            expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_advertise_message() {
        let raw = br#"{
            "id": "stager-1",
            "stacks": ["cflinuxfs3", "cflinuxfs4"],
            "available_memory": 4096,
            "available_disk": 8192
        }"#;

        let hb = StagerHeartbeat::from_slice(raw).unwrap();
        assert_eq!(hb.id, "stager-1");
        assert_eq!(hb.stacks, vec!["cflinuxfs3", "cflinuxfs4"]);
        assert_eq!(hb.available_memory, 4096);
        assert_eq!(hb.available_disk, 8192);
    }

    #[test]
    fn ignores_unknown_fields() {
        let raw = br#"{
            "id": "stager-1",
            "stacks": [],
            "available_memory": 1,
            "available_disk": 1,
            "app_id_to_count": {"abc": 2},
            "placement_properties": {"zone": "z1"}
        }"#;

        assert!(StagerHeartbeat::from_slice(raw).is_ok());
    }

    #[test]
    fn rejects_invalid_json() {
        let err = StagerHeartbeat::from_slice(b"{not json").unwrap_err();
        assert!(matches!(err, AdvertError::Decode(_)));
    }

    #[test]
    fn rejects_missing_stacks() {
        let raw = br#"{"id": "s", "available_memory": 1, "available_disk": 1}"#;
        let err = StagerHeartbeat::from_slice(raw).unwrap_err();
        assert!(matches!(err, AdvertError::Decode(_)));
    }

    #[test]
    fn rejects_fractional_memory() {
        let raw = br#"{"id": "s", "stacks": [], "available_memory": 1.5, "available_disk": 1}"#;
        assert!(StagerHeartbeat::from_slice(raw).is_err());
    }

    #[test]
    fn rejects_blank_id() {
        let raw = br#"{"id": "  ", "stacks": [], "available_memory": 1, "available_disk": 1}"#;
        let err = StagerHeartbeat::from_slice(raw).unwrap_err();
        assert!(matches!(err, AdvertError::MissingStagerId));
    }

    #[test]
    fn rejects_negative_capacity() {
        let raw = br#"{"id": "s", "stacks": [], "available_memory": 1, "available_disk": -5}"#;
        let err = StagerHeartbeat::from_slice(raw).unwrap_err();
        match err {
            AdvertError::NegativeCapacity { field, value, .. } => {
                assert_eq!(field, "available_disk");
                assert_eq!(value, -5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_empty_stack_name() {
        let raw = br#"{"id": "s", "stacks": ["cflinuxfs3", ""], "available_memory": 1, "available_disk": 1}"#;
        let err = StagerHeartbeat::from_slice(raw).unwrap_err();
        assert!(matches!(err, AdvertError::EmptyStack(_)));
    }

    #[test]
    fn from_value_validates() {
        let value = serde_json::json!({
            "id": "",
            "stacks": ["cflinuxfs3"],
            "available_memory": 10,
            "available_disk": 10
        });
        assert!(matches!(
            StagerHeartbeat::from_value(value),
            Err(AdvertError::MissingStagerId)
        ));
    }

    #[test]
    fn into_advertisement_dedups_stacks() {
        let hb = StagerHeartbeat {
            id: "stager-1".to_string(),
            stacks: vec!["a".into(), "b".into(), "a".into()],
            available_memory: 100,
            available_disk: 200,
        };

        let ad = hb.into_advertisement(1_700_000_010);
        assert_eq!(ad.stager_id, "stager-1");
        assert_eq!(ad.stacks.len(), 2);
        assert_eq!(ad.available_memory, 100);
        assert_eq!(ad.available_disk, 200);
        assert_eq!(ad.expires_at, 1_700_000_010);
    }
}
