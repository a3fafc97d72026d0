//! Countermeasure register
//!
//! The one piece of analysis state that outlives a run: the host's
//! response to each threat id. Re-analysis adds defaults for new ids and
//! never touches entries that already exist.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Response {
    #[default]
    Mitigate,
    Accept,
    Transfer,
    Avoid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MitigationStatus {
    #[default]
    #[serde(rename = "Non-Mitigated")]
    NonMitigated,
    #[serde(rename = "Partially Mitigated", alias = "Partial")]
    Partial,
    #[serde(rename = "Mitigated")]
    Mitigated,
}

/// The decision recorded against one threat id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Countermeasure {
    pub response: Response,
    pub status: MitigationStatus,
}

impl Countermeasure {
    pub fn new(response: Response, status: MitigationStatus) -> Self {
        Self { response, status }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountermeasureRegister {
    entries: IndexMap<String, Countermeasure>,
}

impl CountermeasureRegister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the default record for `id` unless one exists. Returns `true`
    /// when a new record was created.
    pub fn upsert_default(&mut self, id: &str) -> bool {
        if self.entries.contains_key(id) {
            return false;
        }
        self.entries.insert(id.to_string(), Countermeasure::default());
        true
    }

    pub fn set(&mut self, id: &str, countermeasure: Countermeasure) {
        self.entries.insert(id.to_string(), countermeasure);
    }

    pub fn get(&self, id: &str) -> Option<&Countermeasure> {
        self.entries.get(id)
    }

    pub fn status(&self, id: &str) -> MitigationStatus {
        self.get(id).map(|c| c.status).unwrap_or_default()
    }

    pub fn remove(&mut self, id: &str) -> Option<Countermeasure> {
        self.entries.shift_remove(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Countermeasure)> {
        self.entries.iter().map(|(id, c)| (id.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_preserves_existing_decisions() {
        let mut reg = CountermeasureRegister::new();
        assert!(reg.upsert_default("T-001"));
        reg.set(
            "T-001",
            Countermeasure::new(Response::Accept, MitigationStatus::Mitigated),
        );

        assert!(!reg.upsert_default("T-001"));
        assert_eq!(reg.get("T-001").unwrap().response, Response::Accept);
        assert_eq!(reg.status("T-001"), MitigationStatus::Mitigated);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_unknown_id_reads_as_non_mitigated() {
        let reg = CountermeasureRegister::new();
        assert_eq!(reg.status("nope"), MitigationStatus::NonMitigated);
        assert!(reg.is_empty());
    }

    #[test]
    fn test_editor_wire_format() {
        let json = r#"{"T-002":{"response":"Transfer","status":"Partial"}}"#;
        let reg: CountermeasureRegister = serde_json::from_str(json).unwrap();
        assert_eq!(reg.status("T-002"), MitigationStatus::Partial);

        let back = serde_json::to_value(&reg).unwrap();
        assert_eq!(back["T-002"]["status"], "Partially Mitigated");
        assert_eq!(back["T-002"]["response"], "Transfer");
    }
}
