use super::{DocType, JobTicket};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub doc_type: DocType,
    pub confidence: f32,
}

impl Default for Classification {
    fn default() -> Self {
        Self {
            doc_type: DocType::Unknown,
            confidence: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiiHit {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

/// Outcome of one stage attempt, used for the per-stage timing/status the
/// orchestrator records alongside the final record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Ok,
    Degraded,
    Skipped,
}

/// Mutable context a single worker carries through the stage DAG. Owned
/// exclusively by that worker for the lifetime of one job attempt; the
/// orchestrator is the only thing that mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobContext {
    pub ticket: JobTicket,
    pub raw_text: String,
    pub classification: Classification,
    pub structured_data: serde_json::Value,
    pub summary: String,
    pub pii: Vec<PiiHit>,
    pub embedding: Vec<f32>,
    #[serde(with = "duration_ms_map")]
    pub stage_elapsed: BTreeMap<String, Duration>,
    pub stage_status: BTreeMap<String, StageStatus>,
}

impl JobContext {
    pub fn new(ticket: JobTicket) -> Self {
        Self {
            ticket,
            raw_text: String::new(),
            classification: Classification::default(),
            structured_data: serde_json::Value::Object(Default::default()),
            summary: String::new(),
            pii: Vec::new(),
            embedding: Vec::new(),
            stage_elapsed: BTreeMap::new(),
            stage_status: BTreeMap::new(),
        }
    }

    pub fn record_stage(&mut self, stage: &str, elapsed: Duration, status: StageStatus) {
        self.stage_elapsed.insert(stage.to_string(), elapsed);
        self.stage_status.insert(stage.to_string(), status);
    }

    pub fn total_elapsed(&self) -> Duration {
        self.stage_elapsed.values().copied().sum()
    }
}

mod duration_ms_map {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<String, Duration>,
        ser: S,
    ) -> Result<S::Ok, S::Error> {
        let as_ms: BTreeMap<&String, u128> =
            map.iter().map(|(k, v)| (k, v.as_millis())).collect();
        as_ms.serialize(ser)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        de: D,
    ) -> Result<BTreeMap<String, Duration>, D::Error> {
        let as_ms: BTreeMap<String, u64> = BTreeMap::deserialize(de)?;
        Ok(as_ms
            .into_iter()
            .map(|(k, v)| (k, Duration::from_millis(v)))
            .collect())
    }
}
