use super::{Classification, JobContext};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Final artifact written to the lexical and vector stores. `id` is the
/// same value in both stores and is the job's identity for all downstream
/// reindexing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub file_name: String,
    pub doc_type: String,
    pub doc_confidence: f32,
    pub content: String,
    pub summary: String,
    pub extracted_data: serde_json::Value,
    pub pii_count: usize,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    pub vector_indexed: bool,
}

impl DocumentRecord {
    pub fn from_context(ctx: &JobContext, vector_indexed: bool, created_at: DateTime<Utc>) -> Self {
        let Classification { doc_type, confidence } = ctx.classification.clone();
        Self {
            id: ctx.ticket.job_id.clone(),
            file_name: ctx.ticket.file_name.clone(),
            doc_type: doc_type.to_string(),
            doc_confidence: confidence,
            content: ctx.raw_text.clone(),
            summary: ctx.summary.clone(),
            extracted_data: ctx.structured_data.clone(),
            pii_count: ctx.pii.len(),
            created_at,
            vector_indexed,
        }
    }

    /// The payload written to the lexical index, per §3 of the spec:
    /// `{id, file_name, doc_type, doc_confidence, content, summary,
    /// extracted_data, pii_count, created_at}`.
    pub fn lexical_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "file_name": self.file_name,
            "doc_type": self.doc_type,
            "doc_confidence": self.doc_confidence,
            "content": self.content,
            "summary": self.summary,
            "extracted_data": self.extracted_data,
            "pii_count": self.pii_count,
            "created_at": self.created_at.timestamp(),
        })
    }

    /// The payload written alongside the vector, per §3:
    /// `{file_name, doc_type, summary, lexical_id}`.
    pub fn vector_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "file_name": self.file_name,
            "doc_type": self.doc_type,
            "summary": self.summary,
            "lexical_id": self.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DocType, JobTicket};

    #[test]
    fn builds_record_from_context() {
        let mut ctx = JobContext::new(JobTicket::new("j1", "/tmp/a", "invoice.pdf", "application/pdf"));
        ctx.raw_text = "Invoice Total: $123.45".to_string();
        ctx.classification.doc_type = DocType::Invoice;
        ctx.classification.confidence = 0.93;
        ctx.structured_data = serde_json::json!({"total": "123.45", "currency": "USD"});

        let record = DocumentRecord::from_context(&ctx, true, Utc::now());
        assert_eq!(record.id, "j1");
        assert_eq!(record.doc_type, "invoice");
        assert!(record.vector_indexed);

        let lexical = record.lexical_payload();
        assert_eq!(lexical["id"], "j1");
        assert_eq!(lexical["extracted_data"]["total"], "123.45");

        let vector = record.vector_payload();
        assert_eq!(vector["lexical_id"], "j1");
    }
}
