use super::StageResult;
use crate::adapters::{SearchIndexAdapter, VectorIndexAdapter};
use crate::domain::{DocumentRecord, StageStatus};

/// Upserts the lexical payload keyed by `id`. Any failure propagates —
/// lexical is the primary source of truth, so the orchestrator fails the
/// job rather than degrading (§4.5).
pub async fn index_lexical(record: &DocumentRecord, index: &dyn SearchIndexAdapter) -> StageResult {
    index.upsert(&record.id, record.lexical_payload()).await?;
    Ok(StageStatus::Ok)
}

/// Upserts the vector payload. Skipped silently when the embedding is
/// empty; any adapter failure degrades rather than propagates, since a
/// vector-index failure after a successful lexical write is still a
/// degraded success (§4.5).
pub async fn index_vector(
    record: &DocumentRecord,
    embedding: &[f32],
    index: &dyn VectorIndexAdapter,
) -> StageResult {
    if embedding.is_empty() {
        return Ok(StageStatus::Skipped);
    }

    match index.upsert(&record.id, embedding, record.vector_payload()).await {
        Ok(()) => Ok(StageStatus::Ok),
        Err(_) => Ok(StageStatus::Degraded),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::AdapterError;
    use crate::domain::{JobContext, JobTicket};
    use async_trait::async_trait;
    use chrono::Utc;

    struct FailingSearch;

    #[async_trait]
    impl SearchIndexAdapter for FailingSearch {
        async fn ensure_index(&self) -> Result<(), AdapterError> {
            Ok(())
        }
        async fn upsert(&self, _id: &str, _payload: serde_json::Value) -> Result<(), AdapterError> {
            Err(AdapterError::Invalid { backend: "search_index", message: "bad payload".into() })
        }
    }

    struct FailingVector;

    #[async_trait]
    impl VectorIndexAdapter for FailingVector {
        async fn ensure_collection(&self, _dimension: usize) -> Result<(), AdapterError> {
            Ok(())
        }
        async fn upsert(&self, _id: &str, _vector: &[f32], _payload: serde_json::Value) -> Result<(), AdapterError> {
            Err(AdapterError::Request { backend: "vector_index", message: "500".into() })
        }
    }

    fn sample_record() -> DocumentRecord {
        let ctx = JobContext::new(JobTicket::new("j1", "/tmp/a", "a.pdf", "application/pdf"));
        DocumentRecord::from_context(&ctx, false, Utc::now())
    }

    #[tokio::test]
    async fn lexical_failure_propagates() {
        let err = index_lexical(&sample_record(), &FailingSearch).await.unwrap_err();
        assert_eq!(err.kind(), crate::domain::ErrorKind::Permanent);
    }

    #[tokio::test]
    async fn vector_skipped_when_embedding_empty() {
        let status = index_vector(&sample_record(), &[], &FailingVector).await.unwrap();
        assert_eq!(status, StageStatus::Skipped);
    }

    #[tokio::test]
    async fn vector_failure_degrades_not_fails() {
        let status = index_vector(&sample_record(), &[0.1, 0.2], &FailingVector).await.unwrap();
        assert_eq!(status, StageStatus::Degraded);
    }
}
