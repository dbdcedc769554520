use super::StageResult;
use crate::adapters::{AdapterError, LlmAdapter};
use crate::domain::{ErrorKind, JobContext, StageStatus};

/// Reads `raw_text`, writes `embedding`. A `Permanent` adapter failure
/// degrades to an empty vector (vector indexing is then skipped
/// downstream); `Transient` propagates so the orchestrator/runtime can
/// retry the whole job (§4.2).
pub async fn embed(ctx: &mut JobContext, llm: &dyn LlmAdapter, model: &str) -> StageResult {
    match llm.embed(&ctx.raw_text, model).await {
        Ok(vector) => {
            ctx.embedding = vector;
            Ok(StageStatus::Ok)
        }
        Err(e) if e.kind() == ErrorKind::Transient => Err(e.into()),
        Err(_) => {
            ctx.embedding = Vec::new();
            Ok(StageStatus::Degraded)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::CompletionOptions;
    use crate::domain::JobTicket;
    use async_trait::async_trait;

    struct StubLlm(Result<Vec<f32>, AdapterError>);

    #[async_trait]
    impl LlmAdapter for StubLlm {
        async fn complete(&self, _prompt: &str, _opts: &CompletionOptions) -> Result<String, AdapterError> {
            unimplemented!()
        }
        async fn embed(&self, _text: &str, _model: &str) -> Result<Vec<f32>, AdapterError> {
            match &self.0 {
                Ok(v) => Ok(v.clone()),
                Err(AdapterError::Invalid { backend, message }) => {
                    Err(AdapterError::Invalid { backend, message: message.clone() })
                }
                Err(AdapterError::Request { backend, message }) => {
                    Err(AdapterError::Request { backend, message: message.clone() })
                }
                Err(_) => unreachable!(),
            }
        }
    }

    #[tokio::test]
    async fn success_records_vector() {
        let mut ctx = JobContext::new(JobTicket::new("j1", "/tmp/a", "a.pdf", "application/pdf"));
        let llm = StubLlm(Ok(vec![0.1, 0.2, 0.3]));
        embed(&mut ctx, &llm, "text-embedding-3").await.unwrap();
        assert_eq!(ctx.embedding, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn permanent_failure_degrades_to_empty_vector() {
        let mut ctx = JobContext::new(JobTicket::new("j1", "/tmp/a", "a.pdf", "application/pdf"));
        let llm = StubLlm(Err(AdapterError::Invalid { backend: "embed", message: "too long".into() }));
        let status = embed(&mut ctx, &llm, "text-embedding-3").await.unwrap();
        assert_eq!(status, StageStatus::Degraded);
        assert!(ctx.embedding.is_empty());
    }

    #[tokio::test]
    async fn transient_failure_propagates() {
        let mut ctx = JobContext::new(JobTicket::new("j1", "/tmp/a", "a.pdf", "application/pdf"));
        let llm = StubLlm(Err(AdapterError::Request { backend: "embed", message: "503".into() }));
        let err = embed(&mut ctx, &llm, "text-embedding-3").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transient);
    }
}
