use super::StageResult;
use crate::adapters::{AdapterError, ClassifierAdapter};
use crate::domain::{Classification, DocType, JobContext, StageStatus};

/// Reads `raw_text`/`file_name`, writes `classification`. `NotAvailable`
/// degrades to `unknown` rather than propagating, and so does a confidence
/// below `confidence_threshold` — the real score is kept, not zeroed out, so
/// downstream logs still show how close the call was (§4.5). Either way
/// `doc_type` ends up `unknown`, which makes Extract a no-op. Any other
/// error kind propagates for the orchestrator/runtime to handle.
pub async fn classify(
    ctx: &mut JobContext,
    adapter: &dyn ClassifierAdapter,
    confidence_threshold: f32,
) -> StageResult {
    match adapter.classify(&ctx.raw_text, &ctx.ticket.file_name).await {
        Ok((doc_type, confidence)) if confidence < confidence_threshold => {
            ctx.classification = Classification { doc_type: DocType::Unknown, confidence };
            Ok(StageStatus::Degraded)
        }
        Ok((doc_type, confidence)) => {
            ctx.classification = Classification { doc_type, confidence };
            Ok(StageStatus::Ok)
        }
        Err(AdapterError::NotAvailable { .. }) => {
            ctx.classification = Classification { doc_type: DocType::Unknown, confidence: 0.0 };
            Ok(StageStatus::Degraded)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::JobTicket;
    use async_trait::async_trait;

    struct StubClassifier(Result<(DocType, f32), AdapterError>);

    #[async_trait]
    impl ClassifierAdapter for StubClassifier {
        async fn classify(&self, _text: &str, _file_name: &str) -> Result<(DocType, f32), AdapterError> {
            match &self.0 {
                Ok(v) => Ok(*v),
                Err(AdapterError::NotAvailable { backend, message }) => {
                    Err(AdapterError::NotAvailable { backend, message: message.clone() })
                }
                Err(_) => unreachable!("test only exercises Ok/NotAvailable"),
            }
        }
    }

    #[tokio::test]
    async fn not_available_degrades_to_unknown() {
        let mut ctx = JobContext::new(JobTicket::new("j3", "/tmp/a", "random_scan.png", "image/png"));
        let adapter = StubClassifier(Err(AdapterError::NotAvailable {
            backend: "classifier",
            message: "no model loaded".into(),
        }));
        let status = classify(&mut ctx, &adapter, 0.65).await.unwrap();
        assert_eq!(status, StageStatus::Degraded);
        assert_eq!(ctx.classification.doc_type, DocType::Unknown);
    }

    #[tokio::test]
    async fn success_records_classification() {
        let mut ctx = JobContext::new(JobTicket::new("j1", "/tmp/a", "invoice_001.pdf", "application/pdf"));
        let adapter = StubClassifier(Ok((DocType::Invoice, 0.93)));
        classify(&mut ctx, &adapter, 0.65).await.unwrap();
        assert_eq!(ctx.classification.doc_type, DocType::Invoice);
        assert_eq!(ctx.classification.confidence, 0.93);
    }

    #[tokio::test]
    async fn low_confidence_downgrades_to_unknown_but_keeps_score() {
        let mut ctx = JobContext::new(JobTicket::new("j4", "/tmp/a", "invoice_001.pdf", "application/pdf"));
        let adapter = StubClassifier(Ok((DocType::Invoice, 0.4)));
        let status = classify(&mut ctx, &adapter, 0.65).await.unwrap();
        assert_eq!(status, StageStatus::Degraded);
        assert_eq!(ctx.classification.doc_type, DocType::Unknown);
        assert_eq!(ctx.classification.confidence, 0.4);
    }

    #[tokio::test]
    async fn confidence_exactly_at_threshold_is_not_downgraded() {
        let mut ctx = JobContext::new(JobTicket::new("j5", "/tmp/a", "invoice_001.pdf", "application/pdf"));
        let adapter = StubClassifier(Ok((DocType::Invoice, 0.65)));
        let status = classify(&mut ctx, &adapter, 0.65).await.unwrap();
        assert_eq!(status, StageStatus::Ok);
        assert_eq!(ctx.classification.doc_type, DocType::Invoice);
    }
}
