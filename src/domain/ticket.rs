use serde::{Deserialize, Serialize};

/// Immutable job ticket produced by ingress. Carries no pipeline state of
/// its own; it is the only thing that crosses the broker boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobTicket {
    pub job_id: String,
    pub file_path: String,
    pub file_name: String,
    pub mime_type: String,
}

impl JobTicket {
    pub fn new(
        job_id: impl Into<String>,
        file_path: impl Into<String>,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            file_path: file_path.into(),
            file_name: file_name.into(),
            mime_type: mime_type.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_through_json() {
        let ticket = JobTicket::new("j1", "/tmp/j1/invoice.pdf", "invoice.pdf", "application/pdf");
        let json = serde_json::to_string(&ticket).unwrap();
        let back: JobTicket = serde_json::from_str(&json).unwrap();
        assert_eq!(ticket, back);
    }
}
