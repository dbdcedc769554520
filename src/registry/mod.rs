//! Prompt/Schema Registry (C3). Loads prompt templates and JSON schemas
//! once at startup and caches them indefinitely; the registry is read-only
//! for the rest of the process lifetime (§5).

mod error;

pub use error::RegistryError;

use crate::domain::DocType;
use std::collections::BTreeMap;

/// One of the non-extraction prompt tasks: classification, summarization,
/// PII detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GeneralTask {
    Classify,
    Summarize,
    DetectPii,
}

impl GeneralTask {
    fn asset_name(&self) -> &'static str {
        match self {
            GeneralTask::Classify => "classify.txt",
            GeneralTask::Summarize => "summarize.txt",
            GeneralTask::DetectPii => "pii.txt",
        }
    }
}

macro_rules! extraction_asset {
    ($doc_type:expr) => {
        match $doc_type {
            "invoice" => Some((
                include_str!("../../assets/prompts/extract_invoice.txt"),
                include_str!("../../assets/schemas/invoice_v1.json"),
            )),
            "receipt" => Some((
                include_str!("../../assets/prompts/extract_receipt.txt"),
                include_str!("../../assets/schemas/receipt_v1.json"),
            )),
            "contract" => Some((
                include_str!("../../assets/prompts/extract_contract.txt"),
                include_str!("../../assets/schemas/contract_v1.json"),
            )),
            "report" => Some((
                include_str!("../../assets/prompts/extract_report.txt"),
                include_str!("../../assets/schemas/report_v1.json"),
            )),
            "resume" => Some((
                include_str!("../../assets/prompts/extract_resume.txt"),
                include_str!("../../assets/schemas/resume_v1.json"),
            )),
            _ => None,
        }
    };
}

/// Loads and caches prompt templates and JSON schemas keyed by document
/// type. Assets are embedded into the binary at compile time (grounded in
/// the original source's `load_asset` file-per-doc-type convention, here
/// made static rather than an `lru_cache`-wrapped filesystem read) and
/// parsed once in `Registry::load`.
pub struct Registry {
    extraction: BTreeMap<DocType, (String, serde_json::Value)>,
    general: BTreeMap<GeneralTask, String>,
}

impl Registry {
    /// Parses every embedded asset, failing startup if any known doc type's
    /// schema is not valid JSON (§4.3: "missing asset for a known doc_type
    /// is a startup error").
    pub fn load() -> Result<Self, RegistryError> {
        let mut extraction = BTreeMap::new();
        for doc_type in DocType::EXTRACTABLE {
            let (prompt, schema_src) = extraction_asset!(doc_type.as_str())
                .ok_or_else(|| RegistryError::MissingAsset { doc_type: doc_type.as_str() })?;
            let schema: serde_json::Value = serde_json::from_str(schema_src)
                .map_err(|e| RegistryError::InvalidSchema { doc_type: doc_type.as_str(), source: e })?;
            extraction.insert(doc_type, (prompt.to_string(), schema));
        }

        let general = [
            (GeneralTask::Classify, include_str!("../../assets/prompts/classify.txt")),
            (GeneralTask::Summarize, include_str!("../../assets/prompts/summarize.txt")),
            (GeneralTask::DetectPii, include_str!("../../assets/prompts/pii.txt")),
        ]
        .into_iter()
        .map(|(task, body)| (task, body.to_string()))
        .collect();

        Ok(Self { extraction, general })
    }

    /// `GetExtraction(doc_type)`. Returns `None` for `unknown` or any
    /// doc_type not in the closed set; the orchestrator treats that as
    /// "Extract is a no-op yielding `{}`".
    pub fn get_extraction(&self, doc_type: DocType) -> Option<(&str, &serde_json::Value)> {
        self.extraction.get(&doc_type).map(|(p, s)| (p.as_str(), s))
    }

    /// `GetGeneral(task)`.
    pub fn get_general(&self, task: GeneralTask) -> &str {
        &self.general[&task]
    }

    /// Substitutes `{TEXT}` and `{{TEXT}}` literally, both accepted per §4.3.
    pub fn render(template: &str, text: &str) -> String {
        template.replace("{{TEXT}}", text).replace("{TEXT}", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_all_five_extraction_assets() {
        let registry = Registry::load().unwrap();
        for doc_type in DocType::EXTRACTABLE {
            assert!(registry.get_extraction(doc_type).is_some(), "{doc_type} missing");
        }
        assert!(registry.get_extraction(DocType::Unknown).is_none());
    }

    #[test]
    fn render_substitutes_both_placeholder_forms() {
        assert_eq!(Registry::render("hello {TEXT}", "world"), "hello world");
        assert_eq!(Registry::render("hello {{TEXT}}", "world"), "hello world");
    }

    #[test]
    fn general_tasks_are_loaded() {
        let registry = Registry::load().unwrap();
        assert!(!registry.get_general(GeneralTask::Summarize).is_empty());
        assert!(!registry.get_general(GeneralTask::DetectPii).is_empty());
        assert!(!registry.get_general(GeneralTask::Classify).is_empty());
    }
}
