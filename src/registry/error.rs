use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no prompt/schema asset registered for known doc_type '{doc_type}'")]
    MissingAsset { doc_type: &'static str },

    #[error("schema for doc_type '{doc_type}' is not valid JSON: {source}")]
    InvalidSchema {
        doc_type: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
