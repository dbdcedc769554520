//! Key layout for Fjall partitions.
//!
//! - `jobs`: `job:{job_id}` -> `StoredJob` (JSON)
//! - `logs`: `log:{job_id}:{offset:016}` -> `StoredLogEntry` (JSON)
//! - `idempotency`: `idem:{key}` -> `StoredIdempotency` (JSON)
//! - `metadata`: `meta:{key}` -> pruning cursors

pub fn encode_job_key(job_id: &str) -> Vec<u8> {
    format!("job:{job_id}").into_bytes()
}

pub fn decode_job_key(key: &[u8]) -> Option<String> {
    std::str::from_utf8(key).ok()?.strip_prefix("job:").map(String::from)
}

pub fn encode_log_key(job_id: &str, offset: u64) -> Vec<u8> {
    format!("log:{job_id}:{offset:016}").into_bytes()
}

pub fn encode_log_prefix(job_id: &str) -> Vec<u8> {
    format!("log:{job_id}:").into_bytes()
}

pub fn decode_log_key(key: &[u8]) -> Option<(String, u64)> {
    let key_str = std::str::from_utf8(key).ok()?;
    let rest = key_str.strip_prefix("log:")?;
    let (job_id, offset) = rest.rsplit_once(':')?;
    Some((job_id.to_string(), offset.parse().ok()?))
}

pub fn encode_idem_key(key: &str) -> Vec<u8> {
    format!("idem:{key}").into_bytes()
}

pub fn encode_meta_key(key: &str) -> Vec<u8> {
    format!("meta:{key}").into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_key_roundtrips() {
        let key = encode_job_key("job_123");
        assert_eq!(key, b"job:job_123");
        assert_eq!(decode_job_key(&key).unwrap(), "job_123");
    }

    #[test]
    fn log_key_roundtrips() {
        let key = encode_log_key("job_123", 42);
        assert_eq!(key, b"log:job_123:0000000000000042");
        assert_eq!(decode_log_key(&key).unwrap(), ("job_123".to_string(), 42));
    }

    #[test]
    fn log_prefix_scopes_to_one_job() {
        assert_eq!(encode_log_prefix("job_123"), b"log:job_123:");
    }
}
