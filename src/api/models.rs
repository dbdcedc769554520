//! API models for docflow's ingress surface.
//!
//! This module defines the data structures used in the thin ingress HTTP
//! contract (§1): `POST /jobs` accepts a multipart file upload and returns a
//! [`JobAcceptedResponse`]; `GET /jobs/{job_id}` returns the job's current
//! [`crate::domain::JobState`] straight from the result store.

use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Serialize, Clone)]
pub struct JobAcceptedResponse {
    pub job_id: String,
    pub file_name: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub components: HashMap<String, String>,
    pub version: String,
}
