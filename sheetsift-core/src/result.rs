//! Response payload combining the workbook and its JSON projection

use crate::error::Result;
use crate::projection::Projection;
use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};

/// What a filter request hands back to its caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterResult {
    /// Output workbook, base64 encoded
    pub excel_base64: String,
    /// Serialized projection
    pub json: String,
}

impl FilterResult {
    /// Decode the workbook bytes back out of the payload
    pub fn workbook_bytes(&self) -> std::result::Result<Vec<u8>, base64::DecodeError> {
        general_purpose::STANDARD.decode(&self.excel_base64)
    }
}

/// Combine encoded workbook bytes and the projection into a [`FilterResult`]
pub fn assemble(workbook: &[u8], projection: &Projection) -> Result<FilterResult> {
    Ok(FilterResult {
        excel_base64: general_purpose::STANDARD.encode(workbook),
        json: projection.to_json()?,
    })
}
