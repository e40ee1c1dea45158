pub mod assessment;
pub mod candidate;
pub mod job;
pub mod page;

/// Milliseconds since the Unix epoch, the timestamp unit used on the wire.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// `{"success": true}` acknowledgement body.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
