use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Envelope of the Stainless endpoints: a failed verdict is still a
/// successful request, reported through `status` and `message`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct StainlessResponse<T> {
    pub message: String,
    pub result: Option<T>,
    pub status: ResponseStatus,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum ResponseStatus {
    #[serde(rename = "0")]
    Ok,
    #[serde(rename = "1")]
    Failed,
}

impl<T> StainlessResponse<T> {
    pub fn ok(result: T) -> Self {
        Self {
            message: "OK".to_string(),
            result: Some(result),
            status: ResponseStatus::Ok,
        }
    }

    pub fn err(message: impl Display) -> Self {
        Self {
            message: message.to_string(),
            result: None,
            status: ResponseStatus::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::parse::test_serialize_json_ok;
    use serde_json::json;

    #[test]
    fn serialize_response() {
        test_serialize_json_ok(vec![
            (
                StainlessResponse::ok(json!({"console": "done"})),
                json!({
                    "message": "OK",
                    "status": "0",
                    "result": {"console": "done"},
                }),
            ),
            (
                StainlessResponse::err("Error in Stainless execution -- Console:\n"),
                json!({
                    "message": "Error in Stainless execution -- Console:\n",
                    "status": "1",
                    "result": null,
                }),
            ),
        ])
    }
}
