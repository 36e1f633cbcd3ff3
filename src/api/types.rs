use serde::Serialize;

/// Envelope shared by every JSON response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

/// A single message, or one message per violated field.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Messages(Vec<String>),
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            count: None,
            data: Some(data),
            error: None,
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    pub fn list(items: Vec<T>) -> Self {
        Self {
            success: true,
            count: Some(items.len()),
            data: Some(items),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            count: None,
            data: None,
            error: Some(ErrorDetail::Message(message.into())),
        }
    }

    pub const fn errors(messages: Vec<String>) -> Self {
        Self {
            success: false,
            count: None,
            data: None,
            error: Some(ErrorDetail::Messages(messages)),
        }
    }
}

/// Serializes as `{}`.
#[derive(Debug, Serialize)]
pub struct Empty {}

#[derive(Debug, Serialize)]
pub struct HealthDto {
    pub status: &'static str,
    pub videos: u64,
    pub uptime: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_envelope_carries_count() {
        let json = serde_json::to_value(ApiResponse::list(vec![1, 2, 3])).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "count": 3, "data": [1, 2, 3]}));
    }

    #[test]
    fn empty_data_serializes_as_object() {
        let json = serde_json::to_value(ApiResponse::success(Empty {})).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "data": {}}));
    }

    #[test]
    fn field_errors_serialize_as_array() {
        let json = serde_json::to_value(ApiResponse::errors(vec!["a".into(), "b".into()])).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "error": ["a", "b"]}));
    }
}
