use serde_json::Value;

/// Best-effort message for a non-success response.
///
/// Looks at `detail` (string, or a list of `{loc, msg}` validation entries),
/// then `message`, then `error.message`. Falls back to `HTTP <status>: <statusText>`
/// when none is present or the body is not JSON.
pub fn extract_error_message(status: u16, status_text: &str, body: &[u8]) -> String {
    let parsed: Option<Value> = serde_json::from_slice(body).ok();
    if let Some(message) = parsed.as_ref().and_then(message_from_body) {
        return message;
    }
    status_line(status, status_text)
}

fn status_line(status: u16, status_text: &str) -> String {
    format!("HTTP {}: {}", status, status_text)
}

fn message_from_body(body: &Value) -> Option<String> {
    let obj = body.as_object()?;

    match obj.get("detail") {
        Some(Value::String(detail)) if !detail.is_empty() => return Some(detail.clone()),
        Some(Value::Array(entries)) if !entries.is_empty() => {
            let joined = entries.iter().map(render_validation_entry).collect::<Vec<_>>().join(", ");
            return Some(joined);
        }
        Some(Value::Object(detail)) => {
            if let Some(Value::String(msg)) = detail.get("message") {
                return Some(msg.clone());
            }
            return Some(Value::Object(detail.clone()).to_string());
        }
        _ => {}
    }

    if let Some(Value::String(message)) = obj.get("message") {
        if !message.is_empty() {
            return Some(message.clone());
        }
    }

    match obj.get("error") {
        Some(Value::Object(err)) => err
            .get("message")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        Some(Value::String(err)) if !err.is_empty() => Some(err.clone()),
        _ => None,
    }
}

fn render_validation_entry(entry: &Value) -> String {
    let msg = match entry.get("msg") {
        Some(Value::String(msg)) => msg.clone(),
        Some(other) => other.to_string(),
        None => match entry {
            Value::String(s) => return s.clone(),
            other => return other.to_string(),
        },
    };
    let loc = entry.get("loc").and_then(|v| v.as_array()).map(|parts| {
        parts
            .iter()
            .map(|part| match part {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".")
    });
    match loc {
        Some(loc) if !loc.is_empty() => format!("{}: {}", loc, msg),
        _ => msg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_string_wins() {
        let body = br#"{"detail": "invalid prompt", "message": "ignored"}"#;
        assert_eq!(extract_error_message(400, "Bad Request", body), "invalid prompt");
    }

    #[test]
    fn detail_validation_list_is_flattened() {
        let body = br#"{"detail": [
            {"loc": ["body", "prompt"], "msg": "field required"},
            {"loc": ["body", "width", 0], "msg": "too small"}
        ]}"#;
        assert_eq!(
            extract_error_message(422, "Unprocessable Entity", body),
            "body.prompt: field required, body.width.0: too small"
        );
    }

    #[test]
    fn message_field_used_without_detail() {
        let body = br#"{"message": "quota exceeded"}"#;
        assert_eq!(extract_error_message(429, "Too Many Requests", body), "quota exceeded");
    }

    #[test]
    fn chat_style_error_object() {
        let body = br#"{"error": {"message": "model not found", "type": "invalid_request_error"}}"#;
        assert_eq!(extract_error_message(404, "Not Found", body), "model not found");
    }

    #[test]
    fn falls_back_to_status_line() {
        assert_eq!(
            extract_error_message(502, "Bad Gateway", b"<html>upstream</html>"),
            "HTTP 502: Bad Gateway"
        );
        assert_eq!(extract_error_message(500, "Internal Server Error", br#"{"other": 1}"#), "HTTP 500: Internal Server Error");
    }

    #[test]
    fn status_line_keeps_separator_without_reason_phrase() {
        assert_eq!(extract_error_message(599, "", b"oops"), "HTTP 599: ");
        assert_eq!(extract_error_message(500, "", b""), "HTTP 500: ");
    }

    #[test]
    fn empty_detail_falls_through() {
        let body = br#"{"detail": "", "message": "real reason"}"#;
        assert_eq!(extract_error_message(400, "Bad Request", body), "real reason");
    }
}
