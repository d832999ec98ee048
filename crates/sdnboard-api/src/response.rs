// Response decoding shared by the backend, agent, and Ryu clients.
//
// All three services speak loosely-shaped JSON: success bodies are typed
// payloads, failures are `{"error": "..."}` with either a 2xx or 4xx/5xx
// status. These helpers turn that into `Result<T, Error>` in one place.

use serde::de::DeserializeOwned;

use crate::error::Error;

/// Maximum number of body bytes echoed into error messages.
const BODY_PREVIEW_LEN: usize = 200;

/// Decode a response into `T`, mapping `{error}` payloads and non-success
/// statuses onto [`Error`].
pub(crate) async fn decode_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    let body = resp.text().await.map_err(Error::Transport)?;

    if let Some(message) = embedded_error(&body) {
        return Err(Error::Backend {
            status: status.as_u16(),
            message,
        });
    }

    if !status.is_success() {
        return Err(Error::Http {
            status: status.as_u16(),
            message: preview(&body).to_owned(),
        });
    }

    parse_body(&body)
}

/// Parse an already-buffered body, carrying a preview on failure.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(body)),
        body: body.to_owned(),
    })
}

/// Extract the `error` string from a `{"error": "..."}` object, if present.
///
/// Arrays and objects without a string `error` key are not errors.
pub(crate) fn embedded_error(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let error = value.as_object()?.get("error")?;
    match error {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// First [`BODY_PREVIEW_LEN`] bytes of `body`, cut on a char boundary.
pub(crate) fn preview(body: &str) -> &str {
    if body.len() <= BODY_PREVIEW_LEN {
        return body;
    }
    let mut end = BODY_PREVIEW_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn embedded_error_reads_string_payloads() {
        assert_eq!(
            embedded_error(r#"{"error": "Falta el algoritmo de balanceo"}"#).as_deref(),
            Some("Falta el algoritmo de balanceo")
        );
        assert_eq!(embedded_error(r#"{"message": "ok"}"#), None);
        assert_eq!(embedded_error(r#"[{"error": "not top-level"}]"#), None);
        assert_eq!(embedded_error("not json"), None);
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let body = "é".repeat(150);
        let cut = preview(&body);
        assert!(cut.len() <= BODY_PREVIEW_LEN);
        assert!(body.starts_with(cut));
    }

    #[test]
    fn parse_body_reports_preview() {
        let result: Result<Vec<u32>, _> = parse_body("{\"oops\": true}");
        let err = result.unwrap_err();
        assert!(matches!(err, Error::Deserialization { .. }));
        assert!(err.to_string().contains("oops"));
    }
}
