//! Shared helpers for command handlers.

use std::collections::BTreeMap;

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Parse a JSON argument, naming the flag on failure.
pub fn parse_json_arg(field: &str, raw: &str) -> Result<serde_json::Value, CliError> {
    serde_json::from_str(raw).map_err(|e| CliError::Validation {
        field: field.into(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// Parse `host=weight` pairs. Later pairs for the same host win.
pub fn parse_weights(pairs: &[String]) -> Result<BTreeMap<String, u32>, CliError> {
    let mut weights = BTreeMap::new();
    for pair in pairs {
        let (host, weight) = pair.split_once('=').ok_or_else(|| CliError::Validation {
            field: "weights".into(),
            reason: format!("expected HOST=WEIGHT, got '{pair}'"),
        })?;
        let weight: u32 = weight.trim().parse().map_err(|_| CliError::Validation {
            field: "weights".into(),
            reason: format!("weight for {host} is not a number: '{weight}'"),
        })?;
        weights.insert(host.trim().to_owned(), weight);
    }
    Ok(weights)
}

/// `"-"` for missing values in table cells.
pub fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".into(), |v| v.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn weights_parse_pairs() {
        let weights = parse_weights(&["h1=3".into(), "h2 = 1".into(), "h1=2".into()]).unwrap();
        assert_eq!(weights.len(), 2);
        assert_eq!(weights["h1"], 2);
        assert_eq!(weights["h2"], 1);
    }

    #[test]
    fn weights_reject_malformed_pairs() {
        assert!(parse_weights(&["h1".into()]).is_err());
        assert!(parse_weights(&["h1=x".into()]).is_err());
    }

    #[test]
    fn json_arg_reports_field() {
        let err = parse_json_arg("actions", "[oops").unwrap_err();
        assert!(err.to_string().contains("actions"));
    }
}
