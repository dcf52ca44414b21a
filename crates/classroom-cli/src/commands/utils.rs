use anyhow::{Context, Result};
use serde::Serialize;

/// Returns the `--as` username, which every session command needs.
pub fn require_caller(caller: Option<&str>) -> Result<&str> {
    caller
        .filter(|c| !c.trim().is_empty())
        .context("This command requires --as <USER>")
}

/// Writes `value` to stdout as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to encode output")?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_caller_rejects_missing_and_blank() {
        assert!(require_caller(None).is_err());
        assert!(require_caller(Some("  ")).is_err());
        assert_eq!(require_caller(Some("alice")).unwrap(), "alice");
    }
}
