//! JSON I/O handling for CLI
//!
//! - Input: one JSON value per line
//! - Output: one JSON object per line, `{"status": "ok", "data": ...}` or
//!   `{"status": "error", "code": ..., "message": ...}`
//! - UTF-8 only

use std::io::{self, BufRead, Write};

use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Read JSON values from `input`, one per non-blank line
pub fn read_requests<R: BufRead>(input: R) -> impl Iterator<Item = CliResult<Value>> {
    input
        .lines()
        .filter(|line| !matches!(line, Ok(l) if l.trim().is_empty()))
        .map(|line| {
            let line = line.map_err(CliError::from)?;
            serde_json::from_str(&line).map_err(CliError::from)
        })
}

/// Write a success response
pub fn write_response<W: Write>(out: &mut W, data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });
    write_line(out, &response)
}

/// Write an error response
pub fn write_error<W: Write>(out: &mut W, code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });
    write_line(out, &response)
}

fn write_line<W: Write>(out: &mut W, value: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Locked stdout, for commands that print
pub fn stdout() -> io::StdoutLock<'static> {
    io::stdout().lock()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_requests_skips_blank_lines() {
        let input = Cursor::new("{\"a\": 1}\n\n   \n[1]\n");
        let values: Vec<Value> = read_requests(input).map(|r| r.unwrap()).collect();
        assert_eq!(values, vec![serde_json::json!({"a": 1}), serde_json::json!([1])]);
    }

    #[test]
    fn test_read_requests_reports_bad_json() {
        let input = Cursor::new("{oops\n");
        let result: Vec<CliResult<Value>> = read_requests(input).collect();
        assert_eq!(result.len(), 1);
        assert!(result[0].is_err());
    }

    #[test]
    fn test_write_response_and_error() {
        let mut out = Vec::new();
        write_response(&mut out, serde_json::json!({"x": 1})).unwrap();
        write_error(&mut out, "CODE", "bad").unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], r#"{"data":{"x":1},"status":"ok"}"#);
        assert_eq!(lines[1], r#"{"code":"CODE","message":"bad","status":"error"}"#);
    }
}
