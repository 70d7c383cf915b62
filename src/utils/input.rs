//! Input utilities for the line-oriented shell
//!
//! Prompts may span several paragraphs, so one logical input is every line
//! typed up to the first empty line.

use std::io::{self, BufRead, Write};

/// Strip one trailing line terminator (`\n` or `\r\n`).
fn strip_line_ending(line: &mut String) {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
}

/// Read lines until an empty one and join them with `\n`.
///
/// Returns `Ok(None)` when input ends before any line was collected. If input
/// ends after some lines, those are returned and the next call yields `None`.
pub fn read_multiline<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut lines: Vec<String> = Vec::new();

    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            if lines.is_empty() {
                return Ok(None);
            }
            break;
        }
        strip_line_ending(&mut line);
        if line.is_empty() {
            break;
        }
        lines.push(line);
    }

    Ok(Some(lines.join("\n")))
}

/// Print `prompt` once, then collect a multi-line input.
pub fn prompt_multiline<R: BufRead, W: Write>(
    prompt: &str,
    reader: &mut R,
    writer: &mut W,
) -> io::Result<Option<String>> {
    write!(writer, "{prompt}")?;
    writer.flush()?;
    read_multiline(reader)
}
