//! Operator-facing terminal I/O.

use std::io::{BufRead, Write};

use anyhow::{Context, Result, anyhow};

/// Line-oriented operator interaction.
pub trait Prompter {
    /// Print one line of output for the operator.
    fn say(&mut self, line: &str) -> Result<()>;

    /// Show `prompt` and read one line without its terminator.
    ///
    /// Returns `None` once input is exhausted. Bytes that are not UTF-8 are
    /// replaced, never rejected.
    fn ask(&mut self, prompt: &str) -> Result<Option<String>>;

    /// Ask a yes/no question; anything but `y`/`yes` is a no.
    fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self
            .ask(&format!("{question} [y/N]: "))?
            .ok_or_else(|| anyhow!("input closed while waiting for confirmation"))?;
        Ok(matches!(
            answer.trim().to_ascii_lowercase().as_str(),
            "y" | "yes"
        ))
    }
}

/// Prompter over any reader/writer pair (stdin/stdout in the binary).
pub struct TerminalConsole<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalConsole<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalConsole<R, W> {
    fn say(&mut self, line: &str) -> Result<()> {
        writeln!(self.output, "{line}").context("write to console")
    }

    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt}").context("write prompt")?;
        self.output.flush().context("flush prompt")?;
        let mut raw = Vec::new();
        let n = self.input.read_until(b'\n', &mut raw).context("read input")?;
        if n == 0 {
            return Ok(None);
        }
        let line = String::from_utf8_lossy(&raw);
        let trimmed = line.strip_suffix('\n').unwrap_or(&line);
        let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
        Ok(Some(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn ask_strips_line_terminators_only() {
        let mut console = TerminalConsole::new(Cursor::new(" 21 \r\nlast"), Vec::new());
        assert_eq!(console.ask("> ").expect("ask").as_deref(), Some(" 21 "));
        assert_eq!(console.ask("> ").expect("ask").as_deref(), Some("last"));
        assert_eq!(console.ask("> ").expect("ask"), None);
        assert_eq!(
            String::from_utf8(console.into_output()).expect("utf8"),
            "> > > "
        );
    }

    #[test]
    fn undecodable_line_is_replaced_not_fatal() {
        let mut console = TerminalConsole::new(Cursor::new(b"\xff\n4\n".to_vec()), Vec::new());
        assert_eq!(console.ask("> ").expect("ask").as_deref(), Some("\u{fffd}"));
        assert_eq!(console.ask("> ").expect("ask").as_deref(), Some("4"));
    }

    #[test]
    fn confirm_accepts_yes_variants() {
        let mut console = TerminalConsole::new(Cursor::new("Y\nyes\nno\n\n"), Vec::new());
        assert!(console.confirm("Use it?").expect("confirm"));
        assert!(console.confirm("Use it?").expect("confirm"));
        assert!(!console.confirm("Use it?").expect("confirm"));
        assert!(!console.confirm("Use it?").expect("confirm"));
        assert!(console.confirm("Use it?").is_err());
    }
}
