//! Yes/no confirmation on the terminal.

use std::io::{BufRead, Write};

/// Prints `question` followed by ` (y/n): ` and reads one answer line.
///
/// Only `y` or `yes` (any case) confirm. End of input counts as "no".
pub(crate) fn confirm<R: BufRead, W: Write>(
    question: &str,
    input: &mut R,
    output: &mut W,
) -> std::io::Result<bool> {
    write!(output, "\n{question} (y/n): ")?;
    output.flush()?;

    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        return Ok(false);
    }
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

/// [`confirm`] against the process's stdin and stdout.
pub(crate) fn confirm_stdin(question: &str) -> std::io::Result<bool> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    confirm(question, &mut stdin.lock(), &mut stdout)
}
