//! Interactive prompts for the console

use std::io::{self, BufRead, Write};

use zapwatch_core::{Error, Result, ScanTarget, ScanType, DEFAULT_TARGET};

pub const BANNER: &str = r#"
    +-----------------------------------------------------------+
    |           Web Application Security Scanner                |
    |                 Powered by OWASP ZAP                      |
    +-----------------------------------------------------------+
"#;

/// Print `question` and read one trimmed line. End of input reads as empty.
pub fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, question: &str) -> io::Result<String> {
    write!(out, "{}", question)?;
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Ask for the target URL; an empty answer selects the default test site
pub fn prompt_target<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<ScanTarget> {
    let answer = prompt(
        input,
        out,
        &format!("Enter target URL (e.g., {}): ", DEFAULT_TARGET),
    )?;

    if answer.is_empty() {
        writeln!(out, "[*] Using default test site: {}", DEFAULT_TARGET)?;
    }
    ScanTarget::parse_or_default(&answer)
}

/// Show the scan type menu and read a selection; invalid input means quick
pub fn prompt_scan_type<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<ScanType> {
    writeln!(out, "\nScan Types:")?;
    writeln!(out, "1. Quick Scan (Spider + Passive)")?;
    writeln!(out, "2. Standard Scan (Spider + Passive + Active)")?;
    writeln!(out, "3. Deep Scan (Full scan with all checks)")?;

    let choice = prompt(input, out, "\nSelect scan type (1-3): ")?;
    Ok(ScanType::from_selection(&choice))
}

/// Ask for a scan id. Non-numeric input is an error.
pub fn prompt_scan_id<R: BufRead, W: Write>(input: &mut R, out: &mut W, question: &str) -> Result<i64> {
    let answer = prompt(input, out, question)?;
    answer
        .parse()
        .map_err(|_| Error::Parse(format!("'{}' is not a scan id", answer)))
}
