//! Interactive selection prompts.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker walks the user through city -> OLT -> segment -> distance
//!   when those flags are omitted
//!
//! Every prompt accepts a number from the list or the value itself; `q`
//! cancels.

use std::io::{self, BufRead, Write};

use crate::error::AppError;
use crate::report::format_listing;

/// Ask the user to pick one of `options` on stdin/stdout.
pub fn prompt_select(label: &str, options: &[String]) -> Result<String, AppError> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    select_from(&mut stdin.lock(), &mut stdout.lock(), label, options)
}

/// Ask the user for the OTDR distance on stdin/stdout.
pub fn prompt_distance() -> Result<f64, AppError> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    distance_from(&mut stdin.lock(), &mut stdout.lock())
}

pub fn select_from<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
    options: &[String],
) -> Result<String, AppError> {
    if options.is_empty() {
        return Err(AppError::new(3, format!("No {label} options available.")));
    }

    write!(output, "{}", format_listing(&format!("Available {label} options"), options))
        .map_err(|e| AppError::new(2, format!("Failed to write prompt: {e}")))?;

    loop {
        let Some(answer) = ask(
            input,
            output,
            &format!("Select a {label} by number (1-{}) or name (q to quit): ", options.len()),
        )?
        else {
            return Err(AppError::new(2, format!("No input received for {label}.")));
        };

        if let Ok(choice) = answer.parse::<usize>() {
            if (1..=options.len()).contains(&choice) {
                return Ok(options[choice - 1].clone());
            }
        }
        if let Some(found) = options.iter().find(|o| o.eq_ignore_ascii_case(&answer)) {
            return Ok(found.clone());
        }
        writeln!(output, "Invalid {label}: {answer}")
            .map_err(|e| AppError::new(2, format!("Failed to write prompt: {e}")))?;
    }
}

pub fn distance_from<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<f64, AppError> {
    loop {
        let Some(answer) = ask(input, output, "Enter the OTDR cut distance (in meters): ")? else {
            return Err(AppError::new(2, "No OTDR distance received."));
        };
        match answer.parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => return Ok(v),
            _ => writeln!(output, "Invalid distance: {answer} (expected meters >= 0)")
                .map_err(|e| AppError::new(2, format!("Failed to write prompt: {e}")))?,
        }
    }
}

/// Print `prompt` and read one trimmed line. `None` on EOF.
fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> Result<Option<String>, AppError> {
    write!(output, "{prompt}").map_err(|e| AppError::new(2, format!("Failed to write prompt: {e}")))?;
    output
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to write prompt: {e}")))?;

    let mut line = String::new();
    let bytes = input
        .read_line(&mut line)
        .map_err(|e| AppError::new(2, format!("Failed to read input: {e}")))?;
    if bytes == 0 {
        return Ok(None);
    }

    let answer = line.trim().to_string();
    if answer.eq_ignore_ascii_case("q") {
        return Err(AppError::new(2, "Canceled."));
    }
    Ok(Some(answer))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<String> {
        vec!["Bandung".to_string(), "Jakarta".to_string()]
    }

    #[test]
    fn select_by_number_after_invalid_attempts() {
        let mut input = "7\nMedan\n2\n".as_bytes();
        let mut output = Vec::new();
        let pick = select_from(&mut input, &mut output, "city", &options()).unwrap();
        assert_eq!(pick, "Jakarta");
        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("Available city options (2):"));
        assert!(shown.contains("Invalid city: 7"));
        assert!(shown.contains("Invalid city: Medan"));
    }

    #[test]
    fn select_by_name_is_case_insensitive() {
        let mut input = "bandung\n".as_bytes();
        let pick = select_from(&mut input, &mut Vec::<u8>::new(), "city", &options()).unwrap();
        assert_eq!(pick, "Bandung");
    }

    #[test]
    fn quit_and_eof_are_errors() {
        let mut input = "q\n".as_bytes();
        let err = select_from(&mut input, &mut Vec::<u8>::new(), "city", &options()).unwrap_err();
        assert_eq!(err.to_string(), "Canceled.");

        let mut input = "".as_bytes();
        assert!(select_from(&mut input, &mut Vec::<u8>::new(), "city", &options()).is_err());
    }

    #[test]
    fn distance_rejects_negative_and_garbage() {
        let mut input = "-3\nabc\n 250.5 \n".as_bytes();
        let d = distance_from(&mut input, &mut Vec::<u8>::new()).unwrap();
        assert_eq!(d, 250.5);
    }
}
