//! CLI tool for validating generated PowerPoint files in test harnesses.
//!
//! Prints exactly one line to stdout and exits 0 when the file passes,
//! 1 otherwise.

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use pptcheck_core::{ValidationRequest, ValidationResult, Validator};
use pptcheck_pptx::PptxParser;
use std::path::PathBuf;
use std::process::ExitCode;

const USAGE: &str = "Usage: validate-pptx <pptx_file> [min_slides] [keyword1] [keyword2] ...";

const PASS_MARK: &str = "✅";
const FAIL_MARK: &str = "❌";

/// Check that a generated PowerPoint file is valid and contains expected text.
#[derive(Parser, Debug)]
#[command(name = "validate-pptx")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// PowerPoint file to validate (.pptx)
    pptx_file: PathBuf,

    /// Minimum number of slides (default: 1), then keywords that must appear
    /// in the slide text (case-insensitive). Everything after the file is
    /// taken literally, so flags go before it.
    #[arg(
        value_name = "ARGS",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    rest: Vec<String>,

    /// Print the result as a JSON object instead of a status line
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            ErrorKind::MissingRequiredArgument => {
                println!("{}", USAGE);
                return ExitCode::FAILURE;
            }
            _ => {
                eprint!("{}", e);
                println!("{} {}", FAIL_MARK, USAGE);
                return ExitCode::FAILURE;
            }
        },
    };

    // Initialize logging; stdout is reserved for the result line
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let request = match build_request(&args) {
        Ok(request) => request,
        Err(message) => {
            println!("{} {}", FAIL_MARK, message);
            return ExitCode::FAILURE;
        }
    };

    log::debug!("Validating {}", request.path.display());
    let result = Validator::new(PptxParser::new()).validate(&request);

    if let Err(e) = report(&result, args.json) {
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }

    if result.valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Turn command-line arguments into a validation request.
fn build_request(args: &Args) -> std::result::Result<ValidationRequest, String> {
    let mut request = ValidationRequest::new(&args.pptx_file);

    if let Some((min_slides, keywords)) = args.rest.split_first() {
        request = request.with_min_slides(parse_min_slides(min_slides)?);
        if !keywords.is_empty() {
            request = request.with_keywords(keywords.iter().cloned());
        }
    }

    Ok(request)
}

fn parse_min_slides(value: &str) -> std::result::Result<usize, String> {
    value.trim().parse::<usize>().map_err(|_| {
        format!(
            "Invalid min_slides '{}': expected a non-negative integer",
            value
        )
    })
}

/// Print the single result line.
fn report(result: &ValidationResult, json: bool) -> Result<()> {
    if json {
        let line = serde_json::to_string(result).context("Failed to serialize result")?;
        println!("{}", line);
    } else {
        let mark = if result.valid { PASS_MARK } else { FAIL_MARK };
        println!("{} {}", mark, result.message);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("validate-pptx").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_positional_arguments() {
        let args = parse(&["deck.pptx", "3", "Revenue", "Q3 results"]);
        let request = build_request(&args).unwrap();

        assert_eq!(request.path, PathBuf::from("deck.pptx"));
        assert_eq!(request.min_slides, 3);
        assert_eq!(
            request.keywords,
            Some(vec!["Revenue".to_string(), "Q3 results".to_string()])
        );
        assert!(!args.json);
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["deck.pptx"]);
        let request = build_request(&args).unwrap();

        assert_eq!(request.min_slides, 1);
        assert_eq!(request.keywords, None);
    }

    #[test]
    fn test_flags_before_file() {
        let args = parse(&["--json", "-v", "deck.pptx", "2"]);
        assert!(args.json);
        assert!(args.verbose);
        assert_eq!(build_request(&args).unwrap().min_slides, 2);
    }

    #[test]
    fn test_hyphenated_keywords_are_not_flags() {
        let args = parse(&["deck.pptx", "1", "-v", "--json", "-12%"]);
        assert!(!args.json);
        assert!(!args.verbose);
        assert_eq!(
            build_request(&args).unwrap().keywords,
            Some(vec!["-v".to_string(), "--json".to_string(), "-12%".to_string()])
        );
    }

    #[test]
    fn test_missing_file_argument() {
        let err = Args::try_parse_from(["validate-pptx"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_parse_min_slides() {
        assert_eq!(parse_min_slides("0"), Ok(0));
        assert_eq!(parse_min_slides("12"), Ok(12));
        assert_eq!(
            parse_min_slides("three"),
            Err("Invalid min_slides 'three': expected a non-negative integer".to_string())
        );
        assert!(parse_min_slides("1.5").is_err());
    }

    #[test]
    fn test_negative_min_slides_reaches_validation() {
        let args = parse(&["deck.pptx", "-1"]);
        assert_eq!(args.rest, vec!["-1".to_string()]);
        assert!(build_request(&args).is_err());
    }
}
