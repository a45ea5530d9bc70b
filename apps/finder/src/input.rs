//! Company-name input files: one name per line, optionally CSV-quoted.

use std::path::PathBuf;

use tracing::info;

use crate::errors::AppError;

/// Extracts a company name from one input line, or `None` for blank,
/// too-short, and header lines.
pub fn parse_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.chars().count() < 2 || is_header(line) {
        return None;
    }

    let field = match line.strip_prefix('"').and_then(|rest| rest.split_once('"')) {
        Some((quoted, _)) => quoted,
        None => line.split(',').next().unwrap_or(line),
    };

    let name = field
        .trim()
        .trim_start_matches(['"', '\''])
        .trim_end_matches(['"', '\''])
        .trim();

    if name.chars().count() < 2 || is_header(name) {
        return None;
    }
    Some(name.to_string())
}

fn is_header(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower == "company" || lower.contains("company name")
}

/// Parses every usable name in `text`, in file order. Duplicates are kept.
pub fn parse_names(text: &str) -> Vec<String> {
    text.lines().filter_map(parse_line).collect()
}

/// Reads every input file. Fails before any work starts if a file is missing
/// or if the files contain no usable names.
pub fn load_names(paths: &[PathBuf]) -> Result<Vec<String>, AppError> {
    if paths.is_empty() {
        return Err(AppError::Input("no input files given".to_string()));
    }

    let mut names = Vec::new();
    for path in paths {
        if !path.is_file() {
            return Err(AppError::Input(format!("file not found: {}", path.display())));
        }
        let text = std::fs::read_to_string(path).map_err(|e| {
            AppError::Input(format!("could not read {}: {e}", path.display()))
        })?;

        let parsed = parse_names(&text);
        info!("Read {} bytes, {} names from {}", text.len(), parsed.len(), path.display());
        names.extend(parsed);
    }

    if names.is_empty() {
        return Err(AppError::Input("no company names found in input".to_string()));
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_plain_names() {
        assert_eq!(parse_line("  Acme Inc  ").as_deref(), Some("Acme Inc"));
        assert_eq!(parse_line("Acme,https://acme.com").as_deref(), Some("Acme"));
    }

    #[test]
    fn test_quoted_field_taken_verbatim() {
        assert_eq!(
            parse_line(r#""Name, Inc","https://example.com""#).as_deref(),
            Some("Name, Inc")
        );
        assert_eq!(parse_line(r#""Acme, LLC""#).as_deref(), Some("Acme, LLC"));
    }

    #[test]
    fn test_single_quotes_stripped() {
        assert_eq!(parse_line("'Acme'").as_deref(), Some("Acme"));
    }

    #[test]
    fn test_headers_skipped() {
        assert_eq!(parse_line("Company"), None);
        assert_eq!(parse_line("COMPANY NAME"), None);
        assert_eq!(parse_line("Company Name,Website"), None);
        assert_eq!(parse_line("Company,URL"), None);
    }

    #[test]
    fn test_blank_and_short_lines_skipped() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("   "), None);
        assert_eq!(parse_line("X"), None);
        assert_eq!(parse_line(r#""X""#), None);
    }

    #[test]
    fn test_parse_names_keeps_duplicates_in_order() {
        let text = "Company\nAcme Inc\n\nBeta\r\nAcme Inc\n";
        assert_eq!(parse_names(text), vec!["Acme Inc", "Beta", "Acme Inc"]);
    }

    #[test]
    fn test_load_names_from_multiple_files() {
        let mut a = tempfile::NamedTempFile::new().unwrap();
        writeln!(a, "Company Name\nAcme\nBeta").unwrap();
        let mut b = tempfile::NamedTempFile::new().unwrap();
        writeln!(b, "\"Gamma, Inc\",gamma.com").unwrap();

        let names = load_names(&[a.path().to_path_buf(), b.path().to_path_buf()]).unwrap();
        assert_eq!(names, vec!["Acme", "Beta", "Gamma, Inc"]);
    }

    #[test]
    fn test_missing_file_is_input_error() {
        let err = load_names(&[PathBuf::from("/definitely/not/here.csv")]).unwrap_err();
        assert!(matches!(err, AppError::Input(msg) if msg.contains("file not found")));
    }

    #[test]
    fn test_file_without_names_is_input_error() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "company\n\n  \n").unwrap();
        let err = load_names(&[f.path().to_path_buf()]).unwrap_err();
        assert!(matches!(err, AppError::Input(_)));
    }
}
