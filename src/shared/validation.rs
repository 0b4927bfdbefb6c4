use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use validator::ValidationErrors;

lazy_static! {
    /// Regex for validating citizen identifiers (cédula)
    /// Letters, digits and hyphens, 1 to 20 characters
    /// - Valid: "12345678", "V-12345678", "E-8123"
    /// - Invalid: "", "12 345", "../etc", "123_456"
    pub static ref CEDULA_REGEX: Regex = Regex::new(r"^[A-Za-z0-9-]{1,20}$").unwrap();

    /// Characters kept by filename sanitising; everything else is dropped
    pub static ref UNSAFE_FILENAME_CHARS: Regex = Regex::new(r"[^A-Za-z0-9_.-]").unwrap();

    /// Runs of whitespace collapse to a single underscore in filenames
    pub static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Reduce an uploaded filename to a safe ASCII name.
///
/// Accented letters are decomposed (NFKD) and lose their marks, so `baño`
/// becomes `bano`. Path separators become spaces, whitespace runs become `_`,
/// other characters outside `[A-Za-z0-9_.-]` are dropped and leading or
/// trailing `.`/`_` removed.
/// Returns `None` when nothing usable remains.
pub fn sanitize_filename(filename: &str) -> Option<String> {
    let ascii: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = WHITESPACE_RUN.replace_all(ascii.trim(), "_");
    let cleaned = UNSAFE_FILENAME_CHARS.replace_all(&joined, "");
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');

    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Pick one human readable message out of a failed validation.
///
/// Fields are visited in name order so the same input always yields the
/// same message.
pub fn first_error_message(errors: &ValidationErrors) -> String {
    let field_errors = errors.field_errors();
    let mut fields: Vec<_> = field_errors.iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    fields
        .into_iter()
        .flat_map(|(field, errs)| errs.iter().map(move |e| (field, e)))
        .map(|(field, e)| match &e.message {
            Some(message) => message.to_string(),
            None => format!("Valor inválido en '{}'", field),
        })
        .next()
        .unwrap_or_else(|| "Datos inválidos".to_string())
}
