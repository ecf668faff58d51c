use regex::Regex;
use std::sync::LazyLock;

static URL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://.+").expect("valid URL regex"));

static SHORTCODE_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("valid shortcode regex"));

/// Codes that collide with fixed routes and could never redirect from `/{code}`.
pub const RESERVED_CODES: [&str; 2] = ["health", "shorturls"];

/// Query side of the issued-code set.
pub trait IssuedCodes {
    fn is_issued(&self, code: &str) -> bool;
}

/// Why a requested shortcode was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Empty,
    Malformed,
    Reserved,
    Taken,
}

impl Rejection {
    pub fn message(&self) -> &'static str {
        match self {
            Rejection::Empty => "Shortcode cannot be empty",
            Rejection::Malformed => {
                "Invalid shortcode format. Only alphanumeric characters are allowed"
            }
            Rejection::Reserved => "This shortcode is reserved",
            Rejection::Taken => "This shortcode is already in use",
        }
    }
}

/// Checks requested shortcodes for syntax and availability.
pub struct Validator;

impl Validator {
    /// Returns the first failing check; never mutates `issued`.
    pub fn validate(code: &str, issued: &impl IssuedCodes) -> Result<(), Rejection> {
        Self::validate_syntax(code)?;

        if issued.is_issued(code) {
            return Err(Rejection::Taken);
        }

        Ok(())
    }

    pub fn validate_syntax(code: &str) -> Result<(), Rejection> {
        if code.is_empty() {
            return Err(Rejection::Empty);
        }

        if !SHORTCODE_SHAPE.is_match(code) {
            return Err(Rejection::Malformed);
        }

        if is_reserved(code) {
            return Err(Rejection::Reserved);
        }

        Ok(())
    }
}

pub fn is_reserved(code: &str) -> bool {
    RESERVED_CODES.contains(&code)
}

/// Destination URLs must start with `http://` or `https://` followed by something.
pub fn is_valid_url(url: &str) -> bool {
    URL_SHAPE.is_match(url)
}
