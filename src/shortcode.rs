//! Random shortcode generation.

use rand::RngCore;

/// Characters a generated or custom shortcode may contain.
pub const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

pub const DEFAULT_LENGTH: usize = 5;

/// Produces random candidate shortcodes.
///
/// Bytes come from the thread-local CSPRNG and are mapped onto [`ALPHABET`]
/// modulo its size. Candidates are not checked for availability here.
#[derive(Debug, Clone, Copy)]
pub struct ShortcodeGenerator {
    length: usize,
}

impl ShortcodeGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn generate(&self) -> String {
        generate(self.length)
    }
}

impl Default for ShortcodeGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_LENGTH)
    }
}

pub fn generate(length: usize) -> String {
    let mut bytes = vec![0u8; length];
    rand::rng().fill_bytes(&mut bytes);

    bytes
        .iter()
        .map(|b| ALPHABET[*b as usize % ALPHABET.len()] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_alphabet_has_62_unique_chars() {
        assert_eq!(ALPHABET.len(), 62);
        let unique: HashSet<_> = ALPHABET.iter().collect();
        assert_eq!(unique.len(), 62);
    }

    #[test]
    fn test_default_length() {
        let code = ShortcodeGenerator::default().generate();
        assert_eq!(code.len(), 5);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_custom_length() {
        let generator = ShortcodeGenerator::new(12);
        assert_eq!(generator.length(), 12);
        assert_eq!(generator.generate().len(), 12);
    }

    #[test]
    fn test_generated_codes_vary() {
        let codes: HashSet<String> = (0..100).map(|_| generate(8)).collect();
        assert!(codes.len() > 90);
    }
}
