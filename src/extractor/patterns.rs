// file: src/extractor/patterns.rs
// description: serial-number pattern generation (literal tiers and extraction regexes)
// reference: https://docs.rs/regex

use crate::error::{RepositoryError, Result};
use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use tracing::warn;

/// Prefix glyphs used by the precise tier, in match order. The period variant
/// is glued to the serial; the others are followed by one space.
pub const PRECISE_PREFIXES: [&str; 4] = ["N⁰ ", "N° ", "Nº ", "N."];

/// Prefixes a user may type in front of the serial itself.
const USER_TYPED_PREFIXES: [&str; 7] = ["N⁰", "N°", "Nº", "N.", "NO.", "NO ", "N "];

/// Number-sign glyphs. `⁰` and `º` count as alphanumeric in Unicode, so they
/// are dropped explicitly when stripping.
const NUMBER_SIGN_GLYPHS: [char; 3] = ['⁰', '°', 'º'];

/// ASCII word boundary placed after the serial, so a trailing accented
/// letter such as `ñ` still ends the match.
const SERIAL_END: &str = r"(?-u:\b)";

lazy_static! {
    static ref INNER_WHITESPACE: Regex =
        Regex::new(r"\s+").expect("INNER_WHITESPACE regex is valid");
}

/// How a literal pattern is compared against page text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralMode {
    /// Case-insensitive substring containment.
    Substring,
    /// Case-insensitive containment after dropping every non-alphanumeric
    /// character from both the needle and the page text.
    Alphanumeric,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralPattern {
    /// Human-readable form, e.g. `N° 12345`.
    pub text: String,
    pub mode: LiteralMode,
    needle: String,
}

impl LiteralPattern {
    fn substring(text: String) -> Self {
        let needle = text.to_lowercase();
        Self {
            text,
            mode: LiteralMode::Substring,
            needle,
        }
    }

    fn alphanumeric(text: String) -> Self {
        let needle = strip_non_alphanumeric(&text.to_lowercase());
        Self {
            text,
            mode: LiteralMode::Alphanumeric,
            needle,
        }
    }

    pub fn is_found_in(&self, page: &FoldedText) -> bool {
        match self.mode {
            LiteralMode::Substring => page.lower.contains(&self.needle),
            LiteralMode::Alphanumeric => page.alphanumeric().contains(&self.needle),
        }
    }
}

/// Case-folded views of a page's text, built once per page per search.
pub struct FoldedText {
    lower: String,
    alphanumeric: std::cell::OnceCell<String>,
}

impl FoldedText {
    pub fn new(text: &str) -> Self {
        Self {
            lower: text.to_lowercase(),
            alphanumeric: std::cell::OnceCell::new(),
        }
    }

    fn alphanumeric(&self) -> &str {
        self.alphanumeric
            .get_or_init(|| strip_non_alphanumeric(&self.lower))
    }
}

/// A regular expression built from user input, kept as source until compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionPattern {
    pub label: &'static str,
    pub source: String,
}

impl ExtractionPattern {
    pub fn compile(&self) -> std::result::Result<Regex, regex::Error> {
        RegexBuilder::new(&self.source)
            .case_insensitive(true)
            .build()
    }
}

#[derive(Debug)]
pub struct CompiledPattern {
    pub label: &'static str,
    pub regex: Regex,
}

/// Compiled extraction regexes for one search. Patterns that failed to
/// compile are absent.
#[derive(Debug)]
pub struct CompiledExtractors {
    pub specific: Vec<CompiledPattern>,
    pub fallback: Option<CompiledPattern>,
}

/// All patterns derived from one serial query.
#[derive(Debug, Clone)]
pub struct SerialPatterns {
    serial: String,
    precise: Vec<LiteralPattern>,
    permissive: Vec<LiteralPattern>,
    extraction: Vec<ExtractionPattern>,
    fallback: ExtractionPattern,
}

impl SerialPatterns {
    pub fn new(raw: &str) -> Result<Self> {
        Self::with_normalization(raw, false)
    }

    /// Builds the pattern set. With `normalize` the serial is also upper-cased,
    /// stripped of one user-typed prefix and of inner whitespace.
    pub fn with_normalization(raw: &str, normalize: bool) -> Result<Self> {
        let serial = if normalize {
            normalize_serial_input(raw)
        } else {
            raw.trim().to_string()
        };

        if serial.is_empty() {
            return Err(RepositoryError::InvalidInput(
                "A serial number is required to search".to_string(),
            ));
        }

        let precise = PRECISE_PREFIXES
            .iter()
            .map(|prefix| LiteralPattern::substring(format!("{}{}", prefix, serial)))
            .collect();

        let mut permissive = Vec::with_capacity(2);
        if !strip_non_alphanumeric(&serial).is_empty() {
            permissive.push(LiteralPattern::alphanumeric(format!("N{}", serial)));
        }
        permissive.push(LiteralPattern::substring(serial.clone()));

        let escaped = regex::escape(&serial);
        let extraction = vec![
            ExtractionPattern {
                label: "N⁰",
                source: format!(r"N⁰\s*{}{}", escaped, SERIAL_END),
            },
            ExtractionPattern {
                label: "N°",
                source: format!(r"N°\s*{}{}", escaped, SERIAL_END),
            },
            ExtractionPattern {
                label: "Nº",
                source: format!(r"Nº\s*{}{}", escaped, SERIAL_END),
            },
            ExtractionPattern {
                label: "N.",
                source: format!(r"N\.\s*{}{}", escaped, SERIAL_END),
            },
            ExtractionPattern {
                label: "N",
                source: format!(r"N\s+{}{}", escaped, SERIAL_END),
            },
        ];

        let fallback = ExtractionPattern {
            label: "general",
            source: format!(r"(?:[Nn][°⁰º.]?\s*)?{}{}", escaped, SERIAL_END),
        };

        Ok(Self {
            serial,
            precise,
            permissive,
            extraction,
            fallback,
        })
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn precise(&self) -> &[LiteralPattern] {
        &self.precise
    }

    pub fn permissive(&self) -> &[LiteralPattern] {
        &self.permissive
    }

    pub fn extraction(&self) -> &[ExtractionPattern] {
        &self.extraction
    }

    pub fn fallback(&self) -> &ExtractionPattern {
        &self.fallback
    }

    pub fn compile(&self) -> CompiledExtractors {
        CompiledExtractors {
            specific: compile_patterns(&self.extraction),
            fallback: compile_patterns(std::slice::from_ref(&self.fallback))
                .into_iter()
                .next(),
        }
    }
}

/// Compiles every pattern, logging and skipping the ones that fail.
pub fn compile_patterns(patterns: &[ExtractionPattern]) -> Vec<CompiledPattern> {
    patterns
        .iter()
        .filter_map(|pattern| match pattern.compile() {
            Ok(regex) => Some(CompiledPattern {
                label: pattern.label,
                regex,
            }),
            Err(e) => {
                warn!(
                    "Skipping serial pattern '{}' ({}): {}",
                    pattern.label, pattern.source, e
                );
                None
            }
        })
        .collect()
}

/// Upper-cases the input, removes one leading prefix such as `N°` or `NO.`
/// and collapses inner whitespace.
pub fn normalize_serial_input(raw: &str) -> String {
    let mut normalized = raw.trim().to_uppercase();

    for prefix in USER_TYPED_PREFIXES {
        if let Some(rest) = normalized.strip_prefix(prefix) {
            normalized = rest.trim().to_string();
            break;
        }
    }

    INNER_WHITESPACE.replace_all(&normalized, "").into_owned()
}

fn strip_non_alphanumeric(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric() && !NUMBER_SIGN_GLYPHS.contains(c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_precise_tier_order() {
        let patterns = SerialPatterns::new("  12345 ").unwrap();
        let texts: Vec<&str> = patterns.precise().iter().map(|p| p.text.as_str()).collect();

        assert_eq!(texts, vec!["N⁰ 12345", "N° 12345", "Nº 12345", "N.12345"]);
        assert!(
            patterns
                .precise()
                .iter()
                .all(|p| p.mode == LiteralMode::Substring)
        );
    }

    #[test]
    fn test_precise_tier_always_four_members() {
        for serial in ["A", "AB-99", "x.y", "N° 7", "ñandú 3"] {
            let patterns = SerialPatterns::new(serial).unwrap();
            assert_eq!(patterns.precise().len(), 4, "serial {serial}");
        }
    }

    #[test]
    fn test_empty_serial_is_invalid() {
        assert!(matches!(
            SerialPatterns::new("   "),
            Err(RepositoryError::InvalidInput(_))
        ));
        assert!(matches!(
            SerialPatterns::new(""),
            Err(RepositoryError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_permissive_tier() {
        let patterns = SerialPatterns::new("12-345").unwrap();
        let permissive = patterns.permissive();

        assert_eq!(permissive.len(), 2);
        assert_eq!(permissive[0].text, "N12-345");
        assert_eq!(permissive[0].mode, LiteralMode::Alphanumeric);
        assert_eq!(permissive[1].text, "12-345");
        assert_eq!(permissive[1].mode, LiteralMode::Substring);

        assert!(permissive[0].is_found_in(&FoldedText::new("serie n° 12 345 instalada")));
        assert!(!permissive[1].is_found_in(&FoldedText::new("serie n° 12 345 instalada")));
        assert!(permissive[1].is_found_in(&FoldedText::new("lote 12-345")));
    }

    #[test]
    fn test_permissive_tier_ignores_every_number_sign() {
        let patterns = SerialPatterns::new("12345").unwrap();
        let widened = &patterns.permissive()[0];

        for page in ["N⁰ 12 345", "N° 12 345", "Nº 12 345", "N. 12 345"] {
            assert!(widened.is_found_in(&FoldedText::new(page)), "page {page}");
        }
        assert!(!widened.is_found_in(&FoldedText::new("Nª 12 345")));
    }

    #[test]
    fn test_serial_followed_by_accented_letter() {
        let compiled = SerialPatterns::new("12345").unwrap().compile();

        let specific = &compiled.specific[1].regex;
        assert_eq!(
            specific.find("Equipo N° 12345ñ").map(|m| m.as_str()),
            Some("N° 12345")
        );
        assert!(!specific.is_match("Equipo N° 123456"));

        let fallback = &compiled.fallback.unwrap().regex;
        assert!(fallback.is_match("lote 12345é"));
        assert!(!fallback.is_match("lote 12345x"));
    }

    #[test]
    fn test_symbol_only_serial_skips_alphanumeric_pattern() {
        let patterns = SerialPatterns::new("--").unwrap();
        assert_eq!(patterns.permissive().len(), 1);
        assert_eq!(patterns.permissive()[0].text, "--");
    }

    #[test]
    fn test_literal_match_is_case_insensitive() {
        let patterns = SerialPatterns::new("ab12").unwrap();
        let page = FoldedText::new("Equipo Nº AB12 en bodega");
        assert!(patterns.precise()[2].is_found_in(&page));
        assert!(!patterns.precise()[0].is_found_in(&page));
    }

    #[test]
    fn test_extraction_patterns_escape_serial() {
        let patterns = SerialPatterns::new("A.B+1").unwrap();
        assert_eq!(patterns.extraction().len(), 5);
        assert_eq!(patterns.extraction()[3].source, r"N\.\s*A\.B\+1(?-u:\b)");

        let compiled = patterns.compile();
        assert_eq!(compiled.specific.len(), 5);
        assert!(compiled.fallback.is_some());

        let regex = &compiled.specific[1].regex;
        assert!(regex.is_match("n° a.b+1 "));
        assert!(!regex.is_match("N° AxB+1"));
    }

    #[test]
    fn test_extraction_labels_in_order() {
        let patterns = SerialPatterns::new("9").unwrap();
        let labels: Vec<&str> = patterns.extraction().iter().map(|p| p.label).collect();
        assert_eq!(labels, vec!["N⁰", "N°", "Nº", "N.", "N"]);
        assert_eq!(patterns.fallback().label, "general");
    }

    #[test]
    fn test_invalid_pattern_is_skipped() {
        let patterns = vec![
            ExtractionPattern {
                label: "broken",
                source: r"N(\s*123".to_string(),
            },
            ExtractionPattern {
                label: "ok",
                source: r"N\s*123\b".to_string(),
            },
        ];

        let compiled = compile_patterns(&patterns);
        assert_eq!(compiled.len(), 1);
        assert_eq!(compiled[0].label, "ok");
    }

    #[test]
    fn test_normalize_serial_input() {
        assert_eq!(normalize_serial_input(" n° 12 345 "), "12345");
        assert_eq!(normalize_serial_input("No. ab-7"), "AB-7");
        assert_eq!(normalize_serial_input("N 88 1"), "881");
        assert_eq!(normalize_serial_input("xk 9"), "XK9");
    }

    #[test]
    fn test_with_normalization_changes_serial() {
        let patterns = SerialPatterns::with_normalization("N° 12 345", true).unwrap();
        assert_eq!(patterns.serial(), "12345");
        assert_eq!(patterns.precise()[0].text, "N⁰ 12345");

        let plain = SerialPatterns::new("N° 12 345").unwrap();
        assert_eq!(plain.serial(), "N° 12 345");
    }
}
