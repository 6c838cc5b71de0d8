//! Sheet URL recognition
//!
//! Maps a user-facing spreadsheet URL to the query endpoint, sheet key and
//! sheet gid. Two service generations are recognized, each with its own URL
//! shape and endpoint template.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static GID_FORMAT: Lazy<Regex> = Lazy::new(|| compile(r"(?i)gid=([^/&#]+)"));
static KEY_FORMAT_2014: Lazy<Regex> = Lazy::new(|| compile(r"(?i)spreadsheets/d/([^/#]+)"));
static KEY_FORMAT_2010: Lazy<Regex> = Lazy::new(|| compile(r"(?i)key=([^&#]+)"));

fn compile(pattern: &str) -> Regex {
    // Patterns are literals checked by the tests below.
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern}: {e}"))
}

/// Service generation a URL belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SheetGeneration {
    /// `https://docs.google.com/spreadsheets/d/<key>/edit#gid=<gid>`
    #[serde(rename = "2014")]
    Sheets2014,
    /// `https://docs.google.com/spreadsheet/ccc?key=<key>#gid=<gid>`
    #[serde(rename = "2010")]
    Sheets2010,
}

impl SheetGeneration {
    /// Every generation, oldest last. When a URL matches more than one,
    /// the later entry wins.
    pub const ALL: [SheetGeneration; 2] = [SheetGeneration::Sheets2014, SheetGeneration::Sheets2010];

    fn key_format(self) -> &'static Regex {
        match self {
            SheetGeneration::Sheets2014 => &KEY_FORMAT_2014,
            SheetGeneration::Sheets2010 => &KEY_FORMAT_2010,
        }
    }

    /// Query endpoint for a key. The result ends with `?` or `&` so query
    /// parameters can be appended directly.
    pub fn endpoint(self, key: &str) -> String {
        match self {
            SheetGeneration::Sheets2014 => {
                format!("https://docs.google.com/spreadsheets/d/{key}/gviz/tq?")
            }
            SheetGeneration::Sheets2010 => {
                format!("https://spreadsheets.google.com/tq?key={key}&")
            }
        }
    }
}

/// Where a sheet lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetLocation {
    pub endpoint: String,
    pub key: String,
    pub gid: String,
}

/// Extracts a [`SheetLocation`] from a URL
pub trait SheetLocator: Send + Sync {
    /// `None` when the URL matches no recognized pattern.
    fn locate(&self, url: &str) -> Option<SheetLocation>;
}

/// Locator for the hosted spreadsheet service
#[derive(Debug, Clone, Copy, Default)]
pub struct GvizLocator;

impl SheetLocator for GvizLocator {
    fn locate(&self, url: &str) -> Option<SheetLocation> {
        let gid = GID_FORMAT.captures(url)?.get(1)?.as_str();

        SheetGeneration::ALL.iter().rev().find_map(|generation| {
            let key = generation.key_format().captures(url)?.get(1)?.as_str();
            Some(SheetLocation {
                endpoint: generation.endpoint(key),
                key: key.to_string(),
                gid: gid.to_string(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_patterns_compile() {
        Lazy::force(&GID_FORMAT);
        Lazy::force(&KEY_FORMAT_2014);
        Lazy::force(&KEY_FORMAT_2010);
    }

    #[test]
    fn test_locate_2014_url() {
        let url = "https://docs.google.com/spreadsheets/d/1qT1LyvoAcb0HTsi2rHBltBVpUBumAUzT__rhMvrz5Rk/edit#gid=0";
        let location = GvizLocator.locate(url).unwrap();

        assert_eq!(location.key, "1qT1LyvoAcb0HTsi2rHBltBVpUBumAUzT__rhMvrz5Rk");
        assert_eq!(location.gid, "0");
        assert_eq!(
            location.endpoint,
            "https://docs.google.com/spreadsheets/d/1qT1LyvoAcb0HTsi2rHBltBVpUBumAUzT__rhMvrz5Rk/gviz/tq?"
        );
    }

    #[test]
    fn test_locate_2010_url() {
        let url = "https://docs.google.com/spreadsheet/ccc?key=0AlRp2ieP7izLdGFNOERTZW0xLVpROFc3X3FJQ2tSb2c&usp=drive_web#gid=3";
        let location = GvizLocator.locate(url).unwrap();

        assert_eq!(location.key, "0AlRp2ieP7izLdGFNOERTZW0xLVpROFc3X3FJQ2tSb2c");
        assert_eq!(location.gid, "3");
        assert_eq!(
            location.endpoint,
            "https://spreadsheets.google.com/tq?key=0AlRp2ieP7izLdGFNOERTZW0xLVpROFc3X3FJQ2tSb2c&"
        );
    }

    #[test]
    fn test_url_matching_both_generations_uses_2010() {
        let url = "https://docs.google.com/spreadsheets/d/abc/edit?key=xyz#gid=4";
        let location = GvizLocator.locate(url).unwrap();

        assert_eq!(location.key, "xyz");
        assert_eq!(location.gid, "4");
        assert_eq!(location.endpoint, SheetGeneration::Sheets2010.endpoint("xyz"));
    }

    #[test]
    fn test_patterns_are_case_insensitive() {
        let url = "https://docs.google.com/Spreadsheets/D/abc/edit#GID=7";
        let location = GvizLocator.locate(url).unwrap();
        assert_eq!(location.key, "abc");
        assert_eq!(location.gid, "7");
    }

    #[test]
    fn test_missing_gid_is_unrecognized() {
        let url = "https://docs.google.com/spreadsheets/d/abc/edit";
        assert!(GvizLocator.locate(url).is_none());
    }

    #[test]
    fn test_missing_key_is_unrecognized() {
        assert!(GvizLocator.locate("https://example.com/?gid=0").is_none());
        assert!(GvizLocator.locate("").is_none());
    }
}
