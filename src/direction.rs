use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BilingualError;

/// Source→target language pair for a translation session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Arabic to English
    #[default]
    #[serde(rename = "ar-en")]
    ArEn,
    /// English to Arabic
    #[serde(rename = "en-ar")]
    EnAr,
}

impl Direction {
    /// Every supported direction, in selector order
    pub const ALL: [Direction; 2] = [Direction::ArEn, Direction::EnAr];

    /// Short code used in URLs, config keys and file names
    pub fn code(&self) -> &'static str {
        match self {
            Self::ArEn => "ar-en",
            Self::EnAr => "en-ar",
        }
    }

    /// Label shown in the direction selector
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ArEn => "Arabic to English",
            Self::EnAr => "English to Arabic",
        }
    }

    pub fn source_language(&self) -> &'static str {
        match self {
            Self::ArEn => "ar",
            Self::EnAr => "en",
        }
    }

    pub fn target_language(&self) -> &'static str {
        match self {
            Self::ArEn => "en",
            Self::EnAr => "ar",
        }
    }

    /// Heading above the input area and the source result panel
    pub fn input_label(&self) -> &'static str {
        language_label(self.source_language())
    }

    /// Heading above the translated result panel
    pub fn output_label(&self) -> &'static str {
        language_label(self.target_language())
    }

    /// Direction running the other way
    pub fn reversed(&self) -> Self {
        match self {
            Self::ArEn => Self::EnAr,
            Self::EnAr => Self::ArEn,
        }
    }
}

fn language_label(code: &str) -> &'static str {
    match code {
        "ar" => "Arabic text",
        _ => "English text",
    }
}

/// Convert language code to full language name for prompts
pub fn language_name(code: &str) -> &'static str {
    match code {
        "ar" => "Arabic",
        _ => "English",
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Direction {
    type Err = BilingualError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ar-en" | "arabic to english" => Ok(Self::ArEn),
            "en-ar" | "english to arabic" => Ok(Self::EnAr),
            other => Err(BilingualError::UnknownDirection(other.to_string())),
        }
    }
}
