//! Output formats and video qualities offered by the backend, with their
//! display labels.

use std::{borrow::Cow, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Output container the backend converts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatId {
    #[default]
    Mp4,
    Mp3,
    M4a,
    Wav,
    Ogg,
    Flac,
    Opus,
}

impl FormatId {
    /// Order in which the format selector lists them
    pub const ALL: [FormatId; 7] = [
        FormatId::Mp4,
        FormatId::Mp3,
        FormatId::M4a,
        FormatId::Wav,
        FormatId::Ogg,
        FormatId::Flac,
        FormatId::Opus,
    ];

    /// Wire identifier, as sent in the request body
    pub fn as_str(self) -> &'static str {
        match self {
            FormatId::Mp4 => "mp4",
            FormatId::Mp3 => "mp3",
            FormatId::M4a => "m4a",
            FormatId::Wav => "wav",
            FormatId::Ogg => "ogg",
            FormatId::Flac => "flac",
            FormatId::Opus => "opus",
        }
    }
}

impl fmt::Display for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormatId::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| format!("unknown format: {s}"))
    }
}

/// Video quality; only meaningful for MP4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityId {
    #[default]
    Auto,
    Highest,
    High,
    Medium,
    Low,
}

impl QualityId {
    pub const ALL: [QualityId; 5] = [
        QualityId::Auto,
        QualityId::Highest,
        QualityId::High,
        QualityId::Medium,
        QualityId::Low,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            QualityId::Auto => "auto",
            QualityId::Highest => "highest",
            QualityId::High => "high",
            QualityId::Medium => "medium",
            QualityId::Low => "low",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QualityId::Auto => "Auto",
            QualityId::Highest => "Highest quality",
            QualityId::High => "High quality",
            QualityId::Medium => "Medium quality",
            QualityId::Low => "Low quality",
        }
    }
}

impl fmt::Display for QualityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QualityId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QualityId::ALL
            .into_iter()
            .find(|q| q.as_str() == s)
            .ok_or_else(|| format!("unknown quality: {s}"))
    }
}

pub fn label_for(format: FormatId) -> &'static str {
    match format {
        FormatId::Mp4 => "MP4 Video",
        FormatId::Mp3 => "MP3 Audio",
        FormatId::M4a => "M4A Audio",
        FormatId::Wav => "WAV Audio",
        FormatId::Ogg => "OGG Audio",
        FormatId::Flac => "FLAC Audio",
        FormatId::Opus => "Opus Audio",
    }
}

/// Label for an identifier reported by the backend. Unknown ids are echoed.
pub fn label_for_raw(raw: &str) -> Cow<'_, str> {
    match raw.parse::<FormatId>() {
        Ok(format) => Cow::Borrowed(label_for(format)),
        Err(_) => Cow::Borrowed(raw),
    }
}

pub fn is_audio(format: FormatId) -> bool {
    !matches!(format, FormatId::Mp4)
}

/// Whether the quality selector applies to this format
pub fn supports_quality(format: FormatId) -> bool {
    matches!(format, FormatId::Mp4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_mp4_has_a_quality_axis() {
        for format in FormatId::ALL {
            assert_eq!(supports_quality(format), format == FormatId::Mp4);
            assert_eq!(is_audio(format), format != FormatId::Mp4);
        }
    }

    #[test]
    fn unknown_raw_format_echoes_identifier() {
        assert_eq!(label_for_raw("mp3"), "MP3 Audio");
        assert_eq!(label_for_raw("webm"), "webm");
        assert_eq!(label_for_raw(""), "");
    }

    #[test]
    fn wire_ids_parse_back() {
        assert_eq!("flac".parse::<FormatId>(), Ok(FormatId::Flac));
        assert_eq!("high".parse::<QualityId>(), Ok(QualityId::High));
        assert!("MP4".parse::<FormatId>().is_err());
    }

    #[test]
    fn serde_uses_lowercase_ids() {
        assert_eq!(serde_json::to_string(&FormatId::M4a).unwrap(), "\"m4a\"");
        assert_eq!(serde_json::to_string(&QualityId::Auto).unwrap(), "\"auto\"");
    }
}
