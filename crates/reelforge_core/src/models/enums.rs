//! Core enums used throughout the engine.

use serde::{Deserialize, Serialize};

/// Target language for dubbed audio.
///
/// `Original` means no dubbing is performed and the clip keeps its
/// source audio untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DubLanguage {
    #[default]
    Original,
    Indonesian,
    English,
    EnglishUk,
    Japanese,
}

impl DubLanguage {
    /// Two-letter code passed to the translation collaborator.
    ///
    /// `None` for `Original` (no translation happens).
    pub fn translation_code(&self) -> Option<&'static str> {
        match self {
            DubLanguage::Original => None,
            DubLanguage::Indonesian => Some("id"),
            DubLanguage::English | DubLanguage::EnglishUk => Some("en"),
            DubLanguage::Japanese => Some("ja"),
        }
    }
}

impl std::fmt::Display for DubLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DubLanguage::Original => write!(f, "Original"),
            DubLanguage::Indonesian => write!(f, "Indonesian"),
            DubLanguage::English => write!(f, "English"),
            DubLanguage::EnglishUk => write!(f, "English (UK)"),
            DubLanguage::Japanese => write!(f, "Japanese"),
        }
    }
}

/// Gender of the synthesis voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceGender {
    #[default]
    Female,
    Male,
}

impl std::fmt::Display for VoiceGender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoiceGender::Female => write!(f, "Female"),
            VoiceGender::Male => write!(f, "Male"),
        }
    }
}

/// Dub voice identity: a target language plus a voice gender.
///
/// Not every language/gender pair resolves to a synthesis voice; config
/// validation rejects unresolvable pairs before any job starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DubVoice {
    pub language: DubLanguage,
    pub gender: VoiceGender,
}

impl DubVoice {
    /// A voice that leaves the original audio untouched.
    pub fn original() -> Self {
        Self {
            language: DubLanguage::Original,
            gender: VoiceGender::Female,
        }
    }

    /// Create a voice for the given language and gender.
    pub fn new(language: DubLanguage, gender: VoiceGender) -> Self {
        Self { language, gender }
    }

    /// Whether this voice means "keep the original audio".
    pub fn is_original(&self) -> bool {
        self.language == DubLanguage::Original
    }

    /// Resolve to the synthesis collaborator's voice identifier.
    ///
    /// Returns `None` for `Original` and for pairs with no known voice.
    pub fn synthesis_voice(&self) -> Option<&'static str> {
        use DubLanguage::*;
        use VoiceGender::*;
        match (self.language, self.gender) {
            (Original, _) => None,
            (Indonesian, Female) => Some("id-ID-GadisNeural"),
            (Indonesian, Male) => Some("id-ID-ArdiNeural"),
            (English, Female) => Some("en-US-JennyNeural"),
            (English, Male) => Some("en-US-GuyNeural"),
            (EnglishUk, Female) => Some("en-GB-SoniaNeural"),
            (EnglishUk, Male) => None,
            (Japanese, Female) => Some("ja-JP-NanamiNeural"),
            (Japanese, Male) => None,
        }
    }
}

impl std::fmt::Display for DubVoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_original() {
            write!(f, "Original")
        } else {
            write!(f, "{} {}", self.language, self.gender)
        }
    }
}

/// Target language for burned-in subtitles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubtitleLanguage {
    /// Subtitles in the transcript's own language (no translation).
    #[default]
    Original,
    Indonesian,
    English,
}

impl SubtitleLanguage {
    /// Two-letter code for the translation collaborator.
    ///
    /// `None` for `Original` (no translation happens).
    pub fn translation_code(&self) -> Option<&'static str> {
        match self {
            SubtitleLanguage::Original => None,
            SubtitleLanguage::Indonesian => Some("id"),
            SubtitleLanguage::English => Some("en"),
        }
    }
}

impl std::fmt::Display for SubtitleLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubtitleLanguage::Original => write!(f, "Original"),
            SubtitleLanguage::Indonesian => write!(f, "Indonesian"),
            SubtitleLanguage::English => write!(f, "English"),
        }
    }
}

/// Named color grading filter with a fixed parameter set.
///
/// Each filter maps to a fixed ffmpeg video filter chain; the parameters
/// are part of the filter's identity and are not configurable per clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorFilter {
    BrightInspire,
    DarkTerror,
    FunPop,
    SoftWonder,
    CleanPro,
    MagicGlow,
    CyberNeon,
    ViralPunch,
    MemeChaos,
}

impl ColorFilter {
    /// The ffmpeg filter chain implementing this look.
    pub fn ffmpeg_filter(&self) -> &'static str {
        match self {
            ColorFilter::BrightInspire => {
                "eq=saturation=1.3:contrast=1.15:brightness=0.05,colorbalance=rs=.1:gs=.05:bs=-.05,unsharp=3:3:0.8"
            }
            ColorFilter::DarkTerror => {
                "eq=saturation=0.6:contrast=1.4:brightness=-0.1,vignette=PI/3,colorbalance=rs=-.1:bs=.1"
            }
            ColorFilter::FunPop => {
                "eq=saturation=1.35:contrast=1.1:brightness=0.08,unsharp=3:3:0.6"
            }
            ColorFilter::SoftWonder => {
                "eq=saturation=1.1:contrast=1.0:brightness=0.1,colorbalance=rs=.15:gs=.1:bs=-.05,gblur=sigma=0.5"
            }
            ColorFilter::CleanPro => "eq=contrast=1.1:brightness=0.02,unsharp=5:5:1.0",
            ColorFilter::MagicGlow => {
                "eq=saturation=1.2:brightness=0.08,colorbalance=rs=.2:gs=.1:bs=.05,gblur=sigma=0.8"
            }
            ColorFilter::CyberNeon => {
                "colorbalance=rs=-.15:gs=-.05:bs=.25,eq=saturation=1.3:contrast=1.3:brightness=-0.02"
            }
            ColorFilter::ViralPunch => "eq=saturation=1.4:contrast=1.25,unsharp=5:5:1.2",
            ColorFilter::MemeChaos => {
                "eq=saturation=2.0:contrast=1.6:brightness=0.15,rgbashift=rh=2:bh=-2,noise=c0s=20:allf=t"
            }
        }
    }
}

impl std::fmt::Display for ColorFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorFilter::BrightInspire => write!(f, "Bright Inspire"),
            ColorFilter::DarkTerror => write!(f, "Dark Terror"),
            ColorFilter::FunPop => write!(f, "Fun Pop"),
            ColorFilter::SoftWonder => write!(f, "Soft Wonder"),
            ColorFilter::CleanPro => write!(f, "Clean Pro"),
            ColorFilter::MagicGlow => write!(f, "Magic Glow"),
            ColorFilter::CyberNeon => write!(f, "Cyber Neon"),
            ColorFilter::ViralPunch => write!(f, "Viral Punch"),
            ColorFilter::MemeChaos => write!(f, "Meme Chaos"),
        }
    }
}

/// Corner the watermark is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatermarkAnchor {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
}

impl WatermarkAnchor {
    /// ffmpeg overlay position expression for this corner.
    ///
    /// `margin` is the fixed pixel distance from both edges.
    pub fn overlay_position(&self, margin: u32) -> String {
        match self {
            WatermarkAnchor::TopLeft => format!("{m}:{m}", m = margin),
            WatermarkAnchor::TopRight => format!("W-w-{m}:{m}", m = margin),
            WatermarkAnchor::BottomLeft => format!("{m}:H-h-{m}", m = margin),
            WatermarkAnchor::BottomRight => format!("W-w-{m}:H-h-{m}", m = margin),
        }
    }
}
