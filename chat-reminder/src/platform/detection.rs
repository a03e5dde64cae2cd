//! User agent based platform detection

use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform tag used for behavior decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformTag {
    Pc,
    Android,
    Ios,
    Unknown,
}

impl PlatformTag {
    /// Android and iOS are mobile; everything else is treated as desktop
    pub fn is_mobile(self) -> bool {
        matches!(self, PlatformTag::Android | PlatformTag::Ios)
    }

    /// Capitalized name for the settings panel
    pub fn label(self) -> &'static str {
        match self {
            PlatformTag::Pc => "Pc",
            PlatformTag::Android => "Android",
            PlatformTag::Ios => "Ios",
            PlatformTag::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for PlatformTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlatformTag::Pc => "pc",
            PlatformTag::Android => "android",
            PlatformTag::Ios => "ios",
            PlatformTag::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// User-forced platform from the settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformOverride {
    #[default]
    Auto,
    Pc,
    Android,
    Ios,
}

impl PlatformOverride {
    /// The forced tag, or `None` when detection should decide
    pub fn forced(self) -> Option<PlatformTag> {
        match self {
            PlatformOverride::Auto => None,
            PlatformOverride::Pc => Some(PlatformTag::Pc),
            PlatformOverride::Android => Some(PlatformTag::Android),
            PlatformOverride::Ios => Some(PlatformTag::Ios),
        }
    }
}

/// Maps the environment to a platform tag
pub trait PlatformClassifier: Send + Sync {
    /// Cached result of the one-time detection
    fn detected(&self) -> PlatformTag;

    /// Platform after applying the user override
    fn effective(&self, over: PlatformOverride) -> PlatformTag {
        over.forced().unwrap_or_else(|| self.detected())
    }
}

/// Classify a browser identification string.
///
/// Windows Phone reports "Android" in some builds but behaves like a
/// desktop browser, so it is checked first. Unrecognized systems are `Pc`.
pub fn classify_user_agent(user_agent: &str) -> PlatformTag {
    let lowered = user_agent.to_lowercase();

    if lowered.contains("windows phone") {
        return PlatformTag::Pc;
    }
    if lowered.contains("android") {
        return PlatformTag::Android;
    }
    // iOS device names are matched case-sensitively
    if ["iPad", "iPhone", "iPod"]
        .iter()
        .any(|device| user_agent.contains(device))
    {
        return PlatformTag::Ios;
    }

    PlatformTag::Pc
}

/// Classifier that detects once from a user agent string
#[derive(Debug, Clone)]
pub struct UserAgentClassifier {
    detected: PlatformTag,
}

impl UserAgentClassifier {
    /// Run detection on the host's user agent
    pub fn detect(user_agent: &str) -> Self {
        let detected = classify_user_agent(user_agent);
        tracing::info!("Detected platform: {}", detected);
        Self { detected }
    }

    /// Classifier with a known detection result
    pub fn with_detected(detected: PlatformTag) -> Self {
        Self { detected }
    }
}

impl PlatformClassifier for UserAgentClassifier {
    fn detected(&self) -> PlatformTag {
        self.detected
    }
}
