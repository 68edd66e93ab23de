use std::fmt::{self, Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Video,
    Audio,
}

impl Display for TrackKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TrackKind::Video => "video",
            TrackKind::Audio => "audio",
        })
    }
}

/// A media stream discovered while parsing, with a codec string
/// suitable for media source extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTrack {
    pub kind: TrackKind,
    pub codec: String,
}

/// `avc1.PPCCLL` from the profile, compatibility and level bytes.
pub fn avc_codec(profile: u8, compatibility: u8, level: u8) -> String {
    format!("avc1.{profile:02x}{compatibility:02x}{level:02x}")
}

/// `mp4a.40.<objectTypeIndication>` from the top five bits of the first
/// AudioSpecificConfig byte.
pub fn aac_codec(object_type: u8) -> String {
    format!("mp4a.40.{object_type}")
}
