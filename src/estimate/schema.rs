use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum SealerType {
    CoalTar,
    AsphaltEmulsion,
    Acrylic,
    PolymerModified,
}

impl SealerType {
    pub const ALL: [SealerType; 4] = [
        SealerType::CoalTar,
        SealerType::AsphaltEmulsion,
        SealerType::Acrylic,
        SealerType::PolymerModified,
    ];

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::CoalTar => "coal-tar",
            Self::AsphaltEmulsion => "asphalt-emulsion",
            Self::Acrylic => "acrylic",
            Self::PolymerModified => "polymer-modified",
        }
    }
}

impl Display for SealerType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::CoalTar => "Coal Tar",
            Self::AsphaltEmulsion => "Asphalt Emulsion",
            Self::Acrylic => "Acrylic",
            Self::PolymerModified => "Polymer Modified",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Error)]
#[error("unknown sealer type: {0}")]
pub struct SealerParseError(pub String);

impl FromStr for SealerType {
    type Err = SealerParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "coal-tar" | "coaltar" | "tar" => Ok(Self::CoalTar),
            "asphalt-emulsion" | "emulsion" => Ok(Self::AsphaltEmulsion),
            "acrylic" => Ok(Self::Acrylic),
            "polymer-modified" | "polymer" => Ok(Self::PolymerModified),
            _ => Err(SealerParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum PaintType {
    Waterborne,
    SolventBased,
    Epoxy,
}

impl PaintType {
    pub const ALL: [PaintType; 3] = [PaintType::Waterborne, PaintType::SolventBased, PaintType::Epoxy];

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Waterborne => "waterborne",
            Self::SolventBased => "solvent-based",
            Self::Epoxy => "epoxy",
        }
    }
}

impl Display for PaintType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Waterborne => "Waterborne",
            Self::SolventBased => "Solvent Based",
            Self::Epoxy => "Epoxy",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Error)]
#[error("unknown paint type: {0}")]
pub struct PaintParseError(pub String);

impl FromStr for PaintType {
    type Err = PaintParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "waterborne" | "water-based" | "latex" => Ok(Self::Waterborne),
            "solvent-based" | "solvent" => Ok(Self::SolventBased),
            "epoxy" => Ok(Self::Epoxy),
            _ => Err(PaintParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MixType {
    Standard,
    Premium,
    Recycled,
}

impl MixType {
    pub const ALL: [MixType; 3] = [MixType::Standard, MixType::Premium, MixType::Recycled];

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Premium => "premium",
            Self::Recycled => "recycled",
        }
    }
}

impl Display for MixType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Standard => "Standard",
            Self::Premium => "Premium",
            Self::Recycled => "Recycled",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Error)]
#[error("unknown mix type: {0}")]
pub struct MixParseError(pub String);

impl FromStr for MixType {
    type Err = MixParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "premium" => Ok(Self::Premium),
            "recycled" | "rap" => Ok(Self::Recycled),
            _ => Err(MixParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceType {
    #[default]
    New,
    Overlay,
    Patch,
}

impl SurfaceType {
    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Overlay => "overlay",
            Self::Patch => "patch",
        }
    }
}

impl Display for SurfaceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_slug())
    }
}

#[derive(Debug, Error)]
#[error("unknown surface type: {0}")]
pub struct SurfaceParseError(pub String);

impl FromStr for SurfaceType {
    type Err = SurfaceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" | "new_construction" => Ok(Self::New),
            "overlay" => Ok(Self::Overlay),
            "patch" | "repair" => Ok(Self::Patch),
            _ => Err(SurfaceParseError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{MixType, PaintType, SealerType, SurfaceType};

    #[test]
    fn parses_names_with_aliases() {
        assert_eq!(SealerType::from_str("Coal_Tar").unwrap(), SealerType::CoalTar);
        assert_eq!(PaintType::from_str("solvent").unwrap(), PaintType::SolventBased);
        assert_eq!(MixType::from_str(" RAP ").unwrap(), MixType::Recycled);
        assert_eq!(SurfaceType::from_str("overlay").unwrap(), SurfaceType::Overlay);
    }

    #[test]
    fn rejects_unknown_names() {
        let err = MixType::from_str("gravel").unwrap_err();
        assert_eq!(err.to_string(), "unknown mix type: gravel");
        assert!(SealerType::from_str("").is_err());
    }

    #[test]
    fn slugs_round_trip_through_parser() {
        for sealer in SealerType::ALL {
            assert_eq!(SealerType::from_str(sealer.as_slug()).unwrap(), sealer);
        }
        for paint in PaintType::ALL {
            assert_eq!(PaintType::from_str(paint.as_slug()).unwrap(), paint);
        }
    }
}
