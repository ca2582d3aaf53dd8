//! Inner files and their kind/naming rules.

/// What an inner file is, derived from its stored name.
///
/// Everything except `Other` survives an archive rewrite; `Player` and
/// `DataMapping` are additionally dropped when converting between consoles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    RegionNether,
    RegionOverworld,
    RegionEnd,
    EntityNether,
    EntityOverworld,
    EntityEnd,
    Player,
    Map,
    Structure,
    Village,
    DataMapping,
    Level,
    Grf,
    Other,
}

impl FileKind {
    /// Classify a stored file name.
    pub fn from_name(name: &str) -> FileKind {
        let (prefix, rest) = dimension_prefix(name);
        if rest.starts_with("r.") && rest.ends_with(".mcr") {
            return match prefix {
                DimPrefix::Nether => FileKind::RegionNether,
                DimPrefix::Overworld => FileKind::RegionOverworld,
                DimPrefix::End => FileKind::RegionEnd,
            };
        }
        if rest == "entities.dat" {
            return match prefix {
                DimPrefix::Nether => FileKind::EntityNether,
                DimPrefix::Overworld => FileKind::EntityOverworld,
                DimPrefix::End => FileKind::EntityEnd,
            };
        }
        match name {
            "level.dat" => FileKind::Level,
            "data/villages.dat" => FileKind::Village,
            "data/largeMapDataMappings.dat" => FileKind::DataMapping,
            _ if name.starts_with("data/map_") && name.ends_with(".dat") => FileKind::Map,
            _ if name.starts_with("players/") => FileKind::Player,
            _ if name.ends_with(".grf") => FileKind::Grf,
            _ if name.ends_with(".mtplace") => FileKind::Structure,
            _ => FileKind::Other,
        }
    }

    pub fn is_region(self) -> bool {
        matches!(
            self,
            FileKind::RegionNether | FileKind::RegionOverworld | FileKind::RegionEnd
        )
    }

    pub fn is_entity(self) -> bool {
        matches!(
            self,
            FileKind::EntityNether | FileKind::EntityOverworld | FileKind::EntityEnd
        )
    }

    /// Whether this kind is carried through an archive rewrite.
    pub fn written_on_rewrite(self) -> bool {
        self != FileKind::Other
    }

    fn dimension(self) -> Option<DimPrefix> {
        Some(match self {
            FileKind::RegionNether | FileKind::EntityNether => DimPrefix::Nether,
            FileKind::RegionOverworld | FileKind::EntityOverworld => DimPrefix::Overworld,
            FileKind::RegionEnd | FileKind::EntityEnd => DimPrefix::End,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DimPrefix {
    Nether,
    Overworld,
    End,
}

impl DimPrefix {
    fn as_str(self) -> &'static str {
        match self {
            DimPrefix::Nether => "DIM-1/",
            DimPrefix::Overworld => "",
            DimPrefix::End => "DIM1/",
        }
    }
}

fn dimension_prefix(name: &str) -> (DimPrefix, &str) {
    if let Some(rest) = name.strip_prefix("DIM-1/") {
        (DimPrefix::Nether, rest)
    } else if let Some(rest) = name.strip_prefix("DIM1/") {
        (DimPrefix::End, rest)
    } else {
        (DimPrefix::Overworld, name)
    }
}

/// One named blob inside an archive.
#[derive(Debug, Clone)]
pub struct InnerFile {
    pub name: String,
    pub kind: FileKind,
    pub timestamp: u64,
    pub payload: Vec<u8>,
}

impl InnerFile {
    pub fn new(name: String, timestamp: u64, payload: Vec<u8>) -> Self {
        let kind = FileKind::from_name(&name);
        InnerFile {
            name,
            kind,
            timestamp,
            payload,
        }
    }

    /// Region coordinates parsed out of an `r.X.Z.mcr` name.
    pub fn region_coords(&self) -> Option<(i16, i16)> {
        if !self.kind.is_region() {
            return None;
        }
        let (_, rest) = dimension_prefix(&self.name);
        let mut parts = rest.split('.');
        if parts.next() != Some("r") {
            return None;
        }
        let x = parts.next()?.parse().ok()?;
        let z = parts.next()?.parse().ok()?;
        Some((x, z))
    }

    /// Canonical on-disk name, rebuilt from the kind (and coordinates for
    /// dimension-scoped files).
    pub fn construct_name(&self) -> String {
        if let Some(prefix) = self.kind.dimension() {
            if self.kind.is_region() {
                if let Some((x, z)) = self.region_coords() {
                    return format!("{}r.{}.{}.mcr", prefix.as_str(), x, z);
                }
            } else {
                return format!("{}entities.dat", prefix.as_str());
            }
        }
        self.name.clone()
    }
}
