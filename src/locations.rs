use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed pedestrian counting sites. Discriminants are the public 1-based ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Location {
    JordanPond = 1,
    SandBeach = 2,
    CadillacSummit = 3,
    ThunderHole = 4,
    OceanPath = 5,
    VillageGreen = 6,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocationInfo {
    pub location: Location,
    pub display_name: &'static str,
    /// Lower-case name used for the historical csv files.
    pub short_name: &'static str,
    /// Mean arrivals per 30 second bucket.
    pub inbound_rate: f64,
    pub outbound_rate: f64,
}

pub const LOCATION_COUNT: usize = 6;

static LOCATION_TABLE: [LocationInfo; LOCATION_COUNT] = [
    LocationInfo {
        location: Location::JordanPond,
        display_name: "Jordan Pond",
        short_name: "jordanpond",
        inbound_rate: 0.9,
        outbound_rate: 0.7,
    },
    LocationInfo {
        location: Location::SandBeach,
        display_name: "Sand Beach",
        short_name: "sandbeach",
        inbound_rate: 0.8,
        outbound_rate: 0.65,
    },
    LocationInfo {
        location: Location::CadillacSummit,
        display_name: "Cadillac Summit",
        short_name: "cadillac",
        inbound_rate: 1.0,
        outbound_rate: 0.85,
    },
    LocationInfo {
        location: Location::ThunderHole,
        display_name: "Thunder Hole",
        short_name: "thunderhole",
        inbound_rate: 0.7,
        outbound_rate: 0.6,
    },
    LocationInfo {
        location: Location::OceanPath,
        display_name: "Ocean Path",
        short_name: "oceanpath",
        inbound_rate: 0.6,
        outbound_rate: 0.5,
    },
    LocationInfo {
        location: Location::VillageGreen,
        display_name: "Village Green",
        short_name: "villagegreen",
        inbound_rate: 0.5,
        outbound_rate: 0.45,
    },
];

impl Location {
    /// Every location, ordered by id.
    pub const ALL: [Location; LOCATION_COUNT] = [
        Location::JordanPond,
        Location::SandBeach,
        Location::CadillacSummit,
        Location::ThunderHole,
        Location::OceanPath,
        Location::VillageGreen,
    ];

    pub fn from_id(id: u8) -> Option<Location> {
        match id {
            1..=6 => Some(Location::ALL[(id - 1) as usize]),
            _ => None,
        }
    }

    pub fn from_short_name(short_name: &str) -> Option<Location> {
        LOCATION_TABLE
            .iter()
            .find(|info| info.short_name == short_name)
            .map(|info| info.location)
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    /// Position in `Location::ALL` and in any per-location table.
    pub fn index(self) -> usize {
        self.id() as usize - 1
    }

    pub fn info(self) -> &'static LocationInfo {
        &LOCATION_TABLE[self.index()]
    }

    pub fn display_name(self) -> &'static str {
        self.info().display_name
    }

    pub fn short_name(self) -> &'static str {
        self.info().short_name
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
