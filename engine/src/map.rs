// ═══════════════════════════════════════════════════════════════════════
// Territory graph — static adjacency and regions, loaded once per game
// ═══════════════════════════════════════════════════════════════════════

use crate::error::MapError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Static description of one territory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerritoryDef {
    pub name: String,
    pub neighbours: Vec<String>,
}

/// A named group of territories granting a bonus when fully owned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionDef {
    pub name: String,
    pub territories: Vec<String>,
    pub bonus: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapDef {
    pub name: String,
    pub territories: Vec<TerritoryDef>,
    #[serde(default)]
    pub regions: Vec<RegionDef>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl MapDef {
    /// Build and validate a map. Adjacency must be symmetric.
    pub fn new(
        name: &str,
        territories: Vec<TerritoryDef>,
        regions: Vec<RegionDef>,
    ) -> Result<Self, MapError> {
        let mut map = MapDef {
            name: name.to_string(),
            territories,
            regions,
            index: HashMap::new(),
        };
        map.validate()?;
        Ok(map)
    }

    /// Parse a map from its JSON description.
    pub fn from_json(json: &str) -> Result<Self, MapError> {
        let mut map: MapDef = serde_json::from_str(json)?;
        map.validate()?;
        Ok(map)
    }

    /// Build a map from an undirected edge list.
    fn from_edges(
        name: &str,
        names: &[&str],
        edges: &[(&str, &str)],
        regions: &[(&str, u32, &[&str])],
    ) -> Result<Self, MapError> {
        let mut territories: Vec<TerritoryDef> = names
            .iter()
            .map(|n| TerritoryDef { name: n.to_string(), neighbours: Vec::new() })
            .collect();
        for &(a, b) in edges {
            for (from, to) in [(a, b), (b, a)] {
                match territories.iter_mut().find(|t| t.name == from) {
                    Some(t) => t.neighbours.push(to.to_string()),
                    None => {
                        return Err(MapError::UnknownNeighbour {
                            territory: to.to_string(),
                            neighbour: from.to_string(),
                        })
                    }
                }
            }
        }
        let regions = regions
            .iter()
            .map(|&(name, bonus, members)| RegionDef {
                name: name.to_string(),
                territories: members.iter().map(|m| m.to_string()).collect(),
                bonus,
            })
            .collect();
        MapDef::new(name, territories, regions)
    }

    fn validate(&mut self) -> Result<(), MapError> {
        if self.territories.is_empty() {
            return Err(MapError::Empty);
        }
        self.index.clear();
        for (i, t) in self.territories.iter().enumerate() {
            if self.index.insert(t.name.clone(), i).is_some() {
                return Err(MapError::DuplicateTerritory(t.name.clone()));
            }
        }
        for t in &self.territories {
            for n in &t.neighbours {
                let Some(&j) = self.index.get(n) else {
                    return Err(MapError::UnknownNeighbour {
                        territory: t.name.clone(),
                        neighbour: n.clone(),
                    });
                };
                if !self.territories[j].neighbours.contains(&t.name) {
                    return Err(MapError::Asymmetric { a: t.name.clone(), b: n.clone() });
                }
            }
        }
        for r in &self.regions {
            if let Some(missing) = r.territories.iter().find(|t| !self.index.contains_key(*t)) {
                return Err(MapError::UnknownRegionTerritory {
                    region: r.name.clone(),
                    territory: missing.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn contains(&self, territory: &str) -> bool {
        self.index.contains_key(territory)
    }

    /// Territory names in map order.
    pub fn territory_names(&self) -> impl Iterator<Item = &str> {
        self.territories.iter().map(|t| t.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.territories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.territories.is_empty()
    }

    /// Neighbours of a territory; empty for unknown names.
    pub fn neighbours(&self, territory: &str) -> &[String] {
        match self.index.get(territory) {
            Some(&i) => &self.territories[i].neighbours,
            None => &[],
        }
    }

    pub fn is_adjacent(&self, from: &str, to: &str) -> bool {
        self.neighbours(from).iter().any(|n| n == to)
    }

    /// Regions whose every territory satisfies `owned`.
    pub fn regions_held_by<'a>(
        &'a self,
        owned: impl Fn(&str) -> bool + 'a,
    ) -> impl Iterator<Item = &'a RegionDef> + 'a {
        self.regions
            .iter()
            .filter(move |r| r.territories.iter().all(|t| owned(t.as_str())))
    }
}

// ── Built-in maps ──────────────────────────────────────────────────────

pub const BUILTIN_MAPS: [&str; 2] = ["alpha", "tidewater"];

/// Look up one of the maps shipped with the engine.
pub fn builtin(name: &str) -> Result<MapDef, MapError> {
    match name {
        "alpha" => alpha(),
        "tidewater" => tidewater(),
        _ => Err(MapError::UnknownMap(name.to_string())),
    }
}

/// Three mutually adjacent territories, no regions.
fn alpha() -> Result<MapDef, MapError> {
    MapDef::from_edges(
        "alpha",
        &["Arafan", "Moncton", "Creer"],
        &[("Arafan", "Moncton"), ("Arafan", "Creer"), ("Moncton", "Creer")],
        &[],
    )
}

fn tidewater() -> Result<MapDef, MapError> {
    MapDef::from_edges(
        "tidewater",
        &[
            "Frostmere", "Greyhollow", "Ironpeak", "Wolfden",
            "Brinewick", "Reedholm", "Mudflats", "Tidegate",
            "Goldvale", "Ambercross", "Millbrook", "Southwatch",
        ],
        &[
            // Northreach
            ("Frostmere", "Greyhollow"),
            ("Frostmere", "Wolfden"),
            ("Greyhollow", "Ironpeak"),
            ("Greyhollow", "Wolfden"),
            ("Ironpeak", "Wolfden"),
            // Saltmarsh
            ("Brinewick", "Reedholm"),
            ("Reedholm", "Mudflats"),
            ("Mudflats", "Tidegate"),
            ("Tidegate", "Brinewick"),
            // Sunfields
            ("Goldvale", "Ambercross"),
            ("Goldvale", "Millbrook"),
            ("Ambercross", "Millbrook"),
            ("Millbrook", "Southwatch"),
            // Crossings
            ("Ironpeak", "Brinewick"),
            ("Wolfden", "Goldvale"),
            ("Mudflats", "Millbrook"),
            ("Tidegate", "Southwatch"),
        ],
        &[
            ("Northreach", 2, &["Frostmere", "Greyhollow", "Ironpeak", "Wolfden"]),
            ("Saltmarsh", 3, &["Brinewick", "Reedholm", "Mudflats", "Tidegate"]),
            ("Sunfields", 2, &["Goldvale", "Ambercross", "Millbrook", "Southwatch"]),
        ],
    )
}
