// Champion registry: id <-> name lookup and lane aptitude weights. The
// embedded data file is authoritative offline; a one-shot CDN refresh may
// extend it with champions released after the build.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::draft::Role;
use crate::error::{AgentError, Result};

const EMBEDDED_DATA: &str = include_str!("../../data/champions.json");

static EMBEDDED_SET: Lazy<Arc<ChampionSet>> = Lazy::new(|| {
    Arc::new(ChampionSet::from_embedded(EMBEDDED_DATA).expect("embedded champion data is valid"))
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaneAptitude {
    pub top: u8,
    pub jungle: u8,
    pub middle: u8,
    pub bottom: u8,
    pub support: u8,
}

impl LaneAptitude {
    pub fn for_role(&self, role: Role) -> u8 {
        match role {
            Role::Top => self.top,
            Role::Jungle => self.jungle,
            Role::Middle => self.middle,
            Role::Bottom => self.bottom,
            Role::Support => self.support,
            Role::Unknown => 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Champion {
    pub id: u32,
    /// URL-safe name, already normalised (e.g. `kaisa`, `leesin`, `wukong`).
    pub canonical_name: String,
    pub display_names: BTreeMap<String, String>,
    pub lane_aptitude: LaneAptitude,
}

impl Champion {
    pub fn display_name(&self) -> &str {
        self.display_names
            .get("en_US")
            .map(String::as_str)
            .unwrap_or(&self.canonical_name)
    }
}

/// One immutable version of the registry. Readers hold an `Arc` snapshot so a
/// concurrent refresh never changes data under them.
#[derive(Debug, Default)]
pub struct ChampionSet {
    by_id: HashMap<u32, Champion>,
}

// Embedded file shape, produced by the data fetch tooling.
#[derive(Deserialize)]
struct EmbeddedFile {
    #[allow(dead_code)]
    version: String,
    champions: Vec<EmbeddedChampion>,
}

#[derive(Deserialize)]
struct EmbeddedChampion {
    id: u32,
    key: String,
    name: String,
    #[serde(default)]
    name_ja: Option<String>,
    lanes: EmbeddedLanes,
}

#[derive(Deserialize)]
struct EmbeddedLanes {
    top: u8,
    jungle: u8,
    middle: u8,
    bottom: u8,
    support: u8,
}

impl ChampionSet {
    fn from_embedded(raw: &str) -> Result<ChampionSet> {
        let file: EmbeddedFile = serde_json::from_str(raw)?;
        let mut by_id = HashMap::with_capacity(file.champions.len());
        for entry in file.champions {
            let mut display_names = BTreeMap::new();
            display_names.insert("en_US".to_string(), entry.name);
            if let Some(ja) = entry.name_ja {
                display_names.insert("ja_JP".to_string(), ja);
            }
            by_id.insert(
                entry.id,
                Champion {
                    id: entry.id,
                    canonical_name: canonical_name_for_key(&entry.key),
                    display_names,
                    lane_aptitude: LaneAptitude {
                        top: entry.lanes.top,
                        jungle: entry.lanes.jungle,
                        middle: entry.lanes.middle,
                        bottom: entry.lanes.bottom,
                        support: entry.lanes.support,
                    },
                },
            );
        }
        Ok(ChampionSet { by_id })
    }

    pub fn champion(&self, id: u32) -> Option<&Champion> {
        self.by_id.get(&id)
    }

    pub fn canonical_name(&self, id: u32) -> Option<&str> {
        self.by_id.get(&id).map(|c| c.canonical_name.as_str())
    }

    pub fn aptitude(&self, id: u32) -> Option<LaneAptitude> {
        self.by_id.get(&id).map(|c| c.lane_aptitude)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Shared registry handle. Lookups go through `snapshot()`; the refresh
/// replaces the whole set atomically.
pub struct ChampionRegistry {
    current: RwLock<Arc<ChampionSet>>,
}

impl ChampionRegistry {
    /// Registry seeded from the embedded data file.
    pub fn embedded() -> Self {
        ChampionRegistry {
            current: RwLock::new(Arc::clone(&EMBEDDED_SET)),
        }
    }

    pub fn snapshot(&self) -> Arc<ChampionSet> {
        self.current.read().expect("registry lock poisoned").clone()
    }

    /// Fetch the newest champion list from the vendor CDN and merge it in.
    /// Champions already present keep their curated lane weights; new ones get
    /// weights derived from their CDN tags. On any failure the current set
    /// stays authoritative.
    pub async fn refresh_from_cdn(&self, cdn_base_url: &str) -> Result<usize> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;

        let versions: Vec<String> = client
            .get(format!("{}/api/versions.json", cdn_base_url))
            .send()
            .await?
            .error_for_status()
            .map_err(|e| AgentError::Transport(e.to_string()))?
            .json()
            .await?;
        let latest = versions
            .first()
            .ok_or_else(|| AgentError::Decode("empty version list from CDN".into()))?;
        debug!(version = %latest, "refreshing champion data");

        let payload: CdnChampionFile = client
            .get(format!(
                "{}/cdn/{}/data/en_US/champion.json",
                cdn_base_url, latest
            ))
            .send()
            .await?
            .error_for_status()
            .map_err(|e| AgentError::Transport(e.to_string()))?
            .json()
            .await?;

        let base = self.snapshot();
        let mut by_id: HashMap<u32, Champion> =
            base.by_id.iter().map(|(k, v)| (*k, v.clone())).collect();
        let mut added = 0usize;

        for (key, entry) in payload.data {
            let id: u32 = match entry.key.parse() {
                Ok(id) => id,
                Err(_) => {
                    warn!(champion = %key, "skipping CDN entry with non-numeric key");
                    continue;
                }
            };
            match by_id.get_mut(&id) {
                Some(existing) => {
                    // Curated aptitudes win; the CDN only freshens names.
                    existing
                        .display_names
                        .insert("en_US".to_string(), entry.name);
                }
                None => {
                    let mut display_names = BTreeMap::new();
                    display_names.insert("en_US".to_string(), entry.name);
                    by_id.insert(
                        id,
                        Champion {
                            id,
                            canonical_name: canonical_name_for_key(&key),
                            display_names,
                            lane_aptitude: aptitude_from_tags(&entry.tags),
                        },
                    );
                    added += 1;
                }
            }
        }

        let next = Arc::new(ChampionSet { by_id });
        info!(total = next.len(), added, "champion registry refreshed");
        *self.current.write().expect("registry lock poisoned") = next;
        Ok(added)
    }
}

#[derive(Deserialize)]
struct CdnChampionFile {
    data: HashMap<String, CdnChampion>,
}

#[derive(Deserialize)]
struct CdnChampion {
    key: String,
    name: String,
    #[serde(default)]
    tags: Vec<String>,
}

/// Lowercase with apostrophes, spaces, and periods stripped. Idempotent.
pub fn normalise_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '\'' | '\u{2019}' | ' ' | '.'))
        .flat_map(char::to_lowercase)
        .collect()
}

fn canonical_name_for_key(key: &str) -> String {
    // The one internal id whose normalisation does not match the public name.
    if key == "MonkeyKing" {
        return "wukong".to_string();
    }
    normalise_name(key)
}

fn aptitude_from_tags(tags: &[String]) -> LaneAptitude {
    let mut lanes = LaneAptitude::default();
    for (index, tag) in tags.iter().enumerate() {
        // The first tag is the primary class; weigh it heavier.
        let weight: u8 = if index == 0 { 6 } else { 3 };
        match tag.as_str() {
            "Marksman" => lanes.bottom = bump(lanes.bottom, weight + 2),
            "Support" => lanes.support = bump(lanes.support, weight + 2),
            "Mage" => {
                lanes.middle = bump(lanes.middle, weight);
                lanes.support = bump(lanes.support, 2);
            }
            "Assassin" => {
                lanes.middle = bump(lanes.middle, weight);
                lanes.jungle = bump(lanes.jungle, 2);
            }
            "Fighter" => {
                lanes.top = bump(lanes.top, weight);
                lanes.jungle = bump(lanes.jungle, 3);
            }
            "Tank" => {
                lanes.top = bump(lanes.top, weight.saturating_sub(2));
                lanes.jungle = bump(lanes.jungle, 2);
                lanes.support = bump(lanes.support, 3);
            }
            _ => {}
        }
    }
    lanes
}

fn bump(current: u8, by: u8) -> u8 {
    current.saturating_add(by).min(10)
}
