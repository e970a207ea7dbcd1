//! Supported cities, their spelling variants, and suburb aliases.

use super::normalize::normalize;
use super::types::Coordinate;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::OnceLock;

// ─── Built-in dataset ───────────────────────────────────────────

struct SupportedCity {
    name: &'static str,
    /// Spellings a provider may return instead of `name` (ASCII, exonyms).
    spellings: &'static [&'static str],
    /// Suburbs and neighbouring municipalities that count as this city.
    aliases: &'static [&'static str],
    lat: f64,
    lng: f64,
}

const SUPPORTED_CITIES: &[SupportedCity] = &[
    SupportedCity {
        name: "Stockholm",
        spellings: &["stockholm", "stokholm", "stockholms stad"],
        aliases: &[
            "Solna", "Sundbyberg", "Nacka", "Lidingö", "Danderyd", "Täby",
            "Huddinge", "Järfälla", "Sollentuna", "Bromma", "Kista", "Hägersten",
            "Skärholmen", "Farsta", "Vällingby", "Spånga", "Enskede", "Älvsjö",
            "Södermalm", "Kungsholmen", "Östermalm", "Vasastan", "Norrmalm",
            "Gamla stan", "Hammarby sjöstad", "Saltsjöbaden", "Tyresö", "Haninge",
        ],
        lat: 59.3293, lng: 18.0686,
    },
    SupportedCity {
        name: "Göteborg",
        spellings: &["goteborg", "gothenburg", "goeteborg", "gotheborg", "göteborgs stad"],
        aliases: &[
            "Mölndal", "Partille", "Hisings Kärra", "Hisings Backa", "Torslanda",
            "Västra Frölunda", "Angered", "Askim", "Majorna", "Lindholmen",
            "Kortedala", "Biskopsgården", "Bergsjön", "Styrsö", "Säve",
            "Hovås", "Billdal", "Olofstorp", "Gunnilse",
        ],
        lat: 57.7089, lng: 11.9746,
    },
    SupportedCity {
        name: "Malmö",
        spellings: &["malmo", "malmoe", "malmö stad"],
        aliases: &[
            "Limhamn", "Bunkeflostrand", "Oxie", "Husie", "Fosie", "Rosengård",
            "Hyllie", "Arlöv", "Burlöv", "Åkarp", "Klagshamn", "Tygelsjö",
            "Västra hamnen",
        ],
        lat: 55.6050, lng: 13.0038,
    },
    SupportedCity {
        name: "Uppsala",
        spellings: &["upsala"],
        aliases: &["Gottsunda", "Sävja", "Storvreta"],
        lat: 59.8586, lng: 17.6389,
    },
    SupportedCity {
        name: "Västerås",
        spellings: &["vasteras", "westeras"],
        aliases: &["Skultuna", "Hökåsen"],
        lat: 59.6099, lng: 16.5448,
    },
    SupportedCity {
        name: "Örebro",
        spellings: &["orebro", "oerebro"],
        aliases: &["Adolfsberg", "Vivalla"],
        lat: 59.2753, lng: 15.2134,
    },
    SupportedCity {
        name: "Linköping",
        spellings: &["linkoping", "linkoeping"],
        aliases: &["Ryd", "Lambohov", "Malmslätt"],
        lat: 58.4108, lng: 15.6214,
    },
    SupportedCity {
        name: "Helsingborg",
        spellings: &["halsingborg", "hälsingborg"],
        aliases: &["Råå", "Påarp", "Ödåkra"],
        lat: 56.0465, lng: 12.6945,
    },
    SupportedCity {
        name: "Jönköping",
        spellings: &["jonkoping", "joenkoeping"],
        aliases: &["Huskvarna", "Bankeryd", "Norrahammar"],
        lat: 57.7826, lng: 14.1618,
    },
    SupportedCity {
        name: "Norrköping",
        spellings: &["norrkoping", "norrkoeping"],
        aliases: &["Åby", "Kolmården"],
        lat: 58.5877, lng: 16.1924,
    },
    SupportedCity {
        name: "Lund",
        spellings: &["lunds kommun"],
        aliases: &["Södra Sandby", "Dalby", "Stångby"],
        lat: 55.7047, lng: 13.1910,
    },
    SupportedCity {
        name: "Umeå",
        spellings: &["umea", "umeaa"],
        aliases: &["Holmsund", "Teg"],
        lat: 63.8258, lng: 20.2630,
    },
    SupportedCity {
        name: "Gävle",
        spellings: &["gavle", "gaevle"],
        aliases: &["Valbo", "Forsbacka"],
        lat: 60.6749, lng: 17.1413,
    },
    SupportedCity {
        name: "Luleå",
        spellings: &["lulea", "luleaa"],
        aliases: &["Gammelstad", "Bergnäset"],
        lat: 65.5848, lng: 22.1547,
    },
];

/// A city entry for the public city list API.
#[derive(Debug, Clone, Serialize)]
pub struct CityInfo {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

/// Return the canonical names of every built-in supported city, in dataset order.
pub fn supported_city_names() -> Vec<String> {
    SUPPORTED_CITIES.iter().map(|c| c.name.to_string()).collect()
}

/// Return the full built-in city list (for autocomplete / API).
pub fn supported_city_list() -> Vec<CityInfo> {
    SUPPORTED_CITIES
        .iter()
        .map(|c| CityInfo {
            name: c.name.to_string(),
            lat: c.lat,
            lng: c.lng,
        })
        .collect()
}

/// Center coordinate of a supported city, matched by comparison key.
pub fn city_center(name: &str) -> Option<Coordinate> {
    let key = normalize(name);
    SUPPORTED_CITIES
        .iter()
        .find(|c| normalize(c.name) == key)
        .map(|c| Coordinate::new(c.lat, c.lng))
}

// ─── Lookup tables ──────────────────────────────────────────────

/// Alias and spelling tables keyed by normalized name.
#[derive(Debug, Clone, Default)]
pub struct CityTables {
    aliases: HashMap<String, String>,
    spellings: HashMap<String, String>,
}

impl CityTables {
    /// Build tables from raw `(variant, canonical)` pairs. Keys are normalized here,
    /// so callers may pass display spellings.
    pub fn new<'a, A, S>(aliases: A, spellings: S) -> Self
    where
        A: IntoIterator<Item = (&'a str, &'a str)>,
        S: IntoIterator<Item = (&'a str, &'a str)>,
    {
        Self {
            aliases: normalized_keys(aliases),
            spellings: normalized_keys(spellings),
        }
    }

    /// Tables derived from the built-in supported-city dataset.
    pub fn builtin() -> Self {
        let aliases = SUPPORTED_CITIES
            .iter()
            .flat_map(|c| c.aliases.iter().map(move |a| (*a, c.name)));
        // Every canonical name maps to itself so diacritic-less input is restored.
        let spellings = SUPPORTED_CITIES.iter().flat_map(|c| {
            std::iter::once((c.name, c.name)).chain(c.spellings.iter().map(move |s| (*s, c.name)))
        });
        Self::new(aliases, spellings)
    }

    /// Parent city for a suburb or municipality name.
    pub fn alias_parent(&self, name: &str) -> Option<&str> {
        self.aliases.get(&normalize(name)).map(String::as_str)
    }

    /// Canonical display spelling, or the input unchanged when unknown.
    pub fn canonical_spelling(&self, name: &str) -> String {
        match self.spellings.get(&normalize(name)) {
            Some(canonical) => canonical.clone(),
            None => name.to_string(),
        }
    }
}

fn normalized_keys<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> HashMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (normalize(k), v.to_string()))
        .collect()
}

static BUILTIN_TABLES: OnceLock<CityTables> = OnceLock::new();

/// Process-wide built-in tables, built on first use.
pub fn builtin_tables() -> &'static CityTables {
    BUILTIN_TABLES.get_or_init(CityTables::builtin)
}

/// Canonical display spelling against the built-in tables.
pub fn canonical_spelling(name: &str) -> String {
    builtin_tables().canonical_spelling(name)
}
