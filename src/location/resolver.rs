//! City resolver: coordinate → one of the caller's allowed city names.
//!
//! Flow:  reverse geocode (one request) → locality per candidate → alias / exact pass
//!        → containment pass → None
//!
//! First match wins. Candidates are tried in provider rank order and nothing is
//! scored, so the same response always resolves to the same city.

use super::cities::{builtin_tables, CityTables};
use super::geocoder::GeocodingClient;
use super::locality::extract_locality;
use super::normalize::normalize;
use super::types::{Coordinate, GeocodeResult};
use std::fmt;
use tracing::debug;

/// Which rule produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    Alias,
    Exact,
    Containment,
}

impl fmt::Display for MatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alias => write!(f, "alias"),
            Self::Exact => write!(f, "exact"),
            Self::Containment => write!(f, "containment"),
        }
    }
}

/// A resolved allowed city and the evidence that selected it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityMatch {
    pub city: String,
    pub candidate: String,
    pub rule: MatchRule,
}

/// Maps coordinates onto a closed set of supported city names.
#[derive(Clone)]
pub struct CityResolver {
    client: GeocodingClient,
    tables: CityTables,
}

impl CityResolver {
    /// Resolver over the built-in alias and spelling tables.
    pub fn new(client: GeocodingClient) -> Self {
        Self::with_tables(client, builtin_tables().clone())
    }

    pub fn with_tables(client: GeocodingClient, tables: CityTables) -> Self {
        Self { client, tables }
    }

    pub fn client(&self) -> &GeocodingClient {
        &self.client
    }

    pub fn tables(&self) -> &CityTables {
        &self.tables
    }

    /// Resolve `coord` to an entry of `allowed`, or `None` when no rule matches.
    ///
    /// Never returns a name that is not in `allowed`. Provider failure, an empty
    /// response, or a point in the sea are all plain `None`.
    pub async fn reverse_geocode_city<S: AsRef<str>>(
        &self,
        coord: Coordinate,
        allowed: &[S],
    ) -> Option<String> {
        self.reverse_geocode_city_match(coord, allowed)
            .await
            .map(|m| m.city)
    }

    /// Like [`Self::reverse_geocode_city`] but also reports the matching evidence.
    pub async fn reverse_geocode_city_match<S: AsRef<str>>(
        &self,
        coord: Coordinate,
        allowed: &[S],
    ) -> Option<CityMatch> {
        let result = self.client.reverse_geocode_candidates(coord).await?;
        if result.is_empty() {
            debug!(%coord, "no reverse geocode candidates");
            return None;
        }

        let names = candidate_names(&result);
        let matched = match_city(&names, allowed, &self.tables);
        match &matched {
            Some(m) => debug!(%coord, city = %m.city, candidate = %m.candidate, rule = %m.rule, "city resolved"),
            None => debug!(%coord, candidates = ?names, "no allowed city matched"),
        }
        matched
    }
}

/// Localities of every candidate in rank order, deduplicated by comparison key.
pub fn candidate_names(result: &GeocodeResult) -> Vec<String> {
    let mut seen = Vec::new();
    let mut names = Vec::new();
    for name in result.candidates.iter().filter_map(extract_locality) {
        let key = normalize(name);
        if key.trim().is_empty() || seen.contains(&key) {
            continue;
        }
        seen.push(key);
        names.push(name.to_string());
    }
    names
}

/// Match candidate names against `allowed`.
///
/// Pass one, per candidate: alias parent (must appear in `allowed` verbatim), then
/// normalized equality of the raw or canonically spelled name.
/// Pass two, per candidate: substring containment in either direction between an
/// allowed name and the candidate, its canonical spelling, or its alias parent.
pub fn match_city<S: AsRef<str>>(
    names: &[String],
    allowed: &[S],
    tables: &CityTables,
) -> Option<CityMatch> {
    let allowed_keys: Vec<(&str, String)> = allowed
        .iter()
        .map(|a| (a.as_ref(), normalize(a.as_ref())))
        .filter(|(_, key)| !key.is_empty())
        .collect();

    let found = |city: &str, candidate: &str, rule| CityMatch {
        city: city.to_string(),
        candidate: candidate.to_string(),
        rule,
    };

    for name in names {
        if let Some(parent) = tables.alias_parent(name) {
            if let Some((city, _)) = allowed_keys.iter().find(|(city, _)| *city == parent) {
                return Some(found(city, name, MatchRule::Alias));
            }
        }

        let raw = normalize(name);
        let spelled = normalize(&tables.canonical_spelling(name));
        if let Some((city, _)) = allowed_keys
            .iter()
            .find(|(_, key)| *key == raw || *key == spelled)
        {
            return Some(found(city, name, MatchRule::Exact));
        }
    }

    // Short allowed names can match unrelated longer localities here.
    for name in names {
        let mut keys = vec![normalize(name), normalize(&tables.canonical_spelling(name))];
        if let Some(parent) = tables.alias_parent(name) {
            keys.push(normalize(parent));
        }
        keys.retain(|k| !k.is_empty());

        if let Some((city, _)) = allowed_keys.iter().find(|(_, allowed_key)| {
            keys.iter()
                .any(|k| k.contains(allowed_key.as_str()) || allowed_key.contains(k.as_str()))
        }) {
            return Some(found(city, name, MatchRule::Containment));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::cache::ForwardGeocodeCache;
    use crate::location::mock::{locality_candidate, localities, MockProvider};
    use crate::location::types::{AddressComponent, GeocodeCandidate};
    use std::sync::Arc;

    const ALLOWED: [&str; 3] = ["Stockholm", "Göteborg", "Malmö"];
    const SOMEWHERE: Coordinate = Coordinate::new(59.36, 18.0);

    fn resolver(result: GeocodeResult) -> (CityResolver, MockProvider) {
        let mock = MockProvider::default().with_reverse(result);
        let client = GeocodingClient::new(Arc::new(mock.clone()), ForwardGeocodeCache::new());
        (CityResolver::new(client), mock)
    }

    async fn resolve(names: &[&str]) -> Option<String> {
        let (r, _) = resolver(localities(names));
        r.reverse_geocode_city(SOMEWHERE, &ALLOWED).await
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_suburb_alias() {
        assert_eq!(resolve(&["Solna"]).await.as_deref(), Some("Stockholm"));
    }

    #[tokio::test]
    async fn test_case_insensitive_exact() {
        assert_eq!(resolve(&["göteborg"]).await.as_deref(), Some("Göteborg"));
    }

    #[tokio::test]
    async fn test_multi_word_alias() {
        assert_eq!(resolve(&["Hisings Kärra"]).await.as_deref(), Some("Göteborg"));
    }

    #[tokio::test]
    async fn test_ascii_spelling_restored() {
        assert_eq!(resolve(&["Malmo"]).await.as_deref(), Some("Malmö"));
    }

    #[tokio::test]
    async fn test_exonym_via_canonical_spelling() {
        assert_eq!(resolve(&["Gothenburg"]).await.as_deref(), Some("Göteborg"));
    }

    #[tokio::test]
    async fn test_zero_candidates() {
        let (r, mock) = resolver(GeocodeResult::empty());
        assert_eq!(r.reverse_geocode_city(SOMEWHERE, &ALLOWED).await, None);
        assert_eq!(mock.reverse_count(), 1);
    }

    #[tokio::test]
    async fn test_provider_failure_is_none() {
        let client = GeocodingClient::new(Arc::new(MockProvider::failing()), ForwardGeocodeCache::new());
        let r = CityResolver::new(client);
        assert_eq!(r.reverse_geocode_city(SOMEWHERE, &ALLOWED).await, None);
    }

    #[tokio::test]
    async fn test_ocean_point_is_none() {
        // A candidate with only a country/natural feature and no locality tags.
        let result = GeocodeResult {
            candidates: vec![GeocodeCandidate {
                formatted_address: "Kattegat".into(),
                location: None,
                address_components: vec![AddressComponent::new("Kattegat", &["natural_feature"])],
            }],
        };
        let (r, _) = resolver(result);
        assert_eq!(r.reverse_geocode_city(Coordinate::new(56.9, 11.5), &ALLOWED).await, None);
    }

    #[tokio::test]
    async fn test_lower_ranked_result_is_fallback_evidence() {
        assert_eq!(resolve(&["Kiruna", "Malmö"]).await.as_deref(), Some("Malmö"));
    }

    #[tokio::test]
    async fn test_top_result_wins_over_lower_ranked() {
        assert_eq!(resolve(&["Solna", "Göteborg"]).await.as_deref(), Some("Stockholm"));
    }

    #[tokio::test]
    async fn test_never_invents_a_city() {
        assert_eq!(resolve(&["Kiruna", "Abisko"]).await, None);
        let (r, _) = resolver(localities(&["Solna"]));
        assert_eq!(r.reverse_geocode_city(SOMEWHERE, &["Göteborg", "Malmö"]).await, None);
    }

    #[tokio::test]
    async fn test_single_network_call() {
        let (r, mock) = resolver(localities(&["Kiruna", "Abisko", "Solna"]));
        r.reverse_geocode_city(SOMEWHERE, &ALLOWED).await;
        assert_eq!(mock.reverse_count(), 1);
        assert_eq!(mock.forward_count(), 0);
    }

    #[tokio::test]
    async fn test_match_reports_rule() {
        let (r, _) = resolver(localities(&["Limhamn"]));
        let m = r.reverse_geocode_city_match(SOMEWHERE, &ALLOWED).await.unwrap();
        assert_eq!(m.city, "Malmö");
        assert_eq!(m.candidate, "Limhamn");
        assert_eq!(m.rule, MatchRule::Alias);
    }

    #[tokio::test]
    async fn test_accepts_owned_allow_list() {
        let allowed: Vec<String> = ALLOWED.iter().map(|s| s.to_string()).collect();
        let (r, _) = resolver(localities(&["Sundbyberg"]));
        assert_eq!(r.reverse_geocode_city(SOMEWHERE, &allowed).await.as_deref(), Some("Stockholm"));
    }

    #[test]
    fn test_alias_parent_not_allowed_falls_through_to_exact() {
        let tables = CityTables::new([("Lund", "Malmö")], Vec::<(&str, &str)>::new());
        let m = match_city(&names(&["Lund"]), &["Lund", "Malmö"][..], &tables).unwrap();
        assert_eq!(m.city, "Malmö");
        assert_eq!(m.rule, MatchRule::Alias);

        let m = match_city(&names(&["Lund"]), &["Lund"][..], &tables).unwrap();
        assert_eq!(m.city, "Lund");
        assert_eq!(m.rule, MatchRule::Exact);
    }

    #[test]
    fn test_alias_parent_must_be_verbatim() {
        let tables = CityTables::builtin();
        // "stockholm" is not verbatim "Stockholm"; pass two still recovers it.
        let m = match_city(&names(&["Solna"]), &["stockholm"][..], &tables).unwrap();
        assert_eq!(m.city, "stockholm");
        assert_eq!(m.rule, MatchRule::Containment);
    }

    #[test]
    fn test_exact_pass_beats_containment_of_earlier_candidate() {
        let tables = CityTables::builtin();
        let m = match_city(&names(&["Lunds kommun", "Malmö"]), &["Malmö", "Lunds"][..], &tables).unwrap();
        // "Lunds kommun" spells as "Lund", which is not equal to "Lunds".
        assert_eq!(m.city, "Malmö");
        assert_eq!(m.rule, MatchRule::Exact);
    }

    #[test]
    fn test_containment_pass() {
        let tables = CityTables::builtin();
        let m = match_city(&names(&["Stockholms innerstad"]), &ALLOWED[..], &tables).unwrap();
        assert_eq!(m.city, "Stockholm");
        assert_eq!(m.rule, MatchRule::Containment);

        let m = match_city(&names(&["Borås"]), &["Borås stad"][..], &tables).unwrap();
        assert_eq!(m.city, "Borås stad");
    }

    #[test]
    fn test_containment_false_positive_is_kept() {
        // Known trade-off: a short allowed name matches any locality containing it.
        let tables = CityTables::builtin();
        let m = match_city(&names(&["Edsbyn"]), &["Ed"][..], &tables).unwrap();
        assert_eq!(m.city, "Ed");
    }

    #[test]
    fn test_empty_allowed_names_ignored() {
        let tables = CityTables::builtin();
        assert_eq!(match_city(&names(&["Kiruna"]), &["", "Malmö"][..], &tables), None);
    }

    #[test]
    fn test_candidate_names_dedup_and_order() {
        let mut result = localities(&["Solna", "solna", "Stockholm"]);
        result.candidates.push(GeocodeCandidate::default());
        result.candidates.push(locality_candidate("SOLNA"));
        assert_eq!(candidate_names(&result), names(&["Solna", "Stockholm"]));
    }
}
