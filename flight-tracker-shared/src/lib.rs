pub mod itinerary {
    use serde::{ser::SerializeTuple, Serialize};
    use std::collections::HashMap;
    use thiserror::Error;

    /// Airport code as sent by the client, e.g. `"SFO"`
    pub type Airport = String;

    /// Itinerary exactly as it comes off the wire, nothing validated yet
    pub type RawItinerary = Vec<Vec<String>>;

    /// Why a single leg was rejected
    #[derive(Debug, Error, Clone, PartialEq, Eq)]
    pub enum LegDefect {
        #[error("has {0} endpoints, expected 2")]
        WrongArity(usize),
        #[error("has a blank airport code")]
        BlankEndpoint,
    }

    #[derive(Debug, Error, Clone, PartialEq, Eq)]
    pub enum ItineraryError {
        #[error("failed to find any flights to track")]
        EmptyItinerary,
        #[error("invalid flight data format: leg {index} {defect}")]
        MalformedLeg { index: usize, defect: LegDefect },
        #[error(
            "failed to find connecting flights: broken flight chain \
             ({sources} candidate sources, {destinations} candidate destinations)"
        )]
        BrokenChain { sources: usize, destinations: usize },
    }

    /// One directed flight segment, origin to destination
    #[derive(Debug, Eq, PartialEq, Hash, Clone, Serialize)]
    #[serde(into = "[Airport; 2]")]
    pub struct Leg {
        origin: Airport,
        destination: Airport,
    }

    impl Leg {
        pub fn new(
            origin: impl Into<Airport>,
            destination: impl Into<Airport>,
        ) -> Result<Leg, LegDefect> {
            let origin = origin.into();
            let destination = destination.into();

            if origin.trim().is_empty() || destination.trim().is_empty() {
                return Err(LegDefect::BlankEndpoint);
            }

            Ok(Leg {
                origin,
                destination,
            })
        }

        pub fn origin(&self) -> &str {
            &self.origin
        }

        pub fn destination(&self) -> &str {
            &self.destination
        }
    }

    impl TryFrom<Vec<String>> for Leg {
        type Error = LegDefect;

        fn try_from(endpoints: Vec<String>) -> Result<Self, Self::Error> {
            let [origin, destination] = <[String; 2]>::try_from(endpoints)
                .map_err(|endpoints| LegDefect::WrongArity(endpoints.len()))?;

            Leg::new(origin, destination)
        }
    }

    impl From<Leg> for [Airport; 2] {
        fn from(leg: Leg) -> Self {
            [leg.origin, leg.destination]
        }
    }

    /// Unordered set of legs making up one trip. Never empty.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Itinerary {
        legs: Vec<Leg>,
    }

    impl Itinerary {
        pub fn new(legs: Vec<Leg>) -> Result<Itinerary, ItineraryError> {
            if legs.is_empty() {
                return Err(ItineraryError::EmptyItinerary);
            }

            Ok(Itinerary { legs })
        }

        pub fn legs(&self) -> &[Leg] {
            &self.legs
        }

        pub fn adjacency(&self) -> AdjacencyMap<'_> {
            AdjacencyMap::from_legs(&self.legs)
        }

        /// Find where the trip starts and where it finally ends.
        ///
        /// Fails with [`ItineraryError::BrokenChain`] unless exactly one airport is never
        /// flown into and exactly one airport is never flown out of.
        pub fn endpoints(&self) -> Result<Endpoints, ItineraryError> {
            self.adjacency().endpoints()
        }
    }

    impl TryFrom<RawItinerary> for Itinerary {
        type Error = ItineraryError;

        fn try_from(raw: RawItinerary) -> Result<Self, Self::Error> {
            if raw.is_empty() {
                return Err(ItineraryError::EmptyItinerary);
            }

            let legs = raw
                .into_iter()
                .enumerate()
                .map(|(index, endpoints)| {
                    Leg::try_from(endpoints)
                        .map_err(|defect| ItineraryError::MalformedLeg { index, defect })
                })
                .collect::<Result<Vec<_>, _>>()?;

            Itinerary::new(legs)
        }
    }

    /// Validate a decoded payload and resolve its endpoints in one go.
    pub fn resolve(raw: RawItinerary) -> Result<Endpoints, ItineraryError> {
        Itinerary::try_from(raw)?.endpoints()
    }

    /// Neighbours of one airport within the chain
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct Hops<'a> {
        pub last_hop: Option<&'a str>,
        pub next_hop: Option<&'a str>,
    }

    /// Per-airport last-hop/next-hop record, borrowed from the legs it was built from
    #[derive(Debug, Default, Clone)]
    pub struct AdjacencyMap<'a> {
        hops: HashMap<&'a str, Hops<'a>>,
    }

    impl<'a> AdjacencyMap<'a> {
        /// Later legs overwrite earlier ones touching the same airport, so duplicate or
        /// conflicting legs never fail here. They show up later as extra candidates.
        pub fn from_legs(legs: &'a [Leg]) -> AdjacencyMap<'a> {
            let mut hops: HashMap<&'a str, Hops<'a>> = HashMap::with_capacity(legs.len() + 1);

            for leg in legs {
                hops.entry(leg.destination()).or_default().last_hop = Some(leg.origin());
                hops.entry(leg.origin()).or_default().next_hop = Some(leg.destination());
            }

            AdjacencyMap { hops }
        }

        pub fn get(&self, airport: &str) -> Option<Hops<'a>> {
            self.hops.get(airport).copied()
        }

        pub fn len(&self) -> usize {
            self.hops.len()
        }

        pub fn is_empty(&self) -> bool {
            self.hops.is_empty()
        }

        /// Airports nothing flies into, sorted
        pub fn candidate_sources(&self) -> Vec<&'a str> {
            self.collect_where(|hops| hops.last_hop.is_none())
        }

        /// Airports nothing flies out of, sorted
        pub fn candidate_destinations(&self) -> Vec<&'a str> {
            self.collect_where(|hops| hops.next_hop.is_none())
        }

        pub fn endpoints(&self) -> Result<Endpoints, ItineraryError> {
            let sources = self.candidate_sources();
            let destinations = self.candidate_destinations();

            match (sources.as_slice(), destinations.as_slice()) {
                ([source], [destination]) => Ok(Endpoints {
                    source: source.to_string(),
                    destination: destination.to_string(),
                }),
                _ => Err(ItineraryError::BrokenChain {
                    sources: sources.len(),
                    destinations: destinations.len(),
                }),
            }
        }

        fn collect_where(&self, pred: impl Fn(&Hops<'a>) -> bool) -> Vec<&'a str> {
            let mut airports: Vec<&'a str> = self
                .hops
                .iter()
                .filter(|(_, hops)| pred(*hops))
                .map(|(airport, _)| *airport)
                .collect();
            airports.sort_unstable();
            airports
        }
    }

    /// Ultimate source and destination of a trip
    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub struct Endpoints {
        pub source: Airport,
        pub destination: Airport,
    }

    impl Serialize for Endpoints {
        // Clients expect a bare ["SRC", "DST"] pair, not an object
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            let mut state = serializer.serialize_tuple(2)?;
            state.serialize_element(&self.source)?;
            state.serialize_element(&self.destination)?;
            state.end()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::itinerary::{
        resolve, AdjacencyMap, Endpoints, Hops, Itinerary, ItineraryError, Leg, LegDefect,
        RawItinerary,
    };
    use proptest::prelude::*;
    use rstest::rstest;

    fn raw(legs: Vec<Vec<&str>>) -> RawItinerary {
        legs.into_iter()
            .map(|leg| leg.into_iter().map(str::to_string).collect())
            .collect()
    }

    fn endpoints(source: &str, destination: &str) -> Endpoints {
        Endpoints {
            source: source.to_string(),
            destination: destination.to_string(),
        }
    }

    #[rstest]
    #[case::no_layovers(vec![vec!["SFO", "EWR"]], "SFO", "EWR")]
    #[case::one_layover(vec![vec!["SFO", "ATL"], vec!["ATL", "EWR"]], "SFO", "EWR")]
    #[case::multiple_layovers(
        vec![vec!["IND", "EWR"], vec!["SFO", "ATL"], vec!["GSO", "IND"], vec!["ATL", "GSO"]],
        "SFO",
        "EWR"
    )]
    #[case::duplicate_leg(vec![vec!["SFO", "EWR"], vec!["SFO", "EWR"]], "SFO", "EWR")]
    fn test_resolve_finds_endpoints(
        #[case] legs: Vec<Vec<&str>>,
        #[case] source: &str,
        #[case] destination: &str,
    ) {
        assert_eq!(resolve(raw(legs)), Ok(endpoints(source, destination)));
    }

    #[test]
    fn test_empty_itinerary() {
        assert_eq!(resolve(vec![]), Err(ItineraryError::EmptyItinerary));
        assert_eq!(Itinerary::new(vec![]), Err(ItineraryError::EmptyItinerary));
    }

    #[rstest]
    #[case::too_many(vec![vec!["IND", "EWR", "NYC"]], 0, LegDefect::WrongArity(3))]
    #[case::too_few(vec![vec!["SFO", "ATL"], vec!["ATL"]], 1, LegDefect::WrongArity(1))]
    #[case::no_endpoints(vec![vec!["SFO", "ATL"], vec![]], 1, LegDefect::WrongArity(0))]
    #[case::blank_origin(vec![vec!["", "ATL"]], 0, LegDefect::BlankEndpoint)]
    #[case::blank_destination(vec![vec!["SFO", "ATL"], vec!["ATL", "  "]], 1, LegDefect::BlankEndpoint)]
    #[case::first_bad_leg_wins(
        vec![vec!["IND", "EWR", "NYC"], vec!["SFO", "ATL"], vec!["GSO", "IND"], vec!["ATL", "GSO"]],
        0,
        LegDefect::WrongArity(3)
    )]
    fn test_malformed_leg(
        #[case] legs: Vec<Vec<&str>>,
        #[case] index: usize,
        #[case] defect: LegDefect,
    ) {
        assert_eq!(
            resolve(raw(legs)),
            Err(ItineraryError::MalformedLeg { index, defect })
        );
    }

    #[rstest]
    #[case::disconnected(
        vec![vec!["IND", "EWR"], vec!["SFO", "ATL"], vec!["GSO", "IND"], vec!["ATL", "NYC"]],
        2,
        2
    )]
    #[case::two_chains(vec![vec!["AAA", "BBB"], vec!["CCC", "DDD"]], 2, 2)]
    #[case::cycle(vec![vec!["AAA", "BBB"], vec!["BBB", "CCC"], vec!["CCC", "AAA"]], 0, 0)]
    #[case::self_loop(vec![vec!["AAA", "AAA"]], 0, 0)]
    // Only the destination side is ambiguous here, still rejected
    #[case::branching(vec![vec!["AAA", "BBB"], vec!["AAA", "CCC"], vec!["BBB", "DDD"]], 1, 2)]
    // Source side is empty while the destination side is fine
    #[case::lollipop(vec![vec!["AAA", "BBB"], vec!["BBB", "AAA"], vec!["BBB", "CCC"]], 0, 1)]
    fn test_broken_chain(
        #[case] legs: Vec<Vec<&str>>,
        #[case] sources: usize,
        #[case] destinations: usize,
    ) {
        assert_eq!(
            resolve(raw(legs)),
            Err(ItineraryError::BrokenChain {
                sources,
                destinations
            })
        );
    }

    #[test]
    fn test_adjacency_map_last_write_wins() {
        let legs = vec![
            Leg::new("AAA", "BBB").unwrap(),
            Leg::new("AAA", "CCC").unwrap(),
        ];
        let map = AdjacencyMap::from_legs(&legs);

        assert_eq!(map.len(), 3);
        assert_eq!(
            map.get("AAA"),
            Some(Hops {
                last_hop: None,
                next_hop: Some("CCC"),
            })
        );
        assert_eq!(map.get("BBB").unwrap().last_hop, Some("AAA"));
        assert_eq!(map.get("ZZZ"), None);
        assert!(AdjacencyMap::from_legs(&[]).is_empty());
        assert_eq!(map.candidate_sources(), vec!["AAA"]);
        assert_eq!(map.candidate_destinations(), vec!["BBB", "CCC"]);
    }

    #[test]
    fn test_layovers_are_not_candidates() {
        let itinerary = Itinerary::try_from(raw(vec![
            vec!["IND", "EWR"],
            vec!["SFO", "ATL"],
            vec!["GSO", "IND"],
            vec!["ATL", "GSO"],
        ]))
        .unwrap();
        let map = itinerary.adjacency();

        assert_eq!(itinerary.legs().len(), 4);
        assert_eq!(itinerary.legs()[1], Leg::new("SFO", "ATL").unwrap());
        assert!(!map.is_empty());
        assert_eq!(map.len(), 5);
        assert_eq!(map.candidate_sources(), vec!["SFO"]);
        assert_eq!(map.candidate_destinations(), vec!["EWR"]);
        assert_eq!(
            map.get("GSO"),
            Some(Hops {
                last_hop: Some("ATL"),
                next_hop: Some("IND"),
            })
        );
    }

    #[test]
    fn test_leg_accessors() {
        let leg = Leg::try_from(vec!["SFO".to_string(), "EWR".to_string()]).unwrap();

        assert_eq!(leg.origin(), "SFO");
        assert_eq!(leg.destination(), "EWR");
        assert_eq!(Leg::new("SFO", ""), Err(LegDefect::BlankEndpoint));
    }

    #[test]
    fn test_serialize_as_pairs() {
        let leg = Leg::new("SFO", "ATL").unwrap();

        assert_eq!(serde_json::to_string(&leg).unwrap(), r#"["SFO","ATL"]"#);
        assert_eq!(
            serde_json::to_string(&endpoints("SFO", "EWR")).unwrap(),
            r#"["SFO","EWR"]"#
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ItineraryError::EmptyItinerary.to_string(),
            "failed to find any flights to track"
        );
        assert_eq!(
            ItineraryError::MalformedLeg {
                index: 0,
                defect: LegDefect::WrongArity(3)
            }
            .to_string(),
            "invalid flight data format: leg 0 has 3 endpoints, expected 2"
        );
        assert!(ItineraryError::BrokenChain {
            sources: 2,
            destinations: 2
        }
        .to_string()
        .starts_with("failed to find connecting flights: broken flight chain"));
    }

    /// Distinct airport codes in travel order, plus the legs between them shuffled
    fn shuffled_chain() -> impl Strategy<Value = (Vec<String>, RawItinerary)> {
        prop::collection::hash_set("[A-Z]{3}", 2..16).prop_flat_map(|codes| {
            let codes: Vec<String> = codes.into_iter().collect();
            let legs: RawItinerary = codes.windows(2).map(|pair| pair.to_vec()).collect();
            (Just(codes), Just(legs).prop_shuffle())
        })
    }

    proptest! {
        #[test]
        fn test_resolve_ignores_leg_order((codes, legs) in shuffled_chain()) {
            let expected = endpoints(&codes[0], &codes[codes.len() - 1]);

            prop_assert_eq!(resolve(legs), Ok(expected));
        }

        #[test]
        fn test_two_disjoint_chains_never_resolve(
            (left, mut legs) in shuffled_chain(),
            suffix in "[0-9]{2}"
        ) {
            // Digits keep the second chain's codes disjoint from the first
            legs.extend(
                left.windows(2)
                    .map(|pair| vec![format!("{}{suffix}", pair[0]), format!("{}{suffix}", pair[1])]),
            );

            prop_assert_eq!(
                resolve(legs),
                Err(ItineraryError::BrokenChain { sources: 2, destinations: 2 })
            );
        }
    }
}
