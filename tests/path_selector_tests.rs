//! Route enumeration and selection tests

use rail_sim::map_file::parse_network_map;
use rail_sim::simulation::{
    best_combination, detour_acceptable, enumerate_all_paths, interior_disjoint,
    k_shortest_paths, rank_heads, Occupancy, PathSelector, RailNetwork, SearchBudgetExceeded,
    SearchStrategy, Selection, SimConfig, StationId, Train, TrainId, TrainState,
};

const DIAMOND: &str = "stations:\na,0,1\nb,1,0\nc,1,2\nd,2,1\nconnections:\na-b\nb-d\na-c\nc-d\n";
const CHAIN: &str = "stations:\na,0,0\nb,1,0\nc,2,0\nd,3,0\nconnections:\na-b\nb-c\nc-d\n";
const LADDER: &str = "\
stations:
s,0,1
a1,1,0
a2,2,0
b1,1,2
b2,2,2
t,3,1
connections:
s-a1
a1-a2
a2-t
s-b1
b1-b2
b2-t
a1-b1
a2-b2
";

fn network(text: &str) -> RailNetwork {
    parse_network_map(text).unwrap()
}

fn ids(network: &RailNetwork, names: &[&str]) -> Vec<StationId> {
    names
        .iter()
        .map(|name| network.station_id(name).unwrap())
        .collect()
}

fn names(network: &RailNetwork, path: &[StationId]) -> Vec<String> {
    path.iter().map(|&s| network.name(s).to_string()).collect()
}

#[test]
fn test_enumeration_follows_connection_order() {
    let network = network(DIAMOND);
    let [a, d] = [network.station_id("a").unwrap(), network.station_id("d").unwrap()];
    let paths = enumerate_all_paths(&network, a, d, |_| false, 100).unwrap();
    assert_eq!(paths, vec![ids(&network, &["a", "b", "d"]), ids(&network, &["a", "c", "d"])]);
}

#[test]
fn test_enumeration_skips_excluded_stations() {
    let network = network(DIAMOND);
    let a = network.station_id("a").unwrap();
    let b = network.station_id("b").unwrap();
    let d = network.station_id("d").unwrap();
    let paths = enumerate_all_paths(&network, a, d, |s| s == b, 100).unwrap();
    assert_eq!(paths, vec![ids(&network, &["a", "c", "d"])]);
}

#[test]
fn test_enumeration_finds_every_simple_path() {
    let network = network(LADDER);
    let s = network.station_id("s").unwrap();
    let t = network.station_id("t").unwrap();
    let paths = enumerate_all_paths(&network, s, t, |_| false, 1_000).unwrap();

    assert_eq!(paths.len(), 8);
    for path in &paths {
        let mut seen = path.clone();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), path.len(), "path revisits a station");
        assert!(path.windows(2).all(|hop| network.are_adjacent(hop[0], hop[1])));
    }
    assert_eq!(names(&network, &paths[0]), vec!["s", "a1", "a2", "t"]);
}

#[test]
fn test_enumeration_budget() {
    let network = network(LADDER);
    let s = network.station_id("s").unwrap();
    let t = network.station_id("t").unwrap();
    let err = enumerate_all_paths(&network, s, t, |_| false, 3).unwrap_err();
    assert_eq!(err, SearchBudgetExceeded { budget: 3 });
}

#[test]
fn test_k_shortest_orders_by_length() {
    let network = network(LADDER);
    let s = network.station_id("s").unwrap();
    let t = network.station_id("t").unwrap();

    let paths = k_shortest_paths(&network, s, t, |_| false, 10);
    assert_eq!(paths.len(), 8);
    assert!(paths.windows(2).all(|pair| pair[0].len() <= pair[1].len()));
    assert_eq!(names(&network, &paths[0]), vec!["s", "a1", "a2", "t"]);
    assert_eq!(names(&network, &paths[1]), vec!["s", "b1", "b2", "t"]);
    for (index, path) in paths.iter().enumerate() {
        assert!(!paths[..index].contains(path), "duplicate path");
        assert!(path.windows(2).all(|hop| network.are_adjacent(hop[0], hop[1])));
    }

    let two = k_shortest_paths(&network, s, t, |_| false, 2);
    assert_eq!(two, paths[..2].to_vec());
    assert!(k_shortest_paths(&network, s, t, |_| false, 0).is_empty());
}

#[test]
fn test_k_shortest_skips_excluded_stations() {
    let network = network(LADDER);
    let s = network.station_id("s").unwrap();
    let t = network.station_id("t").unwrap();
    let a2 = network.station_id("a2").unwrap();

    let paths = k_shortest_paths(&network, s, t, |station| station == a2, 10);
    assert_eq!(
        paths,
        vec![
            ids(&network, &["s", "b1", "b2", "t"]),
            ids(&network, &["s", "a1", "b1", "b2", "t"]),
        ]
    );
    assert!(k_shortest_paths(&network, s, t, |station| station == t, 3).is_empty());
}

#[test]
fn test_interior_disjoint() {
    let network = network(LADDER);
    let upper = ids(&network, &["s", "a1", "a2", "t"]);
    let lower = ids(&network, &["s", "b1", "b2", "t"]);
    let cross = ids(&network, &["s", "a1", "b1", "b2", "t"]);
    let direct = ids(&network, &["s", "t"]);

    assert!(interior_disjoint(&upper, &lower));
    assert!(!interior_disjoint(&upper, &cross));
    assert!(!interior_disjoint(&cross, &lower));
    assert!(interior_disjoint(&direct, &cross));
}

#[test]
fn test_best_combination_prefers_size_then_length() {
    let network = network(LADDER);
    let cross = ids(&network, &["s", "a1", "b1", "b2", "t"]);
    let upper = ids(&network, &["s", "a1", "a2", "t"]);
    let lower = ids(&network, &["s", "b1", "b2", "t"]);
    let paths = vec![cross, upper, lower];

    // {cross} alone, or {upper, lower}
    assert_eq!(best_combination(&paths, 1_000).unwrap(), vec![1, 2]);
    assert!(best_combination(&[], 1_000).unwrap().is_empty());
}

#[test]
fn test_best_combination_tie_goes_to_shorter_total() {
    let path = |stations: &[usize]| stations.iter().map(|&s| StationId(s)).collect::<Vec<_>>();
    let paths = vec![path(&[0, 1, 2, 9]), path(&[0, 3, 9]), path(&[0, 1, 9])];

    // Seeds 0 and 1 both reach {0, 1} with total 7; seed 2 reaches {2, 1} with total 6
    assert_eq!(best_combination(&paths, 1_000).unwrap(), vec![2, 1]);
}

#[test]
fn test_best_combination_budget() {
    let network = network(LADDER);
    let s = network.station_id("s").unwrap();
    let t = network.station_id("t").unwrap();
    let paths = enumerate_all_paths(&network, s, t, |_| false, 1_000).unwrap();

    // 8 seeds, 7 comparisons each, at least two interior stations per route
    let err = best_combination(&paths, 50).unwrap_err();
    assert_eq!(err, SearchBudgetExceeded { budget: 50 });
    assert!(best_combination(&paths, 10_000).is_ok());
}

#[test]
fn test_rank_heads_with_blocked_first_hop() {
    let network = network(DIAMOND);
    let [a, b, d] = [
        network.station_id("a").unwrap(),
        network.station_id("b").unwrap(),
        network.station_id("d").unwrap(),
    ];
    let trains = vec![Train::at(TrainId(0), b, TrainState::InTransit, [a])];
    let occupancy = Occupancy::build(network.station_count(), a, d, &trains);

    let via_b = ids(&network, &["a", "b", "d"]);
    let via_c = ids(&network, &["a", "c", "d"]);
    let family = vec![via_b.as_slice(), via_c.as_slice()];
    let ranking = rank_heads(&family, &occupancy);

    assert_eq!(ranking.shortest, Some(via_c.as_slice()));
    assert_eq!(ranking.alternative, Some(via_b.as_slice()));
    assert_eq!(ranking.shortest_len, 3);
}

#[test]
fn test_rank_heads_all_free_uses_runner_up() {
    let network = network(DIAMOND);
    let a = network.station_id("a").unwrap();
    let d = network.station_id("d").unwrap();
    let occupancy = Occupancy::build(network.station_count(), a, d, &[]);

    let via_b = ids(&network, &["a", "b", "d"]);
    let via_c = ids(&network, &["a", "c", "d"]);
    let family = vec![via_b.as_slice(), via_c.as_slice()];
    let ranking = rank_heads(&family, &occupancy);

    assert_eq!(ranking.shortest, Some(via_b.as_slice()));
    assert_eq!(ranking.alternative, Some(via_c.as_slice()));
}

#[test]
fn test_detour_threshold() {
    // Last of three trains: no queue left behind it
    assert!(detour_acceptable(3, 3, 4, 4));
    assert!(!detour_acceptable(3, 3, 4, 5));
    // First of three trains can absorb two extra hops
    assert!(detour_acceptable(3, 1, 4, 6));
    assert!(!detour_acceptable(3, 1, 4, 7));
}

#[test]
fn test_select_takes_free_route() {
    let network = network(DIAMOND);
    let a = network.station_id("a").unwrap();
    let b = network.station_id("b").unwrap();
    let d = network.station_id("d").unwrap();
    let trains = vec![
        Train::at(TrainId(0), b, TrainState::InTransit, [a]),
        Train::new(TrainId(1), a),
    ];
    let occupancy = Occupancy::build(network.station_count(), a, d, &trains);
    let selector = PathSelector::new(SimConfig::default());

    let selection = selector.select(&network, &trains[1], d, &occupancy, 2).unwrap();
    assert_eq!(selection, Selection::Shortest(ids(&network, &["a", "c", "d"])));
    assert_eq!(selection.next_hop(), network.station_id("c"));
}

#[test]
fn test_select_proposes_blocked_route_as_alternative() {
    let network = network(CHAIN);
    let a = network.station_id("a").unwrap();
    let b = network.station_id("b").unwrap();
    let d = network.station_id("d").unwrap();
    let trains = vec![
        Train::at(TrainId(0), b, TrainState::InTransit, [a]),
        Train::new(TrainId(1), a),
    ];
    let occupancy = Occupancy::build(network.station_count(), a, d, &trains);
    let selector = PathSelector::new(SimConfig::default());

    let selection = selector.select(&network, &trains[1], d, &occupancy, 2).unwrap();
    assert_eq!(
        selection,
        Selection::Alternative(ids(&network, &["a", "b", "c", "d"]))
    );
    assert!(!occupancy.hop_free(a, b));
}

#[test]
fn test_select_history_blocks_return() {
    let network = network(CHAIN);
    let a = network.station_id("a").unwrap();
    let b = network.station_id("b").unwrap();
    let c = network.station_id("c").unwrap();
    let d = network.station_id("d").unwrap();
    // Wandered to b with c already in its history
    let train = Train::at(TrainId(0), b, TrainState::InTransit, [a, c]);
    let occupancy = Occupancy::build(network.station_count(), a, d, std::slice::from_ref(&train));

    let strict = PathSelector::new(SimConfig::default());
    assert_eq!(
        strict.select(&network, &train, d, &occupancy, 1).unwrap(),
        Selection::NoMove
    );

    let relaxed = PathSelector::new(SimConfig {
        use_history: false,
        ..SimConfig::default()
    });
    assert_eq!(
        relaxed.select(&network, &train, d, &occupancy, 1).unwrap(),
        Selection::Shortest(ids(&network, &["b", "c", "d"]))
    );
}

#[test]
fn test_select_with_k_shortest_strategy() {
    let network = network(LADDER);
    let s = network.station_id("s").unwrap();
    let t = network.station_id("t").unwrap();
    let train = Train::new(TrainId(0), s);
    let occupancy = Occupancy::build(network.station_count(), s, t, std::slice::from_ref(&train));

    let selector = PathSelector::new(SimConfig {
        search: SearchStrategy::KShortest { k: 4 },
        ..SimConfig::default()
    });
    let candidates = selector.candidates(&network, &train, t).unwrap();
    assert_eq!(candidates.len(), 4);

    let selection = selector.select(&network, &train, t, &occupancy, 1).unwrap();
    assert_eq!(selection, Selection::Shortest(ids(&network, &["s", "a1", "a2", "t"])));
}

#[test]
fn test_occupancy_ignores_endpoints_and_tracks_commits() {
    let network = network(CHAIN);
    let [a, b, c, d] = [
        network.station_id("a").unwrap(),
        network.station_id("b").unwrap(),
        network.station_id("c").unwrap(),
        network.station_id("d").unwrap(),
    ];
    let trains = vec![
        Train::new(TrainId(0), a),
        Train::new(TrainId(1), a),
        Train::at(TrainId(2), b, TrainState::InTransit, [a]),
    ];
    let mut occupancy = Occupancy::build(network.station_count(), a, d, &trains);

    assert!(occupancy.station_free(a));
    assert!(!occupancy.station_free(b));
    assert_eq!(occupancy.occupied_stations().collect::<Vec<_>>(), vec![b]);

    occupancy.commit(b, c);
    assert!(occupancy.station_free(b));
    assert!(!occupancy.station_free(c));
    assert!(!occupancy.segment_free(b, c));
    assert!(!occupancy.segment_free(c, b));

    occupancy.commit(c, d);
    assert!(occupancy.station_free(d));
    assert_eq!(occupancy.used_segment_count(), 2);
}
