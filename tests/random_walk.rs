use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use walklets::{
    generate_biased_walks, generate_walks, walk_skips, AdjacencyGraph, FirstOrderWalker, GraphRef,
    SecondOrderWalker, TransitionTables, WalkConfig, WalkGenerator,
};

fn small_graph() -> AdjacencyGraph {
    // 0--1--2
    //    \  |
    //     \ |
    //       3
    AdjacencyGraph::from_edges([(0, 1), (1, 2), (1, 3), (2, 3)]).unwrap()
}

fn assert_walks_sane(walks: &[Vec<usize>], n: usize, max_len: usize) {
    for w in walks {
        assert!(!w.is_empty(), "walk should never be empty");
        assert!(w.len() <= max_len, "walk length exceeded config");
        for &v in w {
            assert!(v < n, "walk node index out of range: {v} >= {n}");
        }
    }
}

fn assert_walks_follow_edges(g: &AdjacencyGraph, walks: &[Vec<usize>]) {
    for w in walks {
        for win in w.windows(2) {
            let (u, v) = (win[0], win[1]);
            assert!(g.has_edge(u, v), "walk step {u} -> {v} is not an edge");
        }
    }
}

#[test]
fn first_order_follows_edges() {
    let g = small_graph();
    let cfg = WalkConfig { walk_length: 8, walk_number: 3, seed: 42 };
    let walks = generate_walks(&g, cfg).unwrap();
    assert_eq!(walks.len(), 12);
    assert_walks_sane(&walks, g.node_count(), cfg.walk_length);
    assert_walks_follow_edges(&g, &walks);
}

#[test]
fn second_order_follows_edges() {
    let g = small_graph();
    let t = TransitionTables::new(&g, 0.5, 2.0).unwrap();
    let cfg = WalkConfig { walk_length: 8, walk_number: 3, seed: 42 };
    let walks = generate_biased_walks(&g, &t, cfg).unwrap();
    assert_eq!(walks.len(), 12);
    assert_walks_sane(&walks, g.node_count(), cfg.walk_length);
    assert_walks_follow_edges(&g, &walks);
}

#[test]
fn reproducible_given_seed() {
    let g = small_graph();
    let t = TransitionTables::new(&g, 0.5, 2.0).unwrap();
    let cfg = WalkConfig { walk_length: 6, walk_number: 2, seed: 123 };

    assert_eq!(generate_walks(&g, cfg).unwrap(), generate_walks(&g, cfg).unwrap());
    let w1 = generate_biased_walks(&g, &t, cfg).unwrap();
    let w2 = generate_biased_walks(&g, &t, cfg).unwrap();
    assert_eq!(w1, w2, "same seed should yield identical walks");
}

#[test]
fn injected_rng_drives_the_walkers() {
    let g = small_graph();
    let t = TransitionTables::new(&g, 1.0, 1.0).unwrap();
    let cfg = WalkConfig { walk_length: 6, walk_number: 2, seed: 0 };

    let mut a = ChaCha8Rng::seed_from_u64(77);
    let mut b = ChaCha8Rng::seed_from_u64(77);
    let walker = SecondOrderWalker::new(&g, &t).unwrap();
    assert_eq!(
        walker.generate_all(cfg, &mut a).unwrap(),
        walker.generate_all(cfg, &mut b).unwrap()
    );

    let mut c = ChaCha8Rng::seed_from_u64(77);
    let first = FirstOrderWalker::new(&g).generate_all(cfg, &mut c).unwrap();
    assert_walks_follow_edges(&g, &first);
}

#[test]
fn isolated_node_walks_have_length_1() {
    let g = AdjacencyGraph::with_node_count(1, []).unwrap();
    let t = TransitionTables::new(&g, 0.5, 2.0).unwrap();
    let cfg = WalkConfig { walk_length: 10, walk_number: 3, seed: 7 };

    let u = generate_walks(&g, cfg).unwrap();
    assert_eq!(u.len(), 3);
    assert!(u.iter().all(|w| w.as_slice() == [0]));

    let b = generate_biased_walks(&g, &t, cfg).unwrap();
    assert_eq!(b.len(), 3);
    assert!(b.iter().all(|w| w.as_slice() == [0]));
}

#[test]
fn unit_bias_on_regular_graph_is_first_order() {
    // A 6-cycle with chords making it 3-regular; with p = q = 1 every edge distribution
    // must be uniform, i.e. the biased walk reduces to a uniform walk.
    let g = AdjacencyGraph::from_edges([
        (0, 1),
        (1, 2),
        (2, 3),
        (3, 4),
        (4, 5),
        (5, 0),
        (0, 3),
        (1, 4),
        (2, 5),
    ]).unwrap();
    let t = TransitionTables::new(&g, 1.0, 1.0).unwrap();
    for cur in 0..g.node_count() {
        for &prev in g.neighbors_ref(cur) {
            let d = t.edge_distribution(prev, cur).unwrap();
            for x in d {
                assert!((x - 1.0 / 3.0).abs() < 1e-12, "non-uniform step {prev}->{cur}");
            }
        }
    }
}

#[test]
fn backtrack_frequency_tracks_return_parameter() {
    // On a 4-cycle, cur has neighbors {prev, other}; both are non-common with prev except
    // prev itself. P(return) = (1/p) / (1/p + 1/q).
    let g = AdjacencyGraph::from_edges([(0, 1), (1, 2), (2, 3), (3, 0)]).unwrap();
    let t = TransitionTables::new(&g, 0.25, 1.0).unwrap();
    let cfg = WalkConfig { walk_length: 40, walk_number: 50, seed: 3 };
    let walks = generate_biased_walks(&g, &t, cfg).unwrap();

    let (mut back, mut total) = (0usize, 0usize);
    for w in &walks {
        for i in 2..w.len() {
            total += 1;
            if w[i] == w[i - 2] {
                back += 1;
            }
        }
    }
    let rate = back as f64 / total as f64;
    assert!((rate - 0.8).abs() < 0.03, "backtrack rate {rate:.3}, expected ~0.8");
}

proptest! {
    // Property: all emitted steps are in-range and follow edges.
    #[test]
    fn prop_walks_follow_edges_and_are_in_range(
        n in 1usize..8,
        edges in prop::collection::vec((0usize..8, 0usize..8), 0..16),
        p in 0.1f64..4.0,
        q in 0.1f64..4.0,
        seed in any::<u64>(),
    ) {
        let edges: Vec<(usize, usize)> = edges.into_iter().map(|(a, b)| (a % n, b % n)).collect();
        let g = AdjacencyGraph::with_node_count(n, edges).unwrap();
        let cfg = WalkConfig { walk_length: 10, walk_number: 2, seed };

        let u = generate_walks(&g, cfg).unwrap();
        prop_assert_eq!(u.len(), n * 2);
        assert_walks_sane(&u, n, cfg.walk_length);
        assert_walks_follow_edges(&g, &u);

        let t = TransitionTables::new(&g, p, q).unwrap();
        let b = generate_biased_walks(&g, &t, cfg).unwrap();
        prop_assert_eq!(b.len(), n * 2);
        assert_walks_sane(&b, n, cfg.walk_length);
        assert_walks_follow_edges(&g, &b);

        // A walk only stops short at a node without neighbors.
        for w in u.iter().chain(b.iter()) {
            if w.len() < cfg.walk_length {
                prop_assert!(g.neighbors_ref(*w.last().unwrap()).is_empty());
            }
        }
    }

    #[test]
    fn prop_distributions_sum_to_one(
        edges in prop::collection::vec((0usize..10, 0usize..10), 1..30),
        p in 0.05f64..10.0,
        q in 0.05f64..10.0,
    ) {
        let g = AdjacencyGraph::from_edges(edges).unwrap();
        let t = TransitionTables::new(&g, p, q).unwrap();
        for cur in 0..g.node_count() {
            if g.neighbors_ref(cur).is_empty() {
                prop_assert!(t.node_table(cur).is_none());
                continue;
            }
            let s: f64 = t.node_distribution(cur).unwrap().iter().sum();
            prop_assert!((s - 1.0).abs() < 1e-9);
            for &prev in g.neighbors_ref(cur) {
                let s: f64 = t.edge_distribution(prev, cur).unwrap().iter().sum();
                prop_assert!((s - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn prop_skips_interleave_back_to_walk(
        walk in prop::collection::vec(0usize..100, 0..40),
        k in 1usize..8,
    ) {
        let parts = walk_skips(&walk, k);
        prop_assert_eq!(parts.len(), k);

        let mut rebuilt = Vec::with_capacity(walk.len());
        for i in 0..walk.len() {
            rebuilt.push(parts[i % k][i / k]);
        }
        prop_assert_eq!(rebuilt, walk.clone());
        prop_assert_eq!(parts.iter().map(Vec::len).sum::<usize>(), walk.len());
    }
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_is_thread_count_invariant() {
    use walklets::{generate_biased_walks_parallel, generate_walks_parallel};

    let g = small_graph();
    let t = TransitionTables::new(&g, 0.5, 2.0).unwrap();
    let cfg = WalkConfig { walk_length: 8, walk_number: 5, seed: 999 };

    let pool1 = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
    let pool4 = rayon::ThreadPoolBuilder::new().num_threads(4).build().unwrap();

    let u1 = pool1.install(|| generate_walks_parallel(&g, cfg));
    let u4 = pool4.install(|| generate_walks_parallel(&g, cfg));
    assert_eq!(u1, u4, "unbiased parallel output must be thread-count invariant");
    assert_walks_follow_edges(&g, &u1);

    let b1 = pool1.install(|| generate_biased_walks_parallel(&g, &t, cfg)).unwrap();
    let b4 = pool4.install(|| generate_biased_walks_parallel(&g, &t, cfg)).unwrap();
    assert_eq!(b1, b4, "biased parallel output must be thread-count invariant");
    assert_walks_sane(&b1, g.node_count(), cfg.walk_length);
    assert_walks_follow_edges(&g, &b1);
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_walks_from_different_starts_are_independent() {
    use std::collections::HashSet;
    use walklets::{generate_biased_walks_parallel, generate_walks_parallel};

    // On a ring every step is +1 or -1, so a walk reduces to its sequence of directions.
    let n = 200usize;
    let g = AdjacencyGraph::from_edges((0..n).map(|i| (i, (i + 1) % n))).unwrap();
    let t = TransitionTables::new(&g, 1.0, 1.0).unwrap();
    let cfg = WalkConfig { walk_length: 12, walk_number: 2, seed: 42 };
    let directions = |w: &Vec<usize>| -> Vec<bool> {
        w.windows(2).map(|s| (s[1] + n - s[0]) % n == 1).collect()
    };

    let first = generate_walks_parallel(&g, cfg);
    let biased = generate_biased_walks_parallel(&g, &t, cfg).unwrap();
    for (name, walks) in [("first-order", &first), ("biased", &biased)] {
        assert_eq!(walks.len(), 2 * n);
        assert_walks_follow_edges(&g, walks);

        // 11 fair steps give 2048 patterns; 200 independent walks almost never collide much.
        for (round, chunk) in walks.chunks(n).enumerate() {
            let patterns: HashSet<Vec<bool>> = chunk.iter().map(|w| directions(w)).collect();
            assert!(
                patterns.len() > 150,
                "{name} round {round}: only {} distinct step patterns",
                patterns.len()
            );
        }

        let forward = walks.iter().map(|w| directions(w)).filter(|d| d[0]).count();
        let rate = forward as f64 / walks.len() as f64;
        assert!((rate - 0.5).abs() < 0.1, "{name} first-step forward rate {rate:.3}");
    }
}
