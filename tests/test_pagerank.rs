use std::collections::BTreeSet;
use std::sync::Arc;

use backrank::pagerank::*;
use backrank::{Context, Error, Rdd, Result};
use once_cell::sync::Lazy;

static CONTEXT: Lazy<Arc<Context>> = Lazy::new(|| Context::new().unwrap());

const EPS: f64 = 1e-9;

fn engine(text: &str, partitions: usize) -> Result<PageRank> {
    PageRank::with_partitions(&CONTEXT, parse_edges(text)?, partitions)
}

fn weight_of(nodes: &[Node], id: NodeId) -> f64 {
    nodes
        .iter()
        .find(|node| node.id == id)
        .map(|node| node.weight)
        .unwrap()
}

fn targets(ids: &[NodeId]) -> Targets {
    ids.iter().copied().collect()
}

fn total_weight(nodes: &[Node]) -> f64 {
    nodes.iter().map(|node| node.weight).sum()
}

#[test]
fn mutual_link_stays_balanced() -> Result<()> {
    let mut pr = engine("0 1\n1 0\n", 2)?;
    let initial = pr.nodes()?;
    assert_eq!(initial.len(), 2);
    for node in &initial {
        assert_eq!(node.weight, 1.0);
        assert_eq!(node.old_weight, 1.0);
    }

    pr.run(1)?;
    let nodes = pr.nodes()?;
    assert!((weight_of(&nodes, 0) - 1.0).abs() < EPS);
    assert!((weight_of(&nodes, 1) - 1.0).abs() < EPS);

    let ranking = pr.ranking()?;
    let ids: BTreeSet<NodeId> = ranking.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, [0, 1].iter().copied().collect::<BTreeSet<NodeId>>());
    assert!(ranking.iter().all(|(_, w)| (w - 1.0).abs() < EPS));
    Ok(())
}

#[test]
fn dangling_node_feeds_the_only_other_node() -> Result<()> {
    let mut pr = engine("0 1\n", 2)?;
    assert_eq!(pr.num_nodes(), 2);
    let topology = pr.topology()?;
    assert_eq!(topology[&0], targets(&[1]));
    assert!(topology[&1].is_empty());
    assert!(!topology.contains_key(&2));

    pr.run(3)?;
    let nodes = pr.nodes()?;
    assert!((weight_of(&nodes, 0) - 1.0).abs() < EPS);
    assert!((weight_of(&nodes, 1) - 1.0).abs() < EPS);
    Ok(())
}

#[test]
fn chain_with_dangling_tail() -> Result<()> {
    let mut pr = engine("0 1\n1 2\n", 3)?;

    pr.iterate()?;
    let nodes = pr.nodes()?;
    assert!((weight_of(&nodes, 0) - 0.575).abs() < EPS);
    assert!((weight_of(&nodes, 1) - 1.425).abs() < EPS);
    assert!((weight_of(&nodes, 2) - 1.0).abs() < EPS);

    pr.iterate()?;
    let nodes = pr.nodes()?;
    assert!((weight_of(&nodes, 0) - 0.55375).abs() < EPS);
    assert!((weight_of(&nodes, 1) - 1.085).abs() < EPS);
    assert!((weight_of(&nodes, 2) - 1.36125).abs() < EPS);
    for node in &nodes {
        let previous = match node.id {
            0 => 0.575,
            1 => 1.425,
            _ => 1.0,
        };
        assert!((node.old_weight - previous).abs() < EPS);
    }

    let ranking = pr.ranking()?;
    let order: Vec<NodeId> = ranking.iter().map(|(id, _)| *id).collect();
    assert_eq!(order, vec![2, 1, 0]);
    assert_eq!(pr.top(1)?, vec![ranking[0]]);
    Ok(())
}

#[test]
fn every_mentioned_id_becomes_one_node() -> Result<()> {
    let text = "# sample\n3 9\n3 4\n\n9 3\n4 4\n12 3\n3 9\n";
    let pr = engine(text, 4)?;
    let nodes = pr.nodes()?;
    let ids: Vec<NodeId> = nodes.iter().map(|node| node.id).collect();
    assert_eq!(ids, vec![3, 4, 9, 12]);

    let topology = pr.topology()?;
    assert_eq!(topology[&3], targets(&[4, 9]));
    assert_eq!(topology[&4], targets(&[4]));
    assert_eq!(topology[&9], targets(&[3]));
    assert_eq!(topology[&12], targets(&[3]));
    Ok(())
}

#[test]
fn topology_survives_rounds_and_weight_is_conserved() -> Result<()> {
    let text = "0 1\n0 2\n1 2\n2 0\n3 2\n4 7\n7 4\n5 6\n";
    let mut pr = engine(text, 3)?;
    let topology = pr.topology()?;
    let n = pr.num_nodes() as f64;
    assert_eq!(pr.num_nodes(), 8);

    for round in 1..=6 {
        pr.iterate()?;
        assert_eq!(pr.state(), EngineState::Iterating(round));
        let nodes = pr.nodes()?;
        assert_eq!(nodes.len(), 8);
        assert!((total_weight(&nodes) - n).abs() < 1e-9);
        assert!(nodes.iter().all(|node| node.weight.is_finite() && node.weight >= 0.0));
        assert_eq!(pr.topology()?, topology);
    }
    Ok(())
}

#[test]
fn sparse_ids_only_feed_existing_nodes() -> Result<()> {
    let mut pr = engine("10 20\n", 2)?;
    pr.run(2)?;
    let nodes = pr.nodes()?;
    assert_eq!(nodes.len(), 2);
    assert!((total_weight(&nodes) - 2.0).abs() < EPS);
    Ok(())
}

#[test]
fn results_are_deterministic() -> Result<()> {
    let text = "0 1\n1 2\n2 0\n2 3\n3 4\n5 1\n";
    let mut first = engine(text, 3)?;
    first.run(5)?;
    let mut second = engine(text, 3)?;
    second.run(5)?;
    assert_eq!(first.ranking()?, second.ranking()?);

    let mut other_layout = engine(text, 1)?;
    other_layout.run(5)?;
    for ((id_a, w_a), (id_b, w_b)) in first.ranking()?.into_iter().zip(other_layout.ranking()?) {
        assert_eq!(id_a, id_b);
        assert!((w_a - w_b).abs() < 1e-9);
    }
    Ok(())
}

#[test]
fn single_node_is_a_fixed_point() -> Result<()> {
    let mut pr = engine("5 5\n", 2)?;
    assert_eq!(pr.num_nodes(), 1);
    assert_eq!(pr.iterate()?, 0.0);
    pr.run(4)?;
    assert_eq!(pr.rounds(), 5);
    let nodes = pr.nodes()?;
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].weight, 1.0);
    assert_eq!(nodes[0].old_weight, 1.0);
    Ok(())
}

#[test]
fn engine_state_machine() -> Result<()> {
    let mut pr = engine("0 1\n1 0\n", 2)?;
    assert_eq!(pr.state(), EngineState::Initialized);
    pr.iterate()?;
    assert_eq!(pr.state(), EngineState::Iterating(1));
    pr.run(2)?;
    assert_eq!(pr.state(), EngineState::Done);
    assert_eq!(pr.rounds(), 3);
    match pr.iterate() {
        Err(Error::EngineDone) => {}
        other => panic!("unexpected result {:?}", other),
    }
    Ok(())
}

#[test]
fn run_until_stops_once_weights_settle() -> Result<()> {
    // a balanced cycle does not move at all
    let mut settled = engine("0 1\n1 2\n2 0\n", 2)?;
    assert_eq!(settled.run_until(50, 1e-6)?, 1);
    assert_eq!(settled.state(), EngineState::Done);

    let mut moving = engine("0 1\n1 2\n", 2)?;
    let rounds = moving.run_until(200, 1e-6)?;
    assert!(rounds > 1 && rounds <= 200);

    let mut capped = engine("0 1\n1 2\n", 2)?;
    assert_eq!(capped.run_until(2, 0.0)?, 2);
    Ok(())
}

#[test]
fn format_output_sorts_heaviest_first() -> Result<()> {
    let sc = CONTEXT.clone();
    let nodes = vec![
        Node {
            id: 1,
            old_weight: 1.0,
            weight: 0.5,
            targets: Targets::new(),
        },
        Node {
            id: 2,
            old_weight: 1.0,
            weight: 2.5,
            targets: Targets::new(),
        },
        Node {
            id: 3,
            old_weight: 1.0,
            weight: 1.25,
            targets: Targets::new(),
        },
    ];
    let ranked = format_output(sc.make_rdd(nodes, 2), 2)?.collect()?;
    assert_eq!(ranked, vec![(2, 2.5), (3, 1.25), (1, 0.5)]);
    Ok(())
}

#[test]
fn malformed_input_is_rejected_before_ranking() {
    match rank(&CONTEXT, "0 1\n1 two\n", 3, 2) {
        Err(Error::MalformedEdge {
            line_number, line, ..
        }) => {
            assert_eq!(line_number, 2);
            assert_eq!(line, "1 two");
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn rank_runs_the_whole_pipeline() -> Result<()> {
    let ranking = rank(&CONTEXT, "# tiny\n0 1\n1 2\n", 2, 2)?;
    let order: Vec<NodeId> = ranking.iter().map(|(id, _)| *id).collect();
    assert_eq!(order, vec![2, 1, 0]);
    Ok(())
}

#[test]
fn empty_graph_has_no_ranking() -> Result<()> {
    let mut pr = engine("# nothing here\n\n", 2)?;
    pr.run(3)?;
    assert!(pr.ranking()?.is_empty());
    Ok(())
}

#[test]
fn collector_failures_surface_from_the_round_job() {
    let sc = CONTEXT.clone();
    let own = |id: NodeId| {
        (
            id,
            Contribution::Retained {
                old_weight: 1.0,
                decay: 0.15,
                targets: targets(&[0]),
            },
        )
    };

    // node 3 only receives weight, its own tuple is missing
    let missing = sc.make_rdd(
        vec![own(0), (0, Contribution::Incoming(0.5)), (3, Contribution::Incoming(0.85))],
        2,
    );
    match collect_weights(missing, 2) {
        Err(Error::MissingSelfContribution(3)) => {}
        other => panic!("unexpected result {:?}", other),
    }

    let duplicated = sc.make_rdd(vec![own(1), (1, Contribution::Incoming(0.25)), own(1)], 3);
    match collect_weights(duplicated, 2) {
        Err(Error::DuplicateSelfContribution(1)) => {}
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn well_formed_contributions_collect_into_nodes() -> Result<()> {
    let sc = CONTEXT.clone();
    let contributions = sc.make_rdd(
        vec![
            (
                4,
                Contribution::Retained {
                    old_weight: 2.0,
                    decay: 0.2,
                    targets: targets(&[5]),
                },
            ),
            (4, Contribution::Incoming(0.3)),
            (4, Contribution::Incoming(0.5)),
        ],
        2,
    );
    let nodes = collect_weights(contributions, 2)?;
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].id, 4);
    assert_eq!(nodes[0].old_weight, 2.0);
    assert!((nodes[0].weight - 1.0).abs() < EPS);
    assert_eq!(nodes[0].targets, targets(&[5]));
    Ok(())
}
