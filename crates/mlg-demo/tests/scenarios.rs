//! End-to-end scenarios, one per worked example in the spec's Testable
//! Properties section.

use approx::assert_relative_eq;

use mlg_coarsen::{AdditiveMerger, HeavyHLinkSelector, NeighborCoarsener, XSelector};
use mlg_dao::{LayerDao, NodeLinkDao};
use mlg_demo::scenarios;
use mlg_extract::ComponentExtractor;
use mlg_filter::{TimeSeriesOperator, TimeVertexFilter, TsDirection};
use mlg_store::{Direction, ObjectKind, StoreAdapter};

/// S1: heavy-HLink coarsening collapses the 5-node graph to one node of
/// weight 104 with five VLink children and zero HLinks.
#[test]
fn s1_heavy_hlink_coarsening() {
    let mut fixture = scenarios::five_node_graph().unwrap();
    let mut coarsener = NeighborCoarsener::new(HeavyHLinkSelector::new(false), AdditiveMerger::new(), 0.99);
    let top = coarsener.run(&mut fixture.store).unwrap();

    let top_nodes: Vec<_> = fixture
        .store
        .neighbors(top, ObjectKind::Owns, Direction::Outgoing)
        .iter()
        .collect();
    assert_eq!(top_nodes.len(), 1);
    let merged = top_nodes[0];
    let n = NodeLinkDao::get_node(&fixture.store, merged);
    assert_relative_eq!(n.weight, 104.0);

    let children = fixture.store.neighbors(merged, ObjectKind::VLink, Direction::Ingoing);
    assert_eq!(children.count(), 5);
    let hlinks = fixture.store.neighbors(merged, ObjectKind::HLink, Direction::Any);
    assert!(hlinks.is_empty());
}

/// S2: the X-selector at reduction_factor=1.0 collapses the same graph
/// to a single node of weight 104.
#[test]
fn s2_x_selector_full_reduction() {
    let mut fixture = scenarios::five_node_graph().unwrap();
    let mut coarsener = NeighborCoarsener::new(XSelector::new(false), AdditiveMerger::new(), 1.0);
    let top = coarsener.run(&mut fixture.store).unwrap();

    let top_nodes: Vec<_> = fixture
        .store
        .neighbors(top, ObjectKind::Owns, Direction::Outgoing)
        .iter()
        .collect();
    assert_eq!(top_nodes.len(), 1);
    let n = NodeLinkDao::get_node(&fixture.store, top_nodes[0]);
    assert_relative_eq!(n.weight, 104.0);
}

/// S3: the vertex-only time-vertex mean filter at radius 0 blends each
/// node's self-term with its HLink neighbors' terms.
#[test]
fn s3_time_vertex_mean_vertex_only() {
    let fixture = scenarios::three_node_time_series([10.0, 20.0, 40.0]).unwrap();
    let mut store = fixture.store;
    let base = fixture.layers[0];

    let mut filter = TimeVertexFilter::new();
    filter.set_radius(0);
    filter.set_filter_only_in_time_domain(false);
    let mut operator = TimeSeriesOperator::new(filter);
    operator.run(&mut store).unwrap();

    let weight_of = |node| {
        let olink = NodeLinkDao::find_olink(&store, base, node);
        store.get_attr(olink, "weight").unwrap().as_f64().unwrap()
    };
    assert_relative_eq!(weight_of(fixture.nodes[0]), 13.333333333333334, epsilon = 1e-9);
    assert_relative_eq!(weight_of(fixture.nodes[1]), 18.125, epsilon = 1e-9);
    assert_relative_eq!(weight_of(fixture.nodes[2]), 38.18181818181818, epsilon = 1e-9);
}

/// S4: the time-only filter with a unit inter-layer weight override
/// blends n1's own observation across a 2-radius window.
#[test]
fn s4_time_vertex_mean_time_only_unit_lambda() {
    let fixture = scenarios::three_node_time_series([10.0, 10.0, 10.0]).unwrap();
    let mut store = fixture.store;
    let base = fixture.layers[0];

    let mut filter = TimeVertexFilter::new();
    filter.set_radius(2);
    filter.set_direction(TsDirection::Both);
    filter.set_override_inter_layer_weight(Some(1.0));
    filter.set_filter_only_in_time_domain(true);
    let mut operator = TimeSeriesOperator::new(filter);
    operator.run(&mut store).unwrap();

    let olink = NodeLinkDao::find_olink(&store, base, fixture.nodes[0]);
    let weight = store.get_attr(olink, "weight").unwrap().as_f64().unwrap();
    assert_relative_eq!(weight, 10.0, epsilon = 1e-9);
}

/// S5: component extraction with the auto-threshold (max(|8|,|7|)/2 = 4)
/// yields 5 active dynamic nodes split across 2 components.
#[test]
fn s5_component_extraction() {
    let fixture = scenarios::component_extraction_graph().unwrap();
    let graph = ComponentExtractor::new().run(&fixture.store).unwrap();
    assert_eq!(graph.nodes.len(), 5);
    assert_eq!(graph.component_count, 2);
}

/// S6: the plan parser accepts a strictly-increasing fraction sequence
/// and rejects a non-monotone one, leaving the queue empty.
#[test]
fn s6_builder_plan_parse() {
    let steps = mlg_coarsen::parse_plan("Hs:[0.1,0.3] Xm:0.4").unwrap();
    assert_eq!(steps.len(), 3);
    assert_eq!(steps[0].fraction, 0.1);
    assert_eq!(steps[1].fraction, 0.3);
    assert_eq!(steps[2].fraction, 0.4);

    assert!(mlg_coarsen::parse_plan("Hs:[0.4,0.1]").is_err());

    let mut builder = mlg_coarsen::Builder::new();
    assert!(builder.load("Hs:[0.4,0.1]").is_err());
    assert_eq!(builder.pending(), 0);
}
