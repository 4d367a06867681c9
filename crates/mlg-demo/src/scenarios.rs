//! Fixture builders for the worked examples, used by both the CLI's
//! `run` subcommand and the integration tests.

use mlg_core::{AttrMap, Id, Result};
use mlg_dao::{LayerDao, MlgDao, NodeLinkDao};
use mlg_store::MemStore;

/// 5-node base graph shared by the coarsening scenarios: weights
/// 1,100,1,1,1 and HLinks (n1,n2,5), (n1,n4,4), (n2,n5,3), (n1,n3,1),
/// (n2,n3,1).
pub struct FiveNodeGraph {
    pub store: MemStore,
    pub base: Id,
    pub nodes: [Id; 5],
}

pub fn five_node_graph() -> Result<FiveNodeGraph> {
    let mut store = MemStore::new();
    let base = LayerDao::add_base_layer(&mut store)?;

    let mut attrs = |w: f64| {
        let mut a = AttrMap::new();
        a.insert("weight".into(), w.into());
        a
    };
    let n1 = MlgDao::add_node_to_layer(&mut store, base, attrs(1.0), Some(1.0))?;
    let n2 = MlgDao::add_node_to_layer(&mut store, base, attrs(100.0), Some(1.0))?;
    let n3 = MlgDao::add_node_to_layer(&mut store, base, attrs(1.0), Some(1.0))?;
    let n4 = MlgDao::add_node_to_layer(&mut store, base, attrs(1.0), Some(1.0))?;
    let n5 = MlgDao::add_node_to_layer(&mut store, base, attrs(1.0), Some(1.0))?;

    NodeLinkDao::create_hlink(&mut store, n1, n2, Some(5.0))?;
    NodeLinkDao::create_hlink(&mut store, n1, n4, Some(4.0))?;
    NodeLinkDao::create_hlink(&mut store, n2, n5, Some(3.0))?;
    NodeLinkDao::create_hlink(&mut store, n1, n3, Some(1.0))?;
    NodeLinkDao::create_hlink(&mut store, n2, n3, Some(1.0))?;

    Ok(FiveNodeGraph {
        store,
        base,
        nodes: [n1, n2, n3, n4, n5],
    })
}

/// 3-node, 3-layer graph shared by the time-vertex filter scenarios:
/// identical OLinks on base and the two layers above, HLinks
/// (n1,n2,0.5), (n2,n3,0.1).
pub struct ThreeNodeTimeSeries {
    pub store: MemStore,
    pub layers: [Id; 3],
    pub nodes: [Id; 3],
}

pub fn three_node_time_series(olinks: [f64; 3]) -> Result<ThreeNodeTimeSeries> {
    let mut store = MemStore::new();
    let base = LayerDao::add_base_layer(&mut store)?;
    let l2 = LayerDao::add_layer_on_top(&mut store)?;
    let l3 = LayerDao::add_layer_on_top(&mut store)?;
    let layers = [base, l2, l3];

    let n1 = MlgDao::add_node_to_layer(&mut store, base, AttrMap::new(), Some(olinks[0]))?;
    let n2 = MlgDao::add_node_to_layer(&mut store, base, AttrMap::new(), Some(olinks[1]))?;
    let n3 = MlgDao::add_node_to_layer(&mut store, base, AttrMap::new(), Some(olinks[2]))?;
    for &layer in &layers[1..] {
        NodeLinkDao::create_olink(&mut store, layer, n1, Some(olinks[0]))?;
        NodeLinkDao::create_olink(&mut store, layer, n2, Some(olinks[1]))?;
        NodeLinkDao::create_olink(&mut store, layer, n3, Some(olinks[2]))?;
    }
    NodeLinkDao::create_hlink(&mut store, n1, n2, Some(0.5))?;
    NodeLinkDao::create_hlink(&mut store, n2, n3, Some(0.1))?;

    Ok(ThreeNodeTimeSeries {
        store,
        layers,
        nodes: [n1, n2, n3],
    })
}

/// The component-extraction scenario: 3 base nodes, 3 layers, OLinks for
/// n1 (5,6,1), n2 (-5,-8,1), n3 (1,-1,7); HLinks (n1,n2), (n1,n3).
pub fn component_extraction_graph() -> Result<ThreeNodeTimeSeries> {
    let mut store = MemStore::new();
    let base = LayerDao::add_base_layer(&mut store)?;
    let l2 = LayerDao::add_layer_on_top(&mut store)?;
    let l3 = LayerDao::add_layer_on_top(&mut store)?;
    let layers = [base, l2, l3];

    let n1 = MlgDao::add_node_to_layer(&mut store, base, AttrMap::new(), Some(5.0))?;
    let n2 = MlgDao::add_node_to_layer(&mut store, base, AttrMap::new(), Some(-5.0))?;
    let n3 = MlgDao::add_node_to_layer(&mut store, base, AttrMap::new(), Some(1.0))?;
    NodeLinkDao::create_olink(&mut store, l2, n1, Some(6.0))?;
    NodeLinkDao::create_olink(&mut store, l3, n1, Some(1.0))?;
    NodeLinkDao::create_olink(&mut store, l2, n2, Some(-8.0))?;
    NodeLinkDao::create_olink(&mut store, l3, n2, Some(1.0))?;
    NodeLinkDao::create_olink(&mut store, l2, n3, Some(-1.0))?;
    NodeLinkDao::create_olink(&mut store, l3, n3, Some(7.0))?;

    NodeLinkDao::create_hlink(&mut store, n1, n2, None)?;
    NodeLinkDao::create_hlink(&mut store, n1, n3, None)?;

    Ok(ThreeNodeTimeSeries {
        store,
        layers,
        nodes: [n1, n2, n3],
    })
}
