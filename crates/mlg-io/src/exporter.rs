//! JSON exporter (spec §4.14). The original only ever serializes nodes to
//! CSV (`GraphExporter::writeTSEdges` is an unimplemented stub); the JSON
//! shape here is the spec's own redesign, carrying both the extracted
//! dynamic graph and the raw per-layer observation matrix.

use serde::Serialize;

use mlg_core::{Id, Result, DEFAULT_WEIGHT};
use mlg_dao::{LayerDao, NodeLinkDao};
use mlg_extract::DynamicGraph;
use mlg_store::{Direction, ObjectKind, StoreAdapter};

#[derive(Debug, Clone, Serialize)]
struct GraphData {
    ts_count: usize,
    ts_data_size: usize,
    ts: Vec<Vec<f64>>,
}

/// The wire shape: `{nodes, links, component_count, graph: [["graph_data", {...}]]}`.
#[derive(Debug, Clone, Serialize)]
pub struct JsonExport {
    #[serde(flatten)]
    graph: DynamicGraph,
    #[serde(rename = "graph")]
    graph_data: Vec<(&'static str, GraphData)>,
}

pub struct JsonExporter;

impl JsonExporter {
    /// Builds the export payload: `graph` is the already-extracted dynamic
    /// graph (spec §4.13), and the raw observation matrix is read fresh
    /// from the store, independent of any extraction threshold, so every
    /// layer's weight for every base node is preserved exactly.
    pub fn export(store: &dyn StoreAdapter, graph: DynamicGraph) -> Result<JsonExport> {
        let layers = LayerDao::all_layers_bottom_up(store);
        let base = LayerDao::base_layer(store);
        let base_nodes: Vec<Id> = store
            .neighbors(base, ObjectKind::Owns, Direction::Outgoing)
            .iter()
            .collect();

        let mut ts = Vec::with_capacity(base_nodes.len());
        for &node in &base_nodes {
            let mut row = Vec::with_capacity(layers.len());
            for &layer in &layers {
                let olink = NodeLinkDao::find_olink(store, layer, node);
                let weight = if olink.is_valid() {
                    store
                        .get_attr(olink, "weight")
                        .and_then(|v| v.as_f64())
                        .unwrap_or(DEFAULT_WEIGHT)
                } else {
                    DEFAULT_WEIGHT
                };
                row.push(weight);
            }
            ts.push(row);
        }

        Ok(JsonExport {
            graph,
            graph_data: vec![(
                "graph_data",
                GraphData {
                    ts_count: layers.len(),
                    ts_data_size: base_nodes.len(),
                    ts,
                },
            )],
        })
    }

    pub fn to_json_string(export: &JsonExport) -> Result<String> {
        serde_json::to_string(export)
            .map_err(|e| mlg_core::Error::invalid_argument(format!("json export failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlg_core::AttrMap;
    use mlg_dao::MlgDao;
    use mlg_extract::ComponentExtractor;
    use mlg_store::MemStore;

    #[test]
    fn export_preserves_raw_weight_matrix_shape() {
        let mut store = MemStore::new();
        let base = LayerDao::add_base_layer(&mut store).unwrap();
        let n1 = MlgDao::add_node_to_layer(&mut store, base, AttrMap::new(), Some(1.0)).unwrap();
        let n2 = MlgDao::add_node_to_layer(&mut store, base, AttrMap::new(), Some(2.0)).unwrap();
        let top = LayerDao::add_layer_on_top(&mut store).unwrap();
        NodeLinkDao::create_olink(&mut store, top, n1, Some(5.0)).unwrap();
        NodeLinkDao::create_olink(&mut store, top, n2, Some(6.0)).unwrap();

        let graph = ComponentExtractor::new().run(&store).unwrap();
        let export = JsonExporter::export(&store, graph).unwrap();
        assert_eq!(export.graph_data.len(), 1);
        let (label, data) = &export.graph_data[0];
        assert_eq!(*label, "graph_data");
        assert_eq!(data.ts_count, 2);
        assert_eq!(data.ts_data_size, 2);
        assert_eq!(data.ts[0], vec![1.0, 5.0]);
        assert_eq!(data.ts[1], vec![2.0, 6.0]);

        let json = JsonExporter::to_json_string(&export).unwrap();
        assert!(json.contains("graph_data"));
    }
}
