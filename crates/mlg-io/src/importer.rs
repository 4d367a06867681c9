//! CSV importer (spec §4.14): builds a fresh layer stack and node/edge
//! topology from a nodes file and an edges file.

use std::collections::BTreeMap;
use std::io::Read;

use mlg_core::{AttrMap, AttrValue, Error, Id, Result, DEFAULT_WEIGHT};
use mlg_dao::{LayerDao, MlgDao, NodeLinkDao};
use mlg_store::StoreAdapter;

fn csv_err(e: csv::Error) -> Error {
    Error::invalid_argument(format!("csv parse error: {e}"))
}

/// Toggles importer behaviour the original leaves unpinned (spec §4.14).
#[derive(Debug, Clone)]
pub struct CsvImportOptions {
    /// Create unrecognized node/edge attribute columns as `String` on
    /// first sight rather than dropping them. Defaults to `true`.
    pub auto_create_attrs: bool,
}

impl Default for CsvImportOptions {
    fn default() -> Self {
        CsvImportOptions {
            auto_create_attrs: true,
        }
    }
}

pub struct CsvImporter;

impl CsvImporter {
    /// Parses the nodes file, creating the base layer plus `K-1` layers
    /// stacked on top (file order), one node per row with `K` OLink
    /// values. Returns the external-id -> store-id mapping the edges
    /// file's `src`/`tgt` columns are resolved against.
    pub fn import_nodes(
        store: &mut dyn StoreAdapter,
        reader: impl Read,
        options: &CsvImportOptions,
    ) -> Result<BTreeMap<String, Id>> {
        let mut rdr = csv::Reader::from_reader(reader);
        let headers = rdr.headers().map_err(csv_err)?.clone();
        if headers.len() < 2 {
            return Err(Error::invalid_argument(
                "nodes header must have at least #id and ts:<K>",
            ));
        }
        let ts_col = headers.iter().last().unwrap();
        let k: usize = ts_col
            .strip_prefix("ts:")
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| Error::invalid_argument(format!("malformed ts column: {ts_col}")))?;
        if k == 0 {
            return Err(Error::invalid_argument("ts:<K> must supply at least one layer"));
        }
        let attr_names: Vec<String> = headers
            .iter()
            .skip(1)
            .take(headers.len() - 2)
            .map(str::to_lowercase)
            .collect();

        let base = LayerDao::add_base_layer(store)?;
        let mut layers = vec![base];
        for _ in 1..k {
            layers.push(LayerDao::add_layer_on_top(store)?);
        }

        let mut index = BTreeMap::new();
        for result in rdr.records() {
            let record = result.map_err(csv_err)?;
            if record.len() != headers.len() {
                tracing::warn!(row_len = record.len(), expected = headers.len(), "skipping malformed node row");
                continue;
            }
            let external_id = record.get(0).unwrap_or_default().to_string();

            let mut attrs = AttrMap::new();
            for (name, value) in attr_names.iter().zip(record.iter().skip(1)) {
                if options.auto_create_attrs || name == "weight" || name == "label" {
                    attrs.insert(name.clone(), AttrValue::String(value.to_string()));
                }
            }

            let ts_values: Vec<f64> = record
                .iter()
                .skip(1 + attr_names.len())
                .map(|v| v.parse::<f64>().unwrap_or(DEFAULT_WEIGHT))
                .collect();
            if ts_values.len() != k {
                return Err(Error::invalid_argument(format!(
                    "node {external_id} supplies {} ts values, expected {k}",
                    ts_values.len()
                )));
            }

            let node = MlgDao::add_node_to_layer(store, base, attrs, Some(ts_values[0]))?;
            for (layer, weight) in layers.iter().zip(ts_values.iter()).skip(1) {
                NodeLinkDao::create_olink(store, *layer, node, Some(*weight))?;
            }
            index.insert(external_id, node);
        }
        Ok(index)
    }

    /// Parses the edges file. One `HLink` per row on the base topology;
    /// self-loops are silently skipped, and a row referencing an unknown
    /// node id is skipped with a logged warning rather than aborting the
    /// whole import.
    pub fn import_edges(
        store: &mut dyn StoreAdapter,
        reader: impl Read,
        index: &BTreeMap<String, Id>,
    ) -> Result<usize> {
        let mut rdr = csv::Reader::from_reader(reader);
        let headers = rdr.headers().map_err(csv_err)?.clone();
        if headers.len() < 2 {
            return Err(Error::invalid_argument("edges header must have at least src,tgt"));
        }
        let has_weight = headers
            .get(2)
            .map(|h| h.eq_ignore_ascii_case("weight"))
            .unwrap_or(false);

        let mut created = 0usize;
        for result in rdr.records() {
            let record = result.map_err(csv_err)?;
            let src_key = record.get(0).unwrap_or_default();
            let tgt_key = record.get(1).unwrap_or_default();
            if src_key == tgt_key {
                continue;
            }
            let (Some(&src), Some(&tgt)) = (index.get(src_key), index.get(tgt_key)) else {
                tracing::warn!(src_key, tgt_key, "edge references unknown node, skipping");
                continue;
            };
            let weight = if has_weight {
                record.get(2).and_then(|v| v.parse::<f64>().ok())
            } else {
                None
            };
            MlgDao::add_hlink(store, src, tgt, weight, true)?;
            created += 1;
        }
        Ok(created)
    }
}
