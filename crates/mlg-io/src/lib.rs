pub mod exporter;
pub mod importer;

pub use exporter::{JsonExport, JsonExporter};
pub use importer::{CsvImportOptions, CsvImporter};

pub mod prelude {
    pub use crate::{CsvImportOptions, CsvImporter, JsonExport, JsonExporter};
}
