mod convert;
mod file;
mod scan;

// Convert commands
pub use convert::{ConversionStats, SchemaConverter, convert_all, run_convert};

// Single file commands
pub use file::{convert_file, run_file, run_inspect};

// Scan commands
pub use scan::run_scan;
