//! # netbom-parser
//!
//! Loader for KiCad "generic" XML netlists (`File > Export > Netlist`, or
//! `kicad-cli sch export netlist --format kicadxml`).
//!
//! This crate provides:
//! - `Netlist`: components and library parts read with quick-xml
//! - `ComponentFilter`: selection of the components that belong on a BOM
//! - Natural ordering of reference designators
//!
//! ## Example
//!
//! ```rust
//! use netbom_parser::{ComponentFilter, Netlist};
//!
//! let xml = r#"<export version="E">
//!   <components>
//!     <comp ref="R1">
//!       <value>10k</value>
//!       <footprint>Resistor_SMD:R_0402_1005Metric</footprint>
//!       <libsource lib="Device" part="R" description="Resistor"/>
//!     </comp>
//!   </components>
//! </export>"#;
//!
//! let netlist: Netlist = xml.parse().unwrap();
//! let filter = ComponentFilter::kicad_defaults().unwrap();
//! let components = netlist.interesting_components(&filter);
//! assert_eq!(components[0].value, "10k");
//! ```

pub mod filter;
pub mod netlist;

pub use filter::{natural_cmp, ComponentFilter};
pub use netlist::{LibPart, Netlist};

use std::path::PathBuf;
use thiserror::Error;

/// Netlist loading error
#[derive(Debug, Error)]
pub enum NetlistError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed XML at byte {position}: {source}")]
    Xml {
        position: usize,
        source: quick_xml::Error,
    },

    #[error("Not a KiCad netlist: expected <export> root element, found {0}")]
    NotANetlist(String),

    #[error("Unexpected end of file inside <{0}>")]
    Truncated(String),

    #[error("Component #{0} has no ref attribute")]
    MissingReference(usize),

    #[error("Invalid exclusion pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Load a netlist file
pub fn parse_file(path: &std::path::Path) -> Result<Netlist, NetlistError> {
    Netlist::from_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::Path;

    #[test]
    fn test_parse_file_not_found() {
        let result = parse_file(Path::new("/nonexistent/board.xml"));
        assert!(matches!(result, Err(NetlistError::Io { .. })));
    }

    #[test]
    fn test_parse_file_from_disk() {
        let mut temp_file = tempfile::NamedTempFile::with_suffix(".xml").unwrap();
        write!(
            temp_file,
            r#"<export version="E"><components><comp ref="C1"><value>1u</value></comp></components></export>"#
        )
        .unwrap();

        let netlist = parse_file(temp_file.path()).unwrap();
        assert_eq!(netlist.components.len(), 1);
        assert_eq!(netlist.components[0].reference, "C1");
    }

    #[test]
    fn test_error_messages_name_the_problem() {
        let err = NetlistError::MissingReference(3);
        assert_eq!(err.to_string(), "Component #3 has no ref attribute");

        let err = NetlistError::NotANetlist("<html>".into());
        assert!(err.to_string().contains("<export>"));
    }
}
