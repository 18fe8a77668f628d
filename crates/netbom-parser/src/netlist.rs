//! KiCad generic XML netlist reader
//!
//! Only the parts list is read: `<components>` and `<libparts>`, plus the
//! design source and tool for logging. Nets are skipped.
//!
//! ```text
//! <export version="E">
//!   <design><source>board.kicad_sch</source><tool>Eeschema 8.0</tool></design>
//!   <components>
//!     <comp ref="R1">
//!       <value>10k</value>
//!       <footprint>Resistor_SMD:R_0402_1005Metric</footprint>
//!       <datasheet>~</datasheet>
//!       <fields><field name="MPN">RC0402FR-0710KL</field></fields>
//!       <libsource lib="Device" part="R" description="Resistor"/>
//!       <property name="dnp"/>
//!     </comp>
//!   </components>
//!   <libparts>
//!     <libpart lib="Device" part="R"><docs>~</docs></libpart>
//!   </libparts>
//! </export>
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use netbom_core::Component;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, warn};

use crate::{ComponentFilter, NetlistError};

/// KiCad writes `~` for "no datasheet"
const NO_DATASHEET: &str = "~";

/// A symbol definition from `<libparts>`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LibPart {
    pub lib: String,
    pub part: String,
    pub description: String,
    pub docs: String,
    pub fields: BTreeMap<String, String>,
}

impl LibPart {
    /// Datasheet link from `<docs>` or the `Datasheet` field
    pub fn datasheet(&self) -> &str {
        std::iter::once(self.docs.as_str())
            .chain(self.fields.get("Datasheet").map(String::as_str))
            .map(normalize_datasheet)
            .find(|d| !d.is_empty())
            .unwrap_or("")
    }
}

/// The parts list of a netlist
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Netlist {
    /// Schematic file the netlist was exported from
    pub source: String,
    /// Exporting tool and version
    pub tool: String,
    /// Every `<comp>`, in file order
    pub components: Vec<Component>,
    pub libparts: Vec<LibPart>,
}

impl Netlist {
    /// Read and parse a netlist file
    pub fn from_file(path: &Path) -> Result<Self, NetlistError> {
        let content = std::fs::read_to_string(path).map_err(|source| NetlistError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let netlist: Self = content.parse()?;
        debug!(
            path = %path.display(),
            source = %netlist.source,
            tool = %netlist.tool,
            components = netlist.components.len(),
            "loaded netlist"
        );
        Ok(netlist)
    }

    /// Look up a library part
    pub fn libpart(&self, lib: &str, part: &str) -> Option<&LibPart> {
        self.libparts.iter().find(|p| p.lib == lib && p.part == part)
    }

    /// Components that belong on the BOM, in natural reference order
    pub fn interesting_components(&self, filter: &ComponentFilter) -> Vec<Component> {
        filter.select(&self.components)
    }
}

impl FromStr for Netlist {
    type Err = NetlistError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        NetlistReader::default().read(input)
    }
}

fn normalize_datasheet(datasheet: &str) -> &str {
    let trimmed = datasheet.trim();
    if trimmed == NO_DATASHEET {
        ""
    } else {
        trimmed
    }
}

/// Streaming reader state; `path` is the stack of open element names
#[derive(Default)]
struct NetlistReader {
    path: Vec<String>,
    text: String,
    netlist: Netlist,
    component: Option<Component>,
    libpart: Option<LibPart>,
    field_name: Option<String>,
    comp_count: usize,
}

impl NetlistReader {
    fn read(mut self, input: &str) -> Result<Netlist, NetlistError> {
        let mut reader = Reader::from_str(input);
        reader.trim_text(true);

        let mut root_seen = false;
        loop {
            let position = reader.buffer_position();
            let event = reader
                .read_event()
                .map_err(|source| NetlistError::Xml { position, source })?;

            match event {
                Event::Start(e) => {
                    root_seen = true;
                    self.open(&e, position)?;
                }
                Event::Empty(e) => {
                    root_seen = true;
                    self.open(&e, position)?;
                    self.close();
                }
                Event::End(_) => self.close(),
                Event::Text(t) => {
                    let text = t
                        .unescape()
                        .map_err(|source| NetlistError::Xml { position, source })?;
                    self.text.push_str(&text);
                }
                Event::CData(c) => {
                    self.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = self.path.last() {
            return Err(NetlistError::Truncated(open.clone()));
        }
        if !root_seen {
            return Err(NetlistError::NotANetlist("no root element".into()));
        }

        self.resolve_from_libparts();
        Ok(self.netlist)
    }

    fn open(&mut self, e: &BytesStart<'_>, position: usize) -> Result<(), NetlistError> {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let parent = self.path.last().map(String::as_str);
        self.text.clear();

        match (parent, name.as_str()) {
            (None, "export") => {}
            (None, other) => return Err(NetlistError::NotANetlist(format!("<{other}>"))),
            (Some("components"), "comp") => {
                self.comp_count += 1;
                let reference = attr(e, b"ref", position)?
                    .filter(|r| !r.trim().is_empty())
                    .ok_or(NetlistError::MissingReference(self.comp_count))?;
                self.component = Some(Component::new(reference));
            }
            (Some("comp"), "libsource") => {
                if let Some(component) = self.component.as_mut() {
                    component.library_name = attr(e, b"lib", position)?.unwrap_or_default();
                    component.part_name = attr(e, b"part", position)?.unwrap_or_default();
                    component.description =
                        attr(e, b"description", position)?.unwrap_or_default();
                }
            }
            (Some("comp"), "property") => {
                let property = attr(e, b"name", position)?.unwrap_or_default();
                if let Some(component) = self.component.as_mut() {
                    match property.as_str() {
                        "dnp" => component.dnp = true,
                        "exclude_from_bom" => component.exclude_from_bom = true,
                        "exclude_from_board" => component.exclude_from_board = true,
                        _ => {}
                    }
                }
            }
            (Some("fields"), "field") => {
                self.field_name = attr(e, b"name", position)?;
            }
            (Some("libparts"), "libpart") => {
                self.libpart = Some(LibPart {
                    lib: attr(e, b"lib", position)?.unwrap_or_default(),
                    part: attr(e, b"part", position)?.unwrap_or_default(),
                    ..LibPart::default()
                });
            }
            _ => {}
        }

        self.path.push(name);
        Ok(())
    }

    fn close(&mut self) {
        let Some(name) = self.path.pop() else {
            return;
        };
        let text = std::mem::take(&mut self.text).trim().to_string();
        let parent = self.path.last().cloned().unwrap_or_default();

        match (parent.as_str(), name.as_str()) {
            ("design", "source") => self.netlist.source = text,
            ("design", "tool") => self.netlist.tool = text,
            ("comp", "value") => {
                if let Some(component) = self.component.as_mut() {
                    component.value = text;
                }
            }
            ("comp", "footprint") => {
                if let Some(component) = self.component.as_mut() {
                    component.footprint = text;
                }
            }
            ("comp", "datasheet") => {
                if let Some(component) = self.component.as_mut() {
                    component.datasheet = normalize_datasheet(&text).to_string();
                }
            }
            ("libpart", "description") => {
                if let Some(libpart) = self.libpart.as_mut() {
                    libpart.description = text;
                }
            }
            ("libpart", "docs") => {
                if let Some(libpart) = self.libpart.as_mut() {
                    libpart.docs = text;
                }
            }
            ("fields", "field") => {
                let Some(field) = self.field_name.take() else {
                    return;
                };
                if let Some(component) = self.component.as_mut() {
                    component.fields.insert(field, text);
                } else if let Some(libpart) = self.libpart.as_mut() {
                    libpart.fields.insert(field, text);
                }
            }
            ("components", "comp") => {
                if let Some(component) = self.component.take() {
                    if component.part_name.is_empty() {
                        warn!(reference = %component.reference, "component has no libsource");
                    }
                    self.netlist.components.push(component);
                }
            }
            ("libparts", "libpart") => {
                if let Some(libpart) = self.libpart.take() {
                    self.netlist.libparts.push(libpart);
                }
            }
            _ => {}
        }
    }

    /// Fill missing datasheets and descriptions from the library parts
    fn resolve_from_libparts(&mut self) {
        let Netlist {
            components,
            libparts,
            ..
        } = &mut self.netlist;

        for component in components.iter_mut() {
            let Some(libpart) = libparts
                .iter()
                .find(|p| p.lib == component.library_name && p.part == component.part_name)
            else {
                continue;
            };
            if component.datasheet.is_empty() {
                component.datasheet = libpart.datasheet().to_string();
            }
            if component.description.is_empty() {
                component.description.clone_from(&libpart.description);
            }
        }
    }
}

/// Unescaped value of attribute `key`
fn attr(e: &BytesStart<'_>, key: &[u8], position: usize) -> Result<Option<String>, NetlistError> {
    for attribute in e.attributes() {
        let attribute = attribute.map_err(|err| NetlistError::Xml {
            position,
            source: err.into(),
        })?;
        if attribute.key.as_ref() == key {
            let value = attribute
                .unescape_value()
                .map_err(|source| NetlistError::Xml { position, source })?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}
