//! Selection of the components that belong on a bill of materials

use std::cmp::Ordering;

use netbom_core::Component;
use regex::Regex;
use tracing::debug;

use crate::NetlistError;

/// Test points
pub const DEFAULT_EXCLUDED_REFERENCES: &[&str] = &["TP[0-9]+"];

/// Mechanical parts and solder jumpers
pub const DEFAULT_EXCLUDED_VALUES: &[&str] =
    &["MOUNTHOLE", "SCOPETEST", "MOUNT_HOLE", "SOLDER_BRIDGE.*"];

/// Decides which netlist components make it into the BOM.
///
/// Patterns are regexes matched at the start of the field, so `TP[0-9]+`
/// drops `TP1` and `TP12` but keeps `STP1`.
#[derive(Clone, Debug)]
pub struct ComponentFilter {
    exclude_from_bom: bool,
    exclude_from_board: bool,
    exclude_dnp: bool,
    excluded_references: Vec<Regex>,
    excluded_values: Vec<Regex>,
    excluded_footprints: Vec<Regex>,
}

impl Default for ComponentFilter {
    /// Honor `exclude_from_bom`, no patterns
    fn default() -> Self {
        Self {
            exclude_from_bom: true,
            exclude_from_board: false,
            exclude_dnp: false,
            excluded_references: Vec::new(),
            excluded_values: Vec::new(),
            excluded_footprints: Vec::new(),
        }
    }
}

impl ComponentFilter {
    /// The KiCad BOM script defaults: test points, mount holes, solder bridges
    pub fn kicad_defaults() -> Result<Self, NetlistError> {
        let mut filter = Self::default();
        for pattern in DEFAULT_EXCLUDED_REFERENCES {
            filter = filter.exclude_reference(pattern)?;
        }
        for pattern in DEFAULT_EXCLUDED_VALUES {
            filter = filter.exclude_value(pattern)?;
        }
        Ok(filter)
    }

    /// Keep or drop components marked `exclude_from_bom`
    pub fn exclude_from_bom(mut self, exclude: bool) -> Self {
        self.exclude_from_bom = exclude;
        self
    }

    /// Keep or drop components marked `exclude_from_board`
    pub fn exclude_from_board(mut self, exclude: bool) -> Self {
        self.exclude_from_board = exclude;
        self
    }

    /// Keep or drop Do Not Populate components
    pub fn exclude_dnp(mut self, exclude: bool) -> Self {
        self.exclude_dnp = exclude;
        self
    }

    /// Drop components whose reference starts with a match of `pattern`
    pub fn exclude_reference(mut self, pattern: &str) -> Result<Self, NetlistError> {
        self.excluded_references.push(anchored(pattern)?);
        Ok(self)
    }

    /// Drop components whose value starts with a match of `pattern`
    pub fn exclude_value(mut self, pattern: &str) -> Result<Self, NetlistError> {
        self.excluded_values.push(anchored(pattern)?);
        Ok(self)
    }

    /// Drop components whose footprint starts with a match of `pattern`
    pub fn exclude_footprint(mut self, pattern: &str) -> Result<Self, NetlistError> {
        self.excluded_footprints.push(anchored(pattern)?);
        Ok(self)
    }

    /// Whether `component` belongs on the BOM
    pub fn accepts(&self, component: &Component) -> bool {
        if self.exclude_from_bom && component.exclude_from_bom {
            return false;
        }
        if self.exclude_from_board && component.exclude_from_board {
            return false;
        }
        if self.exclude_dnp && component.dnp {
            return false;
        }
        // Power and flag symbols (#PWR01, #FLG02)
        if component.reference.starts_with('#') {
            return false;
        }

        !(matches_any(&self.excluded_references, &component.reference)
            || matches_any(&self.excluded_values, &component.value)
            || matches_any(&self.excluded_footprints, &component.footprint))
    }

    /// Accepted components, sorted by natural reference order
    pub fn select(&self, components: &[Component]) -> Vec<Component> {
        let mut selected: Vec<Component> = components
            .iter()
            .filter(|c| self.accepts(c))
            .cloned()
            .collect();
        selected.sort_by(|a, b| natural_cmp(&a.reference, &b.reference));

        debug!(
            total = components.len(),
            selected = selected.len(),
            "filtered components"
        );
        selected
    }
}

fn matches_any(patterns: &[Regex], field: &str) -> bool {
    patterns.iter().any(|p| p.is_match(field))
}

fn anchored(pattern: &str) -> Result<Regex, NetlistError> {
    Ok(Regex::new(&format!("^(?:{pattern})"))?)
}

/// Natural order: `R2` < `R10`, case-insensitive text runs
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    natord::compare_ignore_case(a, b).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn refs(components: &[Component]) -> Vec<&str> {
        components.iter().map(|c| c.reference.as_str()).collect()
    }

    #[test]
    fn natural_order_of_references() {
        let mut references = vec!["R10", "C1", "R2", "R1", "c2", "U1A", "U1B", "R100"];
        references.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(references, vec!["C1", "c2", "R1", "R2", "R10", "R100", "U1A", "U1B"]);
    }

    #[test]
    fn natural_cmp_handles_huge_numbers() {
        assert_eq!(natural_cmp("R99999999999999999999999", "R1"), Ordering::Greater);
    }

    #[test]
    fn natural_cmp_is_total() {
        assert_eq!(natural_cmp("r1", "R1"), Ordering::Greater);
        assert_eq!(natural_cmp("R1", "R1"), Ordering::Equal);
    }

    #[test]
    fn default_filter_honors_exclude_from_bom_only() {
        let filter = ComponentFilter::default();
        assert!(filter.accepts(&Component::new("TP1")));
        assert!(filter.accepts(&Component::new("R1").dnp()));
        assert!(!filter.accepts(&Component::new("R2").exclude_from_bom()));
        assert!(!filter.accepts(&Component::new("#PWR01")));
    }

    #[test]
    fn kicad_defaults_drop_test_points_and_holes() {
        let filter = ComponentFilter::kicad_defaults().unwrap();

        assert!(!filter.accepts(&Component::new("TP1")));
        assert!(!filter.accepts(&Component::new("TP12")));
        assert!(filter.accepts(&Component::new("STP1")));
        assert!(!filter.accepts(&Component::new("H1").value("MOUNTHOLE")));
        assert!(!filter.accepts(&Component::new("JP1").value("SOLDER_BRIDGE_2")));
        assert!(filter.accepts(&Component::new("R1").value("10k")));
    }

    #[test]
    fn optional_exclusions() {
        let filter = ComponentFilter::default()
            .exclude_dnp(true)
            .exclude_from_bom(false)
            .exclude_footprint("MountingHole:")
            .unwrap();

        assert!(!filter.accepts(&Component::new("R1").dnp()));
        assert!(filter.accepts(&Component::new("R2").exclude_from_bom()));
        assert!(!filter.accepts(&Component::new("H1").footprint("MountingHole:M3")));
    }

    #[test]
    fn exclude_from_board_when_requested() {
        let mut component = Component::new("R1");
        component.exclude_from_board = true;

        assert!(ComponentFilter::default().accepts(&component));
        assert!(!ComponentFilter::default().exclude_from_board(true).accepts(&component));
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let result = ComponentFilter::default().exclude_value("(");
        assert!(matches!(result, Err(NetlistError::Pattern(_))));
    }

    #[test]
    fn select_filters_and_sorts() {
        let components = vec![
            Component::new("R10"),
            Component::new("TP1"),
            Component::new("R2"),
            Component::new("C1"),
        ];

        let selected = ComponentFilter::kicad_defaults().unwrap().select(&components);
        assert_eq!(refs(&selected), vec!["C1", "R2", "R10"]);
    }
}
