//! BOM rows, one per component group

use crate::ComponentGroup;

/// Separator between reference designators in the Reference(s) column
pub const REFERENCE_SEPARATOR: &str = ", ";

/// One line of the bill of materials
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BomRow {
    /// 1-based position in the BOM
    pub item_id: usize,
    /// Number of components in the group
    pub quantity: usize,
    /// Comma-separated reference designators
    pub references: String,
    pub value: String,
    /// `library:part`
    pub display_name: String,
    pub footprint: String,
    pub datasheet: String,
    /// "DNP" or empty
    pub dnp: String,
}

impl BomRow {
    /// Build the row for `group`, placed at `item_id`
    pub fn from_group(item_id: usize, group: &ComponentGroup) -> Self {
        let representative = group.representative();
        Self {
            item_id,
            quantity: group.len(),
            references: group.references().collect::<Vec<_>>().join(REFERENCE_SEPARATOR),
            value: representative.value.clone(),
            display_name: representative.display_name(),
            footprint: group.first_non_empty(|c| c.footprint.as_str()).to_string(),
            datasheet: group.first_non_empty(|c| c.datasheet.as_str()).to_string(),
            dnp: representative.dnp_string().to_string(),
        }
    }

    /// Reference designators listed in this row
    pub fn reference_list(&self) -> impl Iterator<Item = &str> {
        self.references
            .split(REFERENCE_SEPARATOR)
            .filter(|r| !r.is_empty())
    }
}

/// Build one row per group, numbered from 1 in group order
pub fn build_rows(groups: &[ComponentGroup]) -> Vec<BomRow> {
    groups
        .iter()
        .enumerate()
        .map(|(index, group)| BomRow::from_group(index + 1, group))
        .collect()
}
