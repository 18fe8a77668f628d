//! Cell styling rules
//!
//! Styling is a separate pass over a finished [`SheetLayout`]: it assigns a
//! [`CellStyle`] to every cell in the used range and sets fixed column widths.
//! Content is never touched.

use netbom_core::{FixedColumn, Palette};

use crate::layout::{fixed_column_width, ColumnLayout, Region, SheetLayout};

/// Border line weight on one edge
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BorderWeight {
    #[default]
    None,
    Thin,
    Medium,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Borders {
    pub top: BorderWeight,
    pub right: BorderWeight,
    pub bottom: BorderWeight,
    pub left: BorderWeight,
}

impl Borders {
    pub const fn all(weight: BorderWeight) -> Self {
        Self {
            top: weight,
            right: weight,
            bottom: weight,
            left: weight,
        }
    }

    pub fn is_none(&self) -> bool {
        *self == Self::default()
    }
}

/// Presentation of one cell, hashable so equal styles share one format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CellStyle {
    /// `0xRRGGBB` background
    pub fill: Option<u32>,
    pub border: Borders,
    pub centered: bool,
}

impl CellStyle {
    fn header(fill: u32) -> Self {
        Self {
            fill: Some(fill),
            border: Borders::all(BorderWeight::Thin),
            centered: true,
        }
    }

    fn banded(fill: u32) -> Self {
        Self {
            fill: Some(fill),
            border: Borders::all(BorderWeight::Thin),
            centered: false,
        }
    }

    fn filled(fill: u32) -> Self {
        Self {
            fill: Some(fill),
            ..Self::default()
        }
    }
}

/// Style of the cell at column `col` in a row of `region`.
///
/// - header rows: header fill, thin borders, centered
/// - second header row: medium bottom edge under every label
/// - BOM rows: alternating light/dark fill starting with light, thin borders
/// - footer: fill only
/// - a medium left edge opens each vendor block, except in the footer
pub fn style_for(region: Region, columns: &ColumnLayout, col: u16, palette: &Palette) -> CellStyle {
    let mut style = match region {
        Region::Header => CellStyle::header(palette.header),
        Region::HeaderSubRow => {
            let mut style = CellStyle::header(palette.header);
            style.border.bottom = BorderWeight::Medium;
            style
        }
        Region::Data { index } => {
            let fill = if index % 2 == 0 {
                palette.row_light
            } else {
                palette.row_dark
            };
            CellStyle::banded(fill)
        }
        Region::Footer => return CellStyle::filled(palette.footer),
    };

    if columns.is_vendor_start(col) {
        style.border.left = BorderWeight::Medium;
    }
    style
}

/// Style every cell of the used range and size the fixed columns
pub fn apply_styles(layout: &mut SheetLayout, palette: &Palette) {
    let columns = layout.columns();

    for row in 0..=layout.footer_row() {
        let Some(region) = layout.region(row) else {
            continue;
        };
        for col in 0..columns.total_columns() {
            *layout.style_mut(row, col) = style_for(region, &columns, col, palette);
        }
    }

    for column in FixedColumn::ALL {
        layout.set_column_width(columns.column(column), fixed_column_width(column.label()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::CellValue;
    use netbom_core::{BomConfig, BomRow};
    use pretty_assertions::assert_eq;

    fn rows(n: usize) -> Vec<BomRow> {
        (1..=n)
            .map(|i| BomRow {
                item_id: i,
                quantity: 1,
                references: format!("R{i}"),
                value: "10k".into(),
                display_name: "Device:R".into(),
                footprint: "R_0402".into(),
                datasheet: String::new(),
                dnp: String::new(),
            })
            .collect()
    }

    fn styled(n: usize) -> SheetLayout {
        let config = BomConfig::default().vendors(["Mouser", "Digikey"]);
        let mut layout = SheetLayout::generate(&rows(n), &config).unwrap();
        apply_styles(&mut layout, &Palette::default());
        layout
    }

    fn style(layout: &SheetLayout, row: u32, col: u16) -> CellStyle {
        layout.cell(row, col).map(|c| c.style).unwrap_or_default()
    }

    #[test]
    fn header_cells_are_filled_and_centered() {
        let layout = styled(1);
        let palette = Palette::default();

        for col in 0..layout.columns().total_columns() {
            for row in 0..2 {
                let s = style(&layout, row, col);
                assert_eq!(s.fill, Some(palette.header), "({row}, {col})");
                assert!(s.centered);
                assert_eq!(s.border.top, BorderWeight::Thin);
            }
            assert_eq!(style(&layout, 1, col).border.bottom, BorderWeight::Medium);
        }
    }

    #[test]
    fn vendor_blocks_open_with_medium_left_edge() {
        let layout = styled(2);

        for row in 0..4 {
            assert_eq!(style(&layout, row, 8).border.left, BorderWeight::Medium);
            assert_eq!(style(&layout, row, 11).border.left, BorderWeight::Medium);
            assert_eq!(style(&layout, row, 9).border.left, BorderWeight::Thin);
            assert_eq!(style(&layout, row, 7).border.left, BorderWeight::Thin);
        }
    }

    #[test]
    fn data_rows_alternate_starting_light() {
        let layout = styled(3);
        let palette = Palette::default();

        assert_eq!(style(&layout, 2, 0).fill, Some(palette.row_light));
        assert_eq!(style(&layout, 3, 0).fill, Some(palette.row_dark));
        assert_eq!(style(&layout, 4, 13).fill, Some(palette.row_light));
        assert_eq!(style(&layout, 3, 5).border, Borders::all(BorderWeight::Thin));
    }

    #[test]
    fn footer_is_filled_across_all_columns() {
        let layout = styled(2);
        let palette = Palette::default();
        let footer = layout.footer_row();

        for col in 0..layout.columns().total_columns() {
            let s = style(&layout, footer, col);
            assert_eq!(s.fill, Some(palette.footer));
            assert!(s.border.is_none());
        }
    }

    #[test]
    fn styling_leaves_content_alone() {
        let config = BomConfig::default().vendors(["Mouser", "Digikey"]);
        let plain = SheetLayout::generate(&rows(3), &config).unwrap();
        let mut styled = plain.clone();
        apply_styles(&mut styled, &Palette::default());

        for row in 0..=plain.footer_row() {
            for col in 0..plain.columns().total_columns() {
                assert_eq!(plain.value(row, col), styled.value(row, col), "({row}, {col})");
            }
        }
        assert_eq!(plain.merges(), styled.merges());
        assert_eq!(styled.value(2, 9), &CellValue::Formula("=B3*I3".into()));
    }

    #[test]
    fn fixed_columns_get_label_widths() {
        let layout = styled(0);
        let widths: Vec<(u16, f64)> = layout.column_widths().collect();

        assert_eq!(widths.len(), 8);
        assert_eq!(widths[0], (0, 6.0));
        assert_eq!(widths[2], (2, 16.0));
    }

    #[test]
    fn custom_palette_is_used() {
        let palette = Palette {
            header: 0x112233,
            footer: 0x445566,
            ..Palette::default()
        };
        let columns = ColumnLayout::new(1, 3).unwrap();

        assert_eq!(style_for(Region::Header, &columns, 0, &palette).fill, Some(0x112233));
        assert_eq!(style_for(Region::Footer, &columns, 8, &palette).fill, Some(0x445566));
        assert_eq!(
            style_for(Region::Footer, &columns, 8, &palette).border.left,
            BorderWeight::None
        );
    }
}
