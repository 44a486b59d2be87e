//! 採購明細試算表匯入
//!
//! 產品明細表（每列一個產品尺寸）轉為新採購單的明細。

use std::collections::HashMap;
use std::sync::LazyLock;

use po_core::{LineItem, Size};
use regex::Regex;
use rust_decimal::Decimal;

use crate::cells::{parse_decimal, parse_units};
use crate::columns::compile;
use crate::reconciler::Sheet;
use crate::ImportWarning;

/// 明細欄位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineField {
    ProductName,
    Size,
    CostPrice,
    DesignRef,
    ColourCode,
    Sku,
    QtyUk,
    QtyUsa,
    ConfirmedXf,
}

static LINE_PATTERNS: LazyLock<Vec<(LineField, Regex)>> = LazyLock::new(|| {
    [
        (LineField::ProductName, r"product|name"),
        (LineField::Size, r"^\s*size\s*$"),
        (LineField::CostPrice, r"cost|price"),
        (LineField::DesignRef, r"design|ref"),
        (LineField::ColourCode, r"colou?r|code"),
        (LineField::Sku, r"^\s*sku\s*$"),
        (LineField::QtyUk, r"uk.?(qty|quant)"),
        (LineField::QtyUsa, r"usa?.?(qty|quant)"),
        (LineField::ConfirmedXf, r"confirm|xf|booking"),
    ]
    .into_iter()
    .map(|(field, pattern)| (field, compile(pattern).expect("line header pattern is valid")))
    .collect()
});

/// 明細匯入結果
#[derive(Debug, Clone, Default)]
pub struct LineImport {
    pub lines: Vec<LineItem>,
    pub warnings: Vec<ImportWarning>,
}

/// 明細匯入器
pub struct LineItemImporter;

impl LineItemImporter {
    /// 推斷欄位位置（第一個符合的表頭）
    pub fn resolve(headers: &[String]) -> HashMap<LineField, usize> {
        LINE_PATTERNS
            .iter()
            .filter_map(|(field, re)| {
                headers
                    .iter()
                    .position(|h| re.is_match(h))
                    .map(|index| (*field, index))
            })
            .collect()
    }

    /// 解析明細；沒有產品名稱的資料列略過
    pub fn parse(sheet: &Sheet) -> LineImport {
        let columns = Self::resolve(&sheet.headers);
        let mut import = LineImport::default();

        for (i, row) in sheet.rows.iter().enumerate() {
            let row_no = i + 1;
            let cell = |field: LineField| {
                columns
                    .get(&field)
                    .and_then(|index| row.get(*index))
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
            };

            let Some(product_name) = cell(LineField::ProductName) else {
                continue;
            };

            let size = match cell(LineField::Size) {
                None => Size::default(),
                Some(raw) => raw.parse::<Size>().unwrap_or_else(|e| {
                    import
                        .warnings
                        .push(ImportWarning::warning(row_no, format!("{e}，改用 M")));
                    Size::default()
                }),
            };

            let cost_price = match cell(LineField::CostPrice).map(parse_decimal) {
                None | Some(Ok(None)) => Decimal::ZERO,
                Some(Ok(Some(value))) => value,
                Some(Err(e)) => {
                    import
                        .warnings
                        .push(ImportWarning::warning(row_no, format!("{e}，以 0 計")));
                    Decimal::ZERO
                }
            };

            let mut quantity = |field: LineField| match cell(field).map(parse_units) {
                None | Some(Ok(None)) => 0,
                Some(Ok(Some(value))) => value,
                Some(Err(e)) => {
                    import
                        .warnings
                        .push(ImportWarning::warning(row_no, format!("{e}，以 0 計")));
                    0
                }
            };
            let qty_uk = quantity(LineField::QtyUk);
            let qty_usa = quantity(LineField::QtyUsa);
            let confirmed_xf = quantity(LineField::ConfirmedXf);

            let mut line = LineItem::new(product_name.to_string(), size, cost_price)
                .with_quantities(qty_uk, qty_usa)
                .with_confirmed_xf(confirmed_xf);
            line.design_ref = cell(LineField::DesignRef).unwrap_or_default().to_string();
            line.colour_code = cell(LineField::ColourCode).unwrap_or_default().to_string();
            line.sku = cell(LineField::Sku).unwrap_or_default().to_string();

            if let Err(e) = line.line_total() {
                import
                    .warnings
                    .push(ImportWarning::warning(row_no, format!("{e}，單價以 0 計")));
                line.cost_price = Decimal::ZERO;
            }
            import.lines.push(line);
        }

        tracing::info!(
            "明細匯入：{} 列，{} 筆明細",
            sheet.len(),
            import.lines.len()
        );
        import
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> Sheet {
        Sheet::from_rows(
            [
                vec!["Product Name", "Size", "Cost Price", "Design Ref.", "Colour Code", "SKU", "UK Quantity", "USA Quantity", "Confirmed XF @ Booking"],
                vec!["Wide Leg Jean", "S", "$14.00", "WLJ-01", "IND", "WLJ01-IND-S", "70", "30", "98"],
                vec!["Wide Leg Jean", "4XL", "14", "", "", "", "1,000", "-2", ""],
                vec!["", "M", "14", "", "", "", "5", "5", ""],
            ]
            .into_iter()
            .map(|r| r.into_iter().map(str::to_string).collect())
            .collect(),
        )
    }

    #[test]
    fn test_resolve_line_columns() {
        let columns = LineItemImporter::resolve(&sheet().headers);
        assert_eq!(columns.get(&LineField::ProductName), Some(&0));
        assert_eq!(columns.get(&LineField::DesignRef), Some(&3));
        assert_eq!(columns.get(&LineField::ColourCode), Some(&4));
        assert_eq!(columns.get(&LineField::QtyUk), Some(&6));
        assert_eq!(columns.get(&LineField::QtyUsa), Some(&7));
        assert_eq!(columns.get(&LineField::ConfirmedXf), Some(&8));
    }

    #[test]
    fn test_parse_lines() {
        let import = LineItemImporter::parse(&sheet());

        assert_eq!(import.lines.len(), 2);
        let first = &import.lines[0];
        assert_eq!(first.size, Size::S);
        assert_eq!(first.cost_price, Decimal::from(14));
        assert_eq!(first.sku, "WLJ01-IND-S");
        assert_eq!(first.total_units(), 100);
        assert_eq!(first.confirmed_xf, 98);

        let second = &import.lines[1];
        assert_eq!(second.size, Size::M);
        assert_eq!(second.qty_uk, 1000);
        assert_eq!(second.qty_usa, 0);
        assert_eq!(import.warnings.len(), 2);
        assert!(import.warnings.iter().all(|w| w.row == 2));
    }

    #[test]
    fn test_extreme_price_is_zeroed() {
        let sheet = Sheet::from_rows(
            [
                vec!["Product Name", "Cost Price", "UK Quantity", "USA Quantity"],
                vec!["Tee", "79228162514264337593543950335", "2", "0"],
                vec!["Tee", "79228162514264337593543950335", "1", "0"],
            ]
            .into_iter()
            .map(|r| r.into_iter().map(str::to_string).collect())
            .collect(),
        );

        let import = LineItemImporter::parse(&sheet);
        assert_eq!(import.lines.len(), 2);
        assert_eq!(import.lines[0].cost_price, Decimal::ZERO);
        assert_eq!(import.lines[1].cost_price, Decimal::MAX);
        assert_eq!(import.warnings.len(), 1);
        assert_eq!(import.warnings[0].row, 1);
    }
}
