//! 匯入欄位推斷
//!
//! 以表頭文字推斷各欄位位置。推斷策略以 [`ColumnResolver`] 抽象，
//! 預設實作 [`RegexColumnResolver`] 以不分大小寫的正規表示式比對表頭。
//! 找不到的欄位視為缺少，由呼叫端套用預設值。

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

/// 匯入欄位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportField {
    /// 參考碼（PO# / 出貨參考碼）
    Reference,
    SupplierRef,
    SupplierName,
    Season,
    Currency,
    TotalCost,
    DepositCost,
    DepositDate,
    ExFactoryDate,
    SkusCreated,
    BarcodesSent,
    PolybagsSent,
    /// 目的地（參考碼無法判斷時的備援）
    Destination,
    Status,
    Units,
    Cartons,
    FreightForwarder,
    ShipmentDate,
    Eta,
    DeliveryDate,
    BookedInDate,
    TrackingNumber,
    TotalFreightCost,
    UnitFreightUsd,
    UnitFreightGbp,
    ImportTaxStatus,
    AddedToWarehouse,
    DeliveryBooked,
    QuantitiesVerified,
    StockOnStorefront,
}

impl ImportField {
    pub const ALL: [ImportField; 30] = [
        ImportField::Reference,
        ImportField::SupplierRef,
        ImportField::SupplierName,
        ImportField::Season,
        ImportField::Currency,
        ImportField::TotalCost,
        ImportField::DepositCost,
        ImportField::DepositDate,
        ImportField::ExFactoryDate,
        ImportField::SkusCreated,
        ImportField::BarcodesSent,
        ImportField::PolybagsSent,
        ImportField::Destination,
        ImportField::Status,
        ImportField::Units,
        ImportField::Cartons,
        ImportField::FreightForwarder,
        ImportField::ShipmentDate,
        ImportField::Eta,
        ImportField::DeliveryDate,
        ImportField::BookedInDate,
        ImportField::TrackingNumber,
        ImportField::TotalFreightCost,
        ImportField::UnitFreightUsd,
        ImportField::UnitFreightGbp,
        ImportField::ImportTaxStatus,
        ImportField::AddedToWarehouse,
        ImportField::DeliveryBooked,
        ImportField::QuantitiesVerified,
        ImportField::StockOnStorefront,
    ];

    /// 預設表頭樣式（依優先順序）
    fn default_patterns(self) -> &'static [&'static str] {
        match self {
            ImportField::Reference => &[
                r"^\s*po\s*(#|no\.?|num(ber)?|ref(erence)?)?\s*$",
                r"shipment.?ref",
                r"^\s*ref(erence)?\s*$",
            ],
            ImportField::SupplierRef => &[r"supplier.?ref"],
            ImportField::SupplierName => &[r"supplier.?name", r"^\s*supplier\s*$"],
            ImportField::Season => &[r"season"],
            ImportField::Currency => &[r"^\s*currency\s*$"],
            ImportField::TotalCost => &[r"total.?cost"],
            ImportField::DepositCost => &[r"deposit.?(cost|value|amount)", r"^\s*deposit\s*$"],
            ImportField::DepositDate => &[r"deposit.?(pay|date)"],
            ImportField::ExFactoryDate => &[r"ex.?factory", r"^\s*xf.?date"],
            ImportField::SkusCreated => &[r"skus?.?created"],
            ImportField::BarcodesSent => &[r"barcode"],
            ImportField::PolybagsSent => &[r"polybag"],
            ImportField::Destination => &[r"^\s*dc\s*$", r"destination"],
            ImportField::Status => &[r"^\s*(po\s*|shipment\s*)?status\s*$"],
            ImportField::Units => &[r"^\s*units\s*$"],
            ImportField::Cartons => &[r"carton"],
            ImportField::FreightForwarder => &[r"freight.?forward"],
            ImportField::ShipmentDate => &[r"shipment.?date", r"ship.?date"],
            ImportField::Eta => &[r"^\s*eta\s*$"],
            ImportField::DeliveryDate => &[r"delivery.?date"],
            ImportField::BookedInDate => &[r"booked.?in.?date", r"booked.?in"],
            ImportField::TrackingNumber => &[r"tracking", r"awb"],
            ImportField::TotalFreightCost => &[r"total.?freight"],
            ImportField::UnitFreightUsd => &[r"unit.*usd", r"usd"],
            ImportField::UnitFreightGbp => &[r"unit.*gbp", r"gbp.?new", r"gbp"],
            ImportField::ImportTaxStatus => &[r"import.?tax"],
            ImportField::AddedToWarehouse => &[r"added.?to.?warehouse"],
            ImportField::DeliveryBooked => &[r"delivery.?booked"],
            ImportField::QuantitiesVerified => &[r"quantit(y|ies).?verified", r"qty.?verified"],
            ImportField::StockOnStorefront => &[r"stock.?on", r"on.?shopify"],
        }
    }
}

/// 欄位位置對照表
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    columns: HashMap<ImportField, usize>,
}

impl ColumnMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：指定欄位位置
    pub fn with(mut self, field: ImportField, index: usize) -> Self {
        self.columns.insert(field, index);
        self
    }

    pub fn insert(&mut self, field: ImportField, index: usize) {
        self.columns.insert(field, index);
    }

    pub fn get(&self, field: ImportField) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    /// 取得資料列中指定欄位的值（去除空白；空字串視為缺少）
    pub fn cell<'r>(&self, row: &'r [String], field: ImportField) -> Option<&'r str> {
        self.get(field)
            .and_then(|i| row.get(i))
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    /// 找不到的欄位
    pub fn missing(&self) -> Vec<ImportField> {
        ImportField::ALL
            .into_iter()
            .filter(|f| !self.columns.contains_key(f))
            .collect()
    }
}

/// 欄位推斷策略
pub trait ColumnResolver {
    /// 推斷單一欄位的位置
    fn resolve(&self, headers: &[String], field: ImportField) -> Option<usize>;

    /// 推斷所有欄位
    fn column_map(&self, headers: &[String]) -> ColumnMap {
        let mut map = ColumnMap::new();
        for field in ImportField::ALL {
            if let Some(index) = self.resolve(headers, field) {
                map.insert(field, index);
            }
        }
        map
    }
}

impl<R: ColumnResolver + ?Sized> ColumnResolver for &R {
    fn resolve(&self, headers: &[String], field: ImportField) -> Option<usize> {
        (**self).resolve(headers, field)
    }
}

/// 固定對照表：直接使用已知的欄位位置
impl ColumnResolver for ColumnMap {
    fn resolve(&self, headers: &[String], field: ImportField) -> Option<usize> {
        self.get(field).filter(|i| *i < headers.len())
    }
}

pub(crate) fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

static DEFAULT_PATTERNS: LazyLock<HashMap<ImportField, Vec<Regex>>> = LazyLock::new(|| {
    ImportField::ALL
        .into_iter()
        .map(|field| {
            let patterns = field
                .default_patterns()
                .iter()
                .map(|p| compile(p).expect("default header pattern is valid"))
                .collect();
            (field, patterns)
        })
        .collect()
});

/// 正規表示式欄位推斷
///
/// 每個欄位可有多個樣式，依序嘗試；同一樣式取第一個符合的表頭。
#[derive(Debug, Clone)]
pub struct RegexColumnResolver {
    patterns: HashMap<ImportField, Vec<Regex>>,
}

impl Default for RegexColumnResolver {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_PATTERNS.clone(),
        }
    }
}

impl RegexColumnResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：以自訂樣式取代某欄位的預設樣式
    pub fn with_pattern(mut self, field: ImportField, pattern: &str) -> Result<Self, regex::Error> {
        self.patterns.insert(field, vec![compile(pattern)?]);
        Ok(self)
    }
}

impl ColumnResolver for RegexColumnResolver {
    fn resolve(&self, headers: &[String], field: ImportField) -> Option<usize> {
        self.patterns.get(&field)?.iter().find_map(|re| {
            headers.iter().position(|h| re.is_match(h))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn headers() -> Vec<String> {
        [
            "PO#",
            "Supplier Ref",
            "PO Status",
            "DC",
            "Units",
            "Cartons",
            "Freight Forwarder",
            "Shipment Date",
            "ETA",
            "Total Freight Cost (USD)",
            "Unit Freight Cost USD",
            "Unit Freight Cost GBP",
            "Import Tax Status",
            "Tracking #",
            "Delivery Date",
            "Booked in Date",
            "Total Cost Value",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    #[rstest]
    #[case(ImportField::Reference, Some(0))]
    #[case(ImportField::SupplierRef, Some(1))]
    #[case(ImportField::Status, Some(2))]
    #[case(ImportField::Destination, Some(3))]
    #[case(ImportField::Units, Some(4))]
    #[case(ImportField::Eta, Some(8))]
    #[case(ImportField::TotalFreightCost, Some(9))]
    #[case(ImportField::UnitFreightUsd, Some(10))]
    #[case(ImportField::UnitFreightGbp, Some(11))]
    #[case(ImportField::ImportTaxStatus, Some(12))]
    #[case(ImportField::TrackingNumber, Some(13))]
    #[case(ImportField::BookedInDate, Some(15))]
    #[case(ImportField::TotalCost, Some(16))]
    #[case(ImportField::Season, None)]
    fn test_default_resolution(#[case] field: ImportField, #[case] expected: Option<usize>) {
        let resolver = RegexColumnResolver::default();
        assert_eq!(resolver.resolve(&headers(), field), expected);
    }

    #[test]
    fn test_missing_fields_are_reported() {
        let map = RegexColumnResolver::default().column_map(&headers());
        let missing = map.missing();

        assert!(missing.contains(&ImportField::Season));
        assert!(missing.contains(&ImportField::SkusCreated));
        assert!(!missing.contains(&ImportField::Units));
    }

    #[test]
    fn test_custom_pattern() {
        let resolver = RegexColumnResolver::new()
            .with_pattern(ImportField::Units, r"^qty$")
            .unwrap();
        let headers = vec!["Ref".to_string(), "QTY".to_string()];

        assert_eq!(resolver.resolve(&headers, ImportField::Units), Some(1));
        assert!(RegexColumnResolver::new()
            .with_pattern(ImportField::Units, "(")
            .is_err());
    }

    #[test]
    fn test_fixed_map_resolver() {
        let map = ColumnMap::new()
            .with(ImportField::Reference, 2)
            .with(ImportField::Units, 7);
        let headers = vec!["a".to_string(), "b".to_string(), "c".to_string()];

        assert_eq!(map.resolve(&headers, ImportField::Reference), Some(2));
        // 超出表頭範圍
        assert_eq!(map.resolve(&headers, ImportField::Units), None);
    }

    #[test]
    fn test_cell_trims_and_skips_blank() {
        let map = ColumnMap::new()
            .with(ImportField::Season, 0)
            .with(ImportField::Units, 1);
        let row = vec!["  AW25 ".to_string(), "   ".to_string()];

        assert_eq!(map.cell(&row, ImportField::Season), Some("AW25"));
        assert_eq!(map.cell(&row, ImportField::Units), None);
        assert_eq!(map.cell(&row, ImportField::Eta), None);
    }
}
