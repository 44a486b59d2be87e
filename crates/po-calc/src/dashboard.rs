//! 儀表板與出貨看板的投影計算
//!
//! 輸入為儲存讀出的紀錄清單，輸出為唯讀的彙總；不快取。

use po_core::{
    Currency, Destination, FxRates, InventoryRecord, PoError, PoStatus, PurchaseOrder, Result,
    Shipment, ShipmentStatus, Size, Supplier, Warehouse,
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::aggregation::LineAggregator;

/// 出貨看板篩選條件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShipmentFilter {
    pub status: Option<ShipmentStatus>,
    pub destination: Option<Destination>,
    /// 不分大小寫，比對出貨參考碼、供應商名稱與代碼
    pub search: Option<String>,
}

impl ShipmentFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：篩選狀態
    pub fn with_status(mut self, status: ShipmentStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// 建構器模式：篩選目的地
    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = Some(destination);
        self
    }

    /// 建構器模式：關鍵字搜尋
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    fn matches(&self, order: &PurchaseOrder, shipment: &Shipment) -> bool {
        if self.status.is_some_and(|s| s != shipment.status) {
            return false;
        }
        if self.destination.is_some_and(|d| d != shipment.destination) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                [
                    shipment.shipment_ref.as_str(),
                    order.supplier_name.as_str(),
                    order.supplier_ref.as_str(),
                ]
                .iter()
                .any(|field| field.to_lowercase().contains(&term))
            }
        }
    }
}

/// 出貨看板的一列
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShipmentRow {
    pub po_id: String,
    pub supplier_name: String,
    pub supplier_ref: String,
    pub season: String,
    pub shipment: Shipment,
}

/// 展開所有出貨並依採購單號、目的地排序
pub fn shipment_board(orders: &[PurchaseOrder], filter: &ShipmentFilter) -> Vec<ShipmentRow> {
    let mut rows: Vec<ShipmentRow> = orders
        .iter()
        .flat_map(|order| {
            order
                .shipments
                .iter()
                .filter(move |s| filter.matches(order, s))
                .map(move |s| ShipmentRow {
                    po_id: order.id.clone(),
                    supplier_name: order.supplier_name.clone(),
                    supplier_ref: order.supplier_ref.clone(),
                    season: order.season.clone(),
                    shipment: s.clone(),
                })
        })
        .collect();

    rows.sort_by(|a, b| {
        a.po_id
            .cmp(&b.po_id)
            .then_with(|| a.shipment.destination.code().cmp(b.shipment.destination.code()))
            .then_with(|| a.shipment.shipment_ref.cmp(&b.shipment.shipment_ref))
    });
    rows
}

/// 出貨狀態統計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ShipmentSummary {
    pub in_production: usize,
    pub in_transit: usize,
    pub booked_in: usize,
    /// 運送中件數
    pub units_in_transit: u64,
}

pub fn shipment_summary(orders: &[PurchaseOrder]) -> ShipmentSummary {
    orders
        .iter()
        .flat_map(|o| o.shipments.iter())
        .fold(ShipmentSummary::default(), |mut acc, s| {
            if s.status == ShipmentStatus::InProduction {
                acc.in_production += 1;
            }
            if s.status.is_in_transit() {
                acc.in_transit += 1;
                acc.units_in_transit += u64::from(s.units);
            }
            if s.status.is_booked_in() {
                acc.booked_in += 1;
            }
            acc
        })
}

/// 待拆單的採購單
pub fn pending_split(orders: &[PurchaseOrder]) -> Vec<&PurchaseOrder> {
    orders.iter().filter(|o| o.is_pending_split()).collect()
}

/// 明細總金額（換算為英鎊）
pub fn spend_summary(orders: &[PurchaseOrder], rates: &FxRates) -> Result<Decimal> {
    total_gbp(orders.iter(), rates)
}

/// 未結採購金額（英鎊），不含已收貨與已取消
pub fn outstanding_spend(orders: &[PurchaseOrder], rates: &FxRates) -> Result<Decimal> {
    total_gbp(orders.iter().filter(|o| o.status.is_outstanding()), rates)
}

fn total_gbp<'a>(
    orders: impl Iterator<Item = &'a PurchaseOrder>,
    rates: &FxRates,
) -> Result<Decimal> {
    orders.into_iter().try_fold(Decimal::ZERO, |acc, order| {
        let total = LineAggregator::order_total_in(order, Currency::Gbp, rates)?;
        acc.checked_add(total).ok_or(PoError::AmountOverflow)
    })
}

/// 採購流程中單一階段的統計
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PipelineStage {
    pub status: PoStatus,
    pub count: usize,
    /// 英鎊金額
    pub value_gbp: Decimal,
}

/// 依 [`PoStatus::PIPELINE`] 順序列出各階段的採購單數與金額
pub fn po_pipeline(orders: &[PurchaseOrder], rates: &FxRates) -> Result<Vec<PipelineStage>> {
    PoStatus::PIPELINE
        .into_iter()
        .map(|status| {
            let count = orders.iter().filter(|o| o.status == status).count();
            let value_gbp = total_gbp(orders.iter().filter(|o| o.status == status), rates)?;
            Ok(PipelineStage {
                status,
                count,
                value_gbp,
            })
        })
        .collect()
}

/// 低庫存項目
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LowStockItem {
    pub product_id: String,
    pub name: String,
    pub warehouse: Warehouse,
    pub size: Size,
    pub quantity: u32,
}

/// 庫存統計
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InventorySummary {
    pub total_units: u64,
    pub low_stock: Vec<LowStockItem>,
}

pub fn inventory_summary(records: &[InventoryRecord], threshold: u32) -> InventorySummary {
    let total_units = records.iter().map(InventoryRecord::total_units).sum();
    let low_stock = records
        .iter()
        .flat_map(|record| {
            record
                .low_stock_sizes(threshold)
                .into_iter()
                .map(move |(size, quantity)| LowStockItem {
                    product_id: record.product_id.clone(),
                    name: record.name.clone(),
                    warehouse: record.warehouse,
                    size,
                    quantity,
                })
        })
        .collect();

    InventorySummary {
        total_units,
        low_stock,
    }
}

pub fn active_supplier_count(suppliers: &[Supplier]) -> usize {
    suppliers.iter().filter(|s| s.is_active()).count()
}
