//! 應用狀態快照

use po_calc::dashboard::{
    self, InventorySummary, PipelineStage, ShipmentFilter, ShipmentRow, ShipmentSummary,
};
use po_core::{FxRates, InventoryRecord, PurchaseOrder, Result, Supplier};
use rust_decimal::Decimal;

/// 某一時點從儲存讀出的完整狀態
///
/// 由 [`crate::DeskService::refresh`] 產生；寫入後需重新讀取。
#[derive(Debug, Clone)]
pub struct DeskState {
    /// 採購單（新到舊）
    pub orders: Vec<PurchaseOrder>,
    pub suppliers: Vec<Supplier>,
    pub products: Vec<InventoryRecord>,
    pub fx_rates: FxRates,
    pub low_stock_threshold: u32,
}

impl DeskState {
    pub fn order(&self, id: &str) -> Option<&PurchaseOrder> {
        self.orders.iter().find(|o| o.id == id)
    }

    pub fn pending_split(&self) -> Vec<&PurchaseOrder> {
        dashboard::pending_split(&self.orders)
    }

    pub fn shipment_board(&self, filter: &ShipmentFilter) -> Vec<ShipmentRow> {
        dashboard::shipment_board(&self.orders, filter)
    }

    pub fn shipment_summary(&self) -> ShipmentSummary {
        dashboard::shipment_summary(&self.orders)
    }

    /// 採購總額（英鎊）
    pub fn spend_gbp(&self) -> Result<Decimal> {
        dashboard::spend_summary(&self.orders, &self.fx_rates)
    }

    /// 未結採購金額（英鎊）
    pub fn outstanding_gbp(&self) -> Result<Decimal> {
        dashboard::outstanding_spend(&self.orders, &self.fx_rates)
    }

    /// 採購流程各階段統計
    pub fn po_pipeline(&self) -> Result<Vec<PipelineStage>> {
        dashboard::po_pipeline(&self.orders, &self.fx_rates)
    }

    pub fn inventory_summary(&self) -> InventorySummary {
        dashboard::inventory_summary(&self.products, self.low_stock_threshold)
    }

    pub fn active_supplier_count(&self) -> usize {
        dashboard::active_supplier_count(&self.suppliers)
    }
}
