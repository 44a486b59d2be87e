//! # PO Store
//!
//! 紀錄儲存邊界：核心只依賴 [`RecordStore`] 的操作，實際後端由外部提供。

pub mod memory;

// Re-export 主要類型
pub use memory::InMemoryStore;

use po_core::{
    InventoryRecord, PurchaseOrder, PurchaseOrderPatch, Result, Shipment, ShipmentPatch,
    Supplier, SupplierPatch,
};
use uuid::Uuid;

/// 紀錄儲存介面
///
/// 所有操作皆為同步，寫入採最後寫入者為準。
pub trait RecordStore {
    /// 列出所有採購單（含明細與出貨）
    fn list_purchase_orders(&self) -> Result<Vec<PurchaseOrder>>;

    fn get_purchase_order(&self, id: &str) -> Result<Option<PurchaseOrder>>;

    /// 建立採購單，連同其明細與出貨一併寫入（全有或全無）
    fn create_purchase_order(&mut self, order: PurchaseOrder) -> Result<PurchaseOrder>;

    fn update_purchase_order(&mut self, id: &str, patch: PurchaseOrderPatch)
        -> Result<PurchaseOrder>;

    fn update_shipment(&mut self, id: Uuid, patch: ShipmentPatch) -> Result<Shipment>;

    /// 為既有採購單新增一筆出貨
    fn add_shipment(&mut self, shipment: Shipment) -> Result<Shipment>;

    /// 寫入拆單產生的出貨並將採購單轉為已拆單（單一工作單元）
    fn commit_split(&mut self, id: &str, shipments: Vec<Shipment>) -> Result<PurchaseOrder>;

    fn list_suppliers(&self) -> Result<Vec<Supplier>>;

    fn create_supplier(&mut self, supplier: Supplier) -> Result<Supplier>;

    fn update_supplier(&mut self, id: Uuid, patch: SupplierPatch) -> Result<Supplier>;

    fn delete_supplier(&mut self, id: Uuid) -> Result<()>;

    /// 庫存快照（唯讀）
    fn list_products(&self) -> Result<Vec<InventoryRecord>>;
}
