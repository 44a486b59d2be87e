//! # PO Core
//!
//! 採購單、出貨、供應商與庫存的核心資料模型

pub mod config;
pub mod inventory;
pub mod order;
pub mod reference;
pub mod shipment;
pub mod supplier;

// Re-export 主要類型
pub use config::{DeskConfig, FxRates};
pub use inventory::{InventoryRecord, Warehouse};
pub use order::{
    Currency, LineItem, PoStatus, PurchaseOrder, PurchaseOrderPatch, Size, SplitState,
};
pub use reference::{build_reference, normalize_reference, parse_reference, ParsedReference};
pub use shipment::{
    Destination, ImportTaxStatus, Shipment, ShipmentChecklist, ShipmentPatch, ShipmentStatus,
    TransportMode,
};
pub use supplier::{Supplier, SupplierPatch, SupplierStatus};

/// 採購作業錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum PoError {
    #[error("欄位驗證失敗: {0}")]
    Validation(String),

    #[error("無效的採購單參考碼: {0}")]
    InvalidReference(String),

    #[error("拆單至少需要選擇一個目的地")]
    NoDestinationSelected,

    #[error("採購單已拆單: {0}")]
    AlreadySplit(String),

    #[error("採購單尚未拆單: {0}")]
    NotSplit(String),

    #[error("出貨參考碼重複: {0}")]
    DuplicateShipmentRef(String),

    #[error("數量超出範圍")]
    QuantityOverflow,

    #[error("金額超出範圍")]
    AmountOverflow,

    #[error("採購單已存在: {0}")]
    DuplicateOrder(String),

    #[error("找不到採購單: {0}")]
    OrderNotFound(String),

    #[error("找不到出貨記錄: {0}")]
    ShipmentNotFound(uuid::Uuid),

    #[error("找不到供應商: {0}")]
    SupplierNotFound(uuid::Uuid),

    #[error("資料儲存錯誤: {0}")]
    Store(String),

    #[error("配置解析錯誤: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PoError>;
