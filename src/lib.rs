//! # PO Desk
//!
//! 服飾品牌的採購單拆單、出貨追蹤與試算表匯入
//!
//! ## 模組
//!
//! - `po-core`: 資料模型、參考碼解析、配置
//! - `po-calc`: 拆單、彙總、匯入對帳、儀表板
//! - `po-store`: 紀錄儲存介面與記憶體實作

pub mod service;
pub mod state;

pub use service::{DeskService, NewPurchaseOrder};
pub use state::DeskState;

pub use po_calc;
pub use po_core;
pub use po_store;
