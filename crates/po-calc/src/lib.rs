//! # PO Calculation Engine
//!
//! 拆單、彙總與試算表匯入對帳

pub mod aggregation;
pub mod cells;
pub mod columns;
pub mod dashboard;
pub mod lines;
pub mod reconciler;
pub mod split;

// Re-export 主要類型
pub use aggregation::{DestinationUnits, LineAggregator, UnitVariance};
pub use columns::{ColumnMap, ColumnResolver, ImportField, RegexColumnResolver};
pub use dashboard::{
    InventorySummary, LowStockItem, PipelineStage, ShipmentFilter, ShipmentRow, ShipmentSummary,
};
pub use lines::{LineField, LineImport, LineItemImporter};
pub use reconciler::{ImportGroup, ImportReconciler, Sheet};
pub use split::{SplitPlan, SplitPlanner, SplitSelection};

use serde::{Deserialize, Serialize};

/// 匯入結果
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportReport {
    /// 讀入的資料列數（不含表頭）
    pub rows_loaded: usize,

    /// 成功建立的採購單號
    pub created: Vec<String>,

    /// 寫入失敗而略過的採購單
    pub skipped: Vec<SkippedOrder>,

    /// 警告信息
    pub warnings: Vec<ImportWarning>,
}

impl ImportReport {
    /// 創建空的匯入結果
    pub fn empty() -> Self {
        Self::default()
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: ImportWarning) {
        self.warnings.push(warning);
    }

    /// 是否所有採購單都已寫入
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// 寫入失敗的採購單
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedOrder {
    pub order_id: String,
    pub reason: String,
}

/// 匯入警告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportWarning {
    /// 資料列號（1 起算，表頭為第 0 列）
    pub row: usize,
    pub message: String,
    pub severity: WarningSeverity,
}

impl ImportWarning {
    pub fn new(row: usize, message: String, severity: WarningSeverity) -> Self {
        Self {
            row,
            message,
            severity,
        }
    }

    pub fn info(row: usize, message: String) -> Self {
        Self::new(row, message, WarningSeverity::Info)
    }

    pub fn warning(row: usize, message: String) -> Self {
        Self::new(row, message, WarningSeverity::Warning)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningSeverity {
    Info,
    Warning,
}
