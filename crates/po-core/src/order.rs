//! 採購單模型

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shipment::{Destination, Shipment};
use crate::{PoError, Result};

/// 幣別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Gbp,
    Eur,
    #[default]
    Usd,
}

impl Currency {
    pub fn code(self) -> &'static str {
        match self {
            Currency::Gbp => "GBP",
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Currency::Gbp => "£",
            Currency::Eur => "€",
            Currency::Usd => "$",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GBP" | "£" => Ok(Currency::Gbp),
            "EUR" | "€" => Ok(Currency::Eur),
            "USD" | "$" => Ok(Currency::Usd),
            other => Err(format!("未知的幣別: {other}")),
        }
    }
}

/// 成衣尺寸
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Size {
    Xs,
    S,
    #[default]
    M,
    L,
    Xl,
    Xxl,
}

impl Size {
    pub const ALL: [Size; 6] = [Size::Xs, Size::S, Size::M, Size::L, Size::Xl, Size::Xxl];

    pub fn code(self) -> &'static str {
        match self {
            Size::Xs => "XS",
            Size::S => "S",
            Size::M => "M",
            Size::L => "L",
            Size::Xl => "XL",
            Size::Xxl => "XXL",
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Size {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|size| size.code().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("未知的尺寸: {wanted}"))
    }
}

/// 採購單狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PoStatus {
    #[default]
    Draft,
    Sent,
    Confirmed,
    #[serde(rename = "In Production")]
    InProduction,
    Shipped,
    Received,
    Cancelled,
}

impl PoStatus {
    pub const ALL: [PoStatus; 7] = [
        PoStatus::Draft,
        PoStatus::Sent,
        PoStatus::Confirmed,
        PoStatus::InProduction,
        PoStatus::Shipped,
        PoStatus::Received,
        PoStatus::Cancelled,
    ];

    /// 儀表板採購流程的階段
    pub const PIPELINE: [PoStatus; 4] = [
        PoStatus::Sent,
        PoStatus::Confirmed,
        PoStatus::InProduction,
        PoStatus::Shipped,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PoStatus::Draft => "Draft",
            PoStatus::Sent => "Sent",
            PoStatus::Confirmed => "Confirmed",
            PoStatus::InProduction => "In Production",
            PoStatus::Shipped => "Shipped",
            PoStatus::Received => "Received",
            PoStatus::Cancelled => "Cancelled",
        }
    }

    /// 尚未收貨且未取消
    pub fn is_outstanding(self) -> bool {
        !matches!(self, PoStatus::Received | PoStatus::Cancelled)
    }
}

impl fmt::Display for PoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PoStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("未知的採購單狀態: {wanted}"))
    }
}

/// 拆單狀態
///
/// 只有一個轉移：`Unsplit -> Split`，`Split` 為終態。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SplitState {
    #[default]
    Unsplit,
    Split,
}

/// 採購明細
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineItem {
    pub id: Uuid,

    pub product_name: String,

    pub size: Size,

    /// 單件成本
    pub cost_price: Decimal,

    /// 設計編號
    pub design_ref: String,

    /// 顏色代碼
    pub colour_code: String,

    pub sku: String,

    /// 英國配送中心數量
    pub qty_uk: u32,

    /// 美國配送中心數量
    pub qty_usa: u32,

    /// 出廠確認數量
    pub confirmed_xf: u32,
}

impl LineItem {
    /// 創建新的採購明細
    pub fn new(product_name: String, size: Size, cost_price: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_name,
            size,
            cost_price,
            ..Default::default()
        }
    }

    /// 建構器模式：設置各配送中心數量
    pub fn with_quantities(mut self, qty_uk: u32, qty_usa: u32) -> Self {
        self.qty_uk = qty_uk;
        self.qty_usa = qty_usa;
        self
    }

    /// 建構器模式：設置 SKU
    pub fn with_sku(mut self, sku: String) -> Self {
        self.sku = sku;
        self
    }

    /// 建構器模式：設置出廠確認數量
    pub fn with_confirmed_xf(mut self, confirmed_xf: u32) -> Self {
        self.confirmed_xf = confirmed_xf;
        self
    }

    /// 總數量（英國 + 美國）
    pub fn total_units(&self) -> u64 {
        u64::from(self.qty_uk) + u64::from(self.qty_usa)
    }

    /// 指定目的地的數量
    pub fn units_for(&self, destination: Destination) -> u32 {
        match destination {
            Destination::Uk => self.qty_uk,
            Destination::Us => self.qty_usa,
        }
    }

    /// 明細金額，每次呼叫重新計算，不儲存
    pub fn line_total(&self) -> Result<Decimal> {
        Decimal::from(self.total_units())
            .checked_mul(self.cost_price)
            .ok_or(PoError::AmountOverflow)
    }
}

/// 採購單
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    /// 採購單號（`PO-<年>-<序號>` 或基礎參考碼，如 `GWG049`）
    pub id: String,

    /// 供應商代碼
    pub supplier_ref: String,

    pub supplier_name: String,

    /// 季節，如 `AW25`
    pub season: String,

    pub currency: Currency,

    #[serde(default)]
    pub status: PoStatus,

    /// 出廠日
    pub ex_factory_date: Option<NaiveDate>,

    /// 總成本
    pub total_cost_value: Decimal,

    /// 訂金
    pub deposit_value: Decimal,

    pub deposit_date: Option<NaiveDate>,

    /// SKU 已建立
    pub skus_created: bool,

    /// 條碼已寄送
    pub barcodes_sent: bool,

    /// 包裝袋已寄送
    pub polybags_sent: bool,

    pub split_state: SplitState,

    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,

    /// 採購明細
    pub lines: Vec<LineItem>,

    /// 出貨
    pub shipments: Vec<Shipment>,
}

impl PurchaseOrder {
    /// 創建新的採購單（未拆單、無明細）
    pub fn new(id: String, supplier_name: String) -> Self {
        Self {
            id,
            supplier_ref: String::new(),
            supplier_name,
            season: String::new(),
            currency: Currency::default(),
            status: PoStatus::Draft,
            ex_factory_date: None,
            total_cost_value: Decimal::ZERO,
            deposit_value: Decimal::ZERO,
            deposit_date: None,
            skus_created: false,
            barcodes_sent: false,
            polybags_sent: false,
            split_state: SplitState::Unsplit,
            notes: None,
            created_at: Utc::now(),
            lines: Vec::new(),
            shipments: Vec::new(),
        }
    }

    /// 產生流水採購單號，如 `PO-2025-007`
    pub fn generated_id(prefix: &str, year: i32, sequence: usize, width: usize) -> String {
        format!("{prefix}-{year}-{sequence:0width$}")
    }

    /// 建構器模式：設置供應商代碼
    pub fn with_supplier_ref(mut self, supplier_ref: String) -> Self {
        self.supplier_ref = supplier_ref;
        self
    }

    /// 建構器模式：設置季節
    pub fn with_season(mut self, season: String) -> Self {
        self.season = season;
        self
    }

    /// 建構器模式：設置幣別
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// 建構器模式：設置狀態
    pub fn with_status(mut self, status: PoStatus) -> Self {
        self.status = status;
        self
    }

    /// 建構器模式：設置出廠日
    pub fn with_ex_factory_date(mut self, date: NaiveDate) -> Self {
        self.ex_factory_date = Some(date);
        self
    }

    /// 建構器模式：設置明細
    pub fn with_lines(mut self, lines: Vec<LineItem>) -> Self {
        self.lines = lines;
        self
    }

    /// 唯一的「待拆單」判斷
    pub fn is_pending_split(&self) -> bool {
        self.split_state == SplitState::Unsplit
    }

    pub fn po_splits_confirmed(&self) -> bool {
        self.split_state == SplitState::Split
    }

    /// 執行 `Unsplit -> Split` 轉移
    pub fn mark_split(&mut self) -> Result<()> {
        if self.split_state == SplitState::Split {
            return Err(PoError::AlreadySplit(self.id.clone()));
        }
        self.split_state = SplitState::Split;
        Ok(())
    }

    /// 查找指定參考碼的出貨
    pub fn shipment_by_ref(&self, shipment_ref: &str) -> Option<&Shipment> {
        self.shipments.iter().find(|s| s.shipment_ref == shipment_ref)
    }

    /// 套用表頭欄位更新
    pub fn apply(&mut self, patch: PurchaseOrderPatch) {
        let PurchaseOrderPatch {
            supplier_ref,
            supplier_name,
            season,
            currency,
            status,
            ex_factory_date,
            total_cost_value,
            deposit_value,
            deposit_date,
            skus_created,
            barcodes_sent,
            polybags_sent,
            notes,
        } = patch;

        if let Some(v) = supplier_ref {
            self.supplier_ref = v;
        }
        if let Some(v) = supplier_name {
            self.supplier_name = v;
        }
        if let Some(v) = season {
            self.season = v;
        }
        if let Some(v) = currency {
            self.currency = v;
        }
        if let Some(v) = status {
            self.status = v;
        }
        if let Some(v) = ex_factory_date {
            self.ex_factory_date = Some(v);
        }
        if let Some(v) = total_cost_value {
            self.total_cost_value = v;
        }
        if let Some(v) = deposit_value {
            self.deposit_value = v;
        }
        if let Some(v) = deposit_date {
            self.deposit_date = Some(v);
        }
        if let Some(v) = skus_created {
            self.skus_created = v;
        }
        if let Some(v) = barcodes_sent {
            self.barcodes_sent = v;
        }
        if let Some(v) = polybags_sent {
            self.polybags_sent = v;
        }
        if let Some(v) = notes {
            self.notes = Some(v);
        }
    }
}

/// 採購單表頭更新
///
/// 不含拆單狀態，拆單只能透過拆單轉移完成。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PurchaseOrderPatch {
    pub supplier_ref: Option<String>,
    pub supplier_name: Option<String>,
    pub season: Option<String>,
    pub currency: Option<Currency>,
    pub status: Option<PoStatus>,
    pub ex_factory_date: Option<NaiveDate>,
    pub total_cost_value: Option<Decimal>,
    pub deposit_value: Option<Decimal>,
    pub deposit_date: Option<NaiveDate>,
    pub skus_created: Option<bool>,
    pub barcodes_sent: Option<bool>,
    pub polybags_sent: Option<bool>,
    pub notes: Option<String>,
}
