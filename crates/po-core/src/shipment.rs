//! 出貨模型

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 配送中心（目的地）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Destination {
    /// 英國配送中心
    #[serde(rename = "UK")]
    Uk,
    /// 美國配送中心
    #[serde(rename = "US")]
    Us,
}

impl Destination {
    pub const ALL: [Destination; 2] = [Destination::Uk, Destination::Us];

    /// 目的地代碼
    pub fn code(self) -> &'static str {
        match self {
            Destination::Uk => "UK",
            Destination::Us => "US",
        }
    }

    /// 組成出貨參考碼時使用的代碼（美國沿用檔案慣例 `USA`）
    pub fn reference_code(self) -> &'static str {
        match self {
            Destination::Uk => "UK",
            Destination::Us => "USA",
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Destination {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UK" | "GB" => Ok(Destination::Uk),
            "US" | "USA" => Ok(Destination::Us),
            other => Err(format!("未知的目的地: {other}")),
        }
    }
}

/// 運輸方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransportMode {
    /// 海運（預設）
    #[default]
    Sea,
    /// 空運
    Air,
    /// 陸運
    Truck,
}

impl TransportMode {
    pub fn code(self) -> &'static str {
        match self {
            TransportMode::Sea => "SEA",
            TransportMode::Air => "AIR",
            TransportMode::Truck => "TRUCK",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// 出貨狀態
///
/// 依序為預期的推進順序，但任何狀態都可隨時設定，不做轉移驗證。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShipmentStatus {
    #[default]
    #[serde(rename = "In production")]
    InProduction,
    #[serde(rename = "In transit - awaiting freight info")]
    InTransit,
    #[serde(rename = "Receipt in progress")]
    ReceiptInProgress,
    #[serde(rename = "Delivered")]
    Delivered,
    #[serde(rename = "Booked in & checked")]
    BookedInChecked,
    #[serde(rename = "Delivered + booked in")]
    DeliveredBookedIn,
}

impl ShipmentStatus {
    pub const ALL: [ShipmentStatus; 6] = [
        ShipmentStatus::InProduction,
        ShipmentStatus::InTransit,
        ShipmentStatus::ReceiptInProgress,
        ShipmentStatus::Delivered,
        ShipmentStatus::BookedInChecked,
        ShipmentStatus::DeliveredBookedIn,
    ];

    /// 顯示標籤（與匯入檔案中的文字一致）
    pub fn label(self) -> &'static str {
        match self {
            ShipmentStatus::InProduction => "In production",
            ShipmentStatus::InTransit => "In transit - awaiting freight info",
            ShipmentStatus::ReceiptInProgress => "Receipt in progress",
            ShipmentStatus::Delivered => "Delivered",
            ShipmentStatus::BookedInChecked => "Booked in & checked",
            ShipmentStatus::DeliveredBookedIn => "Delivered + booked in",
        }
    }

    /// 階段序號（0 起算）
    pub fn stage(self) -> usize {
        Self::ALL
            .iter()
            .position(|s| *s == self)
            .unwrap_or_default()
    }

    pub fn is_in_transit(self) -> bool {
        self == ShipmentStatus::InTransit
    }

    /// 是否已入倉登記
    pub fn is_booked_in(self) -> bool {
        matches!(
            self,
            ShipmentStatus::BookedInChecked | ShipmentStatus::DeliveredBookedIn
        )
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ShipmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("未知的出貨狀態: {wanted}"))
    }
}

/// 進口稅政策
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImportTaxStatus {
    /// 賣方完稅交貨
    #[serde(rename = "DDP - No taxes")]
    DdpNoTaxes,
    /// 已繳稅
    #[serde(rename = "Taxes paid")]
    TaxesPaid,
    /// 買方繳稅
    #[serde(rename = "DAP - Buyer pays taxes")]
    DapBuyerPays,
}

impl ImportTaxStatus {
    pub const ALL: [ImportTaxStatus; 3] = [
        ImportTaxStatus::DdpNoTaxes,
        ImportTaxStatus::TaxesPaid,
        ImportTaxStatus::DapBuyerPays,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ImportTaxStatus::DdpNoTaxes => "DDP - No taxes",
            ImportTaxStatus::TaxesPaid => "Taxes paid",
            ImportTaxStatus::DapBuyerPays => "DAP - Buyer pays taxes",
        }
    }
}

impl FromStr for ImportTaxStatus {
    type Err = String;

    /// 接受完整標籤，或以 `DDP` / `DAP` 開頭的簡寫
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        if let Some(status) = Self::ALL
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(wanted))
        {
            return Ok(status);
        }

        let upper = wanted.to_ascii_uppercase();
        if upper.starts_with("DDP") {
            Ok(ImportTaxStatus::DdpNoTaxes)
        } else if upper.starts_with("DAP") {
            Ok(ImportTaxStatus::DapBuyerPays)
        } else {
            Err(format!("未知的進口稅政策: {wanted}"))
        }
    }
}

/// 出貨檢查清單（四項互相獨立）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentChecklist {
    /// 已入倉
    pub added_to_warehouse: bool,
    /// 已預約送貨
    pub delivery_booked: bool,
    /// 數量已核對
    pub quantities_verified: bool,
    /// 銷售通路已顯示庫存
    pub stock_on_storefront: bool,
}

impl ShipmentChecklist {
    pub fn is_complete(&self) -> bool {
        self.added_to_warehouse
            && self.delivery_booked
            && self.quantities_verified
            && self.stock_on_storefront
    }
}

/// 出貨
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    /// 出貨ID
    pub id: Uuid,

    /// 所屬採購單
    pub po_id: String,

    /// 出貨參考碼（基礎單號 + 目的地 + 運輸方式）
    pub shipment_ref: String,

    pub destination: Destination,

    pub mode: TransportMode,

    pub status: ShipmentStatus,

    /// 件數
    pub units: u32,

    /// 箱數
    pub cartons: u32,

    /// 貨代
    pub freight_forwarder: Option<String>,

    pub shipment_date: Option<NaiveDate>,

    /// 預計到貨日
    pub eta: Option<NaiveDate>,

    pub delivery_date: Option<NaiveDate>,

    /// 入倉登記日
    pub booked_in_date: Option<NaiveDate>,

    pub tracking_number: Option<String>,

    /// 總運費
    pub total_freight_cost: Decimal,

    /// 單件運費（美元）
    pub unit_freight_cost_usd: Decimal,

    /// 單件運費（英鎊）
    pub unit_freight_cost_gbp: Decimal,

    pub import_tax_status: Option<ImportTaxStatus>,

    pub checklist: ShipmentChecklist,
}

impl Shipment {
    /// 創建新的出貨（狀態為生產中，檢查清單全部未勾選）
    pub fn new(
        po_id: String,
        shipment_ref: String,
        destination: Destination,
        mode: TransportMode,
        units: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            po_id,
            shipment_ref,
            destination,
            mode,
            status: ShipmentStatus::InProduction,
            units,
            cartons: 0,
            freight_forwarder: None,
            shipment_date: None,
            eta: None,
            delivery_date: None,
            booked_in_date: None,
            tracking_number: None,
            total_freight_cost: Decimal::ZERO,
            unit_freight_cost_usd: Decimal::ZERO,
            unit_freight_cost_gbp: Decimal::ZERO,
            import_tax_status: None,
            checklist: ShipmentChecklist::default(),
        }
    }

    /// 建構器模式：設置狀態
    pub fn with_status(mut self, status: ShipmentStatus) -> Self {
        self.status = status;
        self
    }

    /// 建構器模式：設置箱數
    pub fn with_cartons(mut self, cartons: u32) -> Self {
        self.cartons = cartons;
        self
    }

    /// 建構器模式：設置貨代
    pub fn with_freight_forwarder(mut self, forwarder: String) -> Self {
        self.freight_forwarder = Some(forwarder);
        self
    }

    /// 套用欄位更新（不驗證狀態順序）
    pub fn apply(&mut self, patch: ShipmentPatch) {
        let ShipmentPatch {
            status,
            units,
            cartons,
            freight_forwarder,
            shipment_date,
            eta,
            delivery_date,
            booked_in_date,
            tracking_number,
            total_freight_cost,
            unit_freight_cost_usd,
            unit_freight_cost_gbp,
            import_tax_status,
            checklist,
        } = patch;

        if let Some(v) = status {
            self.status = v;
        }
        if let Some(v) = units {
            self.units = v;
        }
        if let Some(v) = cartons {
            self.cartons = v;
        }
        if let Some(v) = freight_forwarder {
            self.freight_forwarder = Some(v);
        }
        if let Some(v) = shipment_date {
            self.shipment_date = Some(v);
        }
        if let Some(v) = eta {
            self.eta = Some(v);
        }
        if let Some(v) = delivery_date {
            self.delivery_date = Some(v);
        }
        if let Some(v) = booked_in_date {
            self.booked_in_date = Some(v);
        }
        if let Some(v) = tracking_number {
            self.tracking_number = Some(v);
        }
        if let Some(v) = total_freight_cost {
            self.total_freight_cost = v;
        }
        if let Some(v) = unit_freight_cost_usd {
            self.unit_freight_cost_usd = v;
        }
        if let Some(v) = unit_freight_cost_gbp {
            self.unit_freight_cost_gbp = v;
        }
        if let Some(v) = import_tax_status {
            self.import_tax_status = Some(v);
        }
        if let Some(v) = checklist {
            self.checklist = v;
        }
    }
}

/// 出貨欄位更新（`None` 表示不變更）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShipmentPatch {
    pub status: Option<ShipmentStatus>,
    pub units: Option<u32>,
    pub cartons: Option<u32>,
    pub freight_forwarder: Option<String>,
    pub shipment_date: Option<NaiveDate>,
    pub eta: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
    pub booked_in_date: Option<NaiveDate>,
    pub tracking_number: Option<String>,
    pub total_freight_cost: Option<Decimal>,
    pub unit_freight_cost_usd: Option<Decimal>,
    pub unit_freight_cost_gbp: Option<Decimal>,
    pub import_tax_status: Option<ImportTaxStatus>,
    pub checklist: Option<ShipmentChecklist>,
}
