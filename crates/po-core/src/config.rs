//! 作業配置模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::order::Currency;
use crate::shipment::{ShipmentStatus, TransportMode};
use crate::{PoError, Result};

/// 匯率表（每 1 英鎊可兌換的外幣數量，英鎊為基準 = 1）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FxRates {
    pub eur: Decimal,
    pub usd: Decimal,
}

impl Default for FxRates {
    fn default() -> Self {
        Self {
            eur: Decimal::new(117, 2),
            usd: Decimal::new(127, 2),
        }
    }
}

impl FxRates {
    /// 1 英鎊兌換指定幣別的匯率
    pub fn per_gbp(&self, currency: Currency) -> Decimal {
        match currency {
            Currency::Gbp => Decimal::ONE,
            Currency::Eur => self.eur,
            Currency::Usd => self.usd,
        }
    }

    /// 換算金額
    ///
    /// 匯率為 0 時視為 1；結果超出 `Decimal` 範圍時回傳 [`PoError::AmountOverflow`]。
    pub fn convert(&self, amount: Decimal, from: Currency, to: Currency) -> Result<Decimal> {
        if from == to {
            return Ok(amount);
        }
        let from_rate = non_zero(self.per_gbp(from));
        let to_rate = non_zero(self.per_gbp(to));
        amount
            .checked_div(from_rate)
            .and_then(|gbp| gbp.checked_mul(to_rate))
            .ok_or(PoError::AmountOverflow)
    }
}

fn non_zero(rate: Decimal) -> Decimal {
    if rate.is_zero() {
        Decimal::ONE
    } else {
        rate
    }
}

/// 作業參數配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    /// 流水單號前綴
    pub order_id_prefix: String,

    /// 流水號位數（不足補零）
    pub order_sequence_width: usize,

    /// 新採購單預設幣別
    pub default_currency: Currency,

    /// 拆單預設運輸方式
    pub default_mode: TransportMode,

    /// 新出貨的初始狀態
    pub initial_shipment_status: ShipmentStatus,

    pub fx_rates: FxRates,

    /// 低庫存門檻（單一尺寸）
    pub low_stock_threshold: u32,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            order_id_prefix: "PO".to_string(),
            order_sequence_width: 3,
            default_currency: Currency::Usd,
            default_mode: TransportMode::Sea,
            initial_shipment_status: ShipmentStatus::InProduction,
            fx_rates: FxRates::default(),
            low_stock_threshold: 50,
        }
    }
}

impl DeskConfig {
    /// 從 JSON 載入配置，缺少的欄位使用預設值
    ///
    /// # 範例
    /// ```
    /// # use po_core::DeskConfig;
    /// let config = DeskConfig::from_json_str(r#"{ "low_stock_threshold": 20 }"#).unwrap();
    /// assert_eq!(config.low_stock_threshold, 20);
    /// assert_eq!(config.order_id_prefix, "PO");
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// 建構器模式：設置單號前綴
    pub fn with_order_id_prefix(mut self, prefix: String) -> Self {
        self.order_id_prefix = prefix;
        self
    }

    /// 建構器模式：設置預設幣別
    pub fn with_default_currency(mut self, currency: Currency) -> Self {
        self.default_currency = currency;
        self
    }

    /// 建構器模式：設置預設運輸方式
    pub fn with_default_mode(mut self, mode: TransportMode) -> Self {
        self.default_mode = mode;
        self
    }

    /// 建構器模式：設置匯率
    pub fn with_fx_rates(mut self, fx_rates: FxRates) -> Self {
        self.fx_rates = fx_rates;
        self
    }

    /// 建構器模式：設置低庫存門檻
    pub fn with_low_stock_threshold(mut self, threshold: u32) -> Self {
        self.low_stock_threshold = threshold;
        self
    }
}
