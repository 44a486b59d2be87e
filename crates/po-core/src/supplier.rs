//! 供應商模型

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::order::Currency;
use crate::{PoError, Result};

/// 供應商狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SupplierStatus {
    #[default]
    Active,
    Inactive,
}

impl fmt::Display for SupplierStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupplierStatus::Active => f.write_str("Active"),
            SupplierStatus::Inactive => f.write_str("Inactive"),
        }
    }
}

/// 供應商
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: Uuid,

    /// 公司名稱（必填）
    pub name: String,

    /// 簡碼，如 `GWG`
    pub code: String,

    pub status: SupplierStatus,

    // 聯絡資訊
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,

    // 商務條件
    /// 產品類型，如 `Jeans, Jackets`
    pub product_types: Option<String>,
    pub payment_terms: Option<String>,
    /// 生產提前期（天）
    pub lead_time_days: Option<u32>,
    /// 運輸時間，如 `8 weeks Sea / 2 weeks Air`
    pub transit_time: Option<String>,
    pub country_of_origin: Option<String>,
    pub nearest_port: Option<String>,
    pub currency: Currency,

    pub notes: Option<String>,
}

impl Supplier {
    /// 創建新的供應商
    pub fn new(name: String, code: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            code,
            status: SupplierStatus::Active,
            contact_name: None,
            phone: None,
            website: None,
            address: None,
            product_types: None,
            payment_terms: None,
            lead_time_days: None,
            transit_time: None,
            country_of_origin: None,
            nearest_port: None,
            currency: Currency::Usd,
            notes: None,
        }
    }

    /// 建構器模式：設置聯絡人
    pub fn with_contact(mut self, contact_name: String, phone: Option<String>) -> Self {
        self.contact_name = Some(contact_name);
        self.phone = phone;
        self
    }

    /// 建構器模式：設置產地與港口
    pub fn with_origin(mut self, country: String, nearest_port: String) -> Self {
        self.country_of_origin = Some(country);
        self.nearest_port = Some(nearest_port);
        self
    }

    /// 建構器模式：設置提前期
    pub fn with_lead_time_days(mut self, days: u32) -> Self {
        self.lead_time_days = Some(days);
        self
    }

    /// 建構器模式：設置狀態
    pub fn with_status(mut self, status: SupplierStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == SupplierStatus::Active
    }

    /// 儲存前的必填欄位檢查
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(PoError::Validation("供應商名稱為必填".to_string()));
        }
        Ok(())
    }

    /// 套用欄位更新
    pub fn apply(&mut self, patch: SupplierPatch) {
        let SupplierPatch {
            name,
            code,
            status,
            contact_name,
            phone,
            website,
            address,
            product_types,
            payment_terms,
            lead_time_days,
            transit_time,
            country_of_origin,
            nearest_port,
            currency,
            notes,
        } = patch;

        if let Some(v) = name {
            self.name = v;
        }
        if let Some(v) = code {
            self.code = v;
        }
        if let Some(v) = status {
            self.status = v;
        }
        if let Some(v) = currency {
            self.currency = v;
        }
        if let Some(v) = lead_time_days {
            self.lead_time_days = Some(v);
        }

        for (slot, value) in [
            (&mut self.contact_name, contact_name),
            (&mut self.phone, phone),
            (&mut self.website, website),
            (&mut self.address, address),
            (&mut self.product_types, product_types),
            (&mut self.payment_terms, payment_terms),
            (&mut self.transit_time, transit_time),
            (&mut self.country_of_origin, country_of_origin),
            (&mut self.nearest_port, nearest_port),
            (&mut self.notes, notes),
        ] {
            if value.is_some() {
                *slot = value;
            }
        }
    }
}

/// 供應商欄位更新（`None` 表示不變更）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupplierPatch {
    pub name: Option<String>,
    pub code: Option<String>,
    pub status: Option<SupplierStatus>,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub product_types: Option<String>,
    pub payment_terms: Option<String>,
    pub lead_time_days: Option<u32>,
    pub transit_time: Option<String>,
    pub country_of_origin: Option<String>,
    pub nearest_port: Option<String>,
    pub currency: Option<Currency>,
    pub notes: Option<String>,
}
