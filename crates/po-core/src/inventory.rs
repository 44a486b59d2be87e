//! 庫存快照模型

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::order::Size;

/// 倉庫
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Warehouse {
    #[serde(rename = "UK - London")]
    London,
    #[serde(rename = "EU - Amsterdam")]
    Amsterdam,
    #[serde(rename = "US - New York")]
    NewYork,
}

impl fmt::Display for Warehouse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Warehouse::London => "UK - London",
            Warehouse::Amsterdam => "EU - Amsterdam",
            Warehouse::NewYork => "US - New York",
        };
        f.write_str(label)
    }
}

/// 單一產品在單一倉庫的庫存快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    /// 產品ID
    pub product_id: String,

    pub name: String,

    pub warehouse: Warehouse,

    /// 各尺寸現有數量（缺少的尺寸視為 0）
    #[serde(default)]
    pub sizes: BTreeMap<Size, u32>,
}

impl InventoryRecord {
    /// 創建新的庫存記錄
    pub fn new(product_id: String, name: String, warehouse: Warehouse) -> Self {
        Self {
            product_id,
            name,
            warehouse,
            sizes: BTreeMap::new(),
        }
    }

    /// 建構器模式：設置單一尺寸數量
    pub fn with_size(mut self, size: Size, quantity: u32) -> Self {
        self.sizes.insert(size, quantity);
        self
    }

    /// 指定尺寸的數量
    pub fn quantity(&self, size: Size) -> u32 {
        self.sizes.get(&size).copied().unwrap_or(0)
    }

    /// 所有尺寸合計
    pub fn total_units(&self) -> u64 {
        Size::ALL.iter().map(|s| u64::from(self.quantity(*s))).sum()
    }

    /// 低於門檻的尺寸
    pub fn low_stock_sizes(&self, threshold: u32) -> Vec<(Size, u32)> {
        Size::ALL
            .iter()
            .map(|s| (*s, self.quantity(*s)))
            .filter(|(_, qty)| *qty < threshold)
            .collect()
    }

    /// 是否有任一尺寸低於門檻
    pub fn is_low_stock(&self, threshold: u32) -> bool {
        !self.low_stock_sizes(threshold).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_inventory_record() {
        let record = InventoryRecord::new(
            "JKT-001".to_string(),
            "Denim Jacket".to_string(),
            Warehouse::London,
        )
        .with_size(Size::S, 60)
        .with_size(Size::M, 120);

        assert_eq!(record.quantity(Size::M), 120);
        assert_eq!(record.quantity(Size::Xl), 0);
        assert_eq!(record.total_units(), 180);
    }

    #[test]
    fn test_low_stock_sizes() {
        let mut record = InventoryRecord::new(
            "TEE-002".to_string(),
            "Logo Tee".to_string(),
            Warehouse::NewYork,
        );
        for size in Size::ALL {
            record.sizes.insert(size, 100);
        }
        assert!(!record.is_low_stock(50));

        record.sizes.insert(Size::Xxl, 12);
        assert_eq!(record.low_stock_sizes(50), vec![(Size::Xxl, 12)]);
        assert!(record.is_low_stock(50));
    }
}
