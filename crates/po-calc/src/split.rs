//! 拆單規劃
//!
//! 將未拆單的採購單依目的地拆成出貨。狀態只有 `Unsplit -> Split` 一個轉移，
//! 拆單後的變更只發生在各出貨的欄位上。

use std::collections::HashSet;

use po_core::{
    build_reference, DeskConfig, Destination, PoError, PurchaseOrder, Shipment, TransportMode,
};
use serde::{Deserialize, Serialize};

use crate::aggregation::LineAggregator;

/// 單一目的地的拆單選擇
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitSelection {
    pub destination: Destination,

    pub mode: TransportMode,

    /// 指定件數；`None` 時取該目的地的明細數量合計
    pub units: Option<u32>,
}

impl SplitSelection {
    /// 創建拆單選擇（件數由明細預填）
    pub fn new(destination: Destination, mode: TransportMode) -> Self {
        Self {
            destination,
            mode,
            units: None,
        }
    }

    /// 建構器模式：覆寫件數
    pub fn with_units(mut self, units: u32) -> Self {
        self.units = Some(units);
        self
    }
}

/// 拆單結果
#[derive(Debug, Clone)]
pub struct SplitPlan {
    /// 已轉為 `Split` 的採購單（含新出貨）
    pub order: PurchaseOrder,

    /// 本次新建的出貨
    pub shipments: Vec<Shipment>,
}

/// 拆單規劃器
pub struct SplitPlanner<'a> {
    config: &'a DeskConfig,
}

impl<'a> SplitPlanner<'a> {
    pub fn new(config: &'a DeskConfig) -> Self {
        Self { config }
    }

    /// 預設提案：兩個目的地、預設運輸方式、件數由明細預填
    pub fn propose(&self, order: &PurchaseOrder) -> Vec<SplitSelection> {
        let units = LineAggregator::order_units_by_destination(order);
        Destination::ALL
            .into_iter()
            .map(|destination| SplitSelection {
                destination,
                mode: self.config.default_mode,
                units: u32::try_from(units.get(destination)).ok(),
            })
            .collect()
    }

    /// 依選擇建立出貨並將採購單轉為已拆單
    ///
    /// 不寫入儲存；由呼叫端以單一工作單元提交。
    pub fn plan(
        &self,
        order: &PurchaseOrder,
        selections: &[SplitSelection],
    ) -> po_core::Result<SplitPlan> {
        if selections.is_empty() {
            return Err(PoError::NoDestinationSelected);
        }
        if order.po_splits_confirmed() {
            return Err(PoError::AlreadySplit(order.id.clone()));
        }

        let prefill = LineAggregator::order_units_by_destination(order);
        let mut seen = HashSet::new();
        let mut shipments = Vec::with_capacity(selections.len());

        for selection in selections {
            let shipment_ref = build_reference(&order.id, selection.destination, selection.mode);
            if !seen.insert(shipment_ref.clone()) || order.shipment_by_ref(&shipment_ref).is_some()
            {
                return Err(PoError::DuplicateShipmentRef(shipment_ref));
            }

            let units = match selection.units {
                Some(units) => units,
                None => u32::try_from(prefill.get(selection.destination))
                    .map_err(|_| PoError::QuantityOverflow)?,
            };

            tracing::debug!(
                "採購單 {} 拆單：{} {} 件",
                order.id,
                shipment_ref,
                units
            );
            shipments.push(
                Shipment::new(
                    order.id.clone(),
                    shipment_ref,
                    selection.destination,
                    selection.mode,
                    units,
                )
                .with_status(self.config.initial_shipment_status),
            );
        }

        let mut planned = order.clone();
        planned.shipments.extend(shipments.iter().cloned());
        planned.mark_split()?;

        tracing::info!(
            "採購單 {} 拆為 {} 筆出貨",
            order.id,
            shipments.len()
        );

        Ok(SplitPlan {
            order: planned,
            shipments,
        })
    }
}
