//! 採購明細與出貨的數量、金額彙總
//!
//! 全部為純函數：不寫入、不快取，每次讀取重新計算。

use po_core::{Currency, Destination, FxRates, LineItem, PoError, PurchaseOrder, Result};
use rust_decimal::Decimal;

/// 各配送中心數量
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DestinationUnits {
    pub uk: u64,
    pub usa: u64,
}

impl DestinationUnits {
    pub fn get(&self, destination: Destination) -> u64 {
        match destination {
            Destination::Uk => self.uk,
            Destination::Us => self.usa,
        }
    }

    pub fn total(&self) -> u64 {
        self.uk + self.usa
    }
}

/// 訂購數量與出貨數量的差異（僅供檢視，不自動修正）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitVariance {
    pub destination: Destination,
    /// 明細訂購數量
    pub ordered: u64,
    /// 出貨數量
    pub shipped: u64,
}

impl UnitVariance {
    /// 出貨 - 訂購
    pub fn difference(&self) -> i64 {
        let shipped = i64::try_from(self.shipped).unwrap_or(i64::MAX);
        let ordered = i64::try_from(self.ordered).unwrap_or(i64::MAX);
        shipped - ordered
    }
}

/// 明細彙總計算器
pub struct LineAggregator;

impl LineAggregator {
    /// 明細金額 = (英國數量 + 美國數量) × 單件成本
    pub fn line_total(line: &LineItem) -> Result<Decimal> {
        line.line_total()
    }

    /// 採購單明細總金額（採購單幣別）
    pub fn order_total(order: &PurchaseOrder) -> Result<Decimal> {
        order.lines.iter().try_fold(Decimal::ZERO, |acc, line| {
            acc.checked_add(Self::line_total(line)?)
                .ok_or(PoError::AmountOverflow)
        })
    }

    /// 換算為指定幣別的明細總金額
    pub fn order_total_in(
        order: &PurchaseOrder,
        target: Currency,
        rates: &FxRates,
    ) -> Result<Decimal> {
        rates.convert(Self::order_total(order)?, order.currency, target)
    }

    /// 各配送中心的訂購數量
    pub fn order_units_by_destination(order: &PurchaseOrder) -> DestinationUnits {
        order
            .lines
            .iter()
            .fold(DestinationUnits::default(), |acc, line| DestinationUnits {
                uk: acc.uk + u64::from(line.qty_uk),
                usa: acc.usa + u64::from(line.qty_usa),
            })
    }

    /// 訂購總數量
    pub fn order_units_total(order: &PurchaseOrder) -> u64 {
        order.lines.iter().map(LineItem::total_units).sum()
    }

    /// 出廠確認總數量
    pub fn confirmed_xf_total(order: &PurchaseOrder) -> u64 {
        order
            .lines
            .iter()
            .map(|l| u64::from(l.confirmed_xf))
            .sum()
    }

    /// 出貨總件數（與明細數量無關）
    pub fn shipment_units_total(order: &PurchaseOrder) -> u64 {
        order.shipments.iter().map(|s| u64::from(s.units)).sum()
    }

    /// 各配送中心的出貨件數
    pub fn shipment_units_by_destination(order: &PurchaseOrder) -> DestinationUnits {
        order
            .shipments
            .iter()
            .fold(DestinationUnits::default(), |mut acc, s| {
                match s.destination {
                    Destination::Uk => acc.uk += u64::from(s.units),
                    Destination::Us => acc.usa += u64::from(s.units),
                }
                acc
            })
    }

    /// 已拆單採購單中，訂購數量與出貨數量不一致的目的地
    ///
    /// 只檢查已有出貨的目的地。
    pub fn unit_variances(order: &PurchaseOrder) -> Vec<UnitVariance> {
        let ordered = Self::order_units_by_destination(order);
        let shipped = Self::shipment_units_by_destination(order);

        Destination::ALL
            .into_iter()
            .filter(|d| order.shipments.iter().any(|s| s.destination == *d))
            .map(|destination| UnitVariance {
                destination,
                ordered: ordered.get(destination),
                shipped: shipped.get(destination),
            })
            .filter(|v| v.ordered != v.shipped)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use po_core::{Shipment, Size, SplitState, TransportMode};
    use proptest::prelude::*;

    fn line(qty_uk: u32, qty_usa: u32, cost: i64) -> LineItem {
        LineItem::new("Logo Tee".to_string(), Size::M, Decimal::from(cost))
            .with_quantities(qty_uk, qty_usa)
    }

    fn order_with_lines(lines: Vec<LineItem>) -> PurchaseOrder {
        PurchaseOrder::new("GWG048".to_string(), "Guangzhou Works".to_string()).with_lines(lines)
    }

    #[test]
    fn test_line_total() {
        assert_eq!(LineAggregator::line_total(&line(3, 2, 10)).unwrap(), Decimal::from(50));
        assert_eq!(LineAggregator::line_total(&LineItem::default()).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_order_total_overflow() {
        // 單行相乘溢位
        let extreme = LineItem::new("Tee".to_string(), Size::M, Decimal::MAX).with_quantities(2, 0);
        let order = order_with_lines(vec![extreme]);
        assert!(matches!(
            LineAggregator::order_total(&order),
            Err(PoError::AmountOverflow)
        ));

        // 加總溢位
        let half = LineItem::new("Tee".to_string(), Size::M, Decimal::MAX).with_quantities(1, 0);
        let order = order_with_lines(vec![half.clone(), half]);
        assert!(matches!(
            LineAggregator::order_total(&order),
            Err(PoError::AmountOverflow)
        ));
        assert!(LineAggregator::order_total_in(&order, Currency::Gbp, &FxRates::default()).is_err());
    }

    #[test]
    fn test_order_totals() {
        let order = order_with_lines(vec![line(100, 50, 12), line(20, 30, 8)]);

        assert_eq!(LineAggregator::order_total(&order).unwrap(), Decimal::from(2200));
        assert_eq!(
            LineAggregator::order_units_by_destination(&order),
            DestinationUnits { uk: 120, usa: 80 }
        );
        assert_eq!(LineAggregator::order_units_total(&order), 200);
    }

    #[test]
    fn test_order_total_in_gbp() {
        let order = order_with_lines(vec![line(1, 0, 127)]);
        assert_eq!(
            LineAggregator::order_total_in(&order, Currency::Gbp, &FxRates::default()).unwrap(),
            Decimal::from(100)
        );
    }

    #[test]
    fn test_confirmed_xf_total() {
        let order = order_with_lines(vec![
            line(10, 0, 1).with_confirmed_xf(9),
            line(0, 10, 1).with_confirmed_xf(10),
        ]);
        assert_eq!(LineAggregator::confirmed_xf_total(&order), 19);
    }

    #[test]
    fn test_shipment_units_independent_of_lines() {
        let mut order = order_with_lines(vec![line(120, 80, 5)]);
        order.shipments.push(Shipment::new(
            order.id.clone(),
            "GWG048UKSEA".to_string(),
            Destination::Uk,
            TransportMode::Sea,
            110,
        ));
        order.split_state = SplitState::Split;

        assert_eq!(LineAggregator::shipment_units_total(&order), 110);
        assert_eq!(LineAggregator::order_units_total(&order), 200);

        // 美國尚無出貨，不列入差異
        let variances = LineAggregator::unit_variances(&order);
        assert_eq!(variances.len(), 1);
        assert_eq!(variances[0].destination, Destination::Uk);
        assert_eq!(variances[0].difference(), -10);
    }

    #[test]
    fn test_no_variance_when_units_match() {
        let mut order = order_with_lines(vec![line(120, 80, 5)]);
        order.shipments.push(Shipment::new(
            order.id.clone(),
            "GWG048USASEA".to_string(),
            Destination::Us,
            TransportMode::Sea,
            80,
        ));
        assert!(LineAggregator::unit_variances(&order).is_empty());
    }

    proptest! {
        #[test]
        fn prop_order_total_is_order_independent(
            raw in prop::collection::vec((0u32..500, 0u32..500, 0i64..10_000), 0..12)
        ) {
            let lines: Vec<LineItem> = raw
                .iter()
                .map(|(uk, usa, cents)| {
                    LineItem::new("Item".to_string(), Size::M, Decimal::new(*cents, 2))
                        .with_quantities(*uk, *usa)
                })
                .collect();
            let mut reversed = lines.clone();
            reversed.reverse();

            let forward = order_with_lines(lines);
            let backward = order_with_lines(reversed);

            let first = LineAggregator::order_total(&forward).unwrap();
            prop_assert_eq!(first, LineAggregator::order_total(&forward).unwrap());
            prop_assert_eq!(first, LineAggregator::order_total(&backward).unwrap());
            prop_assert_eq!(
                LineAggregator::order_units_by_destination(&forward),
                LineAggregator::order_units_by_destination(&backward)
            );
        }
    }
}
