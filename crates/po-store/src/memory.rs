//! 記憶體內紀錄儲存

use std::collections::{HashMap, HashSet};

use po_core::{
    InventoryRecord, PoError, PurchaseOrder, PurchaseOrderPatch, Result, Shipment,
    ShipmentPatch, SplitState, Supplier, SupplierPatch,
};
use uuid::Uuid;

use crate::RecordStore;

/// 以 `HashMap` 保存的紀錄儲存
///
/// 每個寫入操作先完成所有檢查再變更資料，失敗時不留下部分寫入。
#[derive(Debug, Default)]
pub struct InMemoryStore {
    orders: HashMap<String, PurchaseOrder>,
    suppliers: HashMap<Uuid, Supplier>,
    products: Vec<InventoryRecord>,
}

impl InMemoryStore {
    /// 創建空的儲存
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：設置庫存快照
    pub fn with_products(mut self, products: Vec<InventoryRecord>) -> Self {
        self.products = products;
        self
    }

    /// 採購單數量
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// 所有已使用的出貨參考碼
    fn used_refs(&self) -> HashSet<&str> {
        self.orders
            .values()
            .flat_map(|o| o.shipments.iter())
            .map(|s| s.shipment_ref.as_str())
            .collect()
    }

    /// 檢查一批新出貨的參考碼未與既有或彼此重複
    fn check_new_refs(&self, shipments: &[Shipment]) -> Result<()> {
        let used = self.used_refs();
        let mut batch = HashSet::new();
        for shipment in shipments {
            let shipment_ref = shipment.shipment_ref.as_str();
            if used.contains(shipment_ref) || !batch.insert(shipment_ref) {
                return Err(PoError::DuplicateShipmentRef(shipment_ref.to_string()));
            }
        }
        Ok(())
    }

    fn order_mut(&mut self, id: &str) -> Result<&mut PurchaseOrder> {
        self.orders
            .get_mut(id)
            .ok_or_else(|| PoError::OrderNotFound(id.to_string()))
    }
}

impl RecordStore for InMemoryStore {
    fn list_purchase_orders(&self) -> Result<Vec<PurchaseOrder>> {
        let mut orders: Vec<PurchaseOrder> = self.orders.values().cloned().collect();
        orders.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(orders)
    }

    fn get_purchase_order(&self, id: &str) -> Result<Option<PurchaseOrder>> {
        Ok(self.orders.get(id).cloned())
    }

    fn create_purchase_order(&mut self, mut order: PurchaseOrder) -> Result<PurchaseOrder> {
        if self.orders.contains_key(&order.id) {
            return Err(PoError::DuplicateOrder(order.id));
        }
        if order.split_state == SplitState::Unsplit && !order.shipments.is_empty() {
            return Err(PoError::Validation(format!(
                "未拆單的採購單 {} 不可附帶出貨",
                order.id
            )));
        }
        if order.split_state == SplitState::Split && order.shipments.is_empty() {
            return Err(PoError::Validation(format!(
                "已拆單的採購單 {} 至少需要一筆出貨",
                order.id
            )));
        }
        self.check_new_refs(&order.shipments)?;

        for shipment in &mut order.shipments {
            shipment.po_id = order.id.clone();
        }

        tracing::debug!(
            "寫入採購單 {}：明細 {} 筆，出貨 {} 筆",
            order.id,
            order.lines.len(),
            order.shipments.len()
        );
        self.orders.insert(order.id.clone(), order.clone());
        Ok(order)
    }

    fn update_purchase_order(
        &mut self,
        id: &str,
        patch: PurchaseOrderPatch,
    ) -> Result<PurchaseOrder> {
        let order = self.order_mut(id)?;
        order.apply(patch);
        Ok(order.clone())
    }

    fn update_shipment(&mut self, id: Uuid, patch: ShipmentPatch) -> Result<Shipment> {
        let shipment = self
            .orders
            .values_mut()
            .flat_map(|o| o.shipments.iter_mut())
            .find(|s| s.id == id)
            .ok_or(PoError::ShipmentNotFound(id))?;
        shipment.apply(patch);
        Ok(shipment.clone())
    }

    fn add_shipment(&mut self, shipment: Shipment) -> Result<Shipment> {
        let order = self
            .orders
            .get(&shipment.po_id)
            .ok_or_else(|| PoError::OrderNotFound(shipment.po_id.clone()))?;
        if order.is_pending_split() {
            return Err(PoError::NotSplit(order.id.clone()));
        }
        self.check_new_refs(std::slice::from_ref(&shipment))?;

        self.order_mut(&shipment.po_id)?.shipments.push(shipment.clone());
        Ok(shipment)
    }

    fn commit_split(&mut self, id: &str, shipments: Vec<Shipment>) -> Result<PurchaseOrder> {
        if shipments.is_empty() {
            return Err(PoError::NoDestinationSelected);
        }
        let order = self
            .orders
            .get(id)
            .ok_or_else(|| PoError::OrderNotFound(id.to_string()))?;
        if order.po_splits_confirmed() {
            return Err(PoError::AlreadySplit(id.to_string()));
        }
        self.check_new_refs(&shipments)?;

        let order = self.order_mut(id)?;
        for mut shipment in shipments {
            shipment.po_id = order.id.clone();
            order.shipments.push(shipment);
        }
        order.mark_split()?;
        tracing::debug!("採購單 {} 拆單完成：出貨 {} 筆", id, order.shipments.len());
        Ok(order.clone())
    }

    fn list_suppliers(&self) -> Result<Vec<Supplier>> {
        let mut suppliers: Vec<Supplier> = self.suppliers.values().cloned().collect();
        suppliers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(suppliers)
    }

    fn create_supplier(&mut self, supplier: Supplier) -> Result<Supplier> {
        supplier.validate()?;
        self.suppliers.insert(supplier.id, supplier.clone());
        Ok(supplier)
    }

    fn update_supplier(&mut self, id: Uuid, patch: SupplierPatch) -> Result<Supplier> {
        let supplier = self
            .suppliers
            .get_mut(&id)
            .ok_or(PoError::SupplierNotFound(id))?;

        let mut updated = supplier.clone();
        updated.apply(patch);
        updated.validate()?;

        *supplier = updated.clone();
        Ok(updated)
    }

    fn delete_supplier(&mut self, id: Uuid) -> Result<()> {
        self.suppliers
            .remove(&id)
            .map(|_| ())
            .ok_or(PoError::SupplierNotFound(id))
    }

    fn list_products(&self) -> Result<Vec<InventoryRecord>> {
        Ok(self.products.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use po_core::{Destination, LineItem, ShipmentStatus, Size, TransportMode};
    use rust_decimal::Decimal;
    use rstest::{fixture, rstest};

    fn split_order(id: &str) -> PurchaseOrder {
        let mut order = PurchaseOrder::new(id.to_string(), "Guangzhou Works".to_string());
        order.shipments.push(Shipment::new(
            id.to_string(),
            format!("{id}UKSEA"),
            Destination::Uk,
            TransportMode::Sea,
            100,
        ));
        order.split_state = SplitState::Split;
        order
    }

    #[fixture]
    fn store() -> InMemoryStore {
        let mut store = InMemoryStore::new();
        store.create_purchase_order(split_order("GWG048")).unwrap();
        store
            .create_purchase_order(PurchaseOrder::new(
                "TSH096".to_string(),
                "Turkmen Denim".to_string(),
            ))
            .unwrap();
        store
    }

    #[rstest]
    fn test_duplicate_order_is_rejected(mut store: InMemoryStore) {
        let result = store.create_purchase_order(split_order("GWG048"));
        assert!(matches!(result, Err(PoError::DuplicateOrder(id)) if id == "GWG048"));
        assert_eq!(store.order_count(), 2);
    }

    #[rstest]
    fn test_create_is_all_or_nothing(mut store: InMemoryStore) {
        let mut order = split_order("GWG050");
        // 與既有出貨參考碼衝突
        order.shipments[0].shipment_ref = "GWG048UKSEA".to_string();

        let result = store.create_purchase_order(order);
        assert!(matches!(result, Err(PoError::DuplicateShipmentRef(_))));
        assert!(store.get_purchase_order("GWG050").unwrap().is_none());
    }

    #[rstest]
    fn test_unsplit_order_cannot_carry_shipments(mut store: InMemoryStore) {
        let mut order = split_order("GWG051");
        order.split_state = SplitState::Unsplit;
        assert!(matches!(
            store.create_purchase_order(order),
            Err(PoError::Validation(_))
        ));
    }

    #[rstest]
    fn test_split_order_requires_shipments(mut store: InMemoryStore) {
        let mut order = PurchaseOrder::new("GWG052".to_string(), "Guangzhou Works".to_string())
            .with_lines(vec![LineItem::new(
                "Wide Leg Jean".to_string(),
                Size::M,
                Decimal::from(14),
            )
            .with_quantities(120, 80)]);
        order.split_state = SplitState::Split;

        assert!(matches!(
            store.create_purchase_order(order),
            Err(PoError::Validation(_))
        ));
        assert!(store.get_purchase_order("GWG052").unwrap().is_none());
    }

    #[rstest]
    fn test_update_shipment(mut store: InMemoryStore) {
        let id = store.get_purchase_order("GWG048").unwrap().unwrap().shipments[0].id;

        let updated = store
            .update_shipment(
                id,
                ShipmentPatch {
                    status: Some(ShipmentStatus::InTransit),
                    cartons: Some(12),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.status, ShipmentStatus::InTransit);
        assert_eq!(updated.cartons, 12);
        assert_eq!(updated.units, 100);

        let missing = store.update_shipment(Uuid::new_v4(), ShipmentPatch::default());
        assert!(matches!(missing, Err(PoError::ShipmentNotFound(_))));
    }

    #[rstest]
    fn test_commit_split(mut store: InMemoryStore) {
        let shipments = vec![
            Shipment::new(
                String::new(),
                "TSH096UKSEA".to_string(),
                Destination::Uk,
                TransportMode::Sea,
                10,
            ),
            Shipment::new(
                String::new(),
                "TSH096USASEA".to_string(),
                Destination::Us,
                TransportMode::Sea,
                20,
            ),
        ];

        let order = store.commit_split("TSH096", shipments.clone()).unwrap();
        assert!(order.po_splits_confirmed());
        assert_eq!(order.shipments.len(), 2);
        assert!(order.shipments.iter().all(|s| s.po_id == "TSH096"));

        assert!(matches!(
            store.commit_split("TSH096", shipments),
            Err(PoError::AlreadySplit(_))
        ));
    }

    #[rstest]
    fn test_add_shipment_requires_split_order(mut store: InMemoryStore) {
        let pending = Shipment::new(
            "TSH096".to_string(),
            "TSH096UKSEA".to_string(),
            Destination::Uk,
            TransportMode::Sea,
            0,
        );
        assert!(matches!(
            store.add_shipment(pending),
            Err(PoError::NotSplit(_))
        ));

        let extra = Shipment::new(
            "GWG048".to_string(),
            "GWG048USASEA".to_string(),
            Destination::Us,
            TransportMode::Sea,
            0,
        );
        store.add_shipment(extra).unwrap();
        let order = store.get_purchase_order("GWG048").unwrap().unwrap();
        assert_eq!(order.shipments.len(), 2);
    }

    #[test]
    fn test_supplier_crud() {
        let mut store = InMemoryStore::new();
        let zeta = store
            .create_supplier(Supplier::new("Zeta Knits".to_string(), "ZK".to_string()))
            .unwrap();
        store
            .create_supplier(Supplier::new("Alpha Denim".to_string(), "AD".to_string()))
            .unwrap();

        let names: Vec<String> = store
            .list_suppliers()
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Alpha Denim", "Zeta Knits"]);

        // 清空名稱應被拒絕，且原資料不變
        let blank = store.update_supplier(
            zeta.id,
            SupplierPatch {
                name: Some(" ".to_string()),
                ..Default::default()
            },
        );
        assert!(matches!(blank, Err(PoError::Validation(_))));

        store.delete_supplier(zeta.id).unwrap();
        assert_eq!(store.list_suppliers().unwrap().len(), 1);
        assert!(matches!(
            store.delete_supplier(zeta.id),
            Err(PoError::SupplierNotFound(_))
        ));
    }
}
