//! 採購作業服務
//!
//! 所有驗證都在呼叫儲存之前完成；每個操作最多一次寫入。

use chrono::{Datelike, NaiveDate, Utc};
use po_calc::{
    ColumnResolver, ImportReconciler, ImportReport, Sheet, SplitPlanner, SplitSelection,
};
use po_core::{
    build_reference, parse_reference, Currency, DeskConfig, Destination, LineItem, PoError,
    PurchaseOrder, PurchaseOrderPatch, Result, Shipment, ShipmentPatch, Supplier, SupplierPatch,
    TransportMode,
};
use po_store::RecordStore;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::state::DeskState;

/// 新採購單輸入
#[derive(Debug, Clone, Default)]
pub struct NewPurchaseOrder {
    /// 指定單號（如 `GWG049`）；`None` 時自動產生
    pub id: Option<String>,
    pub supplier_ref: String,
    pub supplier_name: String,
    pub season: String,
    /// `None` 時使用配置的預設幣別
    pub currency: Option<Currency>,
    pub ex_factory_date: Option<NaiveDate>,
    pub total_cost_value: Decimal,
    pub deposit_value: Decimal,
    pub deposit_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub lines: Vec<LineItem>,
    /// 非空時於建立時直接拆單
    pub split: Vec<SplitSelection>,
}

impl NewPurchaseOrder {
    pub fn new(supplier_name: impl Into<String>) -> Self {
        Self {
            supplier_name: supplier_name.into(),
            ..Default::default()
        }
    }

    /// 建構器模式：指定單號
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// 建構器模式：設置供應商代碼
    pub fn with_supplier_ref(mut self, supplier_ref: impl Into<String>) -> Self {
        self.supplier_ref = supplier_ref.into();
        self
    }

    /// 建構器模式：設置季節
    pub fn with_season(mut self, season: impl Into<String>) -> Self {
        self.season = season.into();
        self
    }

    /// 建構器模式：設置幣別
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    /// 建構器模式：設置明細
    pub fn with_lines(mut self, lines: Vec<LineItem>) -> Self {
        self.lines = lines;
        self
    }

    /// 建構器模式：設置備註
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// 建構器模式：建立時拆單
    pub fn with_split(mut self, split: Vec<SplitSelection>) -> Self {
        self.split = split;
        self
    }
}

/// 採購作業服務
pub struct DeskService<S: RecordStore> {
    store: S,
    config: DeskConfig,
}

impl<S: RecordStore> DeskService<S> {
    pub fn new(store: S, config: DeskConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &DeskConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// 讀取目前狀態快照
    pub fn refresh(&self) -> Result<DeskState> {
        Ok(DeskState {
            orders: self.store.list_purchase_orders()?,
            suppliers: self.store.list_suppliers()?,
            products: self.store.list_products()?,
            fx_rates: self.config.fx_rates.clone(),
            low_stock_threshold: self.config.low_stock_threshold,
        })
    }

    /// 建立採購單
    ///
    /// 指定單號會去除空白並轉為大寫，且不可帶目的地/運輸方式後綴。
    /// 帶拆單選擇時，採購單以已拆單狀態建立。
    pub fn create_purchase_order(&mut self, input: NewPurchaseOrder) -> Result<PurchaseOrder> {
        let supplier_name = input.supplier_name.trim();
        if supplier_name.is_empty() {
            return Err(PoError::Validation("供應商名稱為必填".to_string()));
        }

        let id = match input.id.as_deref() {
            Some(raw) => Self::explicit_order_id(raw)?,
            None => self.next_order_id()?,
        };

        let mut order = PurchaseOrder::new(id, supplier_name.to_string())
            .with_supplier_ref(input.supplier_ref.trim().to_string())
            .with_season(input.season.trim().to_string())
            .with_currency(input.currency.unwrap_or(self.config.default_currency))
            .with_lines(input.lines);
        order.ex_factory_date = input.ex_factory_date;
        order.total_cost_value = input.total_cost_value;
        order.deposit_value = input.deposit_value;
        order.deposit_date = input.deposit_date;
        order.notes = input.notes;

        if !input.split.is_empty() {
            order = SplitPlanner::new(&self.config).plan(&order, &input.split)?.order;
        }

        let created = self.store.create_purchase_order(order)?;
        tracing::info!(
            "建立採購單 {}：明細 {} 筆，出貨 {} 筆",
            created.id,
            created.lines.len(),
            created.shipments.len()
        );
        Ok(created)
    }

    fn explicit_order_id(raw: &str) -> Result<String> {
        let id = raw.trim().to_uppercase();
        if id.is_empty() {
            return Err(PoError::Validation("採購單號不可為空白".to_string()));
        }
        if parse_reference(&id).has_suffix {
            return Err(PoError::InvalidReference(id));
        }
        Ok(id)
    }

    /// 流水單號：既有採購單數 + 1
    fn next_order_id(&self) -> Result<String> {
        let count = self.store.list_purchase_orders()?.len();
        Ok(PurchaseOrder::generated_id(
            &self.config.order_id_prefix,
            Utc::now().year(),
            count + 1,
            self.config.order_sequence_width,
        ))
    }

    fn load_order(&self, po_id: &str) -> Result<PurchaseOrder> {
        self.store
            .get_purchase_order(po_id)?
            .ok_or_else(|| PoError::OrderNotFound(po_id.to_string()))
    }

    /// 拆單預設提案
    pub fn propose_split(&self, po_id: &str) -> Result<Vec<SplitSelection>> {
        let order = self.load_order(po_id)?;
        if order.po_splits_confirmed() {
            return Err(PoError::AlreadySplit(order.id));
        }
        Ok(SplitPlanner::new(&self.config).propose(&order))
    }

    /// 確認拆單（單一工作單元寫入）
    pub fn confirm_split(
        &mut self,
        po_id: &str,
        selections: &[SplitSelection],
    ) -> Result<PurchaseOrder> {
        let order = self.load_order(po_id)?;
        let plan = SplitPlanner::new(&self.config).plan(&order, selections)?;
        self.store.commit_split(&order.id, plan.shipments)
    }

    /// 為已拆單的採購單追加出貨
    pub fn add_shipment(
        &mut self,
        po_id: &str,
        destination: Destination,
        mode: TransportMode,
    ) -> Result<Shipment> {
        let order = self.load_order(po_id)?;
        if order.is_pending_split() {
            return Err(PoError::NotSplit(order.id));
        }

        let shipment_ref = build_reference(&order.id, destination, mode);
        if order.shipment_by_ref(&shipment_ref).is_some() {
            return Err(PoError::DuplicateShipmentRef(shipment_ref));
        }

        let shipment = Shipment::new(order.id, shipment_ref, destination, mode, 0)
            .with_status(self.config.initial_shipment_status);
        let added = self.store.add_shipment(shipment)?;
        tracing::info!("採購單 {} 新增出貨 {}", added.po_id, added.shipment_ref);
        Ok(added)
    }

    pub fn update_purchase_order(
        &mut self,
        po_id: &str,
        patch: PurchaseOrderPatch,
    ) -> Result<PurchaseOrder> {
        if patch
            .supplier_name
            .as_deref()
            .is_some_and(|name| name.trim().is_empty())
        {
            return Err(PoError::Validation("供應商名稱為必填".to_string()));
        }
        self.store.update_purchase_order(po_id, patch)
    }

    pub fn update_shipment(&mut self, shipment_id: Uuid, patch: ShipmentPatch) -> Result<Shipment> {
        self.store.update_shipment(shipment_id, patch)
    }

    /// 匯入試算表（預設欄位推斷）
    pub fn import_sheet(&mut self, sheet: &Sheet) -> ImportReport {
        ImportReconciler::new(&self.config).import(sheet, &mut self.store)
    }

    /// 匯入試算表（自訂欄位推斷）
    pub fn import_sheet_with(&mut self, sheet: &Sheet, resolver: &dyn ColumnResolver) -> ImportReport {
        ImportReconciler::with_resolver(&self.config, resolver).import(sheet, &mut self.store)
    }

    pub fn list_suppliers(&self) -> Result<Vec<Supplier>> {
        self.store.list_suppliers()
    }

    pub fn create_supplier(&mut self, supplier: Supplier) -> Result<Supplier> {
        supplier.validate()?;
        let created = self.store.create_supplier(supplier)?;
        tracing::info!("建立供應商 {}", created.name);
        Ok(created)
    }

    pub fn update_supplier(&mut self, id: Uuid, patch: SupplierPatch) -> Result<Supplier> {
        if patch
            .name
            .as_deref()
            .is_some_and(|name| name.trim().is_empty())
        {
            return Err(PoError::Validation("供應商名稱為必填".to_string()));
        }
        self.store.update_supplier(id, patch)
    }

    pub fn delete_supplier(&mut self, id: Uuid) -> Result<()> {
        self.store.delete_supplier(id)?;
        tracing::info!("刪除供應商 {}", id);
        Ok(())
    }
}
