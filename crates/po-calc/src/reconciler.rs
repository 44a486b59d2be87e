//! 試算表匯入對帳
//!
//! 將一張試算表（表頭 + 資料列）依參考碼的基礎單號分組：
//! 每組成為一張採購單，帶後綴的資料列成為該採購單的出貨。
//! 分組為純計算，寫入時每張採購單獨立提交，單筆失敗不影響其他採購單。

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use po_core::{
    normalize_reference, parse_reference, Currency, DeskConfig, Destination, ImportTaxStatus,
    ParsedReference, PurchaseOrder, Shipment, ShipmentChecklist, ShipmentStatus, SplitState,
};
use po_store::RecordStore;
use rust_decimal::Decimal;

use crate::cells::{parse_date, parse_decimal, parse_flag, parse_units};
use crate::columns::{ColumnMap, ColumnResolver, ImportField, RegexColumnResolver};
use crate::{ImportReport, ImportWarning, SkippedOrder};

/// 已解碼的試算表
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// 第一列為表頭
    pub fn from_rows(mut rows: Vec<Vec<String>>) -> Self {
        if rows.is_empty() {
            return Self::default();
        }
        let headers = rows.remove(0);
        Self { headers, rows }
    }

    /// 資料列數（不含表頭）
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// 同一基礎單號的分組結果
#[derive(Debug, Clone)]
pub struct ImportGroup {
    /// 待寫入的採購單（含出貨）
    pub order: PurchaseOrder,

    /// 來源資料列號
    pub source_rows: Vec<usize>,

    /// 各來源列的參考碼解析結果
    pub references: Vec<ParsedReference>,
}

impl ImportGroup {
    fn new(order: PurchaseOrder) -> Self {
        Self {
            order,
            source_rows: Vec::new(),
            references: Vec::new(),
        }
    }
}

/// 匯入對帳器
pub struct ImportReconciler<'a, R: ColumnResolver = RegexColumnResolver> {
    config: &'a DeskConfig,
    resolver: R,
}

impl<'a> ImportReconciler<'a> {
    /// 使用預設欄位推斷
    pub fn new(config: &'a DeskConfig) -> Self {
        Self {
            config,
            resolver: RegexColumnResolver::default(),
        }
    }
}

impl<'a, R: ColumnResolver> ImportReconciler<'a, R> {
    /// 使用自訂欄位推斷
    pub fn with_resolver(config: &'a DeskConfig, resolver: R) -> Self {
        Self { config, resolver }
    }

    /// 分組（不寫入）
    pub fn reconcile(&self, sheet: &Sheet) -> (Vec<ImportGroup>, ImportReport) {
        let mut report = ImportReport::empty();
        report.rows_loaded = sheet.len();

        let columns = self.resolver.column_map(&sheet.headers);
        let reference_col = columns.get(ImportField::Reference).unwrap_or(0);
        tracing::debug!(
            "參考碼欄位 {}，缺少欄位: {:?}",
            reference_col,
            columns.missing()
        );

        let mut groups: Vec<ImportGroup> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut seen_refs: HashSet<String> = HashSet::new();

        for (i, row) in sheet.rows.iter().enumerate() {
            let row_no = i + 1;
            let raw_ref = row.get(reference_col).map(|s| s.trim()).unwrap_or("");
            if raw_ref.is_empty() {
                continue;
            }

            let parsed = parse_reference(raw_ref);
            if parsed.base.is_empty() {
                report.add_warning(ImportWarning::warning(
                    row_no,
                    format!("參考碼 '{}' 缺少基礎單號，略過", raw_ref),
                ));
                continue;
            }

            let mut reader = RowReader {
                row: row.as_slice(),
                columns: &columns,
                row_no,
                warnings: &mut report.warnings,
            };

            let position = match index.get(&parsed.base) {
                Some(position) => *position,
                None => {
                    let order = self.seed_order(&parsed.base, &mut reader);
                    groups.push(ImportGroup::new(order));
                    index.insert(parsed.base.clone(), groups.len() - 1);
                    groups.len() - 1
                }
            };

            if parsed.has_suffix {
                let shipment_ref = normalize_reference(raw_ref);
                let destination = parsed
                    .destination
                    .or_else(|| reader.destination());

                match destination {
                    Some(_) if !seen_refs.insert(shipment_ref.clone()) => {
                        reader.warn(format!("出貨參考碼 '{}' 重複，略過", shipment_ref));
                    }
                    Some(destination) => {
                        let shipment =
                            self.build_shipment(&parsed, shipment_ref, destination, &mut reader);
                        groups[position].order.shipments.push(shipment);
                    }
                    None => {
                        reader.warn(format!("無法判斷 '{}' 的目的地，略過出貨", shipment_ref));
                    }
                }
            }

            let group = &mut groups[position];
            group.source_rows.push(row_no);
            group.references.push(parsed);
        }

        for group in &mut groups {
            if !group.order.shipments.is_empty() {
                group.order.split_state = SplitState::Split;
            }
        }

        tracing::info!(
            "匯入分組完成：{} 列，{} 張採購單",
            report.rows_loaded,
            groups.len()
        );

        (groups, report)
    }

    /// 分組並寫入；單張採購單失敗時記錄原因並繼續
    pub fn import<S: RecordStore + ?Sized>(&self, sheet: &Sheet, store: &mut S) -> ImportReport {
        let (groups, mut report) = self.reconcile(sheet);

        for group in groups {
            let order_id = group.order.id.clone();
            match store.create_purchase_order(group.order) {
                Ok(order) => {
                    tracing::debug!("匯入採購單 {}：出貨 {} 筆", order.id, order.shipments.len());
                    report.created.push(order_id);
                }
                Err(e) => {
                    tracing::warn!("採購單 {} 寫入失敗，略過: {}", order_id, e);
                    report.skipped.push(SkippedOrder {
                        order_id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "匯入完成：建立 {} 張，略過 {} 張，警告 {} 筆",
            report.created.len(),
            report.skipped.len(),
            report.warnings.len()
        );

        report
    }

    /// 以第一列的資料建立採購單表頭欄位
    fn seed_order(&self, base: &str, reader: &mut RowReader<'_>) -> PurchaseOrder {
        let supplier_ref = reader.text(ImportField::SupplierRef).unwrap_or_default();
        let supplier_name = reader
            .text(ImportField::SupplierName)
            .unwrap_or_else(|| supplier_ref.clone());

        let currency = match reader.text(ImportField::Currency) {
            None => self.config.default_currency,
            Some(raw) => raw.parse::<Currency>().unwrap_or_else(|e| {
                reader.warn(format!("{}，改用 {}", e, self.config.default_currency.code()));
                self.config.default_currency
            }),
        };

        let mut order = PurchaseOrder::new(base.to_string(), supplier_name)
            .with_supplier_ref(supplier_ref)
            .with_currency(currency);
        order.season = reader.text(ImportField::Season).unwrap_or_default();
        order.total_cost_value = reader.decimal(ImportField::TotalCost);
        order.deposit_value = reader.decimal(ImportField::DepositCost);
        order.deposit_date = reader.date(ImportField::DepositDate);
        order.ex_factory_date = reader.date(ImportField::ExFactoryDate);
        order.skus_created = reader.flag(ImportField::SkusCreated);
        order.barcodes_sent = reader.flag(ImportField::BarcodesSent);
        order.polybags_sent = reader.flag(ImportField::PolybagsSent);
        order
    }

    fn build_shipment(
        &self,
        parsed: &ParsedReference,
        shipment_ref: String,
        destination: Destination,
        reader: &mut RowReader<'_>,
    ) -> Shipment {
        let initial = self.config.initial_shipment_status;
        let status = match reader.text(ImportField::Status) {
            None => initial,
            Some(raw) => raw.parse::<ShipmentStatus>().unwrap_or_else(|e| {
                reader.warn(format!("{}，改用 {}", e, initial));
                initial
            }),
        };

        let import_tax_status = reader.text(ImportField::ImportTaxStatus).and_then(|raw| {
            raw.parse::<ImportTaxStatus>()
                .map_err(|e| reader.warn(e))
                .ok()
        });

        let mut shipment = Shipment::new(
            parsed.base.clone(),
            shipment_ref,
            destination,
            parsed.mode,
            reader.units(ImportField::Units),
        )
        .with_status(status)
        .with_cartons(reader.units(ImportField::Cartons));

        shipment.freight_forwarder = reader.text(ImportField::FreightForwarder);
        shipment.shipment_date = reader.date(ImportField::ShipmentDate);
        shipment.eta = reader.date(ImportField::Eta);
        shipment.delivery_date = reader.date(ImportField::DeliveryDate);
        shipment.booked_in_date = reader.date(ImportField::BookedInDate);
        shipment.tracking_number = reader.text(ImportField::TrackingNumber);
        shipment.total_freight_cost = reader.decimal(ImportField::TotalFreightCost);
        shipment.unit_freight_cost_usd = reader.decimal(ImportField::UnitFreightUsd);
        shipment.unit_freight_cost_gbp = reader.decimal(ImportField::UnitFreightGbp);
        shipment.import_tax_status = import_tax_status;
        shipment.checklist = ShipmentChecklist {
            added_to_warehouse: reader.flag(ImportField::AddedToWarehouse),
            delivery_booked: reader.flag(ImportField::DeliveryBooked),
            quantities_verified: reader.flag(ImportField::QuantitiesVerified),
            stock_on_storefront: reader.flag(ImportField::StockOnStorefront),
        };
        shipment
    }
}

/// 單一資料列的讀取器：清理儲存格並收集警告
struct RowReader<'r> {
    row: &'r [String],
    columns: &'r ColumnMap,
    row_no: usize,
    warnings: &'r mut Vec<ImportWarning>,
}

impl<'r> RowReader<'r> {
    fn warn(&mut self, message: String) {
        tracing::warn!("第 {} 列: {}", self.row_no, message);
        self.warnings
            .push(ImportWarning::warning(self.row_no, message));
    }

    fn raw(&self, field: ImportField) -> Option<&'r str> {
        self.columns.cell(self.row, field)
    }

    fn text(&self, field: ImportField) -> Option<String> {
        self.raw(field).map(str::to_string)
    }

    fn decimal(&mut self, field: ImportField) -> Decimal {
        let Some(raw) = self.raw(field) else {
            return Decimal::ZERO;
        };
        match parse_decimal(raw) {
            Ok(value) => value.unwrap_or(Decimal::ZERO),
            Err(e) => {
                self.warn(format!("{:?}: {}，以 0 計", field, e));
                Decimal::ZERO
            }
        }
    }

    fn units(&mut self, field: ImportField) -> u32 {
        let Some(raw) = self.raw(field) else {
            return 0;
        };
        match parse_units(raw) {
            Ok(value) => value.unwrap_or(0),
            Err(e) => {
                self.warn(format!("{:?}: {}，以 0 計", field, e));
                0
            }
        }
    }

    fn date(&mut self, field: ImportField) -> Option<NaiveDate> {
        let raw = self.raw(field)?;
        match parse_date(raw) {
            Ok(value) => value,
            Err(e) => {
                self.warn(format!("{:?}: {}", field, e));
                None
            }
        }
    }

    fn flag(&self, field: ImportField) -> bool {
        self.raw(field).is_some_and(parse_flag)
    }

    /// 目的地欄位（參考碼無法判斷時使用）
    fn destination(&self) -> Option<Destination> {
        self.raw(ImportField::Destination)
            .and_then(|raw| raw.parse().ok())
    }
}
