//! 出貨追蹤表匯入示例

use po_desk::po_calc::{SplitSelection, ShipmentFilter, Sheet};
use po_desk::po_core::{
    DeskConfig, Destination, InventoryRecord, LineItem, Size, TransportMode, Warehouse,
};
use po_desk::po_store::InMemoryStore;
use po_desk::{DeskService, NewPurchaseOrder};
use rust_decimal::Decimal;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== 出貨追蹤表匯入示例 ===\n");

    let config = DeskConfig::from_json_str(r#"{ "default_currency": "GBP", "low_stock_threshold": 40 }"#)?;
    let store = InMemoryStore::new().with_products(vec![InventoryRecord::new(
        "WLJ-001".to_string(),
        "Wide Leg Jean".to_string(),
        Warehouse::London,
    )
    .with_size(Size::S, 12)
    .with_size(Size::M, 85)]);
    let mut service = DeskService::new(store, config);

    // 試算表：第一列為表頭
    let sheet = Sheet::from_rows(
        [
            vec!["PO#", "Supplier Name", "Status", "Units", "ETA", "Total Cost Value"],
            vec!["GWG048UKSEA", "Guangzhou Works", "In transit - awaiting freight info", "1,200", "14-Feb-2025", "£16,800"],
            vec!["GWG048USASEA", "Guangzhou Works", "In production", "800", "", ""],
            vec!["TSH096", "Turkmen Denim", "", "", "", "$9,400"],
            vec!["TSH096USAIR", "Turkmen Denim", "Shipped?", "200", "soon", ""],
        ]
        .into_iter()
        .map(|row| row.into_iter().map(str::to_string).collect())
        .collect(),
    );

    let report = service.import_sheet(&sheet);
    println!(
        "匯入 {} 列：建立 {:?}，略過 {}，警告 {}",
        report.rows_loaded,
        report.created,
        report.skipped.len(),
        report.warnings.len()
    );
    for warning in &report.warnings {
        println!("  - 第 {} 列: {}", warning.row, warning.message);
    }

    // 新採購單並拆單
    service.create_purchase_order(
        NewPurchaseOrder::new("Guangzhou Works")
            .with_id("gwg049")
            .with_season("AW25")
            .with_lines(vec![
                LineItem::new("Wide Leg Jean".to_string(), Size::S, Decimal::from(14))
                    .with_quantities(70, 30),
                LineItem::new("Wide Leg Jean".to_string(), Size::M, Decimal::from(14))
                    .with_quantities(50, 50),
            ]),
    )?;
    let proposal = service.propose_split("GWG049")?;
    println!("\n拆單提案: {:?}", proposal);
    service.confirm_split(
        "GWG049",
        &[SplitSelection::new(Destination::Uk, TransportMode::Sea).with_units(120)],
    )?;

    let state = service.refresh()?;
    println!("\n出貨看板:");
    for row in state.shipment_board(&ShipmentFilter::new()) {
        println!(
            "  {} [{}] {} 件 - {}",
            row.shipment.shipment_ref, row.supplier_name, row.shipment.units, row.shipment.status
        );
    }

    let summary = state.shipment_summary();
    println!(
        "\n生產中 {}，運送中 {}（{} 件），已入倉 {}",
        summary.in_production, summary.in_transit, summary.units_in_transit, summary.booked_in
    );
    println!("待拆單: {}", state.pending_split().len());
    println!("採購總額: £{}", state.spend_gbp()?.round_dp(2));
    println!("未結金額: £{}", state.outstanding_gbp()?.round_dp(2));
    for stage in state.po_pipeline()? {
        println!("  {}: {} 張，£{}", stage.status, stage.count, stage.value_gbp.round_dp(2));
    }
    for item in state.inventory_summary().low_stock {
        println!("低庫存: {} {} {} 件", item.name, item.size.code(), item.quantity);
    }

    Ok(())
}
