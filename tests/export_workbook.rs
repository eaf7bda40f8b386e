use chrono::Duration;
use dispatch_qr_scanner_lib::excel::{
    export_columns, export_rows, read_sheet_rows, render_workbook, ExportOutcome, EXPORT_SHEET_NAME,
};
use dispatch_qr_scanner_lib::{ExportError, ManualClock, ScanSession, ScannerConfig};

fn filled_session(payloads: &[&str]) -> ScanSession<ManualClock> {
    let clock = ManualClock::default();
    let mut session = ScanSession::with_clock(ScannerConfig::default(), clock.clone());
    for raw in payloads {
        session.ingest(raw);
        clock.advance(Duration::seconds(2));
    }
    session
}

#[test]
fn empty_log_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("groundnut_dispatch_scans.xlsx");
    let outcome = export_rows(&[], &path).unwrap();
    assert_eq!(outcome, ExportOutcome::NothingToExport);
    assert!(!path.exists());
    assert!(render_workbook(&[]).unwrap().is_none());
}

#[test]
fn summary_count_agrees_with_export() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("groundnut_dispatch_scans.xlsx");

    let mut session = filled_session(&[]);
    assert_eq!(session.summary().count, 0);
    assert_eq!(export_rows(session.rows(), &path).unwrap(), ExportOutcome::NothingToExport);

    session.ingest("Dispatch ID:1");
    assert_eq!(session.summary().count, 1);
    assert!(matches!(
        export_rows(session.rows(), &path).unwrap(),
        ExportOutcome::Written { rows: 1, .. }
    ));

    session.reset();
    assert_eq!(session.summary().count, 0);
}

#[test]
fn exports_header_plus_one_row_per_scan() {
    let session = filled_session(&[
        "Dispatch ID:1/Vehicle No:KA01AB1234/Total Bags:80",
        "Dispatch ID:2/Truck Sheet No:TS-5/Delivery Challan No:DC-9",
        "Dispatch ID:3/Total Net Qty:40.25",
    ]);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("groundnut_dispatch_scans.xlsx");

    let outcome = export_rows(session.rows(), &path).unwrap();
    assert_eq!(
        outcome,
        ExportOutcome::Written {
            path: path.clone(),
            rows: 3
        }
    );

    let rows = read_sheet_rows(&path, EXPORT_SHEET_NAME).unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0], export_columns(session.rows()));
    assert_eq!(
        rows[0],
        vec![
            "dispatch_id",
            "dispatch_date",
            "vehicle_no",
            "truck_sheet_no",
            "delivery_challan_no",
            "total_net_qty",
            "total_bags",
            "timestamp",
        ]
    );
    assert_eq!(rows[1][0], "1");
    assert_eq!(rows[1][2], "KA01AB1234");
    assert_eq!(rows[2][4], "DC-9");
    assert_eq!(rows[3][5], "40.25");
    assert!(!rows[3][7].is_empty());
}

#[test]
fn mixed_variants_export_union_of_columns() {
    let session = filled_session(&[
        "Dispatch ID:1/Vehicle No:KA01",
        "AGY/FED/SOC/RRAO1/EXP/2024/Kharif/Groundnut/Dispatch ID:99",
    ]);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mixed.xlsx");
    export_rows(session.rows(), &path).unwrap();

    let rows = read_sheet_rows(&path, EXPORT_SHEET_NAME).unwrap();
    let header = &rows[0];
    assert_eq!(header.len(), 16);
    let agency = header.iter().position(|h| h == "agency").unwrap();
    let dispatch = header.iter().position(|h| h == "dispatch_id").unwrap();
    assert_eq!(rows[2][agency], "AGY");
    assert_eq!(rows[2][dispatch], "99");
    assert_eq!(rows[1][dispatch], "1");
}

#[test]
fn extension_is_forced_to_xlsx() {
    let session = filled_session(&["Dispatch ID:1"]);
    let dir = tempfile::tempdir().unwrap();
    let outcome = export_rows(session.rows(), &dir.path().join("scans.csv")).unwrap();
    match outcome {
        ExportOutcome::Written { path, .. } => {
            assert_eq!(path.extension().and_then(|e| e.to_str()), Some("xlsx"));
            assert!(path.exists());
        }
        ExportOutcome::NothingToExport => panic!("expected a written file"),
    }
}

#[test]
fn reading_unknown_sheet_fails() {
    let session = filled_session(&["Dispatch ID:1"]);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("groundnut_dispatch_scans.xlsx");
    export_rows(session.rows(), &path).unwrap();
    let err = read_sheet_rows(&path, "Sheet1").unwrap_err();
    assert!(matches!(err, ExportError::SheetNotFound(_)));
}
