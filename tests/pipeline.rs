use provetl::config::Config;
use provetl::db::{self, AuthStrategy, ConnectionProbe};
use provetl::io::{
    frame_to_xlsx_buffer, read_csv_file, read_excel_bytes, read_excel_file, write_csv_file,
    write_xlsx_file,
};
use provetl::model::{Cell, Frame};
use provetl::{EtlError, Result};
use std::fs;
use tempfile::tempdir;

fn report_frame() -> Frame {
    let mut frame = Frame::new(vec![
        "PROVIDERTIN".to_string(),
        "ProviderName".to_string(),
        "Amount".to_string(),
    ]);
    frame
        .push_row(vec![
            Cell::Text("123456789".to_string()),
            Cell::Text("Acme Clinic".to_string()),
            Cell::Float(1250.5),
        ])
        .expect("row pushed");
    frame
        .push_row(vec![
            Cell::Text("987654321".to_string()),
            Cell::Null,
            Cell::Int(80),
        ])
        .expect("row pushed");
    frame
}

fn text_matrix(frame: &Frame) -> Vec<Vec<String>> {
    frame
        .rows
        .iter()
        .map(|row| row.iter().map(Cell::as_text).collect())
        .collect()
}

#[test]
fn csv_roundtrip_preserves_values() {
    let frame = report_frame();
    let temp_dir = tempdir().expect("temporary directory");
    let csv_path = temp_dir.path().join("report.csv");

    write_csv_file(&csv_path, &frame).expect("CSV written");
    let restored = read_csv_file(&csv_path).expect("CSV read");

    assert_eq!(restored.columns, frame.columns);
    assert_eq!(text_matrix(&restored), text_matrix(&frame));
    assert_eq!(restored.rows[1][1], Cell::Null);
}

#[test]
fn excel_roundtrip_preserves_values() {
    let frame = report_frame();
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("report.xlsx");

    write_xlsx_file(&xlsx_path, &frame).expect("Excel written");
    let restored = read_excel_file(&xlsx_path, None).expect("Excel read");

    assert_eq!(restored.columns, frame.columns);
    assert_eq!(text_matrix(&restored), text_matrix(&frame));
}

#[test]
fn workbook_buffer_matches_file_output() {
    let frame = report_frame();
    let buffer = frame_to_xlsx_buffer(&frame).expect("workbook rendered");
    let restored = read_excel_bytes(&buffer, None).expect("workbook read");

    assert_eq!(restored.columns, frame.columns);
    assert_eq!(text_matrix(&restored), text_matrix(&frame));
}

struct BasicOnlyProbe;

impl ConnectionProbe for BasicOnlyProbe {
    fn probe(&mut self, conn_str: &str) -> Result<()> {
        if conn_str.contains("User ID=") {
            Ok(())
        } else {
            Err(EtlError::Io(std::io::Error::other("refused")))
        }
    }
}

#[test]
fn config_drives_connection_negotiation() {
    let temp_dir = tempdir().expect("temporary directory");
    let config_path = temp_dir.path().join("provetl.ini");
    fs::write(
        &config_path,
        "[DatabaseConfig]\n\
         server = sqlhost\n\
         database = analytics\n\
         username = svc_provider\n\
         password = secret\n\
         sso = yes\n",
    )
    .expect("config written");

    let config = Config::load(&config_path).expect("config loaded");
    let settings = config.database().expect("database settings");
    assert_eq!(
        settings.strategies(),
        vec![AuthStrategy::Sso, AuthStrategy::Basic]
    );

    let resolved = db::resolve_connection_string(&settings, &mut BasicOnlyProbe)
        .expect("fallback reached basic auth");
    assert!(resolved.contains("User ID=svc_provider"));
    assert!(resolved.contains("Database=analytics"));
}
