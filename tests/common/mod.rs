//! Shared fixtures: small workbooks built in memory and a reader for results.
#![allow(dead_code)]

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{Days, NaiveDate};
use rust_xlsxwriter::Workbook;

pub const TRANSACTION_HEADERS: [&str; 2] = ["TranDate", "ทะเบียน"];

pub const DELIVERY_HEADERS: [&str; 7] = ["ออก LDT", "ลงสินค้า", "พจส", "พจส2", "เลขรถ", "หัว", "LDT"];

/// Build a single-sheet workbook; empty strings leave the cell blank
pub fn workbook(sheet: &str, rows: &[Vec<&str>]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet).unwrap();
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            if !value.is_empty() {
                worksheet
                    .write_string(u32::try_from(r).unwrap(), u16::try_from(c).unwrap(), *value)
                    .unwrap();
            }
        }
    }
    workbook.save_to_buffer().unwrap()
}

/// Transaction workbook from `(date, registration)` pairs
pub fn transactions_xlsx(rows: &[(&str, &str)]) -> Vec<u8> {
    transactions_xlsx_on_sheet("Sheet1", rows)
}

pub fn transactions_xlsx_on_sheet(sheet: &str, rows: &[(&str, &str)]) -> Vec<u8> {
    let mut table = vec![TRANSACTION_HEADERS.to_vec()];
    table.extend(rows.iter().map(|(date, reg)| vec![*date, *reg]));
    workbook(sheet, &table)
}

/// Delivery workbook from `(departure, head plate, carrier, trip code)` rows,
/// with the title row the dispatch export carries above its header
pub fn deliveries_xlsx(rows: &[(&str, &str, &str, &str)]) -> Vec<u8> {
    let mut table = vec![vec!["Delivery report"], DELIVERY_HEADERS.to_vec()];
    table.extend(
        rows.iter()
            .map(|(date, plate, carrier, trip)| vec![*date, "", *carrier, "", "1", *plate, *trip]),
    );
    workbook("Sheet1", &table)
}

/// Read the first sheet of a workbook as display strings; dates as dd/mm/yyyy
pub fn read_result(bytes: Vec<u8>) -> Vec<Vec<String>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).unwrap();
    let range = workbook.worksheet_range_at(0).unwrap().unwrap();
    range
        .rows()
        .map(|row| row.iter().map(display).collect())
        .collect()
}

fn display(data: &Data) -> String {
    match data {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::DateTime(dt) => {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let days = dt.as_f64().floor() as u64;
            NaiveDate::from_ymd_opt(1899, 12, 30)
                .and_then(|epoch| epoch.checked_add_days(Days::new(days)))
                .map(|d| d.format("%d/%m/%Y").to_string())
                .unwrap_or_default()
        }
        other => other.to_string(),
    }
}
