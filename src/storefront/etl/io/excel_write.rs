use std::path::Path;

use rust_xlsxwriter::{Table, TableColumn, Workbook};

use crate::storefront::etl::error::Result;
use crate::storefront::etl::model::ConsolidatedRecord;

/// Worksheet holding the exported products.
pub const PRODUCTS_SHEET: &str = "Products";

/// Column headers, in the order the snapshot lists the fields.
pub const PRODUCT_COLUMNS: [&str; 8] = [
    "id",
    "name",
    "category",
    "price",
    "stock",
    "description",
    "supplier",
    "price_change_percentage",
];

/// Writes the consolidated records to a single-sheet workbook at `path`.
/// Absent optional values are left as empty cells.
pub fn write_products(path: &Path, records: &[ConsolidatedRecord]) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(PRODUCTS_SHEET)?;

    for (col_idx, column) in PRODUCT_COLUMNS.iter().enumerate() {
        worksheet.write_string(0, col_idx as u16, *column)?;
    }

    for (row_idx, record) in records.iter().enumerate() {
        let row = (row_idx + 1) as u32;
        worksheet.write_number(row, 0, record.id as f64)?;
        worksheet.write_string(row, 1, record.name.as_str())?;
        worksheet.write_string(row, 2, record.category.as_str())?;
        worksheet.write_number(row, 3, record.price)?;
        worksheet.write_number(row, 4, record.stock as f64)?;
        if let Some(description) = &record.description {
            worksheet.write_string(row, 5, description.as_str())?;
        }
        if let Some(supplier) = &record.supplier {
            worksheet.write_string(row, 6, supplier.as_str())?;
        }
        if let Some(change) = record.price_change_percentage {
            worksheet.write_number(row, 7, change)?;
        }
    }

    // A table needs at least one data row below its header.
    if !records.is_empty() {
        let columns: Vec<TableColumn> = PRODUCT_COLUMNS
            .iter()
            .map(|column| TableColumn::new().set_header(*column))
            .collect();
        let mut table = Table::new();
        table.set_autofilter(true).set_columns(&columns);
        let col_end = (PRODUCT_COLUMNS.len() as u16).saturating_sub(1);
        worksheet.add_table(0, 0, records.len() as u32, col_end, &table)?;
    }

    workbook.save(path)?;
    Ok(())
}
