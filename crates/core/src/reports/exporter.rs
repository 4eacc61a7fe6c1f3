//! Spreadsheet export of ledger rows.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{ColNum, Format, RowNum, Workbook, Worksheet};

use super::error::ReportError;
use super::types::LedgerEntry;

/// Largest integer an xlsx number cell holds exactly (2^53).
const MAX_EXACT_INTEGER: u64 = 1 << 53;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Writes ledger rows as a single-sheet xlsx workbook.
pub struct TabularExporter;

impl TabularExporter {
    /// Name of the only worksheet.
    pub const SHEET_NAME: &'static str = "Sheet1";

    /// Header row, one column per [`LedgerEntry`] field.
    pub const COLUMNS: [&'static str; 10] = [
        "id",
        "date",
        "user_email",
        "admin",
        "status",
        "type",
        "original_id",
        "amount",
        "currency",
        "description",
    ];

    /// Serializes `rows` in the order given.
    ///
    /// Dates are written as UTC text, amounts as numbers and absent values as
    /// empty cells. An empty slice produces a workbook holding only the header.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::SerializationFailed`] if a value does not fit in
    /// a cell (text over 32,767 characters, ids beyond 2^53) or the sheet
    /// runs out of rows.
    pub fn export(rows: &[LedgerEntry]) -> Result<Vec<u8>, ReportError> {
        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(Self::SHEET_NAME)?;
        for (col, name) in (0..).zip(Self::COLUMNS) {
            worksheet.write_string_with_format(0, col, name, &header_format)?;
        }
        worksheet.set_freeze_panes(1, 0)?;

        for (index, entry) in rows.iter().enumerate() {
            let row = RowNum::try_from(index + 1)
                .map_err(|_| ReportError::serialization_failed("too many rows for one sheet"))?;
            write_entry(worksheet, row, entry)?;
        }

        Ok(workbook.save_to_buffer()?)
    }
}

fn write_entry(sheet: &mut Worksheet, row: RowNum, entry: &LedgerEntry) -> Result<(), ReportError> {
    if entry.id.unsigned_abs() > MAX_EXACT_INTEGER {
        return Err(ReportError::serialization_failed(format!(
            "entry id {} exceeds spreadsheet integer precision",
            entry.id
        )));
    }
    let amount = number_cell(entry.amount).ok_or_else(|| {
        ReportError::serialization_failed(format!(
            "amount {} of entry {} is not representable as a spreadsheet number",
            entry.amount, entry.id
        ))
    })?;

    #[allow(clippy::cast_precision_loss)]
    sheet.write_number(row, 0, entry.id as f64)?;
    sheet.write_string(row, 1, entry.date.format(DATE_FORMAT).to_string())?;
    sheet.write_string(row, 2, &entry.user_email)?;
    write_optional(sheet, row, 3, entry.admin.as_deref())?;
    sheet.write_string(row, 4, &entry.status)?;
    sheet.write_string(row, 5, &entry.transaction_type)?;
    write_optional(sheet, row, 6, entry.original_id.as_deref())?;
    sheet.write_number(row, 7, amount)?;
    sheet.write_string(row, 8, &entry.currency)?;
    write_optional(sheet, row, 9, entry.description.as_deref())?;
    Ok(())
}

/// The cell value for `amount`, if it reads back as exactly `amount`.
fn number_cell(amount: Decimal) -> Option<f64> {
    amount
        .to_f64()
        .filter(|value| value.to_string().parse::<Decimal>().is_ok_and(|back| back == amount))
}

fn write_optional(
    sheet: &mut Worksheet,
    row: RowNum,
    col: ColNum,
    value: Option<&str>,
) -> Result<(), ReportError> {
    if let Some(value) = value {
        sheet.write_string(row, col, value)?;
    }
    Ok(())
}
