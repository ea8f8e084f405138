use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::finops::review::error::Result;
use crate::finops::review::report::{CellValue, ReportRow, RowStyle, SheetTable, WorkbookData};

const CURRENCY_FORMAT: &str = "$#,##0";
const PERCENT_FORMAT: &str = "0.0%";
const COUNT_FORMAT: &str = "0";

/// Number formats in a plain and a bold variant.
struct Styles {
    text: Format,
    currency: Format,
    percent: Format,
    count: Format,
    bold_text: Format,
    bold_currency: Format,
    bold_percent: Format,
    bold_count: Format,
}

impl Styles {
    fn new() -> Self {
        Self {
            text: Format::new(),
            currency: Format::new().set_num_format(CURRENCY_FORMAT),
            percent: Format::new().set_num_format(PERCENT_FORMAT),
            count: Format::new().set_num_format(COUNT_FORMAT),
            bold_text: Format::new().set_bold(),
            bold_currency: Format::new().set_bold().set_num_format(CURRENCY_FORMAT),
            bold_percent: Format::new().set_bold().set_num_format(PERCENT_FORMAT),
            bold_count: Format::new().set_bold().set_num_format(COUNT_FORMAT),
        }
    }

    fn for_cell(&self, value: &CellValue, bold: bool) -> &Format {
        match (value, bold) {
            (CellValue::Currency(_), false) => &self.currency,
            (CellValue::Currency(_), true) => &self.bold_currency,
            (CellValue::Percent(_), false) => &self.percent,
            (CellValue::Percent(_), true) => &self.bold_percent,
            (CellValue::Count(_), false) => &self.count,
            (CellValue::Count(_), true) => &self.bold_count,
            (_, false) => &self.text,
            (_, true) => &self.bold_text,
        }
    }
}

/// Writes the provided workbook data to the given path, one sheet per table.
pub fn write_workbook(path: &Path, workbook: &WorkbookData) -> Result<()> {
    let mut workbook_writer = Workbook::new();
    let styles = Styles::new();

    for table in &workbook.tables {
        let worksheet = workbook_writer.add_worksheet();
        write_table(worksheet, table, &styles)?;
    }

    workbook_writer.save(path)?;
    Ok(())
}

fn write_table(worksheet: &mut Worksheet, table: &SheetTable, styles: &Styles) -> Result<()> {
    worksheet.set_name(&table.sheet_name)?;

    for (col_idx, header) in table.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col_idx as u16, header, &styles.bold_text)?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        write_row(worksheet, (row_idx + 1) as u32, row, styles)?;
    }

    worksheet.autofit();
    Ok(())
}

fn write_row(worksheet: &mut Worksheet, row_num: u32, row: &ReportRow, styles: &Styles) -> Result<()> {
    for (col_idx, cell) in row.cells.iter().enumerate() {
        let col_num = col_idx as u16;
        let bold = match row.style {
            RowStyle::Data => false,
            RowStyle::Highlight | RowStyle::Total | RowStyle::SectionHeader => true,
            RowStyle::Note => col_idx == 0,
        };
        let format = styles.for_cell(cell, bold);

        match cell {
            CellValue::Text(value) => {
                if !value.is_empty() {
                    worksheet.write_string_with_format(row_num, col_num, value, format)?;
                }
            }
            CellValue::Currency(value) | CellValue::Percent(value) | CellValue::Count(value) => {
                worksheet.write_number_with_format(row_num, col_num, *value, format)?;
            }
            CellValue::Empty => {}
        }
    }
    Ok(())
}
