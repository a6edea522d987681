//! Builds the monthly report spreadsheet.
//!
//! The workbook has two sheets: a summary sheet with totals and per-category
//! breakdowns, and a detail sheet listing every transaction with a live SUM
//! formula in its total row. The whole artifact is produced in memory; on
//! failure nothing is written anywhere, so a partial file can never escape.

use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Color, Format, Formula, Workbook, XlsxError};
use time::{Date, macros::format_description};

use crate::{
    Error,
    dashboard::aggregation::{CategoryTotal, Totals, by_category, totals},
    transaction::{Transaction, TransactionKind},
    window::MonthWindow,
};

/// The MIME type for the exported spreadsheet.
pub(super) const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

impl From<XlsxError> for Error {
    fn from(error: XlsxError) -> Self {
        Error::ExportError(error.to_string())
    }
}

/// The filename for a monthly report, e.g. "Monthly_Report_June_2025.xlsx".
pub(super) fn report_filename(window: MonthWindow) -> String {
    format!("Monthly_Report_{}.xlsx", window.label().replace(' ', "_"))
}

/// Build the spreadsheet for one calendar month of transactions.
///
/// Returns the complete workbook as an in-memory buffer.
///
/// # Errors
/// Returns an [Error::ExportError] carrying the underlying cause if the
/// workbook cannot be constructed.
pub fn build_monthly_report(
    transactions: &[Transaction],
    window: MonthWindow,
) -> Result<Vec<u8>, Error> {
    let summary = totals(transactions);
    let income_by_category = by_category(transactions, TransactionKind::Income);
    let expense_by_category = by_category(transactions, TransactionKind::Expense);

    let mut workbook = Workbook::new();

    write_summary_sheet(
        &mut workbook,
        window,
        &summary,
        &income_by_category,
        &expense_by_category,
    )?;
    write_detail_sheet(&mut workbook, transactions)?;

    let buffer = workbook.save_to_buffer()?;

    Ok(buffer)
}

fn money_format() -> Format {
    Format::new().set_num_format("#,##0.00")
}

fn write_summary_sheet(
    workbook: &mut Workbook,
    window: MonthWindow,
    summary: &Totals,
    income_by_category: &[CategoryTotal],
    expense_by_category: &[CategoryTotal],
) -> Result<(), XlsxError> {
    let title_format = Format::new().set_bold().set_font_size(18.0);
    let subtitle_format = Format::new().set_font_size(14.0);
    let section_format = Format::new().set_bold().set_font_size(12.0);
    let bold = Format::new().set_bold();
    let money_green = money_format().set_font_color(Color::Green);
    let money_red = money_format().set_font_color(Color::Red);
    let balance_format = if summary.balance() >= rust_decimal::Decimal::ZERO {
        money_format().set_bold().set_font_color(Color::Green)
    } else {
        money_format().set_bold().set_font_color(Color::Red)
    };
    let income_header = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x90EE90));
    let expense_header = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xFFB6C1));

    let sheet = workbook.add_worksheet();
    sheet.set_name("Summary")?;

    sheet.merge_range(0, 0, 0, 1, "MONTHLY REPORT", &title_format)?;
    sheet.merge_range(1, 0, 1, 1, &window.label(), &subtitle_format)?;

    sheet.write_string_with_format(3, 0, "Summary", &section_format)?;

    sheet.write_string(4, 0, "Total Income:")?;
    sheet.write_number_with_format(4, 1, to_cell_value(summary.income), &money_green)?;
    sheet.write_string(5, 0, "Total Expense:")?;
    sheet.write_number_with_format(5, 1, to_cell_value(summary.expense), &money_red)?;
    sheet.write_string(6, 0, "Balance:")?;
    sheet.write_number_with_format(6, 1, to_cell_value(summary.balance()), &balance_format)?;

    let mut row: u32 = 8;

    if !income_by_category.is_empty() {
        sheet.write_string_with_format(row, 0, "Income Breakdown", &bold)?;
        write_category_table(sheet, row + 1, income_by_category, &income_header)?;
        row += 2 + income_by_category.len() as u32 + 2;
    }

    if !expense_by_category.is_empty() {
        sheet.write_string_with_format(row, 0, "Expense Breakdown", &bold)?;
        write_category_table(sheet, row + 1, expense_by_category, &expense_header)?;
    }

    sheet.autofit();

    Ok(())
}

fn write_category_table(
    sheet: &mut rust_xlsxwriter::Worksheet,
    header_row: u32,
    categories: &[CategoryTotal],
    header_format: &Format,
) -> Result<(), XlsxError> {
    let money = money_format();

    sheet.write_string_with_format(header_row, 0, "Category", header_format)?;
    sheet.write_string_with_format(header_row, 1, "Transactions", header_format)?;
    sheet.write_string_with_format(header_row, 2, "Amount", header_format)?;

    for (offset, category) in categories.iter().enumerate() {
        let row = header_row + 1 + offset as u32;
        sheet.write_string(row, 0, &category.category)?;
        sheet.write_number(row, 1, category.count as f64)?;
        sheet.write_number_with_format(row, 2, to_cell_value(category.amount), &money)?;
    }

    Ok(())
}

fn write_detail_sheet(
    workbook: &mut Workbook,
    transactions: &[Transaction],
) -> Result<(), XlsxError> {
    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xADD8E6));
    let money = money_format();
    let income_format = Format::new().set_font_color(Color::Green);
    let expense_format = Format::new().set_font_color(Color::Red);
    let total_label_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xD3D3D3));
    let total_amount_format = money_format()
        .set_bold()
        .set_background_color(Color::RGB(0xD3D3D3));

    let sheet = workbook.add_worksheet();
    sheet.set_name("All Transactions")?;

    for (column, header) in ["Date", "Type", "Category", "Description", "Amount"]
        .iter()
        .enumerate()
    {
        sheet.write_string_with_format(0, column as u16, *header, &header_format)?;
    }

    for (offset, transaction) in transactions.iter().enumerate() {
        let row = 1 + offset as u32;

        let kind_format = match transaction.kind {
            TransactionKind::Income => &income_format,
            TransactionKind::Expense => &expense_format,
        };

        sheet.write_string(row, 0, &format_report_date(transaction.date))?;
        sheet.write_string_with_format(row, 1, transaction.kind.as_str(), kind_format)?;
        sheet.write_string(row, 2, transaction.category.as_ref())?;
        sheet.write_string(row, 3, transaction.description.as_deref().unwrap_or("-"))?;
        sheet.write_number_with_format(row, 4, to_cell_value(transaction.amount), &money)?;
    }

    // The total row uses a live SUM formula rather than a precomputed value,
    // so the sheet stays self-consistent if rows are edited afterwards.
    if !transactions.is_empty() {
        let total_row = 1 + transactions.len() as u32;
        let formula = Formula::new(format!("=SUM(E2:E{})", transactions.len() + 1));

        sheet.write_string_with_format(total_row, 3, "TOTAL:", &total_label_format)?;
        sheet.write_formula_with_format(total_row, 4, formula, &total_amount_format)?;
    }

    sheet.autofit();

    Ok(())
}

fn to_cell_value(amount: rust_decimal::Decimal) -> f64 {
    amount.to_f64().unwrap_or_default()
}

fn format_report_date(date: Date) -> String {
    let format = format_description!("[day]-[month repr:short]-[year]");

    date.format(&format).unwrap_or_else(|_| date.to_string())
}
