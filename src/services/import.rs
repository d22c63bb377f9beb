use std::collections::HashMap;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use thiserror::Error;

use crate::domain::import::{ImportRow, ImportSummary};
use crate::forms::{ParseNumberError, clean_phone, parse_money_cents, parse_quantity};
use crate::repository::ImportWriter;
use crate::services::ServiceResult;

/// Result type returned by the sheet parser.
pub type ImportResult<T> = Result<T, ImportError>;

/// Errors that abort an import. Nothing is committed when one is
/// raised: the repository applies the parsed rows in one transaction.
#[derive(Debug, Error)]
pub enum ImportError {
    /// No row carries the sentinel header label in its first column.
    #[error("no header row with a FECHA/DATE label was found")]
    MissingHeaderRow,
    /// A non-blank date cell did not parse.
    #[error("row {row}: `{value}` is not a valid date")]
    InvalidDate { row: usize, value: String },
    /// A money or quantity cell did not parse.
    #[error("row {row}: {source}")]
    InvalidNumber {
        row: usize,
        #[source]
        source: ParseNumberError,
    },
    /// CSV-level parsing failure.
    #[error("failed to parse the sheet: {0}")]
    Csv(#[from] csv::Error),
    /// The sheet file could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Outcome of parsing a sheet: rows ready to apply, plus how many data
/// rows were discarded during cleaning.
#[derive(Debug)]
pub struct ParsedSheet {
    /// Cleaned rows, in sheet order.
    pub rows: Vec<ImportRow>,
    /// Data rows discarded (no customer and no product, or no usable
    /// date or order code).
    pub skipped: usize,
}

/// Imports a sheet from disk. See [`import_bytes`].
pub fn import_file<R>(repo: &R, path: &Path) -> ServiceResult<ImportSummary>
where
    R: ImportWriter + ?Sized,
{
    let bytes = std::fs::read(path).map_err(ImportError::from)?;
    import_bytes(repo, &bytes)
}

/// Parses the sheet and applies every row in one transaction. A parse
/// error or a persistence failure leaves the store untouched.
pub fn import_bytes<R>(repo: &R, bytes: &[u8]) -> ServiceResult<ImportSummary>
where
    R: ImportWriter + ?Sized,
{
    let parsed = parse_sheet(bytes)?;

    log::info!(
        "importing {} cleaned rows ({} skipped)",
        parsed.rows.len(),
        parsed.skipped
    );

    let mut summary = repo.import_rows(&parsed.rows)?;
    summary.rows_skipped = parsed.skipped;

    log::info!(
        "import finished: {} customers, {} orders, {} items created",
        summary.customers_created,
        summary.orders_created,
        summary.items_created
    );

    Ok(summary)
}

/// Columns recognized in the sheet, located by header text.
#[derive(Debug, Default)]
struct Columns {
    date: Option<usize>,
    sales_channel: Option<usize>,
    code: Option<usize>,
    customer: Option<usize>,
    phone: Option<usize>,
    address: Option<usize>,
    comuna: Option<usize>,
    product: Option<usize>,
    units: Option<usize>,
    payment_method: Option<usize>,
    document_type: Option<usize>,
    paid: Option<usize>,
    balance: Option<usize>,
    delivery: Option<usize>,
    email: Option<usize>,
    status: Option<usize>,
}

impl Columns {
    fn from_header(header: &StringRecord) -> Self {
        let mut columns = Self::default();

        for (index, label) in header.iter().enumerate() {
            let slot = match normalize_header(label).as_str() {
                "FECHA" | "DATE" => &mut columns.date,
                "CANAL DE VENTA" | "CANAL" => &mut columns.sales_channel,
                "PEDIDO" | "N PEDIDO" => &mut columns.code,
                "CLIENTE" => &mut columns.customer,
                "TELEFONO" => &mut columns.phone,
                "DIRECCION" => &mut columns.address,
                "COMUNA" => &mut columns.comuna,
                "PRODUCTOS" | "PRODUCTO" => &mut columns.product,
                "UNID" | "UNIDADES" => &mut columns.units,
                "FORMA DE PAGO" => &mut columns.payment_method,
                "BOLETA" => &mut columns.document_type,
                "PAGO" => &mut columns.paid,
                "SALDO" => &mut columns.balance,
                "DESPACHO" => &mut columns.delivery,
                "CORREO" => &mut columns.email,
                "ESTADO" => &mut columns.status,
                _ => continue,
            };
            slot.get_or_insert(index);
        }

        columns
    }
}

/// Order-context cells forward-filled down the sheet, so item rows under
/// a merged header inherit their order's data.
#[derive(Debug, Default)]
struct Carry {
    date: String,
    sales_channel: String,
    code: String,
    payment_method: String,
    document_type: String,
    paid: String,
    balance: String,
    delivery: String,
    status: String,
}

impl Carry {
    fn fill(slot: &mut String, value: String) -> String {
        if !value.is_empty() {
            *slot = value;
        }
        slot.clone()
    }
}

/// Last known contact data for one customer. Contact cells are only
/// filled from rows of the same customer, never across customers.
#[derive(Debug, Default, Clone)]
struct Contact {
    phone: Option<String>,
    email: Option<String>,
    address: Option<String>,
    comuna: Option<String>,
}

/// Parse the first sheet of the workbook (as CSV) into cleaned rows.
///
/// The header row is located by scanning for the sentinel label in the
/// first column; everything above it is ignored.
pub fn parse_sheet(bytes: &[u8]) -> ImportResult<ParsedSheet> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let records: Vec<StringRecord> = reader.records().collect::<Result<_, _>>()?;

    let header_index = records
        .iter()
        .position(|record| {
            record
                .get(0)
                .map(normalize_header)
                .is_some_and(|label| label == "FECHA" || label == "DATE")
        })
        .ok_or(ImportError::MissingHeaderRow)?;

    let columns = Columns::from_header(&records[header_index]);

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    let mut carry = Carry::default();
    let mut current_customer: Option<String> = None;
    let mut contacts: HashMap<String, Contact> = HashMap::new();

    for (offset, record) in records[header_index + 1..].iter().enumerate() {
        let row_number = header_index + offset + 2; // 1-based, after the header

        let date_text = Carry::fill(&mut carry.date, cell(record, columns.date));
        let sales_channel = Carry::fill(&mut carry.sales_channel, cell(record, columns.sales_channel));
        let code = Carry::fill(&mut carry.code, cell(record, columns.code));
        let payment_method =
            Carry::fill(&mut carry.payment_method, cell(record, columns.payment_method));
        let document_type =
            Carry::fill(&mut carry.document_type, cell(record, columns.document_type));
        let paid_text = Carry::fill(&mut carry.paid, cell(record, columns.paid));
        let balance_text = Carry::fill(&mut carry.balance, cell(record, columns.balance));
        let delivery = Carry::fill(&mut carry.delivery, cell(record, columns.delivery));
        let status = Carry::fill(&mut carry.status, cell(record, columns.status));

        let explicit_customer = cell(record, columns.customer);
        let product = cell(record, columns.product);

        if explicit_customer.is_empty() && product.is_empty() {
            skipped += 1;
            continue;
        }

        if !explicit_customer.is_empty() {
            current_customer = Some(explicit_customer.clone());

            let info = contacts.entry(explicit_customer.clone()).or_default();
            let phone = phone_cell(record, columns.phone);
            if !phone.is_empty() {
                info.phone = Some(phone);
            }
            let email = cell(record, columns.email);
            if !email.is_empty() {
                info.email = Some(email);
            }
            let address = cell(record, columns.address);
            if !address.is_empty() {
                info.address = Some(address);
            }
            let comuna = cell(record, columns.comuna);
            if !comuna.is_empty() {
                info.comuna = Some(comuna);
            }
        }

        let Some(customer_name) = current_customer.clone() else {
            skipped += 1;
            continue;
        };

        if date_text.is_empty() || code.is_empty() {
            skipped += 1;
            continue;
        }

        let order_date = parse_date(&date_text).ok_or_else(|| ImportError::InvalidDate {
            row: row_number,
            value: date_text.clone(),
        })?;

        let paid_cents = parse_optional_amount(&paid_text, row_number)?;
        let balance_cents = parse_optional_amount(&balance_text, row_number)?;

        let quantity = parse_quantity(&cell(record, columns.units)).map_err(|source| {
            ImportError::InvalidNumber {
                row: row_number,
                source,
            }
        })?;

        // Contact data resolves to the row's own cells first, then to
        // what this customer has provided on earlier rows.
        let info = contacts.get(&customer_name).cloned().unwrap_or_default();
        let row_phone = phone_cell(record, columns.phone);
        let row_email = cell(record, columns.email);
        let row_address = cell(record, columns.address);
        let row_comuna = cell(record, columns.comuna);

        rows.push(ImportRow {
            order_date,
            code,
            customer_name,
            phone: non_empty(row_phone).or(info.phone),
            email: non_empty(row_email).or(info.email),
            address: non_empty(row_address).or(info.address),
            comuna: non_empty(row_comuna).or(info.comuna),
            sales_channel: non_empty(sales_channel),
            payment_method: non_empty(payment_method),
            document_type: non_empty(document_type),
            delivery_method: non_empty(delivery),
            status: non_empty(status),
            paid_cents,
            balance_cents,
            product: non_empty(product),
            quantity,
            unit_price_cents: 0,
        });
    }

    Ok(ParsedSheet { rows, skipped })
}

fn normalize_header(label: &str) -> String {
    label
        .trim()
        .chars()
        .map(|ch| match ch {
            'Á' | 'á' => 'A',
            'É' | 'é' => 'E',
            'Í' | 'í' => 'I',
            'Ó' | 'ó' => 'O',
            'Ú' | 'ú' => 'U',
            '°' => ' ',
            other => other.to_ascii_uppercase(),
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Clean one cell: trim and drop the `nan` artifacts spreadsheets leave
/// in blank cells.
fn clean_cell(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("nan") {
        return String::new();
    }
    trimmed.to_string()
}

fn cell(record: &StringRecord, index: Option<usize>) -> String {
    index
        .and_then(|idx| record.get(idx))
        .map(clean_cell)
        .unwrap_or_default()
}

fn phone_cell(record: &StringRecord, index: Option<usize>) -> String {
    let raw = cell(record, index);
    if raw.is_empty() {
        return raw;
    }
    clean_phone(&raw)
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

fn parse_optional_amount(text: &str, row: usize) -> ImportResult<Option<i64>> {
    if text.is_empty() {
        return Ok(None);
    }

    parse_money_cents(text)
        .map(Some)
        .map_err(|source| ImportError::InvalidNumber { row, source })
}

fn parse_date(text: &str) -> Option<NaiveDateTime> {
    for format in ["%Y-%m-%d %H:%M:%S", "%d-%m-%Y %H:%M:%S"] {
        if let Ok(value) = NaiveDateTime::parse_from_str(text, format) {
            return Some(value);
        }
    }

    for format in ["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y", "%Y/%m/%d"] {
        if let Ok(value) = NaiveDate::parse_from_str(text, format) {
            return value.and_hms_opt(0, 0, 0);
        }
    }

    None
}
