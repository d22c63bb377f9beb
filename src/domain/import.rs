use chrono::NaiveDateTime;

/// One cleaned spreadsheet row, ready to be applied to the store.
///
/// Rows are produced by the importer after header detection, cell
/// cleaning and forward-filling; every row carries a resolved date, an
/// order code and a customer name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    /// Date of the order the row belongs to.
    pub order_date: NaiveDateTime,
    /// Order code the row belongs to.
    pub code: String,
    /// Name of the customer, the directory match key.
    pub customer_name: String,
    /// Contact phone, digits only, scoped to this customer.
    pub phone: Option<String>,
    /// Contact email, scoped to this customer.
    pub email: Option<String>,
    /// Street address, scoped to this customer.
    pub address: Option<String>,
    /// Comuna, scoped to this customer.
    pub comuna: Option<String>,
    /// Sales channel carried by the order context.
    pub sales_channel: Option<String>,
    /// Payment method carried by the order context.
    pub payment_method: Option<String>,
    /// Document type carried by the order context.
    pub document_type: Option<String>,
    /// Delivery method carried by the order context.
    pub delivery_method: Option<String>,
    /// Status text carried by the order context.
    pub status: Option<String>,
    /// Paid amount in cents, when the sheet provides one.
    pub paid_cents: Option<i64>,
    /// Balance in cents, when the sheet provides one.
    pub balance_cents: Option<i64>,
    /// Product description; rows without one create no line item.
    pub product: Option<String>,
    /// Units for the line item.
    pub quantity: i32,
    /// Unit price in cents for the line item.
    pub unit_price_cents: i64,
}

/// Counters reported after an import or a store merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Customers created (not matched by name).
    pub customers_created: usize,
    /// Orders created (not matched by code).
    pub orders_created: usize,
    /// Line items created (tuple not already present).
    pub items_created: usize,
    /// Spreadsheet rows discarded during cleaning.
    pub rows_skipped: usize,
}

/// Counters reported after merging an external store file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Customers added (no RUT or name match in the live store).
    pub customers_added: usize,
    /// Orders added (code not present in the live store).
    pub orders_added: usize,
    /// Line items added (tuple not present on the mapped order).
    pub items_added: usize,
}
