//! # Receipt Rendering
//!
//! Plain-text receipts for thermal printers and the "print bill" screen.
//!
//! ## Layout (42 columns)
//! ```text
//!                  Tally Store
//! ==========================================
//! Receipt: 20261019-0001
//! Date: 2026-10-19 14:30
//! ------------------------------------------
//! Tea 250g
//!   3 x Rs.100.00                 Rs.300.00
//! Sugar 1kg
//!   1 x Rs.250.00                 Rs.250.00
//! ------------------------------------------
//! TOTAL                           Rs.550.00
//! ==========================================
//!           Thank you for shopping
//! ```

use chrono::{FixedOffset, Offset, Utc};

use crate::money::Money;
use crate::types::Bill;

/// Narrowest supported paper width.
pub const MIN_RECEIPT_WIDTH: usize = 24;
/// Widest supported paper width.
pub const MAX_RECEIPT_WIDTH: usize = 80;

/// Receipt appearance settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptLayout {
    pub store_name: String,
    pub currency_symbol: String,
    /// Characters per line, clamped to `MIN_RECEIPT_WIDTH..=MAX_RECEIPT_WIDTH`.
    pub width: usize,
    /// Offset used to print the bill time.
    pub utc_offset: FixedOffset,
}

impl Default for ReceiptLayout {
    fn default() -> Self {
        ReceiptLayout {
            store_name: "Tally Store".to_string(),
            currency_symbol: "Rs.".to_string(),
            width: 42,
            utc_offset: Utc.fix(),
        }
    }
}

/// Renders a bill as plain text, one `\n` terminated row per line.
pub fn render_receipt(bill: &Bill, layout: &ReceiptLayout) -> String {
    let width = layout.width.clamp(MIN_RECEIPT_WIDTH, MAX_RECEIPT_WIDTH);
    let money = |m: Money| m.format_with_symbol(&layout.currency_symbol);
    let mut out = String::new();

    push_row(&mut out, &center(&layout.store_name, width));
    push_row(&mut out, &"=".repeat(width));
    push_row(&mut out, &fit(&format!("Receipt: {}", bill.receipt_number), width));
    let local = bill.created_at.with_timezone(&layout.utc_offset);
    push_row(&mut out, &format!("Date: {}", local.format("%Y-%m-%d %H:%M")));
    if let Some(customer) = &bill.customer_id {
        push_row(&mut out, &fit(&format!("Customer: {customer}"), width));
    }
    push_row(&mut out, &"-".repeat(width));

    for line in &bill.lines {
        push_row(&mut out, &fit(&line.product_name, width));
        let left = format!(
            "  {} x {}",
            line.quantity_sold,
            money(line.price_sale_per_unit)
        );
        push_row(&mut out, &two_columns(&left, &money(line.price_sale_amount), width));
    }

    push_row(&mut out, &"-".repeat(width));
    push_row(
        &mut out,
        &two_columns("TOTAL", &money(bill.total_sale_amount), width),
    );
    push_row(&mut out, &"=".repeat(width));
    push_row(&mut out, &center("Thank you for shopping", width));
    out
}

fn push_row(out: &mut String, row: &str) {
    out.push_str(row.trim_end());
    out.push('\n');
}

/// Truncates to `width` characters.
fn fit(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

fn center(text: &str, width: usize) -> String {
    let text = fit(text, width);
    let pad = (width - text.chars().count()) / 2;
    format!("{}{}", " ".repeat(pad), text)
}

/// Left text and right text on one row; the left side is cut when both
/// do not fit.
fn two_columns(left: &str, right: &str, width: usize) -> String {
    let right_len = right.chars().count();
    if right_len >= width {
        return fit(right, width);
    }
    let room = width - right_len - 1;
    let left = fit(left, room);
    let gap = width - left.chars().count() - right_len;
    format!("{}{}{}", left, " ".repeat(gap), right)
}

// =============================================================================
// Unit Tests
// =============================================================================
