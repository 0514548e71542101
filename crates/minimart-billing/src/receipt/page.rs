//! # Page Receipt Layout
//!
//! A4/A5 tax-invoice layout: bordered item table with HSN and GST rate
//! columns, for customers who want a full invoice rather than a roll slip.

use std::fmt::Write;

use super::{escape_html, ReceiptData};

/// Renders the page (wide table) layout as a standalone HTML document.
pub fn render(data: &ReceiptData) -> String {
    let txn = &data.transaction;
    let fig = &data.figures;
    let profile = &data.profile;

    let mut html = String::with_capacity(6144);

    html.push_str(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><style>\n\
         body { font-family: Arial, sans-serif; font-size: 13px; \
                max-width: 700px; margin: 0 auto; color: #111; }\n\
         header { text-align: center; margin-bottom: 12px; }\n\
         h1 { font-size: 20px; margin: 0; }\n\
         .meta { display: flex; justify-content: space-between; margin: 8px 0; }\n\
         table { width: 100%; border-collapse: collapse; }\n\
         th, td { border: 1px solid #444; padding: 4px 6px; text-align: left; }\n\
         td.num, th.num { text-align: right; }\n\
         .totals { margin-top: 10px; margin-left: auto; width: 280px; }\n\
         .totals div { display: flex; justify-content: space-between; padding: 2px 0; }\n\
         .grand { font-weight: bold; font-size: 15px; border-top: 2px solid #111; }\n\
         footer { text-align: center; margin-top: 16px; }\n\
         </style></head><body>\n",
    );

    // Header
    let _ = write!(
        html,
        "<header><h1>{}</h1><div>{}</div>",
        escape_html(&profile.name),
        escape_html(&profile.tagline),
    );
    if !profile.address.is_empty() {
        let _ = write!(html, "<div>{}</div>", escape_html(&profile.address));
    }
    let mut contact = Vec::new();
    if !profile.phone.is_empty() {
        contact.push(format!("Ph: {}", escape_html(&profile.phone)));
    }
    if !profile.gstin.is_empty() {
        contact.push(format!("GSTIN: {}", escape_html(&profile.gstin)));
    }
    if !contact.is_empty() {
        let _ = write!(html, "<div>{}</div>", contact.join(" | "));
    }
    html.push_str("<div><strong>TAX INVOICE</strong></div></header>\n");

    // Invoice meta
    let _ = write!(
        html,
        "<div class=\"meta\"><span>Invoice: <strong>{}</strong></span>\
         <span>Date: {}</span></div>\n\
         <div class=\"meta\"><span>Cashier: {}</span>",
        escape_html(&txn.invoice_number),
        txn.created_at.format("%d/%m/%Y %H:%M"),
        escape_html(&txn.cashier_name),
    );
    if let Some(name) = &txn.customer_name {
        let phone = txn.customer_phone.as_deref().unwrap_or("");
        let _ = write!(
            html,
            "<span>Customer: {} {}</span>",
            escape_html(name),
            escape_html(phone)
        );
    }
    html.push_str("</div>\n");

    // Item table
    html.push_str(
        "<table><thead><tr>\
         <th>#</th><th>Item</th><th>HSN</th><th class=\"num\">Qty</th>\
         <th class=\"num\">MRP</th><th class=\"num\">Rate</th>\
         <th class=\"num\">GST%</th><th class=\"num\">Amount</th>\
         </tr></thead><tbody>\n",
    );
    for (idx, item) in data.items.iter().enumerate() {
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td class=\"num\">{}</td>\
             <td class=\"num\">{}</td><td class=\"num\">{}</td>\
             <td class=\"num\">{:.1}</td><td class=\"num\">{}</td></tr>\n",
            idx + 1,
            escape_html(&item.name_snapshot),
            escape_html(&item.hsn_snapshot),
            item.quantity,
            minimart_core::Money::from_cents(item.mrp_cents),
            item.unit_price(),
            item.gst_rate_bps as f64 / 100.0,
            item.line_total(),
        );
    }
    html.push_str("</tbody></table>\n");

    // Totals
    let _ = write!(
        html,
        "<div class=\"totals\">\
         <div><span>Subtotal</span><span>{}</span></div>\
         <div><span>CGST</span><span>{}</span></div>\
         <div><span>SGST</span><span>{}</span></div>",
        fig.subtotal, fig.cgst, fig.sgst,
    );
    if !fig.loyalty_discount.is_zero() {
        let _ = write!(
            html,
            "<div><span>Loyalty Discount</span><span>-{}</span></div>",
            fig.loyalty_discount
        );
    }
    if !fig.manual_discount.is_zero() {
        let _ = write!(
            html,
            "<div><span>Discount</span><span>-{}</span></div>",
            fig.manual_discount
        );
    }
    if !fig.rounding.is_zero() {
        let _ = write!(html, "<div><span>Round Off</span><span>{}</span></div>", fig.rounding);
    }
    let _ = write!(
        html,
        "<div class=\"grand\"><span>Grand Total</span><span>{}</span></div>\
         <div><span>Payment</span><span>{}</span></div>",
        fig.total,
        txn.payment_method.label(),
    );
    if let (Some(tendered), Some(change)) = (txn.cash_tendered_cents, txn.change_cents) {
        let _ = write!(
            html,
            "<div><span>Cash Tendered</span><span>{}</span></div>\
             <div><span>Change</span><span>{}</span></div>",
            minimart_core::Money::from_cents(tendered),
            minimart_core::Money::from_cents(change),
        );
    }
    html.push_str("</div>\n");

    if fig.total_savings.is_positive() {
        let _ = write!(
            html,
            "<div style=\"text-align:right\"><strong>Total savings: {}</strong></div>\n",
            fig.total_savings
        );
    }

    if txn.customer_id.is_some() {
        let _ = write!(
            html,
            "<div style=\"text-align:right\">Loyalty points earned: {} | redeemed: {}</div>\n",
            txn.loyalty_points_earned, txn.loyalty_points_redeemed,
        );
    }

    let _ = write!(
        html,
        "<footer>{}</footer></body></html>\n",
        escape_html(&profile.footer)
    );

    html
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::super::tests::{sample_items, sample_transaction};
    use super::super::{ReceiptData, StoreProfile};
    use super::*;

    #[test]
    fn test_page_renders_table_and_totals() {
        let txn = sample_transaction();
        let items = sample_items(&txn.id);
        let data = ReceiptData::new(StoreProfile::default(), txn, items);

        let html = render(&data);

        assert!(html.contains("TAX INVOICE"));
        assert!(html.contains("<th>HSN</th>"));
        assert!(html.contains("1905")); // HSN column populated
        assert!(html.contains("18.0")); // GST% column
        assert!(html.contains("Grand Total"));
        assert!(html.contains("₹289.00"));
        assert!(html.contains("Total savings: ₹4.00"));
    }

    #[test]
    fn test_both_layouts_agree_on_totals() {
        let txn = sample_transaction();
        let items = sample_items(&txn.id);
        let data = ReceiptData::new(StoreProfile::default(), txn, items);

        let page = render(&data);
        let thermal = super::super::thermal::render(&data);

        for figure in ["₹250.00", "₹19.25", "₹289.00"] {
            assert!(page.contains(figure), "page missing {figure}");
            assert!(thermal.contains(figure), "thermal missing {figure}");
        }
    }
}
