//! # Thermal Receipt Layout
//!
//! 80mm roll-printer layout: monospace, centered header, dashed rules.
//! Designed to print legibly on cheap thermal paper, so no colors and
//! no table borders.

use std::fmt::Write;

use minimart_core::LOYALTY_EARN_SLAB_CENTS;

use super::{escape_html, ReceiptData};

/// Renders the thermal (roll) layout as a standalone HTML document.
pub fn render(data: &ReceiptData) -> String {
    let txn = &data.transaction;
    let fig = &data.figures;
    let profile = &data.profile;

    let mut html = String::with_capacity(4096);

    html.push_str(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><style>\n\
         body { font-family: 'Courier New', monospace; font-size: 12px; \
                width: 280px; margin: 0 auto; color: #000; }\n\
         .center { text-align: center; }\n\
         .rule { border-top: 1px dashed #000; margin: 4px 0; }\n\
         .row { display: flex; justify-content: space-between; }\n\
         .bold { font-weight: bold; }\n\
         .big { font-size: 14px; }\n\
         </style></head><body>\n",
    );

    // Header
    let _ = write!(
        html,
        "<div class=\"center bold big\">{}</div>\n\
         <div class=\"center\">{}</div>\n",
        escape_html(&profile.name),
        escape_html(&profile.tagline),
    );
    if !profile.address.is_empty() {
        let _ = write!(html, "<div class=\"center\">{}</div>\n", escape_html(&profile.address));
    }
    if !profile.phone.is_empty() {
        let _ = write!(html, "<div class=\"center\">Ph: {}</div>\n", escape_html(&profile.phone));
    }
    if !profile.gstin.is_empty() {
        let _ = write!(html, "<div class=\"center\">GSTIN: {}</div>\n", escape_html(&profile.gstin));
    }

    html.push_str("<div class=\"rule\"></div>\n");

    // Invoice meta
    let _ = write!(
        html,
        "<div class=\"row\"><span>Invoice:</span><span>{}</span></div>\n\
         <div class=\"row\"><span>Date:</span><span>{}</span></div>\n\
         <div class=\"row\"><span>Cashier:</span><span>{}</span></div>\n",
        escape_html(&txn.invoice_number),
        txn.created_at.format("%d/%m/%Y %H:%M"),
        escape_html(&txn.cashier_name),
    );
    if let Some(name) = &txn.customer_name {
        let _ = write!(
            html,
            "<div class=\"row\"><span>Customer:</span><span>{}</span></div>\n",
            escape_html(name)
        );
    }

    html.push_str("<div class=\"rule\"></div>\n");

    // Items: name line, then qty × price = total line. MRP is struck
    // through when the item sold below it.
    for item in &data.items {
        let _ = write!(html, "<div>{}</div>\n", escape_html(&item.name_snapshot));
        if item.mrp_cents > item.selling_price_cents {
            let _ = write!(
                html,
                "<div class=\"row\"><span>  {} x <s>{}</s> {}</span><span>{}</span></div>\n",
                item.quantity,
                minimart_core::Money::from_cents(item.mrp_cents),
                item.unit_price(),
                item.line_total(),
            );
        } else {
            let _ = write!(
                html,
                "<div class=\"row\"><span>  {} x {}</span><span>{}</span></div>\n",
                item.quantity,
                item.unit_price(),
                item.line_total(),
            );
        }
    }

    html.push_str("<div class=\"rule\"></div>\n");

    // Totals chain
    let _ = write!(
        html,
        "<div class=\"row\"><span>Subtotal</span><span>{}</span></div>\n\
         <div class=\"row\"><span>CGST</span><span>{}</span></div>\n\
         <div class=\"row\"><span>SGST</span><span>{}</span></div>\n",
        fig.subtotal, fig.cgst, fig.sgst,
    );
    if !fig.loyalty_discount.is_zero() {
        let _ = write!(
            html,
            "<div class=\"row\"><span>Loyalty Discount</span><span>-{}</span></div>\n",
            fig.loyalty_discount
        );
    }
    if !fig.manual_discount.is_zero() {
        let _ = write!(
            html,
            "<div class=\"row\"><span>Discount</span><span>-{}</span></div>\n",
            fig.manual_discount
        );
    }
    if !fig.rounding.is_zero() {
        let _ = write!(
            html,
            "<div class=\"row\"><span>Round Off</span><span>{}</span></div>\n",
            fig.rounding
        );
    }

    let _ = write!(
        html,
        "<div class=\"rule\"></div>\n\
         <div class=\"row bold big\"><span>TOTAL</span><span>{}</span></div>\n\
         <div class=\"row\"><span>Paid by</span><span>{}</span></div>\n",
        fig.total,
        txn.payment_method.label(),
    );

    if let (Some(tendered), Some(change)) = (txn.cash_tendered_cents, txn.change_cents) {
        let _ = write!(
            html,
            "<div class=\"row\"><span>Cash</span><span>{}</span></div>\n\
             <div class=\"row\"><span>Change</span><span>{}</span></div>\n",
            minimart_core::Money::from_cents(tendered),
            minimart_core::Money::from_cents(change),
        );
    }

    if fig.total_savings.is_positive() {
        let _ = write!(
            html,
            "<div class=\"center bold\">You saved {}</div>\n",
            fig.total_savings
        );
    }

    // Loyalty block only for attached customers
    if txn.customer_id.is_some() {
        html.push_str("<div class=\"rule\"></div>\n");
        let _ = write!(
            html,
            "<div class=\"row\"><span>Points earned</span><span>{}</span></div>\n",
            txn.loyalty_points_earned
        );
        if txn.loyalty_points_redeemed > 0 {
            let _ = write!(
                html,
                "<div class=\"row\"><span>Points redeemed</span><span>{}</span></div>\n",
                txn.loyalty_points_redeemed
            );
        }
        let _ = write!(
            html,
            "<div class=\"center\">Earn 1 point per ₹{} spent</div>\n",
            LOYALTY_EARN_SLAB_CENTS / 100
        );
    }

    let _ = write!(
        html,
        "<div class=\"rule\"></div>\n\
         <div class=\"center\">{}</div>\n\
         </body></html>\n",
        escape_html(&profile.footer),
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
    fn test_thermal_renders_core_fields() {
        let txn = sample_transaction();
        let items = sample_items(&txn.id);
        let data = ReceiptData::new(StoreProfile::default(), txn, items);

        let html = render(&data);

        assert!(html.contains("NATIONAL MINI MART"));
        assert!(html.contains("NM 0042"));
        assert!(html.contains("₹289.00")); // rounded total
        assert!(html.contains("₹19.25")); // CGST half of ₹38.50
        assert!(html.contains("Round Off"));
        assert!(html.contains("Change"));
        assert!(html.contains("Points earned"));
        assert!(html.contains("Thank You! Visit Again!"));
    }

    #[test]
    fn test_mrp_struck_only_when_discounted() {
        let txn = sample_transaction();
        let items = sample_items(&txn.id);
        let data = ReceiptData::new(StoreProfile::default(), txn, items);

        let html = render(&data);
        // Biscuits sell at ₹118 against a ₹120 MRP; rice sells at MRP.
        assert!(html.contains("<s>₹120.00</s>"));
        assert!(!html.contains("<s>₹50.00</s>"));
    }

    #[test]
    fn test_item_names_are_escaped() {
        let txn = sample_transaction();
        let items = sample_items(&txn.id);
        let data = ReceiptData::new(StoreProfile::default(), txn, items);

        let html = render(&data);
        assert!(html.contains("Biscuits &lt;Gold&gt;"));
        assert!(!html.contains("Biscuits <Gold>"));
    }

    #[test]
    fn test_anonymous_sale_hides_loyalty_block() {
        let mut txn = sample_transaction();
        txn.customer_id = None;
        txn.customer_name = None;
        let items = sample_items(&txn.id);
        let data = ReceiptData::new(StoreProfile::default(), txn, items);

        let html = render(&data);
        assert!(!html.contains("Points earned"));
        assert!(!html.contains("Customer:"));
    }
}
