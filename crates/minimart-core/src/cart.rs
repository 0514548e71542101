//! # Cart Module
//!
//! The in-progress shopping cart: frozen product snapshots plus quantities.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Cashier Action            Cart Method             State Change         │
//! │  ──────────────            ───────────             ────────────         │
//! │                                                                         │
//! │  Click Product ──────────► add_item() ───────────► merge or push        │
//! │                                                                         │
//! │  Change Quantity ────────► set_quantity() ───────► items[i].qty = n     │
//! │                                                                         │
//! │  Click Remove ───────────► remove_item() ────────► items.remove(i)     │
//! │                                                                         │
//! │  Click Clear ────────────► clear() ──────────────► items.clear()       │
//! │                                                                         │
//! │  NOTE: Every mutation is checked against the stock level the product    │
//! │        had when it was added, so the cart can never promise more units  │
//! │        than the shelf held.                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Product, TaxRate};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart Item
// =============================================================================

/// An item in the shopping cart.
///
/// ## Design Notes
/// - `product_id`: Reference to the product (for the stock decrement at commit)
/// - Everything else is a frozen copy of product data at time of adding.
///   This ensures the cart displays consistent prices even if the product
///   is edited in the database after being added to cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    /// Product ID (UUID)
    pub product_id: String,

    /// Product name at time of adding (frozen)
    pub name: String,

    /// Brand at time of adding (frozen)
    pub brand: String,

    /// HSN code at time of adding (frozen)
    pub hsn_code: String,

    /// MRP in paise at time of adding (frozen)
    pub mrp_cents: i64,

    /// Cost price in paise at time of adding (frozen)
    pub cost_price_cents: i64,

    /// Effective unit price in paise at time of adding (frozen).
    /// This is critical: we lock in the price when added to cart.
    pub unit_price_cents: i64,

    /// GST rate in basis points at time of adding (frozen)
    pub gst_rate_bps: u32,

    /// Whether the unit price already includes GST (frozen)
    pub price_includes_gst: bool,

    /// Stock level at time of adding; the ceiling for this line's quantity
    pub stock_at_add: i64,

    /// Quantity in cart
    pub quantity: i64,

    /// When this item was added to cart
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    /// Creates a new cart item from a product and quantity.
    ///
    /// ## Price Freezing
    /// The effective price (selling price, falling back to MRP) is captured
    /// at this moment. If the product price changes in the database, this
    /// cart item retains the original price.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            brand: product.brand.clone(),
            hsn_code: product.hsn_code.clone(),
            mrp_cents: product.mrp_cents,
            cost_price_cents: product.cost_price_cents,
            unit_price_cents: product.effective_price().cents(),
            gst_rate_bps: product.gst_rate_bps,
            price_includes_gst: product.price_includes_gst,
            stock_at_add: product.stock_quantity,
            quantity,
            added_at: Utc::now(),
        }
    }

    /// The frozen unit price.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// The frozen GST rate.
    #[inline]
    pub fn gst_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.gst_rate_bps)
    }

    /// Listed line total (unit price × quantity), before any tax split.
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }

    /// Tax-exclusive base for one unit.
    ///
    /// For inclusive pricing this peels GST out of the listed price; for
    /// exclusive pricing the listed price *is* the base.
    pub fn unit_base(&self) -> Money {
        if self.price_includes_gst {
            self.unit_price().base_excluding(self.gst_rate())
        } else {
            self.unit_price()
        }
    }

    /// GST for one unit.
    ///
    /// Inclusive: `price − base`, so base + tax reconstructs the listed
    /// price exactly. Exclusive: computed on top of the listed price.
    pub fn unit_tax(&self) -> Money {
        if self.price_includes_gst {
            self.unit_price() - self.unit_base()
        } else {
            self.unit_price().tax_portion(self.gst_rate())
        }
    }

    /// Tax-exclusive base for the whole line.
    pub fn line_base(&self) -> Money {
        self.unit_base().multiply_quantity(self.quantity)
    }

    /// GST for the whole line.
    pub fn line_tax(&self) -> Money {
        self.unit_tax().multiply_quantity(self.quantity)
    }

    /// Line total including tax.
    pub fn line_total_with_tax(&self) -> Money {
        self.line_base() + self.line_tax()
    }

    /// Line savings versus MRP, floored at zero per unit.
    pub fn line_mrp_savings(&self) -> Money {
        (Money::from_cents(self.mrp_cents) - self.unit_price())
            .max(Money::zero())
            .multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - Items are unique by `product_id` (adding same product increases quantity)
/// - Quantity per line is in `1..=MAX_ITEM_QUANTITY` and never exceeds the
///   stock the product had when added (setting qty to 0 removes the line)
/// - At most [`MAX_CART_ITEMS`] unique items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    /// Items in the cart
    pub items: Vec<CartItem>,

    /// When the cart was created/last cleared
    pub created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            items: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds a product to the cart or increases quantity if already present.
    ///
    /// ## Behavior
    /// - If product already in cart: increases quantity (merge)
    /// - If product not in cart: adds a new line with a frozen snapshot
    /// - Either way the resulting quantity is checked against the stock
    ///   level observed when the product was (first) added
    pub fn add_item(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        crate::validation::validate_quantity(quantity)?;

        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product.id) {
            let new_qty = item.quantity + quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            if new_qty > item.stock_at_add {
                return Err(CoreError::InsufficientStock {
                    name: item.name.clone(),
                    available: item.stock_at_add,
                    requested: new_qty,
                });
            }
            item.quantity = new_qty;
            return Ok(());
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        if quantity > product.stock_quantity {
            return Err(CoreError::InsufficientStock {
                name: product.name.clone(),
                available: product.stock_quantity,
                requested: quantity,
            });
        }

        self.items.push(CartItem::from_product(product, quantity));
        Ok(())
    }

    /// Sets the quantity of an item in the cart.
    ///
    /// ## Behavior
    /// - If quantity is 0: removes the item
    /// - If product not found: returns [`CoreError::ProductNotInCart`]
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_item(product_id);
        }

        crate::validation::validate_quantity(quantity)?;

        let item = self
            .items
            .iter_mut()
            .find(|i| i.product_id == product_id)
            .ok_or_else(|| CoreError::ProductNotInCart(product_id.to_string()))?;

        if quantity > item.stock_at_add {
            return Err(CoreError::InsufficientStock {
                name: item.name.clone(),
                available: item.stock_at_add,
                requested: quantity,
            });
        }

        item.quantity = quantity;
        Ok(())
    }

    /// Removes an item from the cart by product ID.
    pub fn remove_item(&mut self, product_id: &str) -> CoreResult<()> {
        let initial_len = self.items.len();
        self.items.retain(|i| i.product_id != product_id);

        if self.items.len() == initial_len {
            Err(CoreError::ProductNotInCart(product_id.to_string()))
        } else {
            Ok(())
        }
    }

    /// Clears all items from the cart.
    pub fn clear(&mut self) {
        self.items.clear();
        self.created_at = Utc::now();
    }

    /// Returns the number of unique items in the cart.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the total unit count across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// True when the cart holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for Cart {
    fn default() -> Self {
        Cart::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, price_cents: i64, incl: bool, bps: u32, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            brand: "Generic".to_string(),
            hsn_code: format!("100{id}"),
            barcode: None,
            mrp_cents: price_cents,
            cost_price_cents: 0,
            selling_price_cents: Some(price_cents),
            gst_rate_bps: bps,
            price_includes_gst: incl,
            stock_quantity: stock,
            min_stock_level: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_merges_same_product() {
        let mut cart = Cart::new();
        let p = product("1", 11800, true, 1800, 10);

        cart.add_item(&p, 2).unwrap();
        cart.add_item(&p, 3).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.items[0].quantity, 5);
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn test_add_respects_stock() {
        let mut cart = Cart::new();
        let p = product("1", 11800, true, 1800, 3);

        cart.add_item(&p, 3).unwrap();
        let err = cart.add_item(&p, 1).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientStock { available: 3, requested: 4, .. }));
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let mut cart = Cart::new();
        let p = product("1", 11800, true, 1800, 10);

        cart.add_item(&p, 2).unwrap();
        cart.set_quantity("1", 0).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_unknown_product() {
        let mut cart = Cart::new();
        assert!(matches!(
            cart.set_quantity("nope", 2).unwrap_err(),
            CoreError::ProductNotInCart(_)
        ));
    }

    #[test]
    fn test_remove_item() {
        let mut cart = Cart::new();
        let p = product("1", 11800, true, 1800, 10);

        cart.add_item(&p, 1).unwrap();
        cart.remove_item("1").unwrap();
        assert!(cart.is_empty());
        assert!(cart.remove_item("1").is_err());
    }

    #[test]
    fn test_inclusive_line_split() {
        // ₹118.00 incl. 18% × 2 → base ₹200.00, GST ₹36.00
        let mut cart = Cart::new();
        cart.add_item(&product("1", 11800, true, 1800, 10), 2).unwrap();

        let item = &cart.items[0];
        assert_eq!(item.line_base().cents(), 20000);
        assert_eq!(item.line_tax().cents(), 3600);
        assert_eq!(item.line_total_with_tax().cents(), 23600);
        assert_eq!(item.line_total().cents(), 23600);
    }

    #[test]
    fn test_exclusive_line_split() {
        // ₹50.00 excl. 5% × 1 → base ₹50.00, GST ₹2.50
        let mut cart = Cart::new();
        cart.add_item(&product("2", 5000, false, 500, 10), 1).unwrap();

        let item = &cart.items[0];
        assert_eq!(item.line_base().cents(), 5000);
        assert_eq!(item.line_tax().cents(), 250);
        assert_eq!(item.line_total_with_tax().cents(), 5250);
    }

    #[test]
    fn test_price_frozen_at_add() {
        let mut cart = Cart::new();
        let mut p = product("1", 11800, true, 1800, 10);
        cart.add_item(&p, 1).unwrap();

        // Repricing the product after the fact must not touch the cart line.
        p.selling_price_cents = Some(99900);
        assert_eq!(cart.items[0].unit_price_cents, 11800);
    }

    #[test]
    fn test_line_mrp_savings() {
        let mut p = product("1", 9000, true, 1800, 10);
        p.mrp_cents = 10000;

        let mut cart = Cart::new();
        cart.add_item(&p, 3).unwrap();
        assert_eq!(cart.items[0].line_mrp_savings().cents(), 3000);
    }

    #[test]
    fn test_cart_too_large() {
        let mut cart = Cart::new();
        for i in 0..MAX_CART_ITEMS {
            cart.add_item(&product(&i.to_string(), 100, true, 0, 10), 1)
                .unwrap();
        }
        let err = cart
            .add_item(&product("overflow", 100, true, 0, 10), 1)
            .unwrap_err();
        assert!(matches!(err, CoreError::CartTooLarge { .. }));
    }
}
