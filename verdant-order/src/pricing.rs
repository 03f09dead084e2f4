use crate::models::{CartLine, OrderLine};
use uuid::Uuid;
use verdant_catalog::CatalogSnapshot;

/// Default tax rate in basis points (2%).
pub const DEFAULT_TAX_BASIS_POINTS: i64 = 200;

/// A priced cart: the lines with captured unit prices, plus totals in minor
/// currency units.
#[derive(Debug, Clone)]
pub struct OrderQuote {
    pub lines: Vec<OrderLine>,
    pub subtotal: i64,
    pub tax: i64,
    pub total: i64,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("invalid cart: {0}")]
    InvalidCart(String),

    #[error("product {0} is unavailable")]
    ProductUnavailable(Uuid),
}

/// Price a cart against a catalog snapshot.
///
/// Pure and deterministic: integer arithmetic only, no side effects. Tax is
/// `floor(subtotal * tax_basis_points / 10_000)` and the total is
/// `subtotal + tax`.
pub fn compute_total(
    lines: &[CartLine],
    snapshot: &CatalogSnapshot,
    tax_basis_points: i64,
) -> Result<OrderQuote, PricingError> {
    if lines.is_empty() {
        return Err(PricingError::InvalidCart("cart is empty".into()));
    }

    let mut priced = Vec::with_capacity(lines.len());
    let mut subtotal: i64 = 0;

    for line in lines {
        if line.quantity < 1 {
            return Err(PricingError::InvalidCart(format!(
                "quantity for product {} must be at least 1",
                line.product_id
            )));
        }

        let quote = snapshot
            .get(&line.product_id)
            .filter(|q| q.in_stock)
            .ok_or(PricingError::ProductUnavailable(line.product_id))?;

        subtotal += quote.offer_price * i64::from(line.quantity);
        priced.push(OrderLine {
            product_id: line.product_id,
            quantity: line.quantity,
            unit_price: quote.offer_price,
        });
    }

    let tax = subtotal * tax_basis_points / 10_000;

    Ok(OrderQuote {
        lines: priced,
        subtotal,
        tax,
        total: subtotal + tax,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdant_catalog::ProductQuote;

    fn snapshot(quotes: Vec<(Uuid, i64, bool)>) -> CatalogSnapshot {
        CatalogSnapshot::from_quotes(
            quotes
                .into_iter()
                .map(|(id, offer_price, in_stock)| ProductQuote {
                    id,
                    offer_price,
                    in_stock,
                })
                .collect(),
        )
    }

    #[test]
    fn test_two_units_at_500_totals_1020() {
        let p1 = Uuid::new_v4();
        let snap = snapshot(vec![(p1, 500, true)]);
        let cart = vec![CartLine {
            product_id: p1,
            quantity: 2,
        }];

        let quote = compute_total(&cart, &snap, DEFAULT_TAX_BASIS_POINTS).unwrap();
        assert_eq!(quote.subtotal, 1000);
        assert_eq!(quote.tax, 20);
        assert_eq!(quote.total, 1020);
        assert_eq!(quote.lines[0].unit_price, 500);
    }

    #[test]
    fn test_tax_rounds_down() {
        let p1 = Uuid::new_v4();
        let snap = snapshot(vec![(p1, 99, true)]);
        let cart = vec![CartLine {
            product_id: p1,
            quantity: 1,
        }];

        // 99 * 2% = 1.98, floored to 1
        let quote = compute_total(&cart, &snap, DEFAULT_TAX_BASIS_POINTS).unwrap();
        assert_eq!(quote.tax, 1);
        assert_eq!(quote.total, 100);
    }

    #[test]
    fn test_deterministic_across_runs() {
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        let snap = snapshot(vec![(p1, 333, true), (p2, 125, true)]);
        let cart = vec![
            CartLine {
                product_id: p1,
                quantity: 3,
            },
            CartLine {
                product_id: p2,
                quantity: 7,
            },
        ];

        let first = compute_total(&cart, &snap, DEFAULT_TAX_BASIS_POINTS).unwrap();
        for _ in 0..100 {
            let again = compute_total(&cart, &snap, DEFAULT_TAX_BASIS_POINTS).unwrap();
            assert_eq!(again.total, first.total);
            assert_eq!(again.tax, first.tax);
        }
        assert_eq!(first.subtotal, 333 * 3 + 125 * 7);
    }

    #[test]
    fn test_empty_cart_rejected() {
        let snap = snapshot(vec![]);
        let err = compute_total(&[], &snap, DEFAULT_TAX_BASIS_POINTS).unwrap_err();
        assert!(matches!(err, PricingError::InvalidCart(_)));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let p1 = Uuid::new_v4();
        let snap = snapshot(vec![(p1, 500, true)]);
        let cart = vec![CartLine {
            product_id: p1,
            quantity: 0,
        }];
        let err = compute_total(&cart, &snap, DEFAULT_TAX_BASIS_POINTS).unwrap_err();
        assert!(matches!(err, PricingError::InvalidCart(_)));
    }

    #[test]
    fn test_missing_product_rejected() {
        let p1 = Uuid::new_v4();
        let snap = snapshot(vec![]);
        let cart = vec![CartLine {
            product_id: p1,
            quantity: 1,
        }];
        assert_eq!(
            compute_total(&cart, &snap, DEFAULT_TAX_BASIS_POINTS).unwrap_err(),
            PricingError::ProductUnavailable(p1)
        );
    }

    #[test]
    fn test_out_of_stock_rejected() {
        let p1 = Uuid::new_v4();
        let snap = snapshot(vec![(p1, 500, false)]);
        let cart = vec![CartLine {
            product_id: p1,
            quantity: 1,
        }];
        assert_eq!(
            compute_total(&cart, &snap, DEFAULT_TAX_BASIS_POINTS).unwrap_err(),
            PricingError::ProductUnavailable(p1)
        );
    }
}
