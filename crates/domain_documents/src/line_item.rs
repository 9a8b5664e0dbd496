//! Document line items and total computation
//!
//! Ordering of the arithmetic: line discount applies to the extended
//! amount, per-line tax applies to the post-discount amount, and a
//! document-level discount comes off the subtotal before tax (tax is
//! scaled by the same factor so it is always charged on what the
//! customer actually pays).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{Currency, Money, Rate};

use crate::error::DocumentError;

/// A single line on a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub id: Uuid,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Money,
    /// Percentage discount on this line's extended amount
    pub discount: Option<Rate>,
    /// Percentage tax on this line's post-discount amount
    pub tax: Option<Rate>,
}

impl LineItem {
    pub fn new(description: impl Into<String>, quantity: Decimal, unit_price: Money) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            quantity,
            unit_price,
            discount: None,
            tax: None,
        }
    }

    pub fn with_discount(mut self, rate: Rate) -> Self {
        self.discount = Some(rate);
        self
    }

    pub fn with_tax(mut self, rate: Rate) -> Self {
        self.tax = Some(rate);
        self
    }

    /// quantity x unit price, before any discount
    pub fn extended(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }

    /// Line amount after the line discount
    pub fn net(&self) -> Money {
        match self.discount {
            Some(rate) => self.extended() - rate.apply(&self.extended()),
            None => self.extended(),
        }
    }

    /// Tax charged on this line, scaled by the document-level discount
    /// factor (1 when there is no document discount)
    pub fn tax_amount(&self, document_factor: Decimal) -> Money {
        match self.tax {
            Some(rate) => rate.apply(&self.net().multiply(document_factor)),
            None => Money::zero(self.unit_price.currency()),
        }
    }

    /// Rejects empty descriptions, non-positive quantities, negative
    /// prices, and out-of-range rates
    pub fn validate(&self) -> Result<(), DocumentError> {
        let fail = |reason: &str| {
            Err(DocumentError::InvalidLineItem {
                description: self.description.clone(),
                reason: reason.to_string(),
            })
        };

        if self.description.trim().is_empty() {
            return fail("description is empty");
        }
        if self.quantity <= Decimal::ZERO {
            return fail("quantity must be positive");
        }
        if self.unit_price.is_negative() {
            return fail("unit price cannot be negative");
        }
        for (label, rate) in [("discount", self.discount), ("tax", self.tax)] {
            if let Some(rate) = rate {
                let pct = rate.as_percentage();
                if pct < Decimal::ZERO || pct > Decimal::ONE_HUNDRED {
                    return fail(&format!("{label} must be between 0% and 100%"));
                }
            }
        }
        Ok(())
    }
}

/// Document-level discount, applied to the subtotal before tax
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "UPPERCASE")]
pub enum DocumentDiscount {
    /// Percentage of the subtotal
    Percent(Decimal),
    /// Fixed amount, capped at the subtotal
    Amount(Decimal),
}

/// Computed money breakdown of a document
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DocumentTotals {
    /// Sum of line nets, before the document discount
    pub subtotal: Money,
    /// Document-level discount amount
    pub discount: Money,
    /// Total tax
    pub tax: Money,
    /// Amount owed: subtotal - discount + tax
    pub total: Money,
}

impl DocumentTotals {
    pub fn zero(currency: Currency) -> Self {
        Self {
            subtotal: Money::zero(currency),
            discount: Money::zero(currency),
            tax: Money::zero(currency),
            total: Money::zero(currency),
        }
    }
}

/// Computes document totals from its lines and optional document
/// discount, rounding each component to the currency's minor unit
pub fn compute_totals(
    lines: &[LineItem],
    discount: Option<DocumentDiscount>,
    currency: Currency,
) -> DocumentTotals {
    let subtotal = lines
        .iter()
        .fold(Money::zero(currency), |acc, l| acc + l.net());

    let discount_amount = match discount {
        Some(DocumentDiscount::Percent(pct)) => {
            Rate::from_percentage(pct).apply(&subtotal)
        }
        Some(DocumentDiscount::Amount(amount)) => {
            let capped = amount.min(subtotal.amount());
            Money::new(capped, currency)
        }
        None => Money::zero(currency),
    };

    let factor = if subtotal.is_zero() {
        Decimal::ONE
    } else {
        (subtotal.amount() - discount_amount.amount()) / subtotal.amount()
    };

    let tax = lines
        .iter()
        .fold(Money::zero(currency), |acc, l| acc + l.tax_amount(factor));

    let subtotal = subtotal.round_to_currency();
    let discount_amount = discount_amount.round_to_currency();
    let tax = tax.round_to_currency();

    DocumentTotals {
        subtotal,
        discount: discount_amount,
        tax,
        total: subtotal - discount_amount + tax,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn usd(amount: Decimal) -> Money {
        Money::new(amount, Currency::USD)
    }

    #[test]
    fn test_plain_line() {
        let line = LineItem::new("Widget", dec!(3), usd(dec!(10.00)));
        assert_eq!(line.extended().amount(), dec!(30.00));
        assert_eq!(line.net().amount(), dec!(30.00));
        assert!(line.tax_amount(Decimal::ONE).is_zero());
    }

    #[test]
    fn test_line_discount_then_tax() {
        let line = LineItem::new("Widget", dec!(2), usd(dec!(50.00)))
            .with_discount(Rate::from_percentage(dec!(10)))
            .with_tax(Rate::from_percentage(dec!(5)));

        // 100 - 10% = 90; tax 5% of 90 = 4.50
        assert_eq!(line.net().amount(), dec!(90.00));
        assert_eq!(line.tax_amount(Decimal::ONE).amount(), dec!(4.50));
    }

    #[test]
    fn test_totals_without_document_discount() {
        let lines = vec![
            LineItem::new("A", dec!(1), usd(dec!(100.00))).with_tax(Rate::from_percentage(dec!(10))),
            LineItem::new("B", dec!(2), usd(dec!(25.00))),
        ];
        let totals = compute_totals(&lines, None, Currency::USD);

        assert_eq!(totals.subtotal.amount(), dec!(150.00));
        assert_eq!(totals.tax.amount(), dec!(10.00));
        assert_eq!(totals.total.amount(), dec!(160.00));
    }

    #[test]
    fn test_document_percent_discount_scales_tax() {
        let lines = vec![
            LineItem::new("A", dec!(1), usd(dec!(200.00))).with_tax(Rate::from_percentage(dec!(10))),
        ];
        let totals = compute_totals(
            &lines,
            Some(DocumentDiscount::Percent(dec!(50))),
            Currency::USD,
        );

        // Tax on the discounted 100, not the original 200
        assert_eq!(totals.subtotal.amount(), dec!(200.00));
        assert_eq!(totals.discount.amount(), dec!(100.00));
        assert_eq!(totals.tax.amount(), dec!(10.00));
        assert_eq!(totals.total.amount(), dec!(110.00));
    }

    #[test]
    fn test_document_amount_discount_capped() {
        let lines = vec![LineItem::new("A", dec!(1), usd(dec!(50.00)))];
        let totals = compute_totals(
            &lines,
            Some(DocumentDiscount::Amount(dec!(80.00))),
            Currency::USD,
        );

        assert_eq!(totals.discount.amount(), dec!(50.00));
        assert!(totals.total.is_zero());
    }

    #[test]
    fn test_validation_rejects_bad_lines() {
        assert!(LineItem::new("", dec!(1), usd(dec!(1.00))).validate().is_err());
        assert!(LineItem::new("A", dec!(0), usd(dec!(1.00))).validate().is_err());
        assert!(LineItem::new("A", dec!(1), usd(dec!(-1.00))).validate().is_err());
        assert!(LineItem::new("A", dec!(1), usd(dec!(1.00)))
            .with_tax(Rate::from_percentage(dec!(150)))
            .validate()
            .is_err());
        assert!(LineItem::new("A", dec!(1), usd(dec!(1.00))).validate().is_ok());
    }
}
