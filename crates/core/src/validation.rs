//! Administrative promo validation
//!
//! A [`PromoDraft`] is the loosely-typed payload an administrator submits. Validation checks the
//! required fields, fills in defaults and produces a storable [`Promo`].

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    locale::Locale,
    promos::{
        EntitleOrder, ProductEntitlement, Promo, PromoId, PromoType, StoreEntitlement,
        StoreStateEntitlement, UsageLimit, UserEntitlement, UserPromoEntitlement,
    },
    rules::{Rule, ValueType},
};

/// Reasons a draft is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is absent.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A required text field is blank.
    #[error("field must not be empty: {0}")]
    EmptyField(&'static str),

    /// The validity window ends before it starts.
    #[error("start_date {start} is after end_date {end}")]
    InvalidWindow {
        /// Submitted start.
        start: Timestamp,

        /// Submitted end.
        end: Timestamp,
    },

    /// A rule uses a value type the engine cannot evaluate.
    #[error("rule {index} has an unsupported value_type")]
    UnsupportedRule {
        /// Rule position.
        index: usize,
    },

    /// A percentage rule is outside `(0, 100]`.
    #[error("rule {index} percentage {value} is outside (0, 100]")]
    PercentageOutOfRange {
        /// Rule position.
        index: usize,

        /// Submitted value.
        value: Decimal,
    },
}

/// Administrative promo payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromoDraft {
    /// Key; generated when absent.
    pub promo_id: Option<PromoId>,

    /// Required.
    pub promo_code: Option<String>,

    /// Required.
    pub name: Option<String>,

    /// Required.
    pub description: Option<String>,

    /// Required.
    pub promo_type: Option<PromoType>,

    /// Required.
    pub country: Option<String>,

    /// Required.
    pub is_active: Option<bool>,

    /// Required.
    pub priority: Option<i64>,

    /// Start of the validity window.
    pub start_date: Option<Timestamp>,

    /// End of the validity window.
    pub end_date: Option<Timestamp>,

    /// Defaults to a minimum quantity of one.
    pub entitle_order: Option<EntitleOrder>,

    /// Defaults to every product.
    pub entitled_product: Option<ProductEntitlement>,

    /// Product restriction list.
    pub prerequisite_product_id: Vec<String>,

    /// Defaults to unlimited.
    pub usage_limit: Option<UsageLimit>,

    /// Audience flags.
    pub entitled_user: Option<UserEntitlement>,

    /// Customer restriction list.
    pub prerequisite_user_id: Vec<String>,

    /// Defaults to every store.
    pub entitled_store: Option<StoreEntitlement>,

    /// Store restriction list.
    pub prerequisite_store_id: Vec<String>,

    /// Store state flags.
    pub entitled_store_state: Option<StoreStateEntitlement>,

    /// Store state restriction list.
    pub prerequisite_store_state: Vec<String>,

    /// Cross-promo exclusion flags.
    pub entitle_user_promo: Option<UserPromoEntitlement>,

    /// Codes excluding this promo.
    pub prerequisite_promo_code_not_permitted: Vec<String>,

    /// Codes required for this promo.
    pub prerequisite_promo_code_permitted: Vec<String>,

    /// Discount rules.
    pub rules: Vec<Rule>,

    /// Defaults to showing the reference price.
    pub show_original_shipping: Option<bool>,
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, ValidationError> {
    value.ok_or(ValidationError::MissingField(field))
}

fn required_text(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    let value = required(value, field)?;

    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }

    Ok(value)
}

fn validate_rules(rules: &[Rule]) -> Result<(), ValidationError> {
    for (index, rule) in rules.iter().enumerate() {
        match (rule.value_type, rule.value) {
            (ValueType::Unknown, _) => return Err(ValidationError::UnsupportedRule { index }),
            (ValueType::PercentageOff, Some(value))
                if value <= Decimal::ZERO || value > Decimal::ONE_HUNDRED =>
            {
                return Err(ValidationError::PercentageOutOfRange { index, value });
            }
            _ => {}
        }
    }

    Ok(())
}

impl PromoDraft {
    /// Validate into a storable promo.
    ///
    /// Countries the locale does not serve are replaced with its default country.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for the first rejected field.
    pub fn validate(self, locale: &Locale) -> Result<Promo, ValidationError> {
        let promo_code = required_text(self.promo_code, "promo_code")?;
        let name = required_text(self.name, "name")?;
        let description = required_text(self.description, "description")?;
        let promo_type = required(self.promo_type, "promo_type")?;
        let country = required_text(self.country, "country")?;
        let is_active = required(self.is_active, "is_active")?;
        let priority = required(self.priority, "priority")?;

        if let (Some(start), Some(end)) = (self.start_date, self.end_date)
            && start > end
        {
            return Err(ValidationError::InvalidWindow { start, end });
        }

        validate_rules(&self.rules)?;

        Ok(Promo {
            promo_id: self.promo_id.unwrap_or_else(PromoId::generate),
            promo_code,
            name,
            description,
            promo_type,
            country: locale.resolve([Some(country.as_str())]),
            is_active,
            priority,
            start_date: self.start_date,
            end_date: self.end_date,
            entitle_order: self.entitle_order.unwrap_or(EntitleOrder {
                min_quantity: 1,
                min_total: Decimal::ZERO,
            }),
            entitled_product: self.entitled_product.unwrap_or(ProductEntitlement::ALL),
            prerequisite_product_id: self.prerequisite_product_id,
            usage_limit: self.usage_limit.unwrap_or_default(),
            entitled_user: self.entitled_user.unwrap_or_default(),
            prerequisite_user_id: self.prerequisite_user_id,
            entitled_store: self.entitled_store.unwrap_or(StoreEntitlement::ALL),
            prerequisite_store_id: self.prerequisite_store_id,
            entitled_store_state: self.entitled_store_state.unwrap_or_default(),
            prerequisite_store_state: self.prerequisite_store_state,
            entitle_user_promo: self.entitle_user_promo.unwrap_or_default(),
            prerequisite_promo_code_not_permitted: self.prerequisite_promo_code_not_permitted,
            prerequisite_promo_code_permitted: self.prerequisite_promo_code_permitted,
            rules: self.rules,
            show_original_shipping: self.show_original_shipping.unwrap_or(true),
        })
    }
}

impl From<Promo> for PromoDraft {
    fn from(promo: Promo) -> Self {
        Self {
            promo_id: Some(promo.promo_id),
            promo_code: Some(promo.promo_code),
            name: Some(promo.name),
            description: Some(promo.description),
            promo_type: Some(promo.promo_type),
            country: Some(promo.country),
            is_active: Some(promo.is_active),
            priority: Some(promo.priority),
            start_date: promo.start_date,
            end_date: promo.end_date,
            entitle_order: Some(promo.entitle_order),
            entitled_product: Some(promo.entitled_product),
            prerequisite_product_id: promo.prerequisite_product_id,
            usage_limit: Some(promo.usage_limit),
            entitled_user: Some(promo.entitled_user),
            prerequisite_user_id: promo.prerequisite_user_id,
            entitled_store: Some(promo.entitled_store),
            prerequisite_store_id: promo.prerequisite_store_id,
            entitled_store_state: Some(promo.entitled_store_state),
            prerequisite_store_state: promo.prerequisite_store_state,
            entitle_user_promo: Some(promo.entitle_user_promo),
            prerequisite_promo_code_not_permitted: promo.prerequisite_promo_code_not_permitted,
            prerequisite_promo_code_permitted: promo.prerequisite_promo_code_permitted,
            rules: promo.rules,
            show_original_shipping: Some(promo.show_original_shipping),
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use testresult::TestResult;

    use crate::{
        rules::DiscountType,
        test_support::{at, promo},
    };

    use super::*;

    fn draft() -> PromoDraft {
        PromoDraft {
            promo_code: Some("FREESHIP".to_string()),
            name: Some("Free delivery".to_string()),
            description: Some("Free delivery on every order".to_string()),
            promo_type: Some(PromoType::Checkout),
            country: Some("US".to_string()),
            is_active: Some(true),
            priority: Some(1),
            ..PromoDraft::default()
        }
    }

    #[test]
    fn defaults_are_filled_in() -> TestResult {
        let promo = draft().validate(&Locale::default())?;

        assert_eq!(promo.promo_id.as_str().len(), 32);
        assert_eq!(promo.entitled_product, ProductEntitlement::ALL);
        assert_eq!(promo.entitled_store, StoreEntitlement::ALL);
        assert_eq!(promo.usage_limit, UsageLimit::default());
        assert_eq!(promo.entitle_order.min_quantity, 1);
        assert!(promo.show_original_shipping);

        Ok(())
    }

    #[test]
    fn supplied_ids_are_kept() -> TestResult {
        let promo = PromoDraft {
            promo_id: Some(PromoId::new("free-delivery")),
            ..draft()
        }
        .validate(&Locale::default())?;

        assert_eq!(promo.promo_id.as_str(), "free-delivery");

        Ok(())
    }

    #[test]
    fn missing_required_fields_are_named() {
        let result = PromoDraft {
            priority: None,
            ..draft()
        }
        .validate(&Locale::default());

        assert_eq!(result, Err(ValidationError::MissingField("priority")));

        let result = PromoDraft {
            name: Some("  ".to_string()),
            ..draft()
        }
        .validate(&Locale::default());

        assert_eq!(result, Err(ValidationError::EmptyField("name")));
    }

    #[test]
    fn inverted_windows_are_rejected() -> TestResult {
        let result = PromoDraft {
            start_date: Some(at("2026-02-01T00:00:00Z")?),
            end_date: Some(at("2026-01-01T00:00:00Z")?),
            ..draft()
        }
        .validate(&Locale::default());

        assert!(
            matches!(result, Err(ValidationError::InvalidWindow { .. })),
            "expected invalid window, got {result:?}"
        );

        Ok(())
    }

    #[test]
    fn percentages_must_be_within_range() {
        let result = PromoDraft {
            rules: vec![Rule::new(DiscountType::Shipping, ValueType::PercentageOff, dec!(150))],
            ..draft()
        }
        .validate(&Locale::default());

        assert_eq!(
            result,
            Err(ValidationError::PercentageOutOfRange {
                index: 0,
                value: dec!(150)
            })
        );
    }

    #[test]
    fn unsupported_countries_use_the_default() -> TestResult {
        let promo = PromoDraft {
            country: Some("gb".to_string()),
            ..draft()
        }
        .validate(&Locale::default())?;

        assert_eq!(promo.country, "US");

        let promo = PromoDraft {
            country: Some("ca".to_string()),
            ..draft()
        }
        .validate(&Locale::default())?;

        assert_eq!(promo.country, "CA");

        Ok(())
    }

    #[test]
    fn stored_promos_validate_unchanged() -> TestResult {
        let stored = promo("p", 4);

        assert_eq!(PromoDraft::from(stored.clone()).validate(&Locale::default())?, stored);

        Ok(())
    }
}
