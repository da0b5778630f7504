//! Orders
//!
//! Placed orders, read back when a cancelled order's promo redemption is returned.

use promo_engine::{
    context::{CustomerId, UserProfile},
    ledger::PromoDetails,
    user_promos::UserPromo,
};
use serde::{Deserialize, Serialize};

mod repositories;

pub use repositories::{
    InMemoryOrdersRepository, MockOrdersRepository, OrdersRepository, PgOrdersRepository,
};

/// A placed order, as far as promo bookkeeping is concerned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_profile: Option<UserProfile>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promo_details: Option<PromoDetails>,
}

impl Order {
    pub fn customer_id(&self) -> Option<&CustomerId> {
        self.user_profile
            .as_ref()
            .and_then(|profile| profile.customer_id.as_ref())
    }

    /// Code of the first promo redeemed on the order.
    pub fn first_promo_code(&self) -> Option<&str> {
        self.promo_details
            .as_ref()
            .and_then(|details| details.promos.first())
            .map(|promo| promo.promo_code.as_str())
    }
}

/// Outcome of returning a cancelled order's redemption.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderCredit {
    /// The customer's row was credited.
    Credited(UserPromo),

    /// The customer holds no creditable row for the code.
    NotApplied { promo_code: String },
}

impl OrderCredit {
    /// Message shown when nothing was credited.
    pub fn message(&self) -> Option<String> {
        match self {
            OrderCredit::Credited(_) => None,
            OrderCredit::NotApplied { promo_code } => {
                Some(format!("{promo_code} could not be applied for the order"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use promo_engine::eligibility::PromoSummary;

    use crate::test::customer;

    use super::*;

    fn order(codes: &[&str]) -> Order {
        Order {
            order_id: "order-1".to_string(),
            order_type: Some("delivery".to_string()),
            store_id: None,
            user_profile: Some(UserProfile {
                customer_id: Some(customer()),
                is_guest: None,
            }),
            promo_details: Some(PromoDetails {
                promos: codes
                    .iter()
                    .map(|code| PromoSummary {
                        promo_id: code.to_lowercase().into(),
                        promo_code: (*code).to_string(),
                        name: String::new(),
                        description: String::new(),
                        start_date: None,
                        end_date: None,
                        available_count: None,
                    })
                    .collect(),
            }),
        }
    }

    #[test]
    fn first_code_is_credited() {
        assert_eq!(order(&["WELCOME", "FREESHIP"]).first_promo_code(), Some("WELCOME"));
        assert_eq!(order(&[]).first_promo_code(), None);
    }

    #[test]
    fn customer_comes_from_the_profile() {
        assert_eq!(order(&[]).customer_id(), Some(&customer()));
    }

    #[test]
    fn not_applied_names_the_code() {
        let credit = OrderCredit::NotApplied {
            promo_code: "WELCOME".to_string(),
        };

        assert_eq!(
            credit.message().as_deref(),
            Some("WELCOME could not be applied for the order")
        );
    }
}
