//! Shared builders for unit tests.

use jiff::Timestamp;
use rust_decimal::Decimal;

use crate::{
    context::CustomerId,
    promos::{
        EntitleOrder, ProductEntitlement, Promo, PromoId, PromoType, StoreEntitlement,
        UsageLimit, UserEntitlement,
    },
    rules::{DiscountType, Rule, ValueType},
    user_promos::UserPromo,
};

pub(crate) fn at(value: &str) -> Result<Timestamp, jiff::Error> {
    value.parse()
}

pub(crate) fn now() -> Timestamp {
    Timestamp::constant(1_781_784_000, 0)
}

pub(crate) fn promo(id: &str, priority: i64) -> Promo {
    Promo {
        promo_id: PromoId::new(id),
        promo_code: id.to_uppercase(),
        name: format!("{id} name"),
        description: format!("{id} description"),
        promo_type: PromoType::Checkout,
        country: "US".to_string(),
        is_active: true,
        priority,
        start_date: Some(Timestamp::constant(1_767_225_600, 0)),
        end_date: Some(Timestamp::constant(1_798_675_200, 0)),
        entitle_order: EntitleOrder::default(),
        entitled_product: ProductEntitlement::ALL,
        prerequisite_product_id: Vec::new(),
        usage_limit: UsageLimit::default(),
        entitled_user: UserEntitlement {
            all: true,
            ..UserEntitlement::default()
        },
        prerequisite_user_id: Vec::new(),
        entitled_store: StoreEntitlement::ALL,
        prerequisite_store_id: Vec::new(),
        entitled_store_state: Default::default(),
        prerequisite_store_state: Vec::new(),
        entitle_user_promo: Default::default(),
        prerequisite_promo_code_not_permitted: Vec::new(),
        prerequisite_promo_code_permitted: Vec::new(),
        rules: Vec::new(),
        show_original_shipping: true,
    }
}

pub(crate) fn shipping_promo(id: &str, priority: i64, value_type: ValueType, value: Decimal) -> Promo {
    Promo {
        rules: vec![Rule::new(DiscountType::Shipping, value_type, value)],
        ..promo(id, priority)
    }
}

pub(crate) fn capped(mut promo: Promo, max_per_user: i64) -> Promo {
    promo.usage_limit.max_per_user = max_per_user;
    promo
}

pub(crate) fn customer() -> CustomerId {
    CustomerId::new("customer-1")
}

pub(crate) fn user_promo(promo: &Promo, available_count: Option<i64>) -> UserPromo {
    UserPromo {
        available_count,
        ..UserPromo::from_promo(customer(), promo)
    }
}
