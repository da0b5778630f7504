//! Request context
//!
//! Turns the identity carried by a request (token claims or a stored user profile) into the
//! audience and customer identity the engine filters on.

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::TypedId;

/// Marker for customer identities.
#[derive(Debug)]
pub enum Customer {}

/// Customer ID
pub type CustomerId = TypedId<Customer>;

const GUEST_SCOPE: &str = "guest";
const GUEST_PROFILE_FLAG: &str = "Y";

/// Claims extracted from an access token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaims {
    /// Authenticated customer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<CustomerId>,

    /// Token scopes.
    #[serde(default)]
    pub scope: Vec<String>,
}

/// Stored customer profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Customer the profile belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<CustomerId>,

    /// `"Y"` for guest profiles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_guest: Option<String>,
}

/// Audience a request is served as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Audience {
    /// Guest checkout.
    Guest,

    /// Signed-in customer.
    Existing,

    /// Unknown; only promos entitled to everyone are served.
    Any,
}

/// Promo search request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Token claims, when the caller is authenticated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_claims: Option<UserClaims>,

    /// Stored profile, when the caller looked one up.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_profile: Option<UserProfile>,

    /// Store the order is placed with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,

    /// Country the request is served in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    /// Undiscounted delivery fee.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping: Option<Decimal>,

    /// Delivery fee quoted by the caller; replaces `shipping` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_fee: Option<Decimal>,

    /// Evaluation instant; defaults to the wall clock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_date: Option<Timestamp>,

    /// Skip the stacked-offer reference price calculation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avoid_original_shipping_cal: Option<bool>,
}

/// Everything the engine needs to know about one request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    /// Audience to filter on.
    pub audience: Audience,

    /// Customer whose personal promo state applies.
    pub customer_id: Option<CustomerId>,

    /// Store the order is placed with.
    pub store_id: Option<String>,

    /// Requested country.
    pub country: Option<String>,

    /// Amount to price shipping rules against.
    pub shipping: Option<Decimal>,

    /// Evaluation instant.
    pub now: Timestamp,

    /// Skip the stacked-offer reference price calculation.
    pub avoid_reference_price: bool,
}

impl RequestContext {
    /// A context for an unknown audience at `now`.
    pub fn anonymous(now: Timestamp) -> Self {
        Self {
            audience: Audience::Any,
            customer_id: None,
            store_id: None,
            country: None,
            shipping: None,
            now,
            avoid_reference_price: false,
        }
    }
}

impl SearchRequest {
    /// The shipping amount promos are priced against.
    pub fn shipping_amount(&self) -> Option<Decimal> {
        self.delivery_fee.or(self.shipping)
    }

    /// Resolve audience and customer identity.
    ///
    /// Claims win over a profile; a request carrying neither is served as a guest.
    pub fn identity(&self) -> (Audience, Option<CustomerId>) {
        if let Some(claims) = &self.user_claims {
            let audience = if claims.scope.iter().any(|scope| scope == GUEST_SCOPE) {
                Audience::Guest
            } else {
                Audience::Existing
            };

            return (audience, claims.customer_id.clone());
        }

        match &self.user_profile {
            Some(profile) if profile.is_guest.as_deref() == Some(GUEST_PROFILE_FLAG) => {
                (Audience::Guest, None)
            }
            Some(profile) => (Audience::Existing, profile.customer_id.clone()),
            None => (Audience::Guest, None),
        }
    }

    /// Build the engine context, falling back to `clock` for the evaluation instant.
    pub fn to_context(&self, clock: Timestamp) -> RequestContext {
        let (audience, customer_id) = self.identity();

        RequestContext {
            audience,
            customer_id,
            store_id: self.store_id.clone(),
            country: self.country.clone(),
            shipping: self.shipping_amount(),
            now: self.current_date.unwrap_or(clock),
            avoid_reference_price: self.avoid_original_shipping_cal.unwrap_or(false),
        }
    }
}
