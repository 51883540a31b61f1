//! Payment request types.
//!
//! A [`PaymentRequest`] is what the gate submits to the provider once the
//! payer has entered a valid phone number. Amounts are integer minor units
//! of the currency; RWF has no subdivision in practice, so 1000 means
//! 1000 francs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GateError;
use crate::ids::ExternalReference;

/// Number of digits in a payer MSISDN (`2507XXXXXXXX`).
pub const PAYER_PHONE_DIGITS: usize = 12;

/// Fee charged when the caller does not configure one.
pub const DEFAULT_FEE_MINOR: i64 = 1000;

/// Prefix shared by every external reference this marketplace generates.
const REFERENCE_NAMESPACE: &str = "kc";

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Rwandan franc.
    #[default]
    Rwf,
}

impl Currency {
    /// ISO 4217 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Rwf => "RWF",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// What the payment unlocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurposeContext {
    /// Publishing a property listing.
    List,
    /// Viewing or signing a lease agreement.
    Lease,
    /// Viewing the owner's contact information.
    Contact,
    /// Any other service fee.
    #[default]
    Generic,
}

impl PurposeContext {
    /// Tag used in URLs and configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Lease => "lease",
            Self::Contact => "contact",
            Self::Generic => "generic",
        }
    }

    /// Short label for the fee.
    #[must_use]
    pub const fn fee_label(self) -> &'static str {
        match self {
            Self::List => "listing fee",
            Self::Lease => "lease fee",
            Self::Contact => "contact-info fee",
            Self::Generic => "service fee",
        }
    }

    /// Heading shown above the payment prompt.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::List => "Listing Fee Required",
            _ => "Service Fee Required",
        }
    }

    /// Full prompt shown to the payer.
    #[must_use]
    pub fn prompt(self, fee_minor: i64, currency: Currency) -> String {
        let lead = match self {
            Self::List => "To list your property on KigaliCribs",
            Self::Contact => "To view the owner's contact information",
            Self::Lease => "To view or sign the lease agreement",
            Self::Generic => "To view lease options and contact the property owner",
        };
        format!("{lead}, please pay a service fee of {currency} {fee_minor} via MTN MOMO.")
    }

    /// Message shown on the payer's handset and the payee statement.
    #[must_use]
    pub fn payer_message(self) -> String {
        format!("KigaliCribs {}", self.fee_label())
    }

    /// Namespace for external references of this purpose.
    #[must_use]
    pub fn reference_namespace(self) -> String {
        format!("{REFERENCE_NAMESPACE}-{}", self.as_str())
    }
}

impl fmt::Display for PurposeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PurposeContext {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "list" => Ok(Self::List),
            "lease" => Ok(Self::Lease),
            "contact" => Ok(Self::Contact),
            "generic" => Ok(Self::Generic),
            other => Err(GateError::UnknownPurpose(other.to_string())),
        }
    }
}

/// A validated payer MSISDN: exactly [`PAYER_PHONE_DIGITS`] ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PayerPhone(String);

impl PayerPhone {
    /// Whether `input` satisfies the phone validation predicate.
    #[must_use]
    pub fn is_valid(input: &str) -> bool {
        input.len() == PAYER_PHONE_DIGITS && input.bytes().all(|b| b.is_ascii_digit())
    }

    /// Validate and wrap a phone number.
    ///
    /// # Errors
    ///
    /// Returns `GateError::InvalidPhone` if the input is not exactly
    /// [`PAYER_PHONE_DIGITS`] digits.
    pub fn parse(input: &str) -> Result<Self, GateError> {
        if Self::is_valid(input) {
            Ok(Self(input.to_string()))
        } else {
            Err(GateError::InvalidPhone {
                expected: PAYER_PHONE_DIGITS,
            })
        }
    }

    /// The digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PayerPhone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PayerPhone {
    type Error = GateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PayerPhone> for String {
    fn from(phone: PayerPhone) -> Self {
        phone.0
    }
}

/// A request-to-pay for one attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Amount in minor currency units (always positive).
    pub amount_minor: i64,
    /// Currency (always RWF).
    pub currency: Currency,
    /// Validated payer phone.
    pub payer_phone: PayerPhone,
    /// Caller-generated reference, unique per attempt.
    pub external_reference: ExternalReference,
    /// What the payment unlocks.
    pub purpose: PurposeContext,
}

impl PaymentRequest {
    /// Build a request with a freshly generated external reference.
    ///
    /// # Errors
    ///
    /// Returns `GateError::InvalidAmount` if `amount_minor` is not positive.
    pub fn new(
        amount_minor: i64,
        payer_phone: PayerPhone,
        purpose: PurposeContext,
    ) -> Result<Self, GateError> {
        if amount_minor <= 0 {
            return Err(GateError::InvalidAmount(amount_minor));
        }

        Ok(Self {
            amount_minor,
            currency: Currency::Rwf,
            payer_phone,
            external_reference: ExternalReference::generate(&purpose.reference_namespace()),
            purpose,
        })
    }

    /// Message sent to the provider alongside the request.
    #[must_use]
    pub fn payer_message(&self) -> String {
        self.purpose.payer_message()
    }
}
