//! Input forms and their field-level validation rules.
//!
//! Forms are deserialized straight from request bodies. Each operation that
//! persists a form validates it first and returns
//! [`ServiceError::Validation`] with one message per offending field, so a
//! failed validation never leaves a partial write behind.

use std::borrow::Cow;
use std::fmt;

use chrono::NaiveDate;
use model::entities::{order::OrderStatus, producer, product, product::Rarity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::error::{FieldErrors, Result, ServiceError, field_errors};

/// Total digits allowed in a money column (`DECIMAL(10, 2)`).
pub const MONEY_MAX_DIGITS: u32 = 10;
/// Fractional digits allowed in a money column.
pub const MONEY_SCALE: u32 = 2;

const REQUIRED: &str = "This field is required.";

/// An amount at exactly two fractional digits. SQLite hands decimals back
/// through `f64`, which drops trailing zeros.
pub fn to_money(mut value: Decimal) -> Decimal {
    value.rescale(MONEY_SCALE);
    value
}

/// Checks that an amount fits a `DECIMAL(10, 2)` money column.
pub fn check_money(value: &Decimal) -> std::result::Result<(), &'static str> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err("Ensure this value is greater than or equal to 0.");
    }
    if value.normalize().scale() > MONEY_SCALE {
        return Err("Ensure that there are no more than 2 decimal places.");
    }
    let integer_limit = Decimal::from(10_i64.pow(MONEY_MAX_DIGITS - MONEY_SCALE));
    if value.trunc() >= integer_limit {
        return Err("Ensure that there are no more than 10 digits in total.");
    }
    Ok(())
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

fn validate_price(value: &Decimal) -> std::result::Result<(), ValidationError> {
    check_money(value).map_err(|message| invalid("money", message))
}

fn not_blank(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("required", REQUIRED));
    }
    Ok(())
}

/// Letters, digits and `@ . + - _` only.
fn validate_username(value: &str) -> std::result::Result<(), ValidationError> {
    not_blank(value)?;
    let allowed = |c: char| c.is_alphanumeric() || "@.+-_".contains(c);
    if !value.chars().all(allowed) {
        return Err(invalid(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        ));
    }
    Ok(())
}

fn trimmed(value: String) -> String {
    value.trim().to_string()
}

/// `Some("")` clears an optional text field.
fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Runs the derived rules and flattens the result.
pub fn validate_form<F: Validate>(form: &F) -> Result<()> {
    form.validate().map_err(ServiceError::from)
}

fn collect_errors<F: Validate>(form: &F) -> FieldErrors {
    form.validate()
        .err()
        .map(|errors| field_errors(&errors))
        .unwrap_or_default()
}

// ===================== Producers =====================

/// Producer fields as submitted on create.
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct ProducerForm {
    #[validate(
        custom(function = "not_blank"),
        length(max = 200, message = "Ensure this value has at most 200 characters.")
    )]
    pub name: String,
    #[validate(
        custom(function = "not_blank"),
        length(max = 200, message = "Ensure this value has at most 200 characters.")
    )]
    pub contact_info: String,
    #[validate(
        email(message = "Enter a valid email address."),
        length(max = 254, message = "Ensure this value has at most 254 characters.")
    )]
    pub email: String,
    #[validate(
        custom(function = "not_blank"),
        length(max = 200, message = "Ensure this value has at most 200 characters.")
    )]
    pub location: String,
    /// Free text, no length limit
    #[serde(default)]
    pub bio: Option<String>,
}

impl ProducerForm {
    /// Strips surrounding whitespace the way submitted text is normalized.
    pub fn cleaned(self) -> Self {
        Self {
            name: trimmed(self.name),
            contact_info: trimmed(self.contact_info),
            email: trimmed(self.email),
            location: trimmed(self.location),
            bio: blank_to_none(self.bio),
        }
    }
}

/// Partial producer update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct ProducerChanges {
    pub name: Option<String>,
    pub contact_info: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
    /// An empty string clears the bio
    pub bio: Option<String>,
}

impl ProducerChanges {
    /// Merges the changes over the stored record into a full form.
    pub fn apply_to(self, current: &producer::Model) -> ProducerForm {
        ProducerForm {
            name: self.name.unwrap_or_else(|| current.name.clone()),
            contact_info: self
                .contact_info
                .unwrap_or_else(|| current.contact_info.clone()),
            email: self.email.unwrap_or_else(|| current.email.clone()),
            location: self.location.unwrap_or_else(|| current.location.clone()),
            bio: match self.bio {
                Some(bio) => Some(bio),
                None => current.bio.clone(),
            },
        }
        .cleaned()
    }
}

// ===================== Products =====================

/// Product fields as submitted on create.
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct ProductForm {
    #[validate(
        custom(function = "not_blank"),
        length(max = 200, message = "Ensure this value has at most 200 characters.")
    )]
    pub name: String,
    #[validate(custom(function = "not_blank"))]
    pub description: String,
    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,
    /// Production date (YYYY-MM-DD)
    pub prod_date: NaiveDate,
    /// Opaque path or URL of an already stored image
    #[serde(default)]
    #[validate(length(max = 100, message = "Ensure this value has at most 100 characters."))]
    pub image: Option<String>,
    #[serde(default)]
    pub rarity: Rarity,
    pub producer_id: i32,
}

impl ProductForm {
    pub fn cleaned(self) -> Self {
        Self {
            name: trimmed(self.name),
            description: trimmed(self.description),
            image: blank_to_none(self.image),
            ..self
        }
    }

    /// Field rules only. The producer reference is checked against the
    /// store by the catalog, which merges its error into the same map.
    pub fn field_errors(&self) -> FieldErrors {
        collect_errors(self)
    }
}

/// Partial product update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub prod_date: Option<NaiveDate>,
    /// An empty string removes the image reference
    pub image: Option<String>,
    pub rarity: Option<Rarity>,
    pub producer_id: Option<i32>,
}

impl ProductChanges {
    pub fn apply_to(self, current: &product::Model) -> ProductForm {
        ProductForm {
            name: self.name.unwrap_or_else(|| current.name.clone()),
            description: self
                .description
                .unwrap_or_else(|| current.description.clone()),
            price: self.price.unwrap_or(current.price),
            prod_date: self.prod_date.unwrap_or(current.prod_date),
            image: match self.image {
                Some(image) => Some(image),
                None => current.image.clone(),
            },
            rarity: self.rarity.unwrap_or(current.rarity),
            producer_id: self.producer_id.unwrap_or(current.producer_id),
        }
        .cleaned()
    }
}

// ===================== Accounts =====================

/// Sign-up form: creates a user and its customer profile.
#[derive(Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct RegistrationForm {
    #[validate(
        custom(function = "validate_username"),
        length(max = 150, message = "Ensure this value has at most 150 characters.")
    )]
    pub username: String,
    #[validate(
        email(message = "Enter a valid email address."),
        length(max = 254, message = "Ensure this value has at most 254 characters.")
    )]
    pub email: String,
    #[validate(length(
        min = 8,
        message = "This password is too short. It must contain at least 8 characters."
    ))]
    pub password: String,
    pub password_confirmation: String,
    #[validate(
        custom(function = "not_blank"),
        length(max = 200, message = "Ensure this value has at most 200 characters.")
    )]
    pub contact_info: String,
    #[validate(
        custom(function = "not_blank"),
        length(max = 200, message = "Ensure this value has at most 200 characters.")
    )]
    pub location: String,
}

impl RegistrationForm {
    pub fn cleaned(self) -> Self {
        Self {
            username: trimmed(self.username),
            email: trimmed(self.email),
            contact_info: trimmed(self.contact_info),
            location: trimmed(self.location),
            ..self
        }
    }

    /// Field rules plus the password confirmation match.
    pub fn check(&self) -> Result<()> {
        let mut errors = collect_errors(self);
        if self.password != self.password_confirmation {
            errors.insert(
                "password_confirmation".to_string(),
                "The two password fields didn't match.".to_string(),
            );
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::Validation(errors))
        }
    }
}

impl fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("password_confirmation", &"<redacted>")
            .field("contact_info", &self.contact_info)
            .field("location", &self.location)
            .finish()
    }
}

/// Credentials for opening a session.
#[derive(Clone, Deserialize, Serialize, ToSchema)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Contact details stored on a customer record.
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct CustomerForm {
    #[validate(
        custom(function = "not_blank"),
        length(max = 200, message = "Ensure this value has at most 200 characters.")
    )]
    pub contact_info: String,
    #[validate(
        custom(function = "not_blank"),
        length(max = 200, message = "Ensure this value has at most 200 characters.")
    )]
    pub location: String,
}

/// Profile page form: customer contact details plus the user's email.
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct ProfileForm {
    #[validate(
        custom(function = "not_blank"),
        length(max = 200, message = "Ensure this value has at most 200 characters.")
    )]
    pub contact_info: String,
    #[validate(
        custom(function = "not_blank"),
        length(max = 200, message = "Ensure this value has at most 200 characters.")
    )]
    pub location: String,
    #[validate(
        email(message = "Enter a valid email address."),
        length(max = 254, message = "Ensure this value has at most 254 characters.")
    )]
    pub email: String,
}

impl ProfileForm {
    pub fn cleaned(self) -> Self {
        Self {
            contact_info: trimmed(self.contact_info),
            location: trimmed(self.location),
            email: trimmed(self.email),
        }
    }
}

// ===================== Orders =====================

fn default_quantity() -> i32 {
    1
}

/// Order placement. Quantity is checked by the workflow, not here.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct OrderForm {
    pub product_id: i32,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct OrderStatusForm {
    pub status: OrderStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn producer_form() -> ProducerForm {
        ProducerForm {
            name: "Acme".to_string(),
            contact_info: "+351 912 345 678".to_string(),
            email: "hello@acme.test".to_string(),
            location: "Porto".to_string(),
            bio: None,
        }
    }

    fn product_form(price: &str) -> ProductForm {
        ProductForm {
            name: "Shirt".to_string(),
            description: "Linen shirt".to_string(),
            price: Decimal::from_str(price).unwrap(),
            prod_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            image: None,
            rarity: Rarity::default(),
            producer_id: 1,
        }
    }

    fn registration() -> RegistrationForm {
        RegistrationForm {
            username: "maria.silva".to_string(),
            email: "maria@example.com".to_string(),
            password: "correct horse".to_string(),
            password_confirmation: "correct horse".to_string(),
            contact_info: "+351 900 000 000".to_string(),
            location: "Lisbon".to_string(),
        }
    }

    #[test]
    fn test_money_rules() {
        assert!(check_money(&Decimal::from_str("0").unwrap()).is_ok());
        assert!(check_money(&Decimal::from_str("20.00").unwrap()).is_ok());
        assert!(check_money(&Decimal::from_str("99999999.99").unwrap()).is_ok());
        // Trailing zeros do not count as decimal places
        assert!(check_money(&Decimal::from_str("12.5000").unwrap()).is_ok());

        assert!(check_money(&Decimal::from_str("-0.01").unwrap()).is_err());
        assert!(check_money(&Decimal::from_str("1.999").unwrap()).is_err());
        assert!(check_money(&Decimal::from_str("100000000.00").unwrap()).is_err());
    }

    #[test]
    fn test_valid_producer_form() {
        assert!(validate_form(&producer_form()).is_ok());
    }

    #[test]
    fn test_producer_form_reports_each_field() {
        let form = ProducerForm {
            name: "x".repeat(201),
            email: "not-an-email".to_string(),
            location: "   ".to_string(),
            ..producer_form()
        };

        match validate_form(&form) {
            Err(ServiceError::Validation(fields)) => {
                assert_eq!(fields.len(), 3);
                assert_eq!(
                    fields["name"],
                    "Ensure this value has at most 200 characters."
                );
                assert_eq!(fields["email"], "Enter a valid email address.");
                assert_eq!(fields["location"], "This field is required.");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_bio_is_unbounded() {
        let form = ProducerForm {
            bio: Some("b".repeat(10_000)),
            ..producer_form()
        };
        assert!(validate_form(&form).is_ok());
    }

    #[test]
    fn test_product_price_rules() {
        assert!(product_form("20.00").field_errors().is_empty());

        let errors = product_form("20.001").field_errors();
        assert_eq!(
            errors.get("price").map(String::as_str),
            Some("Ensure that there are no more than 2 decimal places.")
        );

        let errors = product_form("-1").field_errors();
        assert!(errors.contains_key("price"));
    }

    #[test]
    fn test_product_form_defaults_rarity() {
        let json = r#"{
            "name": "Bowl",
            "description": "Stoneware bowl",
            "price": "35.50",
            "prod_date": "2024-02-14",
            "producer_id": 4
        }"#;
        let form: ProductForm = serde_json::from_str(json).unwrap();
        assert_eq!(form.rarity, Rarity::Common);
        assert_eq!(form.image, None);
        assert_eq!(form.price, Decimal::new(3550, 2));
    }

    #[test]
    fn test_registration_password_mismatch() {
        let form = RegistrationForm {
            password_confirmation: "something else".to_string(),
            ..registration()
        };
        match form.check() {
            Err(ServiceError::Validation(fields)) => {
                assert_eq!(fields.len(), 1);
                assert!(fields.contains_key("password_confirmation"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_registration_rejects_bad_username_and_short_password() {
        let form = RegistrationForm {
            username: "maria silva!".to_string(),
            password: "short".to_string(),
            password_confirmation: "short".to_string(),
            ..registration()
        };
        match form.check() {
            Err(ServiceError::Validation(fields)) => {
                assert!(fields.contains_key("username"));
                assert!(fields.contains_key("password"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_registration_debug_hides_password() {
        let rendered = format!("{:?}", registration());
        assert!(!rendered.contains("correct horse"));
        assert!(rendered.contains("maria.silva"));
    }

    #[test]
    fn test_changes_merge_over_stored_producer() {
        let stored = producer::Model {
            id: 7,
            name: "Acme".to_string(),
            contact_info: "old".to_string(),
            email: "old@acme.test".to_string(),
            location: "Porto".to_string(),
            bio: Some("Old bio".to_string()),
            created_at: chrono::Utc::now(),
        };
        let merged = ProducerChanges {
            contact_info: Some("  new  ".to_string()),
            bio: Some(String::new()),
            ..Default::default()
        }
        .apply_to(&stored);

        assert_eq!(merged.name, "Acme");
        assert_eq!(merged.contact_info, "new");
        assert_eq!(merged.bio, None);
    }
}
