//! User accounts: registration, password authentication and the profile
//! page (user, customer record and the customer's orders).

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::Utc;
use model::entities::{customer, order, prelude::*, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
    TransactionTrait,
    sea_query::{Expr, Func},
};
use tracing::{debug, info, instrument, trace, warn};

use crate::UserId;
use crate::customers::{delete_customer, ensure_customer, find_customer_for, write_contact};
use crate::error::{Result, ServiceError, is_unique_violation, log_db};
use crate::forms::{ProfileForm, RegistrationForm, validate_form};
use crate::orders::orders_of_customer;

/// Hashes a password into an argon2 PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::PasswordHash(e.to_string()))
}

/// Checks a password against a stored PHC string. A stored value that is not
/// a valid hash never matches.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            debug!("Stored password hash is unusable: {}", e);
            false
        }
    }
}

async fn check_identity_free<C: ConnectionTrait>(db: &C, username: &str, email: &str) -> Result<()> {
    // Usernames differing only in case count as the same identity
    let taken_username = User::find()
        .filter(
            Expr::expr(Func::lower(Expr::col((User, user::Column::Username))))
                .eq(username.to_lowercase()),
        )
        .one(db)
        .await?;
    if taken_username.is_some() {
        warn!("Registration rejected, username {} is taken", username);
        return Err(ServiceError::IdentityConflict(
            "A user with that username already exists.".to_string(),
        ));
    }

    let taken_email = User::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?;
    if taken_email.is_some() {
        warn!("Registration rejected, email {} is taken", email);
        return Err(ServiceError::IdentityConflict(
            "A user with that email already exists.".to_string(),
        ));
    }
    Ok(())
}

/// Creates a user and its customer record in one transaction.
#[instrument(skip(db, form), fields(username = %form.username))]
pub async fn register<C>(db: &C, form: RegistrationForm) -> Result<user::Model>
where
    C: ConnectionTrait + TransactionTrait,
{
    trace!("Entering register function");
    let form = form.cleaned();
    form.check()?;
    check_identity_free(db, &form.username, &form.email).await?;

    let password_hash = hash_password(&form.password)?;

    let txn = db.begin().await?;
    let new_user = user::ActiveModel {
        username: Set(form.username.clone()),
        email: Set(form.email),
        password_hash: Set(password_hash),
        date_joined: Set(Utc::now()),
        ..Default::default()
    };
    let user_model = match new_user.insert(&txn).await {
        Ok(created) => created,
        Err(db_error) if is_unique_violation(&db_error) => {
            warn!("Username {} was registered concurrently", form.username);
            return Err(ServiceError::IdentityConflict(
                "A user with that username already exists.".to_string(),
            ));
        }
        Err(db_error) => return Err(log_db("Failed to create user", db_error)),
    };

    let new_customer = customer::ActiveModel {
        user_id: Set(user_model.id),
        contact_info: Set(form.contact_info),
        location: Set(form.location),
        ..Default::default()
    };
    new_customer
        .insert(&txn)
        .await
        .map_err(|e| log_db("Failed to create customer", e))?;
    txn.commit().await?;

    info!(
        "User {} registered with ID {}",
        user_model.username, user_model.id
    );
    Ok(user_model)
}

/// Resolves credentials to a user. Unknown usernames and wrong passwords fail
/// the same way.
#[instrument(skip(db, password))]
pub async fn authenticate<C: ConnectionTrait>(
    db: &C,
    username: &str,
    password: &str,
) -> Result<user::Model> {
    let found = User::find()
        .filter(user::Column::Username.eq(username.trim()))
        .one(db)
        .await
        .map_err(|e| log_db("Failed to look up user", e))?;

    match found {
        Some(user_model) if verify_password(password, &user_model.password_hash) => {
            info!("User {} authenticated", user_model.id);
            Ok(user_model)
        }
        _ => {
            warn!("Failed login attempt for username {}", username);
            Err(ServiceError::InvalidCredentials)
        }
    }
}

#[instrument(skip(db))]
pub async fn get_user<C: ConnectionTrait>(db: &C, user: UserId) -> Result<user::Model> {
    User::find_by_id(user.0)
        .one(db)
        .await
        .map_err(|e| log_db("Failed to retrieve user", e))?
        .ok_or_else(|| {
            warn!("{} not found", user);
            ServiceError::not_found("User", user.0)
        })
}

/// Everything the profile page shows.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub user: user::Model,
    pub customer: customer::Model,
    /// Newest first
    pub orders: Vec<order::Model>,
}

/// Loads the profile of `user`, creating the customer record on first view.
#[instrument(skip(db))]
pub async fn profile<C: ConnectionTrait>(db: &C, user: UserId) -> Result<Profile> {
    let user_model = get_user(db, user).await?;
    let customer = ensure_customer(db, user).await?;
    let orders = orders_of_customer(db, &customer).await?;
    debug!("Profile of {} has {} orders", user, orders.len());
    Ok(Profile {
        user: user_model,
        customer,
        orders,
    })
}

/// Updates the customer's contact details and the user's email.
#[instrument(skip(db))]
pub async fn update_profile<C>(db: &C, user: UserId, form: ProfileForm) -> Result<Profile>
where
    C: ConnectionTrait + TransactionTrait,
{
    trace!("Entering update_profile function for {}", user);
    let form = form.cleaned();
    validate_form(&form)?;

    let email_owner = User::find()
        .filter(user::Column::Email.eq(form.email.as_str()))
        .filter(user::Column::Id.ne(user.0))
        .one(db)
        .await?;
    if email_owner.is_some() {
        warn!("Profile update rejected, email {} is taken", form.email);
        return Err(ServiceError::IdentityConflict(
            "A user with that email already exists.".to_string(),
        ));
    }

    let txn = db.begin().await?;
    let user_model = get_user(&txn, user).await?;
    let customer = ensure_customer(&txn, user).await?;
    let customer = write_contact(&txn, customer, form.contact_info, form.location).await?;

    let mut user_active: user::ActiveModel = user_model.into();
    user_active.email = Set(form.email);
    let user_model = user_active
        .update(&txn)
        .await
        .map_err(|e| log_db("Failed to update user email", e))?;
    let orders = orders_of_customer(&txn, &customer).await?;
    txn.commit().await?;

    info!("Profile of {} updated", user);
    Ok(Profile {
        user: user_model,
        customer,
        orders,
    })
}

/// Deletes the customer record of `user` together with its orders. The user
/// account itself stays. Returns how many orders were removed.
#[instrument(skip(db))]
pub async fn delete_profile<C>(db: &C, user: UserId) -> Result<u64>
where
    C: ConnectionTrait + TransactionTrait,
{
    let Some(customer) = find_customer_for(db, user).await? else {
        warn!("{} has no customer profile to delete", user);
        return Err(ServiceError::not_found("Customer", user.0));
    };
    delete_customer(db, customer.id).await
}
