use tracing::{info, warn};

use crate::auth::dto::{LoginRequest, RegisterRequest};
use crate::auth::password;
use crate::auth::repo::{User, UserStore};
use crate::error::{AuthError, StoreError};

/// Register a new user: hash the password, insert the record.
///
/// The insert is the uniqueness check; concurrent registrations with the
/// same email are serialized by the store's unique constraint.
pub async fn register(store: &dyn UserStore, req: RegisterRequest) -> Result<User, AuthError> {
    if req.email.is_empty() || req.password.is_empty() {
        warn!("register request with missing fields");
        return Err(AuthError::InvalidInput);
    }

    let hash = password::hash_password(&req.password).map_err(AuthError::Internal)?;

    let user = match store.insert(&req.email, &hash).await {
        Ok(u) => u,
        Err(StoreError::DuplicateEmail) => {
            warn!(email = %req.email, "email already registered");
            return Err(AuthError::DuplicateEmail);
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok(user)
}

/// Authenticate a user by email and password.
///
/// Unknown email and wrong password share one failure so responses cannot
/// be used to probe which emails are registered.
pub async fn login(store: &dyn UserStore, req: LoginRequest) -> Result<User, AuthError> {
    if req.email.is_empty() || req.password.is_empty() {
        warn!("login request with missing fields");
        return Err(AuthError::InvalidInput);
    }

    let user = match store.find_by_email(&req.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %req.email, "login unknown email");
            return Err(AuthError::InvalidCredentials);
        }
    };

    let ok = password::verify_password(&req.password, &user.password_hash)
        .map_err(AuthError::Internal)?;
    if !ok {
        warn!(email = %req.email, user_id = user.id, "login invalid password");
        return Err(AuthError::InvalidCredentials);
    }

    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo::testing::MemoryUserStore;

    fn creds(email: &str, password: &str) -> (RegisterRequest, LoginRequest) {
        (
            RegisterRequest {
                email: email.to_string(),
                password: password.to_string(),
            },
            LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            },
        )
    }

    #[tokio::test]
    async fn register_then_login_succeeds() {
        let store = MemoryUserStore::new();
        let (reg, log) = creds("a@x.com", "pw1");

        let created = register(&store, reg).await.expect("register");
        let authed = login(&store, log).await.expect("login");

        assert_eq!(created.id, authed.id);
        assert_eq!(authed.email, "a@x.com");
    }

    #[tokio::test]
    async fn register_rejects_missing_fields_before_touching_store() {
        // A failing store would turn any storage call into Internal,
        // so InvalidInput proves the store was never reached.
        let store = MemoryUserStore::failing();

        let (reg, _) = creds("", "pw1");
        assert!(matches!(
            register(&store, reg).await.unwrap_err(),
            AuthError::InvalidInput
        ));

        let (reg, _) = creds("a@x.com", "");
        assert!(matches!(
            register(&store, reg).await.unwrap_err(),
            AuthError::InvalidInput
        ));

        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn login_rejects_missing_fields_before_touching_store() {
        let store = MemoryUserStore::failing();
        let (_, log) = creds("a@x.com", "");
        assert!(matches!(
            login(&store, log).await.unwrap_err(),
            AuthError::InvalidInput
        ));
    }

    #[tokio::test]
    async fn duplicate_registration_keeps_single_record() {
        let store = MemoryUserStore::new();
        let (first, _) = creds("a@x.com", "pw1");
        let (second, _) = creds("a@x.com", "pw2");

        register(&store, first).await.expect("first register");
        let err = register(&store, second).await.unwrap_err();

        assert!(matches!(err, AuthError::DuplicateEmail));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_fail_identically() {
        let store = MemoryUserStore::new();
        let (reg, _) = creds("a@x.com", "pw1");
        register(&store, reg).await.expect("register");

        let (_, wrong_password) = creds("a@x.com", "nope");
        let (_, unknown_email) = creds("b@x.com", "pw1");

        let wrong = login(&store, wrong_password).await.unwrap_err();
        let unknown = login(&store, unknown_email).await.unwrap_err();

        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn same_password_stored_with_different_salts() {
        let store = MemoryUserStore::new();
        let (first, first_login) = creds("a@x.com", "shared-pw");
        let (second, second_login) = creds("b@x.com", "shared-pw");

        register(&store, first).await.expect("register a");
        register(&store, second).await.expect("register b");

        let hash_a = store
            .find_by_email("a@x.com")
            .await
            .expect("find a")
            .expect("a exists")
            .password_hash;
        let hash_b = store
            .find_by_email("b@x.com")
            .await
            .expect("find b")
            .expect("b exists")
            .password_hash;
        assert_ne!(hash_a, hash_b);

        login(&store, first_login).await.expect("login a");
        login(&store, second_login).await.expect("login b");
    }

    #[tokio::test]
    async fn store_failures_surface_as_internal() {
        let store = MemoryUserStore::failing();

        let (reg, log) = creds("a@x.com", "pw1");
        assert!(matches!(
            register(&store, reg).await.unwrap_err(),
            AuthError::Internal(_)
        ));
        assert!(matches!(
            login(&store, log).await.unwrap_err(),
            AuthError::Internal(_)
        ));
    }
}
