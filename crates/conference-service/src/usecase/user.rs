use std::sync::Arc;

use conference_constraints::use_cases::{DELETE_USER, GET_USER, LOGIN, REGISTER_USER, UPDATE_USER};
use conference_constraints::{Argument, ConstraintEngine};
use conference_types::{CreateUser, Login, UpdateUser, User, UserId};
use tracing::{debug, info};

use super::validate;
use crate::error::{RepositoryError, UseCaseError};
use crate::password::PasswordVerifier;
use crate::repository::UserRepository;

pub struct UserUseCases {
    engine: Arc<ConstraintEngine>,
    users: Arc<UserRepository>,
    verifier: Arc<dyn PasswordVerifier>,
    /// Checked against on unknown emails so both login failures cost one
    /// verification.
    decoy_hash: String,
}

impl UserUseCases {
    pub fn new(
        engine: Arc<ConstraintEngine>,
        users: Arc<UserRepository>,
        verifier: Arc<dyn PasswordVerifier>,
    ) -> Self {
        let decoy_hash = verifier.hash("");
        Self {
            engine,
            users,
            verifier,
            decoy_hash,
        }
    }

    pub fn register(&self, command: &CreateUser) -> Result<UserId, UseCaseError> {
        validate(&self.engine, REGISTER_USER, &[Argument::object(command)])?;
        let password = command
            .password
            .as_deref()
            .ok_or(RepositoryError::IncompleteCommand { field: "password" })?;
        let Some(id) = self.users.create(command, self.verifier.hash(password))? else {
            return Err(UseCaseError::EmailTaken);
        };
        info!(target: "conference::usecase", user_id = %id, "user registered");
        Ok(id)
    }

    pub fn get(&self, id: &str) -> Result<User, UseCaseError> {
        validate(&self.engine, GET_USER, &[Argument::text(id)])?;
        let id = UserId::parse(id)?;
        self.users.get_by_id(&id)?.ok_or_else(|| not_found(&id))
    }

    /// Apply the given fields. A new password is hashed before it reaches
    /// the repository.
    pub fn update(&self, command: &UpdateUser) -> Result<User, UseCaseError> {
        validate(&self.engine, UPDATE_USER, &[Argument::object(command)])?;
        let id = UserId::parse(command.id.as_deref().unwrap_or_default())?;
        let password_hash = command
            .password
            .as_deref()
            .map(|password| self.verifier.hash(password));
        self.users
            .update(&id, command, password_hash)?
            .ok_or_else(|| not_found(&id))
    }

    pub fn delete(&self, id: &str) -> Result<(), UseCaseError> {
        validate(&self.engine, DELETE_USER, &[Argument::text(id)])?;
        let id = UserId::parse(id)?;
        if !self.users.delete_by_id(&id)? {
            return Err(not_found(&id));
        }
        Ok(())
    }

    /// Check the password against the stored hash. An unknown email and a
    /// wrong password fail the same way.
    pub fn login(&self, command: &Login) -> Result<User, UseCaseError> {
        validate(&self.engine, LOGIN, &[Argument::object(command)])?;
        let email = command.email.as_deref().unwrap_or_default();
        let password = command.password.as_deref().unwrap_or_default();
        let Some(credentials) = self.users.find_credentials(email)? else {
            self.verifier.verify(password, &self.decoy_hash);
            debug!(target: "conference::usecase", "login for unknown email");
            return Err(UseCaseError::InvalidCredentials);
        };
        if !self.verifier.verify(password, &credentials.password_hash) {
            debug!(target: "conference::usecase", user_id = %credentials.user_id, "wrong password");
            return Err(UseCaseError::InvalidCredentials);
        }
        self.users
            .get_by_id(&credentials.user_id)?
            .ok_or_else(|| {
                UseCaseError::DataIntegrity(format!(
                    "credentials found for {} but no user record",
                    credentials.user_id
                ))
            })
    }
}

fn not_found(id: &UserId) -> UseCaseError {
    UseCaseError::UserNotFound { id: id.to_string() }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use conference_constraints::standard_engine;
    use conference_types::UserRecord;

    use super::*;
    use crate::cache::InMemoryCache;
    use crate::config::ServiceConfig;
    use crate::error::ErrorCode;
    use crate::password::Sha256PasswordVerifier;
    use crate::store::InMemoryStore;

    /// Real hashing, with a count of verifications.
    #[derive(Default)]
    struct CountingVerifier {
        inner: Sha256PasswordVerifier,
        verifications: AtomicUsize,
    }

    impl PasswordVerifier for CountingVerifier {
        fn hash(&self, password: &str) -> String {
            self.inner.hash(password)
        }

        fn verify(&self, password: &str, stored_hash: &str) -> bool {
            self.verifications.fetch_add(1, Ordering::SeqCst);
            self.inner.verify(password, stored_hash)
        }
    }

    fn use_cases(verifier: Arc<CountingVerifier>) -> UserUseCases {
        let users = UserRepository::new(
            Arc::new(InMemoryStore::<UserRecord>::new()),
            Arc::new(InMemoryCache::<User>::new()),
            &ServiceConfig::default(),
        );
        UserUseCases::new(Arc::new(standard_engine().unwrap()), Arc::new(users), verifier)
    }

    fn login(email: &str, password: &str) -> Login {
        Login {
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }

    #[test]
    fn unknown_email_still_costs_one_verification() {
        let verifier = Arc::new(CountingVerifier::default());
        let users = use_cases(verifier.clone());
        users
            .register(&CreateUser {
                email: Some("ada@example.com".into()),
                first_name: Some("Ada".into()),
                last_name: Some("Lovelace".into()),
                password: Some("Corr3ct-horse".into()),
            })
            .unwrap();

        let unknown = users.login(&login("nobody@example.com", "Corr3ct-horse")).unwrap_err();
        assert_eq!(unknown.code(), ErrorCode::InvalidCredentials);
        assert_eq!(verifier.verifications.load(Ordering::SeqCst), 1);

        let wrong = users.login(&login("ada@example.com", "Wr0ng-horse")).unwrap_err();
        assert_eq!(wrong.code(), ErrorCode::InvalidCredentials);
        assert_eq!(verifier.verifications.load(Ordering::SeqCst), 2);
    }
}
