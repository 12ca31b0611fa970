//! Minimal user registry. Credentials and sessions belong to the auth layer
//! in front of this service.
use crate::auction::model::User;
use crate::error::{ensure_max_len, MarketError, RuleViolation, ValidationError};
use crate::store::{MarketStore, NewUser};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const USERNAME_MAX_LEN: usize = 150;
pub const EMAIL_MAX_LEN: usize = 254;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RegisterCommand {
    pub username: String,
    #[serde(default)]
    pub email: String,
}

pub async fn register_user(
    store: &impl MarketStore,
    cmd: RegisterCommand,
) -> Result<User, MarketError> {
    let username = cmd.username.trim();
    if username.is_empty() {
        return Err(ValidationError::BlankUsername.into());
    }
    ensure_max_len("username", username, USERNAME_MAX_LEN)?;
    let email = cmd.email.trim();
    ensure_max_len("email", email, EMAIL_MAX_LEN)?;

    let user = store
        .insert_user(NewUser {
            username: username.to_string(),
            email: email.to_string(),
        })
        .await?
        .ok_or(RuleViolation::UsernameTaken)?;
    info!("{:<12} --> registered user {}", "Command", user.id);
    Ok(user)
}

pub async fn get_user(store: &impl MarketStore, user_id: i64) -> Result<User, MarketError> {
    store
        .find_user(user_id)
        .await?
        .ok_or(MarketError::UserNotFound(user_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryMarketStore;
    use rstest::rstest;

    fn register(username: &str) -> RegisterCommand {
        RegisterCommand {
            username: username.to_string(),
            email: format!("{}@example.com", username.trim()),
        }
    }

    #[tokio::test]
    async fn usernames_are_unique() {
        let store = InMemoryMarketStore::new();
        let user = register_user(&store, register("carol")).await.unwrap();
        assert_eq!(get_user(&store, user.id).await.unwrap(), user);

        let err = register_user(&store, register(" carol ")).await.unwrap_err();
        assert!(matches!(err, MarketError::Rule(RuleViolation::UsernameTaken)));
        assert_eq!(err.to_string(), "Username already taken.");
    }

    #[rstest]
    #[case("  ".to_string(), String::new(), ValidationError::BlankUsername)]
    #[case(
        "u".repeat(USERNAME_MAX_LEN + 1),
        String::new(),
        ValidationError::TooLong { field: "username", max: USERNAME_MAX_LEN }
    )]
    #[case(
        "dave".to_string(),
        format!("{}@example.com", "d".repeat(EMAIL_MAX_LEN)),
        ValidationError::TooLong { field: "email", max: EMAIL_MAX_LEN }
    )]
    #[tokio::test]
    async fn rejects_invalid_registration(
        #[case] username: String,
        #[case] email: String,
        #[case] expected: ValidationError,
    ) {
        let store = InMemoryMarketStore::new();
        let cmd = RegisterCommand { username, email };
        match register_user(&store, cmd).await {
            Err(MarketError::Validation(found)) => assert_eq!(found, expected),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn email_at_the_limit_is_accepted() {
        let store = InMemoryMarketStore::new();
        let cmd = RegisterCommand {
            username: "erin".to_string(),
            email: "e".repeat(EMAIL_MAX_LEN),
        };
        let user = register_user(&store, cmd).await.unwrap();
        assert_eq!(user.email.len(), EMAIL_MAX_LEN);
    }
}
