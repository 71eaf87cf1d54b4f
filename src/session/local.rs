use async_trait::async_trait;
use uuid::Uuid;

use super::{AuthError, IdentityProvider, Session};

/// Identity for the embedded sqlite store, which trusts its callers.
/// Anonymous sessions get a random id and a bootstrap token is used as
/// the user id as-is.
pub struct LocalIdentity;

#[async_trait]
impl IdentityProvider for LocalIdentity {
    async fn sign_in_anonymously(&self) -> Result<Session, AuthError> {
        Ok(Session {
            uid: Uuid::new_v4().to_string(),
            anonymous: true,
            ..Session::default()
        })
    }

    async fn sign_in_with_custom_token(&self, token: &str) -> Result<Session, AuthError> {
        Ok(Session {
            uid: token.to_string(),
            anonymous: false,
            ..Session::default()
        })
    }
}
