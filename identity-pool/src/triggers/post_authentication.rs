use super::events::PostAuthenticationEvent;
use crate::services::admin::{AdminError, UserAttribute, UserPoolAdmin};
use thiserror::Error;

pub const EMAIL_VERIFIED: &str = "email_verified";

#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("failed to mark email verified: {0}")]
    Admin(#[from] AdminError),
}

/// Forces `email_verified` to `"true"` after every successful login and
/// hands the event back untouched. An admin failure fails the login.
pub async fn handle_post_authentication<A>(
    admin: &A,
    event: PostAuthenticationEvent,
) -> Result<PostAuthenticationEvent, TriggerError>
where
    A: UserPoolAdmin + ?Sized,
{
    tracing::info!(
        user_pool_id = %event.user_pool_id,
        user_name = %event.user_name,
        "Post authentication hook invoked"
    );

    admin
        .admin_update_user_attributes(
            &event.user_pool_id,
            &event.user_name,
            &[UserAttribute::new(EMAIL_VERIFIED, "true")],
        )
        .await?;

    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingAdmin {
        calls: Mutex<Vec<(String, String, Vec<UserAttribute>)>>,
        fail: bool,
    }

    #[async_trait]
    impl UserPoolAdmin for RecordingAdmin {
        async fn admin_update_user_attributes(
            &self,
            user_pool_id: &str,
            username: &str,
            attributes: &[UserAttribute],
        ) -> Result<(), AdminError> {
            self.calls.lock().unwrap().push((
                user_pool_id.to_string(),
                username.to_string(),
                attributes.to_vec(),
            ));
            if self.fail {
                return Err(AdminError::Service("throttled".to_string()));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn issues_one_update_and_returns_event() {
        let admin = RecordingAdmin::default();
        let event = PostAuthenticationEvent::new("eu-west-1_Pool", "alice");

        let out = handle_post_authentication(&admin, event.clone()).await.unwrap();

        assert_eq!(out, event);
        let calls = admin.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "eu-west-1_Pool");
        assert_eq!(calls[0].1, "alice");
        assert_eq!(calls[0].2, vec![UserAttribute::new("email_verified", "true")]);
    }

    #[tokio::test]
    async fn admin_failure_propagates() {
        let admin = RecordingAdmin {
            fail: true,
            ..Default::default()
        };

        let result =
            handle_post_authentication(&admin, PostAuthenticationEvent::new("p", "bob")).await;

        assert!(matches!(result, Err(TriggerError::Admin(AdminError::Service(_)))));
        assert_eq!(admin.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn repeated_invocations_are_idempotent() {
        let admin = RecordingAdmin::default();
        let event = PostAuthenticationEvent::new("p", "carol");

        handle_post_authentication(&admin, event.clone()).await.unwrap();
        handle_post_authentication(&admin, event).await.unwrap();

        let calls = admin.calls.lock().unwrap();
        assert_eq!(calls[0], calls[1]);
    }
}
