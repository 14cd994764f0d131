use super::events::PreSignUpEvent;

/// Marks the registering account's email and phone as verified and confirms
/// it, whatever the event carries. There is no rejection path.
pub fn handle_pre_signup(mut event: PreSignUpEvent) -> PreSignUpEvent {
    tracing::info!(
        trigger_source = event.trigger_source.as_deref().unwrap_or("-"),
        user_pool_id = event.user_pool_id.as_deref().unwrap_or("-"),
        user_name = event.user_name.as_deref().unwrap_or("-"),
        "Pre sign-up hook invoked"
    );

    event.response.auto_verify_email = Some(true);
    event.response.auto_verify_phone = Some(true);
    event.response.auto_confirm_user = Some(true);
    event
}
