pub(crate) mod random;

/// Renders a caught task panic payload as text.
pub(crate) fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Ok(msg) = payload.downcast::<String>() {
        *msg
    } else {
        "task panicked".to_string()
    }
}
