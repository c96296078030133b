use tokio::task::spawn_blocking;

pub mod add_user_dialog;
pub mod profile;
pub mod roster;

/// Run a store call off the UI thread, flattening failures into the message
/// shown to the user.
pub async fn blocking<T, F>(call: F) -> Result<T, String>
where
    T: Send + 'static,
    F: FnOnce() -> roster_lib::Result<T> + Send + 'static,
{
    match spawn_blocking(call).await {
        Ok(result) => result.map_err(|err| err.to_string()),
        Err(err) => Err(err.to_string()),
    }
}
