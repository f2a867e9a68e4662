//! Resolve the signed-in staff member for a request.

use crate::domain::ports::{
    AuthProvider, AuthProviderError, DataStore, STAFFS_TABLE, SelectQuery, StoreError, decode_rows,
};
use crate::domain::{AccessToken, Error, Staff};

fn map_auth_error(error: AuthProviderError) -> Error {
    match error {
        AuthProviderError::InvalidCredentials => Error::unauthorized(error.to_string()),
        AuthProviderError::Rejected { message } => {
            Error::service_unavailable(format!("auth provider rejected token lookup: {message}"))
        }
        AuthProviderError::Transport { message } => {
            Error::service_unavailable(format!("auth provider unavailable: {message}"))
        }
    }
}

fn map_store_error(error: StoreError) -> Error {
    match error {
        StoreError::Transport { .. } | StoreError::Unconfigured { .. } => {
            Error::service_unavailable(error.to_string())
        }
        StoreError::Backend { .. }
        | StoreError::Decode { .. }
        | StoreError::InvalidRequest { .. } => Error::internal(format!("staff lookup failed: {error}")),
    }
}

/// Look up the staff row linked to the session's access token.
///
/// Returns `Ok(None)` when there is no token, the provider no longer
/// recognises it, or no staff row is linked to the provider user. `store`
/// must be bound to the same token so row-level security applies.
pub async fn current_staff(
    auth: &dyn AuthProvider,
    store: &dyn DataStore,
    token: Option<&AccessToken>,
) -> Result<Option<Staff>, Error> {
    let Some(token) = token else {
        return Ok(None);
    };
    let Some(user_id) = auth.user_for_token(token).await.map_err(map_auth_error)? else {
        return Ok(None);
    };
    let query = SelectQuery::from(STAFFS_TABLE)
        .columns("id,name,facility_id,role")
        .eq("auth_user_id", user_id)
        .limit(1);
    let rows = store.select(&query).await.map_err(map_store_error)?;
    let staff = decode_rows::<Staff>(rows).map_err(map_store_error)?;
    Ok(staff.into_iter().next())
}
