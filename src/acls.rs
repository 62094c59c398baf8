//! Owner, group and mode of namespace objects (`?acl`).

use crate::error::{Error, Result};
use crate::ordered_values::OrderedValues;
use crate::rest_client::{Payload, RestClient};
use crate::types::{Acl, AclAction, AuthoritativeType, FileMode, Persona};
use crate::volumes::namespace_path;
use reqwest::Method;

/// Mode given to a volume whose owner is reassigned.
pub const DEFAULT_OWNER_MODE: FileMode = FileMode(0o777);

fn acl_param() -> OrderedValues {
    let mut values = OrderedValues::new();
    values.add_flag("acl");
    values
}

/// Fetch the ACL of a volume.
pub async fn get_acl(client: &RestClient, volume: &str) -> Result<Acl> {
    let resp: Option<Acl> = client
        .get(&namespace_path(client), volume, Some(&acl_param()), &[])
        .await?;
    resp.ok_or_else(|| Error::InvalidResponse(format!("empty ACL response for {volume}")))
}

/// Apply `acl` to a volume.
pub async fn update_acl(client: &RestClient, volume: &str, acl: &Acl) -> Result<()> {
    client
        .execute(
            Method::PUT,
            &namespace_path(client),
            volume,
            Some(&acl_param()),
            &[],
            Payload::json(acl)?,
        )
        .await?;
    Ok(())
}

/// ACL that makes `user` the owner and resets the mode to 0777.
pub fn owner_acl(user: &str) -> Acl {
    Acl {
        action: Some(AclAction::Replace),
        authoritative: Some(AuthoritativeType::Mode),
        owner: Some(Persona::user(user)),
        group: None,
        mode: Some(DEFAULT_OWNER_MODE),
    }
}

/// ACL that only changes the POSIX mode.
pub fn mode_acl(mode: FileMode) -> Acl {
    Acl {
        action: Some(AclAction::Replace),
        authoritative: Some(AuthoritativeType::Mode),
        mode: Some(mode),
        ..Default::default()
    }
}
