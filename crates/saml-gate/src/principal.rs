use crate::claims::Claims;
use crate::config::ClaimMapping;
use crate::error::HandshakeFailure;
use std::collections::BTreeSet;

/// Decoded profile handed back by the identity provider client after it has
/// validated an assertion.
#[derive(Clone, Debug)]
pub struct RawProfile {
    pub name_id: Option<String>,
    pub claims: Claims,
}

/// The signed-in user. Fixed for the life of the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub groups: BTreeSet<String>,
}

impl Principal {
    /// Name to greet the user with.
    pub fn display_name(&self) -> &str {
        self.first_name.as_deref().unwrap_or(&self.id)
    }
}

/// Maps a validated profile onto a principal. A missing groups claim yields an
/// empty group set; a missing or blank NameID rejects the profile.
pub fn validate_profile(
    profile: &RawProfile,
    mapping: &ClaimMapping,
) -> Result<Principal, HandshakeFailure> {
    let id = profile
        .name_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(HandshakeFailure::MissingNameId)?;

    let claim = |name: &str| profile.claims.first(name).map(str::to_string);

    Ok(Principal {
        id: id.to_string(),
        email: claim(&mapping.email),
        first_name: claim(&mapping.given_name),
        last_name: claim(&mapping.family_name),
        groups: profile
            .claims
            .values(&mapping.groups)
            .iter()
            .cloned()
            .collect(),
    })
}
