use uuid::Uuid;

use crate::auth::extractors::Principal;

/// Ownership is the sole authorization axis for mutating or deleting an
/// insight. No role grants override power.
pub fn can_modify(principal: &Principal, author_id: Uuid) -> bool {
    principal.id == author_id
}
