//! Ownership access policy.
//!
//! Pure decision function, no I/O. The same rule gates point lookup and
//! delete; listing applies it by construction because the store's list query
//! is scoped to the caller's resolved identity.

use crate::models::trip::TripOwner;

/// Outcome of an access decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny,
}

/// Decide whether `requester` may see or delete a record with `owner`.
///
/// Strict equality on ownership: an authenticated caller matches only the
/// records it owns, and an anonymous caller matches only anonymous records.
/// There is no superset rule — being authenticated grants nothing on public
/// records, and vice versa.
pub fn decide(owner: TripOwner, requester: TripOwner) -> Access {
    match (owner, requester) {
        (TripOwner::User(owner_id), TripOwner::User(requester_id)) if owner_id == requester_id => {
            Access::Allow
        }
        (TripOwner::Public, TripOwner::Public) => Access::Allow,
        _ => Access::Deny,
    }
}

/// Convenience predicate over [`decide`].
pub fn is_allowed(owner: TripOwner, requester: TripOwner) -> bool {
    decide(owner, requester) == Access::Allow
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_owner_matches_itself() {
        let id = Uuid::new_v4();
        assert_eq!(
            decide(TripOwner::User(id), TripOwner::User(id)),
            Access::Allow
        );
    }

    #[test]
    fn test_different_users_denied() {
        assert_eq!(
            decide(
                TripOwner::User(Uuid::new_v4()),
                TripOwner::User(Uuid::new_v4())
            ),
            Access::Deny
        );
    }

    #[test]
    fn test_anonymous_matches_public() {
        assert_eq!(decide(TripOwner::Public, TripOwner::Public), Access::Allow);
    }

    #[test]
    fn test_authenticated_never_sees_public() {
        // No implicit grant: a logged-in user does not own anonymous records.
        assert_eq!(
            decide(TripOwner::Public, TripOwner::User(Uuid::new_v4())),
            Access::Deny
        );
    }

    #[test]
    fn test_anonymous_never_sees_owned() {
        assert_eq!(
            decide(TripOwner::User(Uuid::new_v4()), TripOwner::Public),
            Access::Deny
        );
    }

    #[test]
    fn test_is_allowed_agrees_with_decide() {
        let id = Uuid::new_v4();
        assert!(is_allowed(TripOwner::User(id), TripOwner::User(id)));
        assert!(!is_allowed(TripOwner::User(id), TripOwner::Public));
    }
}
