//! Cart and wishlist ownership reconciliation.
//!
//! Ownership is level-triggered: [`reconcile`] looks only at the current
//! snapshot of `(current user, cart owner, wishlist owner)` and returns the
//! commands that bring the cart and wishlist in line with it. It holds no
//! memory of previous snapshots, so running it on an already reconciled
//! snapshot yields no commands.
//!
//! Rules, applied independently to the cart and to the wishlist:
//!
//! | session       | owner            | commands              |
//! |---------------|------------------|-----------------------|
//! | user `u`      | none             | assign `u`            |
//! | user `u`      | `u`              | -                     |
//! | user `u`      | other user       | clear, then assign `u`|
//! | anonymous     | some user        | clear                 |
//! | anonymous     | none             | -                     |
//!
//! Assigning without clearing lets a cart filled while anonymous follow the
//! shopper into their account.

use serde::Serialize;

use cartwheel_core::UserId;

/// Which owned collection a command applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Cart,
    Wishlist,
}

/// A single ownership change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum OwnershipCommand {
    /// Empty the collection and drop its owner.
    Clear { target: Target },
    /// Attribute the collection to a user.
    Assign { target: Target, user_id: UserId },
}

/// The inputs the reconciler observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnershipSnapshot<'a> {
    /// Logged-in user, or `None` when anonymous.
    pub current_user: Option<&'a UserId>,
    pub cart_owner: Option<&'a UserId>,
    pub wishlist_owner: Option<&'a UserId>,
}

impl OwnershipSnapshot<'_> {
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.current_user.is_some()
    }
}

/// Compute the commands that make ownership consistent with the session.
///
/// Cart commands always precede wishlist commands, and a `Clear` for a
/// target always precedes its `Assign`.
#[must_use]
pub fn reconcile(snapshot: &OwnershipSnapshot<'_>) -> Vec<OwnershipCommand> {
    let mut commands = Vec::new();
    reconcile_target(
        Target::Cart,
        snapshot.current_user,
        snapshot.cart_owner,
        &mut commands,
    );
    reconcile_target(
        Target::Wishlist,
        snapshot.current_user,
        snapshot.wishlist_owner,
        &mut commands,
    );
    commands
}

fn reconcile_target(
    target: Target,
    current_user: Option<&UserId>,
    owner: Option<&UserId>,
    commands: &mut Vec<OwnershipCommand>,
) {
    match (current_user, owner) {
        (Some(user), Some(owner)) if owner == user => {}
        (Some(user), Some(_)) => {
            commands.push(OwnershipCommand::Clear { target });
            commands.push(OwnershipCommand::Assign {
                target,
                user_id: user.clone(),
            });
        }
        (Some(user), None) => commands.push(OwnershipCommand::Assign {
            target,
            user_id: user.clone(),
        }),
        (None, Some(_)) => commands.push(OwnershipCommand::Clear { target }),
        (None, None) => {}
    }
}
