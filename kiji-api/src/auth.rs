use std::ops::BitOr;

use uuid::Uuid;

use crate::{Error, STUB_UUID};

#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
pub struct NewSession {
    pub user: String,
    pub password: String,
    pub device: String,
}

impl NewSession {
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_string(&self.user)?;
        crate::validate_string(&self.password)?;
        crate::validate_string(&self.device)?;
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct AuthToken(pub Uuid);

impl AuthToken {
    pub fn stub() -> AuthToken {
        AuthToken(STUB_UUID)
    }
}

/// The roles a user holds. `user` is implied for every account; the other
/// three are the escalating staff roles.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct RoleSet {
    pub user: bool,
    pub admin: bool,
    pub manager: bool,
    pub system_admin: bool,
}

impl RoleSet {
    pub fn plain_user() -> RoleSet {
        RoleSet {
            user: true,
            admin: false,
            manager: false,
            system_admin: false,
        }
    }

    pub fn none() -> RoleSet {
        Self::all_or_nothing(false)
    }

    pub fn all() -> RoleSet {
        Self::all_or_nothing(true)
    }

    pub fn all_or_nothing(all: bool) -> RoleSet {
        RoleSet {
            user: all,
            admin: all,
            manager: all,
            system_admin: all,
        }
    }

    /// Any role that can moderate content or touch other accounts
    pub fn is_staff(&self) -> bool {
        self.admin || self.manager || self.system_admin
    }
}

impl BitOr for RoleSet {
    type Output = Self;

    fn bitor(self, rhs: RoleSet) -> RoleSet {
        RoleSet {
            user: self.user || rhs.user,
            admin: self.admin || rhs.admin,
            manager: self.manager || rhs.manager,
            system_admin: self.system_admin || rhs.system_admin,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum AdminAction {
    List,
    Create,
    Update,
    Delete,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TargetUser {
    pub is_self: bool,
    pub roles: RoleSet,
}

/// The account-administration escalation matrix, as one pure decision
/// function: can `actor` apply `action` to `target`, leaving the target (or
/// created user) with `requested` roles?
///
/// - non-staff actors are always denied;
/// - system admins are always allowed;
/// - admins may list, and may update themselves as long as the requested
///   roles do not add manager or system-admin;
/// - managers may list, create plain users, update themselves (not into
///   admin or system-admin) or plain-user targets (not into any staff
///   role), and delete plain-user targets other than themselves.
pub fn admin_action_allowed(
    actor: RoleSet,
    action: AdminAction,
    target: Option<TargetUser>,
    requested: RoleSet,
) -> bool {
    if !actor.is_staff() {
        return false;
    }
    if actor.system_admin {
        return true;
    }
    let target_is_self = target.map(|t| t.is_self).unwrap_or(false);
    let target_is_staff = target.map(|t| t.roles.is_staff()).unwrap_or(false);
    if actor.admin {
        return match action {
            AdminAction::List => true,
            AdminAction::Update if target_is_self => {
                !requested.manager && !requested.system_admin
            }
            _ => false,
        };
    }
    match action {
        AdminAction::List => true,
        AdminAction::Create => !requested.is_staff(),
        AdminAction::Update => match target_is_self {
            true => !requested.admin && !requested.system_admin,
            false => !target_is_staff && !requested.is_staff(),
        },
        AdminAction::Delete => !target_is_self && !target_is_staff,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> RoleSet {
        RoleSet {
            admin: true,
            ..RoleSet::plain_user()
        }
    }

    fn manager() -> RoleSet {
        RoleSet {
            manager: true,
            ..RoleSet::plain_user()
        }
    }

    fn system_admin() -> RoleSet {
        RoleSet {
            system_admin: true,
            ..RoleSet::plain_user()
        }
    }

    fn target(is_self: bool, roles: RoleSet) -> Option<TargetUser> {
        Some(TargetUser { is_self, roles })
    }

    const ALL_ACTIONS: [AdminAction; 4] = [
        AdminAction::List,
        AdminAction::Create,
        AdminAction::Update,
        AdminAction::Delete,
    ];

    #[test]
    fn plain_users_are_always_denied() {
        for action in ALL_ACTIONS {
            assert!(!admin_action_allowed(
                RoleSet::plain_user(),
                action,
                target(true, RoleSet::plain_user()),
                RoleSet::plain_user(),
            ));
            assert!(!admin_action_allowed(
                RoleSet::none(),
                action,
                None,
                RoleSet::plain_user(),
            ));
        }
    }

    #[test]
    fn system_admins_are_always_allowed() {
        for action in ALL_ACTIONS {
            assert!(admin_action_allowed(
                system_admin(),
                action,
                target(false, system_admin()),
                RoleSet::all(),
            ));
        }
    }

    #[test]
    fn admins_may_only_list_and_edit_themselves() {
        assert!(admin_action_allowed(
            admin(),
            AdminAction::List,
            None,
            RoleSet::none()
        ));
        // self-update keeping (or dropping) the admin role is fine
        assert!(admin_action_allowed(
            admin(),
            AdminAction::Update,
            target(true, admin()),
            admin(),
        ));
        assert!(admin_action_allowed(
            admin(),
            AdminAction::Update,
            target(true, admin()),
            RoleSet::plain_user(),
        ));
        // self-escalation to manager or system-admin is not
        assert!(!admin_action_allowed(
            admin(),
            AdminAction::Update,
            target(true, admin()),
            manager(),
        ));
        assert!(!admin_action_allowed(
            admin(),
            AdminAction::Update,
            target(true, admin()),
            system_admin(),
        ));
        assert!(!admin_action_allowed(
            admin(),
            AdminAction::Create,
            None,
            RoleSet::plain_user(),
        ));
        assert!(!admin_action_allowed(
            admin(),
            AdminAction::Update,
            target(false, RoleSet::plain_user()),
            RoleSet::plain_user(),
        ));
        assert!(!admin_action_allowed(
            admin(),
            AdminAction::Delete,
            target(false, RoleSet::plain_user()),
            RoleSet::plain_user(),
        ));
    }

    #[test]
    fn managers_may_manage_plain_users_only() {
        assert!(admin_action_allowed(
            manager(),
            AdminAction::List,
            None,
            RoleSet::none()
        ));
        assert!(admin_action_allowed(
            manager(),
            AdminAction::Create,
            None,
            RoleSet::plain_user(),
        ));
        for requested in [admin(), manager(), system_admin()] {
            assert!(!admin_action_allowed(
                manager(),
                AdminAction::Create,
                None,
                requested
            ));
        }
        assert!(admin_action_allowed(
            manager(),
            AdminAction::Update,
            target(false, RoleSet::plain_user()),
            RoleSet::plain_user(),
        ));
        assert!(!admin_action_allowed(
            manager(),
            AdminAction::Update,
            target(false, RoleSet::plain_user()),
            admin(),
        ));
        assert!(!admin_action_allowed(
            manager(),
            AdminAction::Update,
            target(false, admin()),
            RoleSet::plain_user(),
        ));
        // self-update may keep manager but not reach admin or system-admin
        assert!(admin_action_allowed(
            manager(),
            AdminAction::Update,
            target(true, manager()),
            manager(),
        ));
        assert!(!admin_action_allowed(
            manager(),
            AdminAction::Update,
            target(true, manager()),
            admin(),
        ));
        assert!(admin_action_allowed(
            manager(),
            AdminAction::Delete,
            target(false, RoleSet::plain_user()),
            RoleSet::none(),
        ));
        assert!(!admin_action_allowed(
            manager(),
            AdminAction::Delete,
            target(true, manager()),
            RoleSet::none(),
        ));
        for staff in [admin(), manager(), system_admin()] {
            assert!(!admin_action_allowed(
                manager(),
                AdminAction::Delete,
                target(false, staff),
                RoleSet::none(),
            ));
        }
    }

    #[test]
    fn role_sets_merge_with_bitor() {
        let merged = admin() | manager();
        assert!(merged.user && merged.admin && merged.manager && !merged.system_admin);
    }
}
