//! Well-known role name constants and privilege ranking.
//!
//! These must match the seed data in `20260301000002_create_roles_table.sql`.
//! Roles are strictly ordered: every role can do everything the roles below
//! it can.

/// Regular employee: own time entries, assigned tasks, form submission.
pub const ROLE_BRUKER: &str = "bruker";
/// Project lead: manages projects and tasks, sees all time entries.
pub const ROLE_PROSJEKTLEDER: &str = "prosjektleder";
/// Manager: deletes projects, processes forms, manages stock and chemicals.
pub const ROLE_LEDER: &str = "leder";
/// Company administrator: user and company management.
pub const ROLE_ADMIN: &str = "admin";
/// Platform support staff: cross-tenant company management.
pub const ROLE_SUPPORT: &str = "support";

/// All roles, lowest privilege first.
pub const ALL_ROLES: &[&str] = &[
    ROLE_BRUKER,
    ROLE_PROSJEKTLEDER,
    ROLE_LEDER,
    ROLE_ADMIN,
    ROLE_SUPPORT,
];

/// Privilege rank of a role name. Unknown roles rank 0 and pass no check.
pub fn role_rank(role: &str) -> u8 {
    match role {
        ROLE_BRUKER => 1,
        ROLE_PROSJEKTLEDER => 2,
        ROLE_LEDER => 3,
        ROLE_ADMIN => 4,
        ROLE_SUPPORT => 5,
        _ => 0,
    }
}

/// Whether `role` has at least the privileges of `required`.
pub fn has_role_at_least(role: &str, required: &str) -> bool {
    let rank = role_rank(role);
    rank > 0 && rank >= role_rank(required)
}

/// Whether `role` is a known role name.
pub fn is_valid_role(role: &str) -> bool {
    ALL_ROLES.contains(&role)
}

/// Whether an actor with `actor_role` may assign `target_role` to a user.
///
/// Company admins may hand out any role up to `admin`; only support staff
/// may create other support users.
pub fn can_assign_role(actor_role: &str, target_role: &str) -> bool {
    is_valid_role(target_role)
        && has_role_at_least(actor_role, ROLE_ADMIN)
        && (target_role != ROLE_SUPPORT || actor_role == ROLE_SUPPORT)
}
