// Read-only game content consulted by the room state machines

// Public API - what other modules can use
pub use keywords::{categories, guess_matches, random_keyword, SecretKeyword};
pub use roles::{
    default_role_distribution, roles_by_team, NightActionKind, Role, RoleDistribution, RoleInfo,
    Team,
};

// Internal modules
mod keywords;
mod roles;
