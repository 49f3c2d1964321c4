use crate::db::sqlite::IdentityStorage;
use crate::error::BackendError;
use crate::identity::password::hash_password;
use tracing::info;

pub const SEED_PASSWORD: &str = "Passw0rd!";

pub const SEED_ROLES: &[&str] = &["Administrator", "Manager", "User"];

pub struct SeedUser {
    pub email: &'static str,
    pub roles: &'static [&'static str],
}

pub const SEED_USERS: &[SeedUser] = &[
    SeedUser {
        email: "leela@contoso.com",
        roles: &["Administrator", "Manager"],
    },
    SeedUser {
        email: "harry@contoso.com",
        roles: &["User"],
    },
];

/// Development data for the identity store. Roles and users that already
/// exist are left untouched. Returns the number of users created.
pub async fn initialize(storage: &IdentityStorage) -> Result<usize, BackendError> {
    for role in SEED_ROLES {
        storage.ensure_role(role).await?;
    }

    let mut created = 0;
    for seed in SEED_USERS {
        if storage.find_user_by_email(seed.email).await?.is_some() {
            continue;
        }
        let user = storage
            .create_user(seed.email, hash_password(SEED_PASSWORD)?, true)
            .await?;
        for role in seed.roles {
            storage.add_to_role(&user.id, role).await?;
        }
        created += 1;
    }

    info!(created, "identity seed data initialized");
    Ok(created)
}
