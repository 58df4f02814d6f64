//! Initial data for a fresh data directory.

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::{JsonStore, User, UserRole};
use crate::config::SeedConfig;
use crate::crypto::hash_password;

/// Write the configured admin and regular accounts into an empty users
/// store. Returns how many users were created; a store that already holds
/// any user is left alone.
pub async fn seed_default_users(store: &JsonStore<User>, seed: &SeedConfig) -> Result<usize> {
    let mut writer = store.write().await?;
    if !writer.records().is_empty() {
        return Ok(0);
    }

    info!("Seeding default user accounts...");

    let accounts = [
        (&seed.admin_name, &seed.admin_email, &seed.admin_password, UserRole::Admin),
        (&seed.user_name, &seed.user_email, &seed.user_password, UserRole::User),
    ];

    let now = Utc::now();
    for (name, email, password, role) in accounts {
        let password = hash_password(password)
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("Failed to hash seed password for {}", email))?;
        writer.push(User {
            id: Uuid::new_v4().to_string(),
            name: name.clone(),
            email: email.clone(),
            password,
            role,
            created_at: now,
            updated_at: now,
        });
        info!(email = %email, role = %role, "Seeded user");
    }

    let count = writer.records().len();
    writer.commit().await?;
    Ok(count)
}
