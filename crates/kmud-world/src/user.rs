//! User accounts.

use kmud_db::{Database, DbError, Document, Filter, fields};
use kmud_types::{ColorMode, EntityKind};
use serde::{Deserialize, Serialize};

use crate::handle::entity_handle;

/// Stored fields of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    /// Login name, stored as given.
    pub name: String,
    /// Terminal color preference.
    #[serde(default)]
    pub color_mode: ColorMode,
}

impl Document for UserData {
    const KIND: EntityKind = EntityKind::User;
}

entity_handle! {
    /// A live user.
    User => UserData
}

impl User {
    /// Create a user with no color preference.
    pub async fn create(db: &Database, name: &str) -> Self {
        Self::insert(
            db,
            UserData {
                name: name.to_owned(),
                color_mode: ColorMode::default(),
            },
        )
        .await
    }

    /// Whether the store already holds a user called `name`.
    ///
    /// Asks the store directly, so a user created moments ago may not be
    /// counted until the committer has written it.
    pub async fn name_taken(db: &Database, name: &str) -> Result<bool, DbError> {
        let count = db
            .count(EntityKind::User, &Filter::eq(fields::NAME, name))
            .await?;
        Ok(count > 0)
    }

    /// Login name.
    pub async fn name(&self) -> String {
        self.read(|u| u.name.clone()).await
    }

    /// Change the login name.
    pub async fn set_name(&self, name: &str) -> bool {
        self.set(|u| &mut u.name, name.to_owned()).await
    }

    /// Terminal color preference.
    pub async fn color_mode(&self) -> ColorMode {
        self.read(|u| u.color_mode).await
    }

    /// Change the terminal color preference.
    pub async fn set_color_mode(&self, color_mode: ColorMode) -> bool {
        self.set(|u| &mut u.color_mode, color_mode).await
    }
}
