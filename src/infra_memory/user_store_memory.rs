use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;

/// Development user store. Identities are unique; records live as long as the process.
pub struct MemoryUserStore {
    by_identity: DashMap<String, UserId>,
    records: DashMap<UserId, (UserRecord, String)>,
    clock: Arc<dyn Clock>,
}

impl MemoryUserStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            by_identity: DashMap::new(),
            records: DashMap::new(),
            clock,
        }
    }

    /// Flip the active flag on an existing user. Returns false if the id is unknown.
    pub fn set_active(&self, user_id: UserId, is_active: bool) -> bool {
        match self.records.get_mut(&user_id) {
            Some(mut entry) => {
                entry.0.is_active = is_active;
                true
            }
            None => false,
        }
    }
}

#[async_trait::async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_identity(
        &self,
        identity: &str,
    ) -> Result<Option<StoredCredential>, AuthError> {
        let Some(user_id) = self.by_identity.get(identity).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self.records.get(&user_id).map(|entry| {
            let (record, password_hash) = entry.value();
            StoredCredential {
                user_id: record.user_id,
                identity: record.identity.clone(),
                password_hash: password_hash.clone(),
                is_active: record.is_active,
            }
        }))
    }

    async fn create(&self, new_user: NewUser) -> Result<UserId, AuthError> {
        let user_id = UserId::new_v4();
        match self.by_identity.entry(new_user.identity.clone()) {
            Entry::Occupied(_) => Err(AuthError::DuplicateIdentity),
            Entry::Vacant(slot) => {
                let record = UserRecord {
                    user_id,
                    identity: new_user.identity,
                    display_name: new_user.display_name,
                    is_active: true,
                    created_at: self.clock.now(),
                };
                // Record first, so a concurrent lookup never sees a dangling id.
                self.records.insert(user_id, (record, new_user.password_hash));
                slot.insert(user_id);
                Ok(user_id)
            }
        }
    }

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<UserRecord>, AuthError> {
        Ok(self.records.get(&user_id).map(|entry| entry.0.clone()))
    }
}
