//! profile/registry.rs
//! Register-once table of profiles.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use crate::choice::RegistrationError;
use crate::profile::types::{Profile, ProfileId};

#[derive(Default, Debug)]
pub struct ProfileRegistry {
    profiles: RwLock<HashMap<ProfileId, Arc<Profile>>>,
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `profile`. An id that is already present is an error and the
    /// first registration stays in place.
    pub(crate) fn register(&self, profile: Profile) -> Result<(), RegistrationError> {
        let mut profiles = self.profiles.write().unwrap_or_else(PoisonError::into_inner);
        if profiles.contains_key(profile.id()) {
            return Err(RegistrationError::DuplicateProfile { id: profile.id().to_string() });
        }
        info!(profile = %profile.id(), points = profile.extensions().len(), "registered profile");
        profiles.insert(profile.id().clone(), Arc::new(profile));
        Ok(())
    }

    pub fn get(&self, id: &ProfileId) -> Option<Arc<Profile>> {
        let profiles = self.profiles.read().unwrap_or_else(PoisonError::into_inner);
        profiles.get(id).cloned()
    }

    pub fn contains(&self, id: &ProfileId) -> bool {
        let profiles = self.profiles.read().unwrap_or_else(PoisonError::into_inner);
        profiles.contains_key(id)
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<ProfileId> {
        let profiles = self.profiles.read().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<_> = profiles.keys().cloned().collect();
        ids.sort();
        ids
    }
}
