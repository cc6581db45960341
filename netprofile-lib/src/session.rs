//! The editor a front end drives.
//!
//! A [`Session`] owns the draft being edited and its live validation errors. The
//! draft only reaches the [`Store`] through [`Session::save`].

use crate::{
    Error, Result,
    repository::{Profile, ProfileId, Store},
    validation::{ValidationErrors, validate},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing selected, the draft is untouched
    #[default]
    Idle,
    /// Editing a draft that isn't stored yet
    EditingNew,
    /// The draft matches the stored profile
    Committed(ProfileId),
    /// Editing a stored profile
    EditingExisting(ProfileId),
}

impl SessionState {
    /// The stored profile the draft belongs to, if any.
    pub fn target(&self) -> Option<ProfileId> {
        match self {
            Self::Committed(id) | Self::EditingExisting(id) => Some(*id),
            Self::Idle | Self::EditingNew => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
    draft: Profile,
    errors: ValidationErrors,
}

impl Session {
    pub fn new() -> Self {
        let draft = Profile::default();

        Self {
            state: SessionState::Idle,
            errors: validate(&draft),
            draft,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn draft(&self) -> &Profile {
        &self.draft
    }

    /// Errors for the current draft, recomputed after every edit.
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn can_save(&self) -> bool {
        self.errors.is_empty()
    }

    /// Change the draft.
    pub fn edit(&mut self, f: impl FnOnce(&mut Profile)) {
        f(&mut self.draft);
        self.errors = validate(&self.draft);

        self.state = match self.state {
            SessionState::Idle => SessionState::EditingNew,
            SessionState::Committed(id) => SessionState::EditingExisting(id),
            state => state,
        };
    }

    /// Start editing the stored profile with `id`.
    pub fn select(&mut self, store: &mut Store, id: ProfileId) -> Result<()> {
        let profile = store.select(id)?.clone();

        self.load(profile);
        self.state = SessionState::EditingExisting(id);

        Ok(())
    }

    /// Commit the draft, adding it or updating the profile it was loaded from.
    pub fn save(&mut self, store: &mut Store) -> Result<ProfileId> {
        if !self.can_save() {
            return Err(Error::Invalid(self.errors.clone()));
        }

        let id = store.upsert(self.state.target(), self.draft.clone())?;
        if let Some(profile) = store.get(id) {
            self.load(profile.clone());
        }
        self.state = SessionState::Committed(id);

        Ok(id)
    }

    /// Remove the profile the draft was loaded from.
    pub fn delete(&mut self, store: &mut Store) -> Result<Profile> {
        let id = self.state.target().ok_or(Error::NothingSelected)?;

        let removed = store.remove(id)?;
        self.reset(store);

        Ok(removed)
    }

    /// Drop the selection and start over with an empty draft.
    pub fn reset(&mut self, store: &mut Store) {
        store.deselect();
        self.load(Profile::default());
        self.state = SessionState::Idle;
    }

    fn load(&mut self, profile: Profile) {
        self.errors = validate(&profile);
        self.draft = profile;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
