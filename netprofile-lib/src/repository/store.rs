use std::{collections::HashSet, io::ErrorKind, mem};

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::{
    Error, Result,
    repository::{
        entities::{Profile, ProfileId},
        storage::Storage,
    },
    validation::validate,
};

/// The authoritative, ordered list of profiles and the current selection.
///
/// Every mutation is written through to the [`Storage`] before it returns. If that
/// write fails the mutation is undone, so the in-memory list and the stored blob
/// never disagree.
#[derive(Debug)]
pub struct Store {
    profiles: Vec<Profile>,
    selected: Option<ProfileId>,
    storage: Box<dyn Storage>,
}

impl Store {
    /// Load the profiles kept in `storage`.
    ///
    /// Missing or unreadable contents give an empty store rather than an error.
    /// Profiles stored without an id, or with a duplicate one, are given fresh ids
    /// that are written back straight away so they stay the same on the next load.
    pub fn load(storage: impl Storage + 'static) -> Self {
        let mut storage: Box<dyn Storage> = Box::new(storage);

        let (profiles, assigned) = match storage.read() {
            Ok(Some(contents)) => match parse(contents.as_bytes()) {
                Ok((profiles, assigned)) => {
                    debug!("Loaded {} profiles", profiles.len());
                    (profiles, assigned)
                }
                Err(err) => {
                    warn!("Stored profiles are malformed, starting empty: {err}");
                    set_aside(storage.as_mut());
                    (Vec::new(), false)
                }
            },
            Ok(None) => (Vec::new(), false),
            Err(err) if err.kind() == ErrorKind::InvalidData => {
                warn!("Stored profiles are not valid UTF-8, starting empty: {err}");
                set_aside(storage.as_mut());
                (Vec::new(), false)
            }
            Err(err) => {
                warn!("Failed to read stored profiles, starting empty: {err}");
                (Vec::new(), false)
            }
        };

        let mut store = Self {
            profiles,
            selected: None,
            storage,
        };

        if assigned {
            match store.persist() {
                Ok(()) => info!("Saved ids assigned to stored profiles"),
                Err(err) => warn!("Failed to save ids assigned to stored profiles: {err}"),
            }
        }

        store
    }

    // Queries

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn get(&self, id: ProfileId) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    /// Position of the profile in insertion order.
    pub fn position(&self, id: ProfileId) -> Option<usize> {
        self.profiles.iter().position(|p| p.id == id)
    }

    /// Look a profile up by full id, exact name, or id prefix, in that order.
    pub fn find(&self, query: &str) -> Result<&Profile> {
        if let Ok(id) = query.parse::<ProfileId>() {
            return self.get(id).ok_or(Error::UnknownProfile(id));
        }

        let mut matches: Vec<&Profile> = self.profiles.iter().filter(|p| p.name == query).collect();
        if matches.is_empty() {
            matches = self
                .profiles
                .iter()
                .filter(|p| p.id.matches_prefix(query))
                .collect();
        }

        match matches.as_slice() {
            [profile] => Ok(*profile),
            [] => Err(Error::NoMatch(query.to_string())),
            _ => Err(Error::AmbiguousMatch(query.to_string())),
        }
    }

    // Selection

    pub fn selected_id(&self) -> Option<ProfileId> {
        self.selected
    }

    pub fn selected(&self) -> Option<&Profile> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn select(&mut self, id: ProfileId) -> Result<&Profile> {
        let position = self.position(id).ok_or(Error::UnknownProfile(id))?;
        self.selected = Some(id);

        self.profiles
            .get(position)
            .ok_or(Error::UnknownProfile(id))
    }

    /// Back to editing a new draft.
    pub fn deselect(&mut self) {
        self.selected = None;
    }

    // Mutations

    /// Commit `profile`.
    ///
    /// With no `selection` the profile is appended and becomes the selection.
    /// Otherwise the profile with that id is replaced in place and keeps its id.
    /// Returns the id of the stored profile.
    pub fn upsert(&mut self, selection: Option<ProfileId>, mut profile: Profile) -> Result<ProfileId> {
        let errors = validate(&profile);
        if !errors.is_empty() {
            return Err(Error::Invalid(errors));
        }

        let mut next = self.profiles.clone();

        match selection {
            None => {
                if self.position(profile.id).is_some() {
                    profile.id = ProfileId::new();
                }
                let id = profile.id;
                let name = profile.name.clone();

                next.push(profile);
                self.commit(next, Some(id))?;

                info!("Added profile: {name}");

                Ok(id)
            }
            Some(id) => {
                let slot = next
                    .iter_mut()
                    .find(|p| p.id == id)
                    .ok_or(Error::UnknownProfile(id))?;
                profile.id = id;
                *slot = profile;

                self.commit(next, Some(id))?;

                info!("Updated profile: {id}");

                Ok(id)
            }
        }
    }

    /// Remove the profile with `id`, clearing the selection if it pointed there.
    pub fn remove(&mut self, id: ProfileId) -> Result<Profile> {
        let position = self.position(id).ok_or(Error::UnknownProfile(id))?;

        let mut next = self.profiles.clone();
        let removed = next.remove(position);
        let selected = self.selected.filter(|selected| *selected != id);

        self.commit(next, selected)?;

        info!("Removed profile: {}", removed.name);

        Ok(removed)
    }

    /// Replace every profile at once, as an import does. Clears the selection.
    pub fn replace_all(&mut self, profiles: Vec<Profile>) -> Result<()> {
        let count = profiles.len();

        self.commit(with_unique_ids(profiles), None)?;

        info!("Replaced profiles with {count} imported ones");

        Ok(())
    }

    /// Write the current list to storage.
    pub fn persist(&mut self) -> Result<()> {
        let blob = serde_json::to_string(&self.profiles)?;
        self.storage.write(&blob)?;

        debug!("Persisted {} profiles", self.profiles.len());

        Ok(())
    }

    /// Human readable JSON of every profile, as written by an export.
    pub fn serialize(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.profiles)?)
    }

    fn commit(&mut self, profiles: Vec<Profile>, selected: Option<ProfileId>) -> Result<()> {
        let previous_profiles = mem::replace(&mut self.profiles, profiles);
        let previous_selected = mem::replace(&mut self.selected, selected);

        if let Err(err) = self.persist() {
            warn!("Failed to persist profiles, rolling back: {err}");
            self.profiles = previous_profiles;
            self.selected = previous_selected;
            return Err(err);
        }

        Ok(())
    }
}

/// Parse profiles written by [`Store::serialize`] or an older export.
///
/// Anything other than a JSON array of objects is rejected, including bytes that
/// are not UTF-8.
pub fn deserialize(data: impl AsRef<[u8]>) -> Result<Vec<Profile>> {
    objects(data.as_ref())?.into_iter().map(to_profile).collect()
}

/// Like [`deserialize`], but also reports whether any profile had no id or a
/// duplicate one and was given a fresh id.
fn parse(data: &[u8]) -> Result<(Vec<Profile>, bool)> {
    let objects = objects(data)?;
    let missing = objects.iter().any(|object| !object.contains_key("id"));

    let profiles = objects
        .into_iter()
        .map(to_profile)
        .collect::<Result<Vec<_>>>()?;
    let unique: HashSet<ProfileId> = profiles.iter().map(|p| p.id).collect();
    let duplicated = unique.len() != profiles.len();

    Ok((with_unique_ids(profiles), missing || duplicated))
}

fn objects(data: &[u8]) -> Result<Vec<Map<String, Value>>> {
    Ok(serde_json::from_slice(data)?)
}

fn to_profile(object: Map<String, Value>) -> Result<Profile> {
    serde_json::from_value::<Profile>(Value::Object(object)).map_err(Error::from)
}

/// Give a fresh id to any profile whose id was already seen earlier in the list.
fn with_unique_ids(mut profiles: Vec<Profile>) -> Vec<Profile> {
    let mut seen = HashSet::new();

    for profile in &mut profiles {
        if !seen.insert(profile.id) {
            debug!("Reassigning duplicate profile id {}", profile.id);
            profile.id = ProfileId::new();
            seen.insert(profile.id);
        }
    }

    profiles
}

fn set_aside(storage: &mut dyn Storage) {
    if let Err(err) = storage.quarantine() {
        warn!("Failed to set aside malformed profiles: {err}");
    }
}
