use std::collections::BTreeSet;
use std::collections::HashSet;
use std::hash::Hash;

/// Set of selected ids with deterministic iteration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<Id: Ord> {
    ids: BTreeSet<Id>,
}

impl<Id: Ord> Default for Selection<Id> {
    fn default() -> Self {
        Self {
            ids: BTreeSet::new(),
        }
    }
}

impl<Id: Ord + Clone + Hash> Selection<Id> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips membership of `id`; returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: Id) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn select(&mut self, id: Id) {
        self.ids.insert(id);
    }

    pub fn select_all<I: IntoIterator<Item = Id>>(&mut self, ids: I) {
        self.ids.extend(ids);
    }

    pub fn deselect_all<'a, I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = &'a Id>,
        Id: 'a,
    {
        for id in ids {
            self.ids.remove(id);
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drops every selected id that is not in `loaded`.
    pub fn retain_loaded<'a, I>(&mut self, loaded: I)
    where
        I: IntoIterator<Item = &'a Id>,
        Id: 'a,
    {
        let loaded: HashSet<&Id> = loaded.into_iter().collect();
        self.ids.retain(|id| loaded.contains(id));
    }

    pub fn contains(&self, id: &Id) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> Vec<Id> {
        self.ids.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Id> {
        self.ids.iter()
    }
}
