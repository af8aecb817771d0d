//! Footnotes and the id → footnote registry.
//!
//! Footnotes live in an arena owned by [`FootnoteRegistry`] and are addressed
//! by [`FootnoteId`]. A footnote may proxy to another one when several ids end
//! up naming the same note; content queries always go through
//! [`FootnoteRegistry::resolve`].

use std::collections::HashMap;

use crate::model::Line;

/// Stable index of a footnote inside its registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FootnoteId(usize);

impl FootnoteId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct Footnote {
    name: String,
    actual: bool,
    proxy: Option<FootnoteId>,
    lines: Vec<Line>,
}

impl Footnote {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// The id this footnote was first created under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True once the footnote has been entered to receive content.
    pub fn is_actual(&self) -> bool {
        self.actual
    }

    pub fn proxy_target(&self) -> Option<FootnoteId> {
        self.proxy
    }

    /// Lines stored on this record itself, ignoring any proxy.
    pub fn own_lines(&self) -> &[Line] {
        &self.lines
    }

    fn clear(&mut self) {
        self.lines.clear();
    }
}

#[derive(Debug, Default)]
pub struct FootnoteRegistry {
    notes: Vec<Footnote>,
    by_name: HashMap<String, FootnoteId>,
}

impl FootnoteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn clear(&mut self) {
        self.notes.clear();
        self.by_name.clear();
    }

    pub fn lookup(&self, name: &str) -> Option<FootnoteId> {
        self.by_name.get(name).copied()
    }

    /// # Panics
    ///
    /// If `id` was not handed out by this registry, or the registry was
    /// cleared since. The same holds for every method taking a [`FootnoteId`].
    pub fn get(&self, id: FootnoteId) -> &Footnote {
        &self.notes[id.0]
    }

    /// Like [`get`](Self::get), but `None` for an id this registry does not
    /// hold.
    pub fn try_get(&self, id: FootnoteId) -> Option<&Footnote> {
        self.notes.get(id.0)
    }

    fn create(&mut self, name: &str) -> FootnoteId {
        let id = FootnoteId(self.notes.len());
        self.notes.push(Footnote::new(name));
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Find or create the footnote indexed under `name`.
    ///
    /// With `want_actual`, an already actual footnote is a duplicate id: its
    /// lines are dropped so the newest occurrence wins.
    pub fn get_or_create(&mut self, name: &str, want_actual: bool) -> FootnoteId {
        let Some(id) = self.lookup(name) else {
            let id = self.create(name);
            self.notes[id.0].actual = want_actual;
            return id;
        };
        if want_actual {
            let note = &mut self.notes[id.0];
            if note.actual {
                log::warn!("Duplicate footnote id {name:?}: replacing earlier content");
                note.clear();
            }
            note.actual = true;
        }
        id
    }

    /// Enter a footnote known under several ids at once.
    ///
    /// The first already indexed id supplies the returned footnote (created
    /// under the first id if none is indexed). The other ids are then bound to
    /// it, except that content already captured under an actual footnote is
    /// never overwritten; non-actual footnotes become proxies.
    pub fn get_or_create_many(&mut self, names: &[&str]) -> Option<FootnoteId> {
        match names {
            [] => None,
            [name] => Some(self.get_or_create(name, true)),
            _ => {
                let found = names.iter().find_map(|name| self.lookup(name));
                let target = match found {
                    Some(id) => {
                        let note = &mut self.notes[id.0];
                        if note.actual {
                            log::warn!(
                                "Duplicate footnote id {:?}: replacing earlier content",
                                note.name
                            );
                            note.clear();
                        }
                        note.actual = true;
                        id
                    }
                    None => {
                        let id = self.create(names[0]);
                        self.notes[id.0].actual = true;
                        id
                    }
                };

                for name in names {
                    match self.lookup(name) {
                        None => {
                            self.by_name.insert(name.to_string(), target);
                        }
                        Some(id) if id == target => {}
                        Some(id) if self.notes[id.0].actual => {
                            log::debug!("Footnote id {name:?} already has content, not aliasing");
                        }
                        Some(id) => {
                            self.notes[id.0].proxy = Some(target);
                        }
                    }
                }
                Some(target)
            }
        }
    }

    /// Follow proxy links to the footnote that owns the content.
    pub fn resolve(&self, id: FootnoteId) -> FootnoteId {
        let mut current = id;
        // A chain longer than the arena can only be a cycle.
        for _ in 0..self.notes.len() {
            match self.notes[current.0].proxy {
                Some(next) if next != current => current = next,
                _ => return current,
            }
        }
        log::warn!("Footnote proxy cycle starting at {:?}", self.notes[id.0].name);
        current
    }

    pub fn is_actual(&self, id: FootnoteId) -> bool {
        self.notes[self.resolve(id).0].actual
    }

    /// Content lines of `id`, seen through its proxy target.
    pub fn lines(&self, id: FootnoteId) -> &[Line] {
        &self.notes[self.resolve(id).0].lines
    }

    pub(crate) fn push_line(&mut self, id: FootnoteId, line: Line) {
        let target = self.resolve(id);
        self.notes[target.0].lines.push(line);
    }
}
