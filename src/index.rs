//! Global, name-ordered index of class aggregates across a suite.

use std::collections::BTreeMap;

use crate::model::ClassStat;

#[derive(Debug, Default)]
pub struct ClassIndex {
    classes: BTreeMap<String, ClassStat>,
}

impl ClassIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a class; a later entry with the same qualified name replaces
    /// the earlier one.
    pub fn insert(&mut self, class: ClassStat) {
        self.classes.insert(class.qualified_name.clone(), class);
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Classes in ascending byte order of their qualified names.
    #[must_use]
    pub fn into_sorted(self) -> Vec<ClassStat> {
        self.classes.into_values().collect()
    }
}

impl FromIterator<ClassStat> for ClassIndex {
    fn from_iter<I: IntoIterator<Item = ClassStat>>(iter: I) -> Self {
        let mut index = ClassIndex::new();
        for class in iter {
            index.insert(class);
        }
        index
    }
}
