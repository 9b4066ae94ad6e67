use alloc::string::String;
use alloc::vec::Vec;

use bean_utils::hash::HashMap;

use crate::info::BeanRef;
use crate::metadata::PropertyDescriptor;

/// The discovered properties of one bean type.
///
/// Lookup is by name; iteration is in name order, so callers that hash,
/// compare or serialize get a deterministic sequence.
#[derive(Debug)]
pub struct TypeMetadata {
    owner: BeanRef,
    properties: Vec<PropertyDescriptor>,
    index: HashMap<String, usize>,
}

impl TypeMetadata {
    pub(crate) fn new(owner: BeanRef, mut properties: Vec<PropertyDescriptor>) -> Self {
        properties.sort_by(|a, b| a.name.cmp(&b.name));
        let index = properties
            .iter()
            .enumerate()
            .map(|(at, p)| (p.name.clone(), at))
            .collect();
        Self {
            owner,
            properties,
            index,
        }
    }

    #[inline]
    pub fn owner(&self) -> BeanRef {
        self.owner
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.index.get(name).map(|&at| &self.properties[at])
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Descriptors sorted by name.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &PropertyDescriptor> {
        self.properties.iter()
    }

    /// Property names sorted.
    #[inline]
    pub fn names(&self) -> impl ExactSizeIterator<Item = &str> {
        self.properties.iter().map(|p| p.name.as_str())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl PartialEq for TypeMetadata {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner && self.properties == other.properties
    }
}

impl<'a> IntoIterator for &'a TypeMetadata {
    type Item = &'a PropertyDescriptor;
    type IntoIter = core::slice::Iter<'a, PropertyDescriptor>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.properties.iter()
    }
}
