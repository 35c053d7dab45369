//! Text → color mapping.
//!
//! Keys play two roles: every key text becomes its own fragment during segmentation, and
//! after construction the parts matching a key are painted with its color.

use ecow::EcoString;

use crate::scene::Rgba;

/// Either one text or several texts sharing a color.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColorMapKey {
    Single(EcoString),
    Group(Vec<EcoString>),
}

impl ColorMapKey {
    pub fn group<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<EcoString>,
    {
        Self::Group(texts.into_iter().map(Into::into).collect())
    }

    /// The texts this key matches, in order.
    pub fn texts(&self) -> &[EcoString] {
        match self {
            Self::Single(text) => std::slice::from_ref(text),
            Self::Group(texts) => texts,
        }
    }
}

impl From<&str> for ColorMapKey {
    fn from(text: &str) -> Self {
        Self::Single(text.into())
    }
}

impl From<String> for ColorMapKey {
    fn from(text: String) -> Self {
        Self::Single(text.into())
    }
}

impl From<EcoString> for ColorMapKey {
    fn from(text: EcoString) -> Self {
        Self::Single(text)
    }
}

impl<const N: usize> From<[&str; N]> for ColorMapKey {
    fn from(texts: [&str; N]) -> Self {
        Self::group(texts)
    }
}

/// Ordered list of `(key, color)` entries; later entries win where matches overlap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorMap {
    entries: Vec<(ColorMapKey, Rgba)>,
}

impl ColorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<ColorMapKey>, color: Rgba) -> Self {
        self.insert(key, color);
        self
    }

    pub fn with_group<I, S>(self, texts: I, color: Rgba) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<EcoString>,
    {
        self.with(ColorMapKey::group(texts), color)
    }

    pub fn insert(&mut self, key: impl Into<ColorMapKey>, color: Rgba) {
        self.entries.push((key.into(), color));
    }

    pub fn iter(&self) -> impl Iterator<Item = &(ColorMapKey, Rgba)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every non-empty key text, group members flattened, in entry order.
    pub fn split_keys(&self) -> Vec<EcoString> {
        self.entries
            .iter()
            .flat_map(|(key, _)| key.texts().iter().cloned())
            .filter(|text| !text.is_empty())
            .collect()
    }
}

impl<K: Into<ColorMapKey>> FromIterator<(K, Rgba)> for ColorMap {
    fn from_iter<T: IntoIterator<Item = (K, Rgba)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, c)| (k.into(), c)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_keys_flatten_groups_and_skip_empty() {
        let map = ColorMap::new()
            .with("x", Rgba::RED)
            .with_group(["a", "", "b"], Rgba::BLUE)
            .with("", Rgba::GREEN);

        assert_eq!(map.split_keys(), vec![EcoString::from("x"), "a".into(), "b".into()]);
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn keys_from_arrays_are_groups() {
        let key = ColorMapKey::from(["alpha", "beta"]);
        assert_eq!(key.texts().len(), 2);
        assert!(matches!(key, ColorMapKey::Group(_)));
        assert!(matches!(ColorMapKey::from("alpha"), ColorMapKey::Single(_)));
    }

    #[test]
    fn collects_from_pairs() {
        let map: ColorMap = [("a", Rgba::RED), ("b", Rgba::BLUE)].into_iter().collect();
        assert_eq!(map.iter().map(|(_, c)| *c).collect::<Vec<_>>(), vec![Rgba::RED, Rgba::BLUE]);
    }
}
