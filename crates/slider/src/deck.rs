use std::path::{Path, PathBuf};

use renderer::{LoadFailure, TextureHandle, TextureLoader, TextureSet};
use slideconfig::{DeckConfig, SlideConfig};

/// A slide as presented to the viewer. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Slide {
    pub id: String,
    pub title: String,
    pub media: PathBuf,
    pub description: String,
    pub author: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
}

impl Slide {
    pub fn from_config(config: &SlideConfig, media: PathBuf) -> Self {
        Self {
            id: config.id.clone(),
            title: config.title.clone(),
            media,
            description: config.description.clone(),
            author: config.metadata.author.clone(),
            category: config.metadata.category.clone(),
            tags: config.metadata.tags.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeckEntry {
    pub slide: Slide,
    pub texture: TextureHandle,
}

/// Slides whose media decoded, in configuration order.
#[derive(Debug, Clone, Default)]
pub struct Deck {
    entries: Vec<DeckEntry>,
}

impl Deck {
    pub fn new(entries: Vec<DeckEntry>) -> Self {
        Self { entries }
    }

    /// Loads every slide's media relative to `base`. Slides that fail to load
    /// are left out of the deck and reported in the returned failures.
    pub fn load<L>(config: &DeckConfig, base: &Path, loader: &L) -> (Deck, Vec<LoadFailure>)
    where
        L: TextureLoader + ?Sized,
    {
        let slides: Vec<Slide> = config
            .slides
            .iter()
            .zip(config.media_paths(base))
            .map(|(slide, media)| Slide::from_config(slide, media))
            .collect();

        let set = TextureSet::load_all(
            slides.iter().map(|slide| (slide.id.as_str(), slide.media.as_path())),
            loader,
        );
        let failures = set.failures().to_vec();

        let entries = set
            .into_loaded()
            .into_iter()
            .filter_map(|loaded| {
                slides
                    .iter()
                    .find(|slide| slide.id == loaded.slide_id)
                    .map(|slide| DeckEntry {
                        slide: slide.clone(),
                        texture: loaded.texture,
                    })
            })
            .collect();

        (Deck { entries }, failures)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&DeckEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeckEntry> {
        self.entries.iter()
    }

    pub fn texture(&self, index: usize) -> Option<&TextureHandle> {
        self.entries.get(index).map(|entry| &entry.texture)
    }

    pub fn slide(&self, index: usize) -> Option<&Slide> {
        self.entries.get(index).map(|entry| &entry.slide)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.slide.id == id)
    }

    /// Drops every texture reference.
    pub fn dispose(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use anyhow::Result;

    pub(crate) fn solid_deck(count: usize) -> Deck {
        let entries = (0..count)
            .map(|index| DeckEntry {
                slide: Slide {
                    id: format!("slide-{index}"),
                    title: format!("Slide {index}"),
                    media: PathBuf::from(format!("{index}.png")),
                    description: String::new(),
                    author: None,
                    category: None,
                    tags: Vec::new(),
                },
                texture: TextureHandle::solid(4, 4, [index as u8 * 40, 0, 0, 255]),
            })
            .collect();
        Deck::new(entries)
    }

    struct SkipLoader;

    impl TextureLoader for SkipLoader {
        fn load(&self, media: &Path) -> Result<TextureHandle> {
            if media.ends_with("missing.jpg") {
                anyhow::bail!("no such file");
            }
            Ok(TextureHandle::solid(2, 2, [0, 0, 0, 255]))
        }
    }

    #[test]
    fn load_skips_failed_slides_and_keeps_order() {
        let config = DeckConfig::from_toml_str(
            r#"
version = 1

[[slides]]
id = "one"
title = "One"
media = "one.jpg"

[[slides]]
id = "two"
title = "Two"
media = "missing.jpg"

[[slides]]
id = "three"
title = "Three"
media = "/abs/three.jpg"

[slides.metadata]
tags = ["abstract"]
"#,
        )
        .unwrap();

        let (deck, failures) = Deck::load(&config, Path::new("/deck"), &SkipLoader);
        assert_eq!(deck.len(), 2);
        assert_eq!(deck.slide(0).unwrap().media, PathBuf::from("/deck/one.jpg"));
        assert_eq!(deck.slide(1).unwrap().id, "three");
        assert_eq!(deck.slide(1).unwrap().tags, vec!["abstract"]);
        assert_eq!(deck.position("three"), Some(1));
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].slide_id, "two");
    }
}
