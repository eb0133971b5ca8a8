use std::fmt::{Display, Formatter};
use std::num::NonZero;

/// An 8-bit RGBA color. Compared component-wise, never by identity.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// An opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: u8::MAX }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Whether `self` and `other` name the same palette color. Alpha does not take part.
    pub fn same_rgb(&self, other: &Color) -> bool {
        (self.r, self.g, self.b) == (other.r, other.g, other.b)
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != u8::MAX {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

/// Index of an entry in a [`Palette`]. The solver assigns slots, not raw colors.
pub type Slot = usize;

/// One palette entry: a color that may be used at most `max_usage` times.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ColorConstraint {
    pub color: Color,
    pub max_usage: NonZero<u32>,
    pub name: String,
}

impl ColorConstraint {
    pub fn new(color: Color, max_usage: NonZero<u32>, name: impl Into<String>) -> Self {
        Self { color, max_usage, name: name.into() }
    }
}

/// The ordered list of available colors.
///
/// Two entries may carry the same color or name; each is still its own [`Slot`] with its own cap.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Palette {
    slots: Vec<ColorConstraint>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, constraint: ColorConstraint) -> Slot {
        self.slots.push(constraint);
        self.slots.len() - 1
    }

    /// Chainable shorthand for [`Self::push`].
    pub fn with(mut self, color: Color, max_usage: NonZero<u32>, name: impl Into<String>) -> Self {
        self.push(ColorConstraint::new(color, max_usage, name));
        self
    }

    pub fn get(&self, slot: Slot) -> Option<&ColorConstraint> {
        self.slots.get(slot)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColorConstraint> {
        self.slots.iter()
    }

    pub fn slots(&self) -> std::ops::Range<Slot> {
        0..self.slots.len()
    }

    /// The first slot whose color matches `color` on RGB, if any.
    pub fn slot_of(&self, color: &Color) -> Option<Slot> {
        self.slots.iter().position(|c| c.color.same_rgb(color))
    }
}

impl FromIterator<ColorConstraint> for Palette {
    fn from_iter<T: IntoIterator<Item = ColorConstraint>>(iter: T) -> Self {
        Self { slots: iter.into_iter().collect() }
    }
}

impl<'a> IntoIterator for &'a Palette {
    type Item = &'a ColorConstraint;
    type IntoIter = std::slice::Iter<'a, ColorConstraint>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter()
    }
}
