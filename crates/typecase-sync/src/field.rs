//! The three variant dimensions a specimen page exposes.

use std::fmt;
use std::ops::{Index, IndexMut};

/// One of the selection fields driven by a page dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Version,
    Style,
    Weight,
}

impl Field {
    /// Every field, in the order synchronization passes process them.
    pub const ALL: [Field; 3] = [Field::Version, Field::Style, Field::Weight];

    /// Lowercase field name, as used in config keys and attribute suffixes.
    pub fn name(self) -> &'static str {
        match self {
            Field::Version => "version",
            Field::Style => "style",
            Field::Weight => "weight",
        }
    }

    /// Name of the `data-*` attribute that stores this field's state.
    pub fn data_attr(self) -> &'static str {
        match self {
            Field::Version => "data-version",
            Field::Style => "data-style",
            Field::Weight => "data-weight",
        }
    }

    fn index(self) -> usize {
        match self {
            Field::Version => 0,
            Field::Style => 1,
            Field::Weight => 2,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value of type `T` for each of the three fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerField<T>([T; 3]);

impl<T> PerField<T> {
    /// Build a map by evaluating `f` once per field, in `Field::ALL` order.
    pub fn from_fn(mut f: impl FnMut(Field) -> T) -> Self {
        Self([f(Field::Version), f(Field::Style), f(Field::Weight)])
    }

    /// Fallible version of [`from_fn`](Self::from_fn); stops at the first error.
    pub fn try_from_fn<E>(mut f: impl FnMut(Field) -> Result<T, E>) -> Result<Self, E> {
        Ok(Self([f(Field::Version)?, f(Field::Style)?, f(Field::Weight)?]))
    }

    /// Iterate fields and values in `Field::ALL` order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &T)> {
        Field::ALL.iter().map(|&field| (field, &self.0[field.index()]))
    }
}

impl<T> Index<Field> for PerField<T> {
    type Output = T;

    fn index(&self, field: Field) -> &T {
        &self.0[field.index()]
    }
}

impl<T> IndexMut<Field> for PerField<T> {
    fn index_mut(&mut self, field: Field) -> &mut T {
        &mut self.0[field.index()]
    }
}
