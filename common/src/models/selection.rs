// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

/// One entry of a timed selection prompt.
///
/// The prompt does not know what `value` is; it only hands it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionOption<T> {
    pub index: usize,
    pub label: String,
    /// Extra lines printed below the label (compatibility notes and the like).
    pub hints: Vec<String>,
    pub value: T,
}

/// Builds an option list from `(label, value)` pairs. Indices follow iteration
/// order, so the first pair becomes the default.
pub fn options_from<T, I>(items: I) -> Vec<SelectionOption<T>>
where
    I: IntoIterator<Item = (String, T)>,
{
    items
        .into_iter()
        .enumerate()
        .map(|(index, (label, value))| SelectionOption {
            index,
            label,
            hints: Vec::new(),
            value,
        })
        .collect()
}

/// A non-empty, index-ordered list of options. Option 0 is the default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionList<T> {
    options: Vec<SelectionOption<T>>,
}

impl<T> SelectionList<T> {
    /// Returns `None` for an empty list. Indices are renumbered to match positions.
    pub fn new(mut options: Vec<SelectionOption<T>>) -> Option<Self> {
        if options.is_empty() {
            return None;
        }
        for (idx, opt) in options.iter_mut().enumerate() {
            opt.index = idx;
        }
        Some(Self { options })
    }

    pub fn default_option(&self) -> &SelectionOption<T> {
        &self.options[0]
    }

    pub fn get(&self, index: usize) -> Option<&SelectionOption<T>> {
        self.options.get(index)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn max_index(&self) -> usize {
        self.options.len() - 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectionOption<T>> {
        self.options.iter()
    }
}
