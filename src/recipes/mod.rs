//! Built-in recipes.

pub mod arcade;
