#![deny(clippy::all, clippy::pedantic)]

pub mod members;
pub mod posts;
