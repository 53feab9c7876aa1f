//! Geometry model and engine wire protocol shared by the scene, client core and apps.

pub mod domain;
pub mod error;
pub mod geometry;
pub mod protocol;
