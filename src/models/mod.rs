// src/models/mod.rs

pub mod post;
