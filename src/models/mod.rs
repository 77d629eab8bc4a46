// src/models/mod.rs

pub mod ad;
