#![allow(dead_code)]

pub mod depscreen_env;
pub mod survey;
