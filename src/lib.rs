pub mod assembler;
pub mod budget;
pub mod config;
pub mod document;
pub mod error;
pub mod facts;
pub mod generator;
pub mod language;
pub mod loader;
pub mod locator;
pub mod package_info;
pub mod project;
pub mod render;
pub mod tree;
pub mod vcs;
pub mod xml_builder;
