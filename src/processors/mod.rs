//! Collaborator-facing processors

pub mod clipboard;
