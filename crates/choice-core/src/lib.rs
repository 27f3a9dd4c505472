#![forbid(unsafe_code)]

//! Core: input events, platform modifiers, and named timers.
//!
//! # Role in choice
//! `choice-core` is the input layer. It owns the normalized event types the
//! selection engine consumes, the platform distinction between Command and
//! Ctrl shortcuts, and the time-injected timer set that backs every debounce
//! in the engine.
//!
//! # How it fits in the system
//! `choice-widgets` consumes `choice_core::event::Event` values and drives
//! the option model. Nothing in this crate knows about options or selection,
//! so hosts can translate their native input into these types without
//! depending on the engine.

pub mod event;
pub mod platform;
pub mod timer;
