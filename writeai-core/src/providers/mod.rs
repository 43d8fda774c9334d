//! External generation providers.
//!
//! Two vendor APIs sit behind this module: an OpenAI-compatible
//! chat-completions endpoint for text and an ElevenLabs-compatible endpoint
//! for voice synthesis. Every transport or vendor failure is normalized into
//! [`crate::Error::Provider`] so callers never branch on provider-specific
//! error formats.
//!
//! There are no automatic retries: a failed generation is terminal for that
//! attempt and the user re-triggers it.

pub mod elevenlabs;
pub mod openai;

pub use elevenlabs::VoiceClient;
pub use openai::{TextClient, TextGeneration};
