//! Firing profiles
//!
//! A profile is the user-visible list of segments; the profile engine turns
//! it into a moving setpoint.

pub mod segment;

pub use segment::{
    decode_profile, encode_profile, FiringProfile, ProfileError, Segment, MAX_PROFILE_BYTES,
    MAX_SEGMENTS,
};
