//! Firing segments and profile validation

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::config::MAX_TARGET_C;

/// Maximum segments per profile (preheat, step 1, step 2, final)
pub const MAX_SEGMENTS: usize = 4;

/// Upper bound for an encoded profile blob
pub const MAX_PROFILE_BYTES: usize = 64;

/// A single firing segment
///
/// The setpoint ramps toward `target_temp_c` at `ramp_rate_c_per_hour`, then
/// soaks there for `hold_minutes` once the kiln actually reaches it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Segment {
    /// Segment target temperature (°C)
    pub target_temp_c: f32,
    /// Setpoint ramp rate (°C/h)
    pub ramp_rate_c_per_hour: f32,
    /// Soak duration at target (minutes, 0 = advance immediately)
    pub hold_minutes: u16,
}

impl Segment {
    /// Create a new segment
    pub const fn new(target_temp_c: f32, ramp_rate_c_per_hour: f32, hold_minutes: u16) -> Self {
        Self {
            target_temp_c,
            ramp_rate_c_per_hour,
            hold_minutes,
        }
    }

    fn validate(&self) -> Result<(), ProfileError> {
        if !self.target_temp_c.is_finite()
            || self.target_temp_c <= 0.0
            || self.target_temp_c > MAX_TARGET_C
        {
            return Err(ProfileError::InvalidTarget);
        }
        if !self.ramp_rate_c_per_hour.is_finite() || self.ramp_rate_c_per_hour <= 0.0 {
            return Err(ProfileError::InvalidRampRate);
        }
        Ok(())
    }
}

/// Reasons a profile is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProfileError {
    /// No segments
    Empty,
    /// More than [`MAX_SEGMENTS`] segments
    TooManySegments,
    /// Target not finite or outside (0, MAX_TARGET_C]
    InvalidTarget,
    /// Ramp rate not finite or not positive
    InvalidRampRate,
    /// Blob could not be encoded or decoded
    Encoding,
}

impl From<postcard::Error> for ProfileError {
    fn from(_: postcard::Error) -> Self {
        ProfileError::Encoding
    }
}

/// An ordered, validated list of 1 to [`MAX_SEGMENTS`] segments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FiringProfile {
    segments: Vec<Segment, MAX_SEGMENTS>,
}

impl FiringProfile {
    /// Build a profile from segments, validating each one
    pub fn new(segments: &[Segment]) -> Result<Self, ProfileError> {
        let segments =
            Vec::from_slice(segments).map_err(|_| ProfileError::TooManySegments)?;
        let profile = Self { segments };
        profile.validate()?;
        Ok(profile)
    }

    /// Check segment count and every segment's values
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.segments.is_empty() {
            return Err(ProfileError::Empty);
        }
        self.segments.iter().try_for_each(Segment::validate)
    }

    /// All segments in firing order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Segment at `index`
    pub fn get(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    /// Final segment
    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True when the profile has no segments (never true once validated)
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Serialize a profile into `buf` for the crash-recovery blob
pub fn encode_profile<'a>(
    profile: &FiringProfile,
    buf: &'a mut [u8],
) -> Result<&'a mut [u8], ProfileError> {
    Ok(postcard::to_slice(profile, buf)?)
}

/// Deserialize and re-validate a profile blob
pub fn decode_profile(bytes: &[u8]) -> Result<FiringProfile, ProfileError> {
    let profile: FiringProfile = postcard::from_bytes(bytes)?;
    profile.validate()?;
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bisque() -> [Segment; 3] {
        [
            Segment::new(100.0, 60.0, 60),
            Segment::new(600.0, 100.0, 0),
            Segment::new(1000.0, 150.0, 15),
        ]
    }

    #[test]
    fn test_valid_profile() {
        let profile = FiringProfile::new(&bisque()).unwrap();
        assert_eq!(profile.len(), 3);
        assert_eq!(profile.last().unwrap().target_temp_c, 1000.0);
    }

    #[test]
    fn test_empty_profile_rejected() {
        assert_eq!(FiringProfile::new(&[]), Err(ProfileError::Empty));
    }

    #[test]
    fn test_too_many_segments_rejected() {
        let seg = Segment::new(500.0, 100.0, 0);
        let result = FiringProfile::new(&[seg; 5]);
        assert_eq!(result, Err(ProfileError::TooManySegments));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert_eq!(
            FiringProfile::new(&[Segment::new(f32::NAN, 100.0, 0)]),
            Err(ProfileError::InvalidTarget)
        );
        assert_eq!(
            FiringProfile::new(&[Segment::new(2000.0, 100.0, 0)]),
            Err(ProfileError::InvalidTarget)
        );
        assert_eq!(
            FiringProfile::new(&[Segment::new(500.0, 0.0, 0)]),
            Err(ProfileError::InvalidRampRate)
        );
    }

    #[test]
    fn test_blob_roundtrip() {
        let profile = FiringProfile::new(&bisque()).unwrap();
        let mut buf = [0u8; MAX_PROFILE_BYTES];
        let bytes = encode_profile(&profile, &mut buf).unwrap();
        assert_eq!(decode_profile(bytes), Ok(profile));
    }

    #[test]
    fn test_corrupt_blob_rejected() {
        assert_eq!(decode_profile(&[0xFF, 0xFF]), Err(ProfileError::Encoding));
        // Decodes structurally but has no segments
        assert_eq!(decode_profile(&[0x00]), Err(ProfileError::Empty));
    }
}
