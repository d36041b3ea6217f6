//! # hand_grip
//!
//! Turns one frame of hand-tracker landmarks into a binary **grip** level:
//! closed fist → `true`, open hand or no hand → `false`.
//!
//! Frames use the common 21-point hand layout (wrist + four joints per
//! digit) with coordinates normalised to the camera image, where `y`
//! increases downward:
//!
//! | Digit | MCP | PIP | DIP | TIP |
//! |---|---|---|---|---|
//! | Thumb  | 2 (CMC = 1) | — | 3 (IP) | 4 |
//! | Index  | 5  | 6  | 7  | 8  |
//! | Middle | 9  | 10 | 11 | 12 |
//! | Ring   | 13 | 14 | 15 | 16 |
//! | Pinky  | 17 | 18 | 19 | 20 |
//!
//! A finger counts as *folded* when its tip sits visually below its
//! knuckle (`tip.y > mcp.y`).  Three folded fingers out of four is a grip.
//! Every frame is classified on its own; there is no smoothing window.
//!
//! ```rust
//! use hand_grip::{classify, synthetic};
//!
//! assert!(classify(Some(&synthetic::fist())));
//! assert!(!classify(Some(&synthetic::open_palm())));
//! assert!(!classify(None));
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ════════════════════════════════════════════════════════════════════════════
// Landmark layout
// ════════════════════════════════════════════════════════════════════════════

/// Number of points in a full hand frame.
pub const LANDMARK_COUNT: usize = 21;

pub const WRIST:      usize = 0;
pub const INDEX_MCP:  usize = 5;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP:   usize = 13;
pub const RING_TIP:   usize = 16;
pub const PINKY_MCP:  usize = 17;
pub const PINKY_TIP:  usize = 20;

/// `(tip, mcp)` index pairs for the four non-thumb fingers.
pub const FINGER_PAIRS: [(usize, usize); 4] = [
    (INDEX_TIP,  INDEX_MCP),
    (MIDDLE_TIP, MIDDLE_MCP),
    (RING_TIP,   RING_MCP),
    (PINKY_TIP,  PINKY_MCP),
];

/// Folded fingers needed before a frame reads as a fist.
pub const GRIP_MIN_FOLDED: usize = 3;

// ════════════════════════════════════════════════════════════════════════════
// Landmark
// ════════════════════════════════════════════════════════════════════════════

/// One tracked hand keypoint in normalised image coordinates.
///
/// Deserializes from either `{"x":..,"y":..,"z":..}` (`z` optional) or a
/// `[x, y]` / `[x, y, z]` array.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LandmarkRepr")]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Landmark { x, y, z }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LandmarkRepr {
    Object {
        x: f32,
        y: f32,
        #[serde(default)]
        z: f32,
    },
    Array(Vec<f32>),
}

impl TryFrom<LandmarkRepr> for Landmark {
    type Error = String;

    fn try_from(repr: LandmarkRepr) -> Result<Self, Self::Error> {
        match repr {
            LandmarkRepr::Object { x, y, z } => Ok(Landmark { x, y, z }),
            LandmarkRepr::Array(v) => match v.as_slice() {
                [x, y]    => Ok(Landmark { x: *x, y: *y, z: 0.0 }),
                [x, y, z] => Ok(Landmark { x: *x, y: *y, z: *z }),
                other     => Err(format!("landmark array needs 2 or 3 values, got {}", other.len())),
            },
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Classification
// ════════════════════════════════════════════════════════════════════════════

/// How many of the four fingers are folded in `frame`.
///
/// Fingers whose tip or knuckle index is missing from a short frame are
/// counted as extended.
pub fn folded_count(frame: &[Landmark]) -> usize {
    FINGER_PAIRS
        .iter()
        .filter(|&&(tip, mcp)| match (frame.get(tip), frame.get(mcp)) {
            (Some(t), Some(m)) => t.y > m.y,
            _ => false,
        })
        .count()
}

/// Classify one tracker frame.  `None` or an empty frame means no hand,
/// which reads as an open hand.
pub fn classify(frame: Option<&[Landmark]>) -> bool {
    match frame {
        Some(points) if !points.is_empty() => folded_count(points) >= GRIP_MIN_FOLDED,
        _ => false,
    }
}

/// Result of classifying one frame, as handed to the game loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GripSample {
    /// A non-empty frame arrived.
    pub hand_visible: bool,
    /// The frame reads as a closed fist.
    pub gripping: bool,
}

impl GripSample {
    pub fn from_frame(frame: Option<&[Landmark]>) -> Self {
        GripSample {
            hand_visible: frame.is_some_and(|f| !f.is_empty()),
            gripping:     classify(frame),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Frame decoding
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("malformed tracker frame: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FrameRepr {
    Points(Vec<Landmark>),
    Wrapped {
        landmarks: Vec<Landmark>,
    },
    MultiHand {
        #[serde(rename = "multiHandLandmarks")]
        multi_hand_landmarks: Vec<Vec<Landmark>>,
    },
}

/// Decode one tracker frame from a JSON document.
///
/// Accepted shapes:
///
/// * `null`, `[]` or a blank line — no hand
/// * `[{"x":..,"y":..}, ...]` or `[[x, y, z], ...]` — a single hand
/// * `{"landmarks": [...]}`
/// * `{"multiHandLandmarks": [[...], ...]}` — only the first hand is used
pub fn decode_frame(line: &str) -> Result<Option<Vec<Landmark>>, FrameError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let repr: Option<FrameRepr> = serde_json::from_str(line)?;
    let points = match repr {
        None => None,
        Some(FrameRepr::Points(p)) | Some(FrameRepr::Wrapped { landmarks: p }) => Some(p),
        Some(FrameRepr::MultiHand { multi_hand_landmarks }) => {
            multi_hand_landmarks.into_iter().next()
        }
    };
    Ok(points.filter(|p| !p.is_empty()))
}

// ════════════════════════════════════════════════════════════════════════════
// Synthetic frames
// ════════════════════════════════════════════════════════════════════════════

/// Hand-made frames for the keyboard simulator and for tests.
pub mod synthetic {
    use super::{Landmark, LANDMARK_COUNT};

    // Joint heights (MCP, PIP, DIP, TIP) for a straight and a curled finger.
    const STRAIGHT: [f32; 4] = [0.60, 0.45, 0.35, 0.25];
    const CURLED:   [f32; 4] = [0.60, 0.50, 0.62, 0.70];
    const THUMB:    [f32; 4] = [0.80, 0.72, 0.64, 0.58];

    /// A hand with each of index/middle/ring/pinky folded per `folded`.
    pub fn with_folded(folded: [bool; 4]) -> Vec<Landmark> {
        let mut pts = Vec::with_capacity(LANDMARK_COUNT);
        pts.push(Landmark::new(0.50, 0.90, 0.0));
        for (i, y) in THUMB.iter().enumerate() {
            pts.push(Landmark::new(0.30 - i as f32 * 0.02, *y, 0.0));
        }
        for (finger, &curl) in folded.iter().enumerate() {
            let x = 0.40 + finger as f32 * 0.07;
            let joints = if curl { CURLED } else { STRAIGHT };
            for y in joints {
                pts.push(Landmark::new(x, y, 0.0));
            }
        }
        pts
    }

    pub fn fist() -> Vec<Landmark> {
        with_folded([true; 4])
    }

    pub fn open_palm() -> Vec<Landmark> {
        with_folded([false; 4])
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_frames_have_full_layout() {
        assert_eq!(synthetic::fist().len(), LANDMARK_COUNT);
        assert_eq!(synthetic::open_palm().len(), LANDMARK_COUNT);
    }

    #[test]
    fn fist_is_grip() {
        assert!(classify(Some(&synthetic::fist())));
        assert_eq!(folded_count(&synthetic::fist()), 4);
    }

    #[test]
    fn open_palm_is_not_grip() {
        assert!(!classify(Some(&synthetic::open_palm())));
        assert_eq!(folded_count(&synthetic::open_palm()), 0);
    }

    #[test]
    fn absent_or_empty_frame_is_open() {
        assert!(!classify(None));
        assert!(!classify(Some(&[])));
    }

    #[test]
    fn three_of_four_folded_is_enough() {
        for skip in 0..4 {
            let mut folded = [true; 4];
            folded[skip] = false;
            let frame = synthetic::with_folded(folded);
            assert!(classify(Some(&frame)), "finger {} extended should still grip", skip);
        }
    }

    #[test]
    fn two_folded_is_not_grip() {
        let frame = synthetic::with_folded([true, true, false, false]);
        assert_eq!(folded_count(&frame), 2);
        assert!(!classify(Some(&frame)));
    }

    #[test]
    fn tip_level_with_knuckle_is_not_folded() {
        let mut frame = synthetic::fist();
        frame[INDEX_TIP].y = frame[INDEX_MCP].y;
        frame[MIDDLE_TIP].y = frame[MIDDLE_MCP].y;
        assert_eq!(folded_count(&frame), 2);
        assert!(!classify(Some(&frame)));
    }

    #[test]
    fn short_frame_degrades_without_panicking() {
        let frame = &synthetic::fist()[..14];
        // Only index (8/5) and middle (12/9) are present.
        assert_eq!(folded_count(frame), 2);
        assert!(!classify(Some(frame)));
    }

    #[test]
    fn nan_coordinates_never_fold() {
        let mut frame = synthetic::fist();
        for p in frame.iter_mut() { p.y = f32::NAN; }
        assert!(!classify(Some(&frame)));
    }

    #[test]
    fn grip_sample_reports_visibility() {
        assert_eq!(GripSample::from_frame(None), GripSample::default());
        let s = GripSample::from_frame(Some(&synthetic::fist()));
        assert!(s.hand_visible && s.gripping);
        let s = GripSample::from_frame(Some(&synthetic::open_palm()));
        assert!(s.hand_visible && !s.gripping);
    }

    // ── decoding ─────────────────────────────────────────────────────────

    #[test]
    fn decode_null_and_blank() {
        assert!(decode_frame("null").unwrap().is_none());
        assert!(decode_frame("   ").unwrap().is_none());
        assert!(decode_frame("[]").unwrap().is_none());
    }

    #[test]
    fn decode_object_points() {
        let json = serde_json::to_string(&synthetic::fist()).unwrap();
        let frame = decode_frame(&json).unwrap().unwrap();
        assert_eq!(frame.len(), LANDMARK_COUNT);
        assert!(classify(Some(&frame)));
    }

    #[test]
    fn decode_array_points_and_missing_z() {
        let frame = decode_frame(r#"[[0.1, 0.2], [0.3, 0.4, 0.5]]"#).unwrap().unwrap();
        assert_eq!(frame[0], Landmark::new(0.1, 0.2, 0.0));
        assert_eq!(frame[1], Landmark::new(0.3, 0.4, 0.5));

        let frame = decode_frame(r#"[{"x": 0.1, "y": 0.2}]"#).unwrap().unwrap();
        assert_eq!(frame[0].z, 0.0);
    }

    #[test]
    fn decode_wrapped_and_multi_hand() {
        let pts = serde_json::to_string(&synthetic::open_palm()).unwrap();
        let wrapped = format!(r#"{{"landmarks": {}}}"#, pts);
        assert_eq!(decode_frame(&wrapped).unwrap().unwrap().len(), LANDMARK_COUNT);

        let fist = serde_json::to_string(&synthetic::fist()).unwrap();
        let multi = format!(r#"{{"multiHandLandmarks": [{}, {}]}}"#, fist, pts);
        let first = decode_frame(&multi).unwrap().unwrap();
        assert!(classify(Some(&first)));

        let none = decode_frame(r#"{"multiHandLandmarks": []}"#).unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode_frame("{not json").is_err());
        assert!(decode_frame(r#"[[0.1]]"#).is_err());
        assert!(decode_frame(r#""fist""#).is_err());
    }
}
