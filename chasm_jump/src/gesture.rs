//! Hand input: keyboard simulation, a JSON-lines tracker bridge, and
//! LeapMotion hardware.
//!
//! Every source runs on its own thread and sends a [`GripSample`] per
//! frame.  The game loop only ever looks at the most recent one through
//! [`GripReader`], so a slow frame never replays stale jump intents.

use std::io::{self, BufRead, BufReader, Stdin};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use hand_grip::{decode_frame, synthetic, GripSample, Landmark};
use log::{debug, info, warn};

// ════════════════════════════════════════════════════════════════════════════
// GestureSource trait — unified interface for hw and sim
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`GripSample`]s over a channel.
pub trait GestureSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<GripSample>);
}

/// Spawn a gesture source on its own thread and return a reader for it.
pub fn spawn_gesture_source<G: GestureSource>(source: G) -> GripReader {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    GripReader::from_receiver(rx)
}

// ════════════════════════════════════════════════════════════════════════════
// GripReader — most-recent-value view of a source
// ════════════════════════════════════════════════════════════════════════════

pub struct GripReader {
    rx:        Receiver<GripSample>,
    latest:    GripSample,
    connected: bool,
}

impl GripReader {
    pub fn from_receiver(rx: Receiver<GripSample>) -> Self {
        GripReader { rx, latest: GripSample::default(), connected: true }
    }

    /// Drain everything queued and return the newest sample.  Once the
    /// source hangs up this reports "no hand" forever.
    pub fn latest(&mut self) -> GripSample {
        loop {
            match self.rx.try_recv() {
                Ok(sample) => self.latest = sample,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if self.connected {
                        info!("gesture source disconnected");
                        self.connected = false;
                    }
                    self.latest = GripSample::default();
                    break;
                }
            }
        }
        self.latest
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimGestureSource — keyboard simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the game window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimInput {
    KeyDown(SimKey),
    KeyUp(SimKey),
}

/// Simulated key codes (mapped from minifb Key).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimKey {
    Grip,     // Space
    HideHand, // H
}

/// Turns window key events into synthetic landmark frames and classifies
/// them exactly like tracker output.
pub struct SimGestureSource {
    pub rx: Receiver<SimInput>,
}

#[derive(Debug, Default)]
struct SimHand {
    fist:   bool,
    hidden: bool,
}

impl SimHand {
    fn apply(&mut self, input: SimInput) -> bool {
        match input {
            SimInput::KeyDown(SimKey::Grip) if !self.fist => self.fist = true,
            SimInput::KeyUp(SimKey::Grip) if self.fist    => self.fist = false,
            SimInput::KeyDown(SimKey::HideHand)           => self.hidden = !self.hidden,
            _ => return false,
        }
        true
    }

    fn frame(&self) -> Option<Vec<Landmark>> {
        if self.hidden {
            None
        } else if self.fist {
            Some(synthetic::fist())
        } else {
            Some(synthetic::open_palm())
        }
    }

    fn sample(&self) -> GripSample {
        GripSample::from_frame(self.frame().as_deref())
    }
}

impl GestureSource for SimGestureSource {
    fn run(self: Box<Self>, tx: Sender<GripSample>) {
        let mut hand = SimHand::default();
        if tx.send(hand.sample()).is_err() {
            return;
        }
        for input in self.rx {
            if !hand.apply(input) {
                continue;
            }
            debug!("sim hand {:?}", hand);
            if tx.send(hand.sample()).is_err() {
                return;
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// JsonLinesSource — external tracker piped in as JSON lines
// ════════════════════════════════════════════════════════════════════════════

/// One landmark frame per line, in any shape `hand_grip::decode_frame`
/// accepts.  Bad lines count as "no hand".
pub struct JsonLinesSource<R> {
    reader: R,
}

impl<R: BufRead + Send + 'static> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        JsonLinesSource { reader }
    }
}

impl JsonLinesSource<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        JsonLinesSource::new(BufReader::new(io::stdin()))
    }
}

impl<R: BufRead + Send + 'static> GestureSource for JsonLinesSource<R> {
    fn run(self: Box<Self>, tx: Sender<GripSample>) {
        let mut lines = 0u64;
        for line in self.reader.lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    warn!("landmark stream read error: {}", e);
                    break;
                }
            };
            lines += 1;
            let sample = match decode_frame(&line) {
                Ok(frame) => GripSample::from_frame(frame.as_deref()),
                Err(e) => {
                    warn!("line {}: unreadable landmark frame: {}", lines, e);
                    GripSample::default()
                }
            };
            if tx.send(sample).is_err() {
                return;
            }
        }
        info!("landmark stream ended after {} lines", lines);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapGestureSource — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Height above the controller treated as the bottom of the frame, in mm.
pub const LEAP_RANGE_MM: f32 = 500.0;

/// Map a LeapMotion position (mm, y up) into the normalised image layout
/// the classifier expects (y grows downward).
pub fn leap_to_landmark(x: f32, y: f32, z: f32) -> Landmark {
    Landmark::new(
        (x + LEAP_RANGE_MM / 2.0) / LEAP_RANGE_MM,
        (LEAP_RANGE_MM - y) / LEAP_RANGE_MM,
        z / LEAP_RANGE_MM,
    )
}

/// Gesture source backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
/// The first tracked hand is converted to the 21-point layout: palm centre
/// for the wrist slot, then knuckle, middle joint, last joint and tip for
/// each digit from thumb to pinky.
#[cfg(feature = "leap")]
pub struct LeapGestureSource;

#[cfg(feature = "leap")]
impl GestureSource for LeapGestureSource {
    fn run(self: Box<Self>, tx: Sender<GripSample>) {
        use leaprs::*;

        let mut connection = match Connection::create(ConnectionConfig::default()) {
            Ok(c) => c,
            Err(e) => {
                log::error!("cannot create LeapC connection: {:?}", e);
                return;
            }
        };
        if let Err(e) = connection.open() {
            log::error!("cannot open LeapMotion device: {:?}", e);
            return;
        }
        info!("LeapMotion connected");

        loop {
            let msg = match connection.poll(100) {
                Ok(m)  => m,
                Err(_) => continue,
            };

            if let Event::Tracking(frame) = msg.event() {
                let landmarks = frame.hands().next().map(|hand| {
                    let palm = hand.palm().position();
                    let mut points = Vec::with_capacity(hand_grip::LANDMARK_COUNT);
                    points.push(leap_to_landmark(palm.x, palm.y, palm.z));
                    for digit in hand.digits() {
                        for joint in [
                            digit.proximal().prev_joint(),
                            digit.intermediate().prev_joint(),
                            digit.distal().prev_joint(),
                            digit.distal().next_joint(),
                        ] {
                            points.push(leap_to_landmark(joint.x, joint.y, joint.z));
                        }
                    }
                    points
                });
                if tx.send(GripSample::from_frame(landmarks.as_deref())).is_err() {
                    return;
                }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::{Duration, Instant};

    const FIST: GripSample = GripSample { hand_visible: true, gripping: true };
    const OPEN: GripSample = GripSample { hand_visible: true, gripping: false };
    const GONE: GripSample = GripSample { hand_visible: false, gripping: false };

    /// Wait until the source thread hangs up, then return what it sent.
    fn collect(rx: Receiver<GripSample>) -> Vec<GripSample> {
        rx.iter().collect()
    }

    #[test]
    fn reader_keeps_only_the_newest_sample() {
        let (tx, rx) = mpsc::channel();
        let mut reader = GripReader::from_receiver(rx);
        assert_eq!(reader.latest(), GONE);

        tx.send(FIST).unwrap();
        tx.send(OPEN).unwrap();
        tx.send(FIST).unwrap();
        assert_eq!(reader.latest(), FIST);
        // Nothing new: the last value sticks.
        assert_eq!(reader.latest(), FIST);
        assert!(reader.is_connected());
    }

    #[test]
    fn reader_reports_no_hand_after_disconnect() {
        let (tx, rx) = mpsc::channel();
        let mut reader = GripReader::from_receiver(rx);
        tx.send(FIST).unwrap();
        drop(tx);
        assert_eq!(reader.latest(), GONE);
        assert!(!reader.is_connected());
    }

    #[test]
    fn sim_source_follows_keys() {
        let (key_tx, key_rx) = mpsc::channel();
        let (tx, rx) = mpsc::channel();
        for input in [
            SimInput::KeyDown(SimKey::Grip),
            SimInput::KeyDown(SimKey::Grip), // auto-repeat, ignored
            SimInput::KeyUp(SimKey::Grip),
            SimInput::KeyDown(SimKey::HideHand),
            SimInput::KeyDown(SimKey::Grip),
            SimInput::KeyUp(SimKey::HideHand), // only key-down toggles
            SimInput::KeyDown(SimKey::HideHand),
        ] {
            key_tx.send(input).unwrap();
        }
        drop(key_tx);

        Box::new(SimGestureSource { rx: key_rx }).run(tx);
        assert_eq!(collect(rx), vec![OPEN, FIST, OPEN, GONE, GONE, FIST]);
    }

    #[test]
    fn json_lines_are_classified() {
        let fist = serde_json::to_string(&synthetic::fist()).unwrap();
        let palm = serde_json::to_string(&synthetic::open_palm()).unwrap();
        let text = format!("{}\n{}\nnull\nnot json\n{}\n", fist, palm, fist);

        let (tx, rx) = mpsc::channel();
        Box::new(JsonLinesSource::new(Cursor::new(text))).run(tx);
        assert_eq!(collect(rx), vec![FIST, OPEN, GONE, GONE, FIST]);
    }

    #[test]
    fn spawned_source_feeds_the_reader() {
        let fist = serde_json::to_string(&synthetic::fist()).unwrap();
        let mut reader = spawn_gesture_source(JsonLinesSource::new(Cursor::new(fist)));

        let deadline = Instant::now() + Duration::from_secs(5);
        while reader.is_connected() && Instant::now() < deadline {
            reader.latest();
            thread::sleep(Duration::from_millis(5));
        }
        assert!(!reader.is_connected());
        assert_eq!(reader.latest(), GONE);
    }

    #[test]
    fn leap_coordinates_flip_y() {
        let high = leap_to_landmark(0.0, 400.0, 0.0);
        let low  = leap_to_landmark(0.0, 100.0, 0.0);
        assert!(low.y > high.y);
        assert!((high.y - 0.2).abs() < 1e-6);
        assert!((high.x - 0.5).abs() < 1e-6);
    }
}
