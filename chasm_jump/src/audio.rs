//! Sound cues on a MIDI playback thread.
//!
//! Each cue is a short sequence of tones.  Tones are mapped to the nearest
//! MIDI note and one channel per waveform, so overlapping cues never fight
//! over a program change.  With no MIDI port available the thread runs
//! against a null output and the game stays silent.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::config::AudioConfig;

// ════════════════════════════════════════════════════════════════════════════
// Cues and tones
// ════════════════════════════════════════════════════════════════════════════

/// Something the player should hear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Start,
    Jump,
    Point,
    Fall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Square,
    Sawtooth,
    Triangle,
    Sine,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [Waveform::Square, Waveform::Sawtooth, Waveform::Triangle, Waveform::Sine];

    /// Closest General MIDI timbre.
    pub fn program(self) -> u8 {
        match self {
            Waveform::Square   => 80, // Lead 1 (square)
            Waveform::Sawtooth => 81, // Lead 2 (sawtooth)
            Waveform::Triangle => 73, // Flute
            Waveform::Sine     => 79, // Ocarina
        }
    }

    pub fn channel(self) -> u8 {
        match self {
            Waveform::Square   => 0,
            Waveform::Sawtooth => 1,
            Waveform::Triangle => 2,
            Waveform::Sine     => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub hz:          f32,
    pub wave:        Waveform,
    /// Offset from the start of the cue.
    pub delay_ms:    u64,
    pub duration_ms: u64,
    pub velocity:    u8,
}

const fn tone(hz: f32, wave: Waveform, delay_ms: u64, duration_ms: u64, velocity: u8) -> Tone {
    Tone { hz, wave, delay_ms, duration_ms, velocity }
}

const LOUD: u8 = 100;
const SOFT: u8 = 64;

const START: [Tone; 3] = [
    tone(440.0, Waveform::Square, 0,   300, SOFT),
    tone(554.0, Waveform::Square, 150, 300, SOFT),
    tone(659.0, Waveform::Square, 300, 300, SOFT),
];
const JUMP: [Tone; 2] = [
    tone(400.0, Waveform::Sine, 0,  200, LOUD),
    tone(600.0, Waveform::Sine, 50, 200, SOFT),
];
const POINT: [Tone; 1] = [tone(800.0, Waveform::Triangle, 0, 100, SOFT)];
const FALL: [Tone; 2] = [
    tone(200.0, Waveform::Sawtooth, 0,   500, LOUD),
    tone(100.0, Waveform::Sawtooth, 100, 500, SOFT),
];

impl Cue {
    pub fn tones(self) -> &'static [Tone] {
        match self {
            Cue::Start => &START,
            Cue::Jump  => &JUMP,
            Cue::Point => &POINT,
            Cue::Fall  => &FALL,
        }
    }
}

/// Nearest MIDI note number for a frequency (A4 = 440 Hz = 69).
pub fn freq_to_note(hz: f32) -> u8 {
    let note = 69.0 + 12.0 * (hz.max(1.0) / 440.0).log2();
    note.round().clamp(0.0, 127.0) as u8
}

// ════════════════════════════════════════════════════════════════════════════
// Scheduling
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteAction {
    On { velocity: u8 },
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteEvent {
    pub at_ms:   u64,
    pub channel: u8,
    pub note:    u8,
    pub action:  NoteAction,
}

/// On/off events for one cue, ordered by time.
pub fn schedule(cue: Cue) -> Vec<NoteEvent> {
    let mut events: Vec<NoteEvent> = cue
        .tones()
        .iter()
        .flat_map(|t| {
            let note = freq_to_note(t.hz);
            let channel = t.wave.channel();
            [
                NoteEvent { at_ms: t.delay_ms, channel, note, action: NoteAction::On { velocity: t.velocity } },
                NoteEvent { at_ms: t.delay_ms + t.duration_ms, channel, note, action: NoteAction::Off },
            ]
        })
        .collect();
    events.sort_by_key(|e| e.at_ms);
    events
}

// ════════════════════════════════════════════════════════════════════════════
// MidiOut — abstraction over midir / null
// ════════════════════════════════════════════════════════════════════════════

trait MidiOut: Send {
    fn program_change(&mut self, channel: u8, program: u8);
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8);
    fn note_off(&mut self, channel: u8, note: u8);
}

struct MidirOut {
    conn: midir::MidiOutputConnection,
}

impl MidiOut for MidirOut {
    fn program_change(&mut self, channel: u8, program: u8) {
        let _ = self.conn.send(&[0xC0 | (channel & 0x0F), program]);
    }
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        let _ = self.conn.send(&[0x90 | (channel & 0x0F), note, velocity]);
    }
    fn note_off(&mut self, channel: u8, note: u8) {
        let _ = self.conn.send(&[0x80 | (channel & 0x0F), note, 0]);
    }
}

struct NullOut;
impl MidiOut for NullOut {
    fn program_change(&mut self, _ch: u8, _p: u8)  {}
    fn note_on(&mut self, _ch: u8, _n: u8, _v: u8) {}
    fn note_off(&mut self, _ch: u8, _n: u8)         {}
}

/// First available output port, preferring a software synth.
fn open_midi_output() -> Box<dyn MidiOut> {
    let midi_out = match midir::MidiOutput::new("chasm_jump") {
        Ok(m) => m,
        Err(e) => {
            warn!("MIDI init error: {}; sound disabled", e);
            return Box::new(NullOut);
        }
    };

    let ports = midi_out.ports();
    if ports.is_empty() {
        warn!("no MIDI output ports found; sound disabled (try `timidity -iA` or `fluidsynth`)");
        return Box::new(NullOut);
    }

    let port_idx = ports
        .iter()
        .position(|p| {
            midi_out
                .port_name(p)
                .map(|n| {
                    let n = n.to_lowercase();
                    n.contains("fluid") || n.contains("timidity") || n.contains("microsoft")
                        || n.contains("gm") || n.contains("synth")
                })
                .unwrap_or(false)
        })
        .unwrap_or(0);

    let port = &ports[port_idx];
    let name = midi_out.port_name(port).unwrap_or_else(|_| "unknown".to_string());
    info!("opening MIDI port: {}", name);

    match midi_out.connect(port, "chasm-cues") {
        Ok(conn) => Box::new(MidirOut { conn }),
        Err(e) => {
            warn!("MIDI connect failed: {}; sound disabled", e);
            Box::new(NullOut)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// CuePlayer — handle to the playback thread
// ════════════════════════════════════════════════════════════════════════════

enum CueCommand {
    Play(Cue),
    Quit,
}

/// Fire-and-forget cue playback.  Never blocks the game loop.
pub struct CuePlayer {
    tx:     Option<Sender<CueCommand>>,
    handle: Option<JoinHandle<()>>,
}

impl CuePlayer {
    /// Spawn the playback thread, or a silent player when audio is disabled.
    pub fn spawn(cfg: &AudioConfig) -> Self {
        if !cfg.enabled {
            info!("audio muted");
            return Self::muted();
        }
        Self::spawn_with(open_midi_output, cfg.program)
    }

    /// A player that drops every cue.
    pub fn muted() -> Self {
        CuePlayer { tx: None, handle: None }
    }

    fn spawn_with<F>(open: F, program: Option<u8>) -> Self
    where
        F: FnOnce() -> Box<dyn MidiOut> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || cue_thread(open(), program, rx));
        CuePlayer { tx: Some(tx), handle: Some(handle) }
    }

    pub fn is_muted(&self) -> bool {
        self.tx.is_none()
    }

    pub fn play(&self, cue: Cue) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(CueCommand::Play(cue));
        }
    }

    /// Silence everything and join the thread.
    pub fn quit(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(CueCommand::Quit);
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for CuePlayer {
    fn drop(&mut self) {
        self.quit();
    }
}

const IDLE_WAIT: Duration = Duration::from_millis(250);

fn cue_thread(mut midi: Box<dyn MidiOut>, program: Option<u8>, rx: Receiver<CueCommand>) {
    for wave in Waveform::ALL {
        midi.program_change(wave.channel(), program.unwrap_or(wave.program()));
    }

    // Sorted by due time.
    let mut pending: Vec<(Instant, NoteEvent)> = Vec::new();

    loop {
        let now = Instant::now();
        let due = pending.partition_point(|(t, _)| *t <= now);
        for (_, ev) in pending.drain(..due) {
            send(midi.as_mut(), &ev);
        }

        let wait = pending
            .first()
            .map(|(t, _)| t.saturating_duration_since(now))
            .unwrap_or(IDLE_WAIT);

        match rx.recv_timeout(wait) {
            Ok(CueCommand::Play(cue)) => {
                debug!("cue {:?}", cue);
                let start = Instant::now();
                for ev in schedule(cue) {
                    let at = start + Duration::from_millis(ev.at_ms);
                    let i = pending.partition_point(|(t, _)| *t <= at);
                    pending.insert(i, (at, ev));
                }
            }
            Ok(CueCommand::Quit) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }
    }

    for (_, ev) in pending.iter().filter(|(_, ev)| ev.action == NoteAction::Off) {
        send(midi.as_mut(), ev);
    }
}

fn send(midi: &mut dyn MidiOut, ev: &NoteEvent) {
    match ev.action {
        NoteAction::On { velocity } => midi.note_on(ev.channel, ev.note, velocity),
        NoteAction::Off             => midi.note_off(ev.channel, ev.note),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
