use parking_lot::RwLock;
use std::sync::Arc;

use rangewarn_zones::Zone;

/// Physical output lines of the simulated board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    Red = 0,
    Orange = 1,
    Green = 2,
    Buzzer = 3,
    Trigger = 4,
}

impl Line {
    pub const COUNT: usize = 5;

    pub fn index(self) -> usize {
        self as usize
    }
}

/// What an observer of the board would see right now.
#[derive(Clone, Debug, Default)]
pub struct State {
    pub levels: [bool; Line::COUNT],
    pub rising_edges: [u64; Line::COUNT],
    pub zone: Zone,
    pub last_distance_cm: Option<f32>,
    pub last_reaction_ms: u32,
    pub faults: Vec<String>,
}

impl State {
    pub fn level(&self, line: Line) -> bool {
        self.levels[line.index()]
    }

    pub fn rising_edges(&self, line: Line) -> u64 {
        self.rising_edges[line.index()]
    }
}

pub type Blackboard = Arc<RwLock<State>>;

pub fn snapshot(bb: &Blackboard) -> State {
    (*bb.read()).clone()
}

pub fn set_level(bb: &Blackboard, line: Line, high: bool) {
    let mut g = bb.write();
    let i = line.index();
    if high && !g.levels[i] {
        g.rising_edges[i] += 1;
    }
    g.levels[i] = high;
}

pub fn record_zone(bb: &Blackboard, zone: Zone, distance_cm: Option<f32>, reaction_ms: u32) {
    let mut g = bb.write();
    g.zone = zone;
    g.last_distance_cm = distance_cm;
    g.last_reaction_ms = reaction_ms;
}

pub fn raise_fault(bb: &Blackboard, msg: &str) {
    let mut g = bb.write();
    if !g.faults.iter().any(|s| s == msg) {
        g.faults.push(msg.to_string());
    }
}
