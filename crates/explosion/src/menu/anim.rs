//! Time-driven transitions and timers for overlay nodes.
//!
//! Nothing happens between calls: the owner advances the scheduler with
//! [`Scheduler::tick`] and receives the cues of everything that completed
//! since the previous tick, in a deterministic order.

use derive_more::{Display, From, Into};
use orbit::geom::Point;
use serde::Serialize;
use serde_with::DeserializeFromStr;
use std::time::Duration;
use strum::{Display as StrumDisplay, EnumString};

use super::scene::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into)]
pub struct AnimationId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into)]
pub struct TimerId(u64);

/// Named timing curves as they appear in configuration files.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    DeserializeFromStr,
    EnumString,
    StrumDisplay,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum Curve {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    Spring,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    /// Damped spring. `damping` is the damping ratio (1.0 is critical),
    /// `velocity` the initial velocity in target distances per duration.
    Spring { damping: f64, velocity: f64 },
}

impl Easing {
    pub fn from_curve(curve: Curve, damping: f64, velocity: f64) -> Self {
        match curve {
            Curve::Linear => Self::Linear,
            Curve::EaseIn => Self::EaseIn,
            Curve::EaseOut => Self::EaseOut,
            Curve::EaseInOut => Self::EaseInOut,
            Curve::Spring => Self::Spring { damping, velocity },
        }
    }

    /// Maps linear progress to eased progress. Always 0 at the start and
    /// exactly 1 at the end; springs may overshoot in between.
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        if t >= 1.0 {
            return 1.0;
        }
        match *self {
            Self::Linear => t,
            Self::EaseIn => t * t * t,
            Self::EaseOut => 1.0 - (1.0 - t).powi(3),
            Self::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Self::Spring { damping, velocity } => spring(t, damping, velocity),
        }
    }
}

// Envelope decays to 1/1000 of the initial displacement by t = 1.
const SPRING_SETTLE: f64 = 6.907_755_278_982_137;

fn spring(t: f64, damping: f64, velocity: f64) -> f64 {
    let zeta = damping.clamp(0.01, 1.0);
    let omega = SPRING_SETTLE / zeta;
    let decay = (-zeta * omega * t).exp();

    if zeta < 1.0 {
        let omega_d = omega * (1.0 - zeta * zeta).sqrt();
        let b = (zeta * omega - velocity) / omega_d;
        1.0 - decay * ((omega_d * t).cos() + b * (omega_d * t).sin())
    } else {
        1.0 - decay * (1.0 + (omega - velocity) * t)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    pub duration: Duration,
    pub delay: Duration,
    pub easing: Easing,
}

impl Timing {
    pub fn new(duration: Duration, easing: Easing) -> Self {
        Self {
            duration,
            delay: Duration::ZERO,
            easing,
        }
    }

    pub fn linear(duration: Duration) -> Self {
        Self::new(duration, Easing::Linear)
    }

    pub fn delayed(self, delay: Duration) -> Self {
        Self { delay, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Scale,
    Opacity,
    Position,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mutation {
    Scale(f64),
    Opacity(f64),
    Position(Point),
}

impl Mutation {
    pub fn property(&self) -> Property {
        match self {
            Self::Scale(_) => Property::Scale,
            Self::Opacity(_) => Property::Opacity,
            Self::Position(_) => Property::Position,
        }
    }

    fn interpolate(from: Mutation, to: Mutation, t: f64) -> Mutation {
        match (from, to) {
            (Self::Scale(a), Self::Scale(b)) => Self::Scale(a + (b - a) * t),
            (Self::Opacity(a), Self::Opacity(b)) => {
                Self::Opacity((a + (b - a) * t).clamp(0.0, 1.0))
            }
            (Self::Position(a), Self::Position(b)) => Self::Position(a.lerp(b, t)),
            (_, to) => to,
        }
    }
}

/// Something whose node properties the scheduler can read and write.
pub trait Animatable {
    fn current(&self, node: NodeId, property: Property) -> Option<Mutation>;

    /// Returns `false` when the node no longer exists.
    fn apply(&mut self, node: NodeId, value: Mutation) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Completion<C> {
    pub cue: C,
    /// `false` when the transition was overridden before reaching its end.
    pub finished: bool,
}

/// One node's share of a staggered group.
#[derive(Debug, Clone)]
pub struct Step<C> {
    pub node: NodeId,
    pub mutations: Vec<Mutation>,
    pub cue: Option<C>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stagger {
    ids: Vec<AnimationId>,
}

impl Stagger {
    pub fn ids(&self) -> &[AnimationId] {
        &self.ids
    }

    /// The transition that starts, and therefore ends, last.
    pub fn last(&self) -> Option<AnimationId> {
        self.ids.last().copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
struct Track {
    target: Mutation,
    from: Option<Mutation>,
}

#[derive(Debug)]
struct Transition<C> {
    id: AnimationId,
    node: NodeId,
    tracks: Vec<Track>,
    start: Duration,
    duration: Duration,
    easing: Easing,
    cue: Option<C>,
    started: bool,
}

impl<C> Transition<C> {
    fn end(&self) -> Duration {
        self.start + self.duration
    }

    fn progress(&self, now: Duration) -> f64 {
        if self.duration.is_zero() || now >= self.end() {
            return 1.0;
        }
        now.saturating_sub(self.start).as_nanos() as f64 / self.duration.as_nanos() as f64
    }
}

#[derive(Debug)]
struct Timer<C> {
    id: TimerId,
    fire_at: Duration,
    cue: C,
}

pub struct Scheduler<C> {
    next_id: u64,
    transitions: Vec<Transition<C>>,
    timers: Vec<Timer<C>>,
    interrupted: Vec<Completion<C>>,
}

impl<C> Default for Scheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Scheduler<C> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            transitions: Vec::new(),
            timers: Vec::new(),
            interrupted: Vec::new(),
        }
    }

    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Starts a transition of `node` towards `mutations` after
    /// `timing.delay`. Once the delay has passed, the new transition takes
    /// over properties that earlier transitions are animating on that node.
    pub fn animate(
        &mut self,
        now: Duration,
        node: NodeId,
        mutations: impl IntoIterator<Item = Mutation>,
        timing: Timing,
        cue: Option<C>,
    ) -> AnimationId {
        let tracks: Vec<Track> = mutations
            .into_iter()
            .map(|target| Track { target, from: None })
            .collect();

        let id = AnimationId(self.allocate());
        self.transitions.push(Transition {
            id,
            node,
            tracks,
            start: now + timing.delay,
            duration: timing.duration,
            easing: timing.easing,
            cue,
            started: false,
        });
        id
    }

    /// Schedules `steps` in order, the n-th delayed by an extra
    /// `n * increment` on top of `timing.delay`.
    pub fn animate_staggered(
        &mut self,
        now: Duration,
        steps: impl IntoIterator<Item = Step<C>>,
        timing: Timing,
        increment: Duration,
    ) -> Stagger {
        let ids = steps
            .into_iter()
            .enumerate()
            .map(|(n, step)| {
                let delay = timing.delay + increment * n as u32;
                self.animate(
                    now,
                    step.node,
                    step.mutations,
                    timing.delayed(delay),
                    step.cue,
                )
            })
            .collect();
        Stagger { ids }
    }

    /// Strips `properties` from every transition on `node` scheduled before
    /// `writer`.
    fn take_over(&mut self, writer: AnimationId, node: NodeId, properties: &[Property]) {
        let mut emptied = Vec::new();
        for (i, transition) in self.transitions.iter_mut().enumerate() {
            if transition.node != node || transition.id >= writer {
                continue;
            }
            transition
                .tracks
                .retain(|old| !properties.contains(&old.target.property()));
            if transition.tracks.is_empty() {
                emptied.push(i);
            }
        }

        for i in emptied.into_iter().rev() {
            let transition = self.transitions.remove(i);
            log::trace!(
                "transition {} on node {} overridden",
                transition.id,
                transition.node
            );
            if let Some(cue) = transition.cue {
                self.interrupted.push(Completion {
                    cue,
                    finished: false,
                });
            }
        }
    }

    pub fn arm_timer(&mut self, now: Duration, after: Duration, cue: C) -> TimerId {
        let id = TimerId(self.allocate());
        self.timers.push(Timer {
            id,
            fire_at: now + after,
            cue,
        });
        id
    }

    /// Returns `false` if the timer already fired or was cancelled.
    pub fn cancel_timer(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    pub fn replace_timer(
        &mut self,
        old: Option<TimerId>,
        now: Duration,
        after: Duration,
        cue: C,
    ) -> TimerId {
        if let Some(old) = old {
            self.cancel_timer(old);
        }
        self.arm_timer(now, after, cue)
    }

    pub fn is_animating(&self) -> bool {
        !self.transitions.is_empty()
    }

    pub fn is_animating_node(&self, node: NodeId) -> bool {
        self.transitions.iter().any(|t| t.node == node)
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Drops every transition and timer without reporting them.
    pub fn clear(&mut self) {
        self.transitions.clear();
        self.timers.clear();
        self.interrupted.clear();
    }

    /// Advances every transition to `now`, writing values into `target`.
    ///
    /// Overridden transitions are reported first, then finished transitions
    /// and fired timers ordered by their end time and scheduling order.
    pub fn tick(&mut self, now: Duration, target: &mut impl Animatable) -> Vec<Completion<C>> {
        let starting: Vec<(AnimationId, NodeId, Vec<Property>)> = self
            .transitions
            .iter_mut()
            .filter(|t| !t.started && now >= t.start)
            .map(|t| {
                t.started = true;
                let properties = t.tracks.iter().map(|track| track.target.property()).collect();
                (t.id, t.node, properties)
            })
            .collect();
        for (writer, node, properties) in starting {
            self.take_over(writer, node, &properties);
        }

        let mut completions = std::mem::take(&mut self.interrupted);
        let mut ended: Vec<(Duration, u64, Completion<C>)> = Vec::new();

        let mut i = 0;
        while i < self.transitions.len() {
            let transition = &mut self.transitions[i];
            if now < transition.start {
                i += 1;
                continue;
            }

            let node = transition.node;
            let eased = transition.easing.apply(transition.progress(now));
            let mut alive = true;
            for track in transition.tracks.iter_mut() {
                let goal = track.target;
                let from = match track.from {
                    Some(from) => from,
                    None => {
                        let from = target.current(node, goal.property()).unwrap_or(goal);
                        track.from = Some(from);
                        from
                    }
                };
                let value = if eased >= 1.0 {
                    goal
                } else {
                    Mutation::interpolate(from, goal, eased)
                };
                alive &= target.apply(node, value);
            }

            let done = now >= transition.end();
            if done || !alive {
                let transition = self.transitions.remove(i);
                if !alive {
                    log::debug!(
                        "node {} vanished under transition {}",
                        transition.node,
                        transition.id
                    );
                }
                let end = transition.end();
                let seq = u64::from(transition.id);
                if let Some(cue) = transition.cue {
                    ended.push((
                        end,
                        seq,
                        Completion {
                            cue,
                            finished: alive,
                        },
                    ));
                }
            } else {
                i += 1;
            }
        }

        let (fired, pending): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.timers).into_iter().partition(|t| t.fire_at <= now);
        self.timers = pending;
        ended.extend(fired.into_iter().map(|t| {
            (
                t.fire_at,
                u64::from(t.id),
                Completion {
                    cue: t.cue,
                    finished: true,
                },
            )
        }));

        ended.sort_by_key(|(at, seq, _)| (*at, *seq));
        completions.extend(ended.into_iter().map(|(_, _, c)| c));
        completions
    }
}
