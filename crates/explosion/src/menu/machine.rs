//! Press, drag and release handling for the explosion menu.
//!
//! A session moves through `Entering -> Tracking -> Exiting` and back to
//! idle. Every side effect goes through the overlay and the scheduler; the
//! machine itself only decides what should happen and when.

use derive_more::{Display, From, Into};
use orbit::geom::{Point, Rect, Size};
use orbit::layout;
use std::time::Duration;
use strum::Display as StrumDisplay;

use super::anim::{Easing, Mutation, Scheduler, Step, TimerId, Timing};
use super::notify::SelectionNotifier;
use super::provider::{ItemProvider, SelectedItem, SelectionDelegate, Viewport};
use super::scene::{self, NodeDraft, NodeId, NodeKind, Overlay};
use super::theme::ThemeColors;
use crate::config::MenuConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay)]
pub enum Phase {
    Idle,
    Entering,
    Tracking,
    Exiting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, From, Into)]
pub struct SessionId(u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MenuEvent {
    PressBegan,
    DragChanged(Point),
    ReleaseEnded(Point),
    Tick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CueKind {
    GuardElapsed,
    ExitStep,
}

/// Scheduler payload; the session id lets late completions be recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cue {
    session: SessionId,
    kind: CueKind,
}

/// Live state of one press-to-release cycle. Owns the overlay.
#[derive(Debug)]
pub struct MenuSession {
    id: SessionId,
    phase: Phase,
    anchor: Point,
    points: Vec<Point>,
    overlay: Overlay,
    backdrop: NodeId,
    highlight: NodeId,
    anchor_clone: NodeId,
    items: Vec<NodeId>,
    accessories: Vec<Option<NodeId>>,
    guard: Option<TimerId>,
    pending_release: Option<Point>,
    hovered: Option<usize>,
    selection: Option<SelectedItem>,
    exits_outstanding: usize,
    notifier: SelectionNotifier,
}

impl MenuSession {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn anchor(&self) -> Point {
        self.anchor
    }

    /// Target points, top to bottom. Item `i` flies to `points()[i]`.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn item_nodes(&self) -> &[NodeId] {
        &self.items
    }

    pub fn accessory_node(&self, index: usize) -> Option<NodeId> {
        self.accessories.get(index).copied().flatten()
    }

    pub fn highlight(&self) -> NodeId {
        self.highlight
    }

    pub fn backdrop(&self) -> NodeId {
        self.backdrop
    }

    pub fn anchor_clone(&self) -> NodeId {
        self.anchor_clone
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn guard_pending(&self) -> bool {
        self.guard.is_some()
    }

    pub fn release_pending(&self) -> bool {
        self.pending_release.is_some()
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    /// First item, in point order, whose current bounds contain `point`.
    pub fn hit_test(&self, point: Point) -> Option<usize> {
        self.items.iter().position(|&id| {
            self.overlay
                .get(id)
                .is_some_and(|node| node.bounds().contains(point))
        })
    }

    fn cue(&self, kind: CueKind) -> Cue {
        Cue {
            session: self.id,
            kind,
        }
    }
}

pub struct ExplosionMenu<P, D, V> {
    provider: P,
    delegate: D,
    viewport: V,
    config: MenuConfig,
    colors: ThemeColors,
    staged: Option<(MenuConfig, ThemeColors)>,
    scheduler: Scheduler<Cue>,
    session: Option<MenuSession>,
    sessions_started: u64,
}

impl<P, D, V> ExplosionMenu<P, D, V>
where
    P: ItemProvider,
    D: SelectionDelegate,
    V: Viewport,
{
    pub fn new(
        provider: P,
        delegate: D,
        viewport: V,
        config: MenuConfig,
        colors: ThemeColors,
    ) -> Self {
        Self {
            provider,
            delegate,
            viewport,
            config,
            colors,
            staged: None,
            scheduler: Scheduler::new(),
            session: None,
            sessions_started: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.session.as_ref().map_or(Phase::Idle, |s| s.phase)
    }

    pub fn session(&self) -> Option<&MenuSession> {
        self.session.as_ref()
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.session.as_ref().map(|s| &s.overlay)
    }

    pub fn is_animating(&self) -> bool {
        self.scheduler.is_animating()
    }

    pub fn config(&self) -> &MenuConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn delegate(&self) -> &D {
        &self.delegate
    }

    pub fn viewport(&self) -> &V {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut V {
        &mut self.viewport
    }

    /// Takes effect for the next session; a running one keeps its settings.
    pub fn set_config(&mut self, config: MenuConfig, colors: ThemeColors) {
        if self.session.is_some() {
            self.staged = Some((config, colors));
        } else {
            self.config = config;
            self.colors = colors;
        }
    }

    pub fn handle(&mut self, now: Duration, event: MenuEvent) {
        match event {
            MenuEvent::PressBegan => self.press_began(now),
            MenuEvent::DragChanged(point) => self.drag_changed(now, point),
            MenuEvent::ReleaseEnded(point) => self.release_ended(now, point),
            MenuEvent::Tick => self.tick(now),
        }
    }

    pub fn press_began(&mut self, now: Duration) {
        if let Some(session) = &self.session {
            log::warn!(
                "press began during session {} ({}), ignoring",
                session.id,
                session.phase
            );
            return;
        }

        if let Some((config, colors)) = self.staged.take() {
            self.config = config;
            self.colors = colors;
        }

        let Some(root) = self.viewport.root_bounds() else {
            log::debug!("no root container, menu stays idle");
            return;
        };

        let count = self.provider.item_count();
        let anchor_frame = self.viewport.anchor_frame();
        let anchor = anchor_frame.center();
        let points = match layout::compute_item_points_with_spread(
            anchor,
            self.provider.radius(),
            count,
            self.config.spread_degrees,
        ) {
            Ok(points) => points,
            Err(e) => {
                log::debug!("not opening menu: {}", e);
                return;
            }
        };

        self.sessions_started += 1;
        let id = SessionId(self.sessions_started);
        let session = self.build_session(id, root, anchor_frame, points);
        self.session = Some(session);
        self.start_entrance(now);

        log::debug!("session {} entering with {} items", id, count);
    }

    fn build_session(
        &self,
        id: SessionId,
        root: Rect,
        anchor_frame: Rect,
        points: Vec<Point>,
    ) -> MenuSession {
        let anchor = anchor_frame.center();
        let mut overlay = Overlay::new(root);

        let backdrop = overlay.insert(
            NodeDraft::new(NodeKind::Backdrop, root.size, root.center(), self.colors.backdrop)
                .with_opacity(0.0),
        );
        let highlight = overlay.insert(NodeDraft::new(
            NodeKind::Highlight,
            anchor_frame.size,
            anchor,
            self.colors.highlight,
        ));
        let anchor_clone = overlay.insert(NodeDraft::new(
            NodeKind::AnchorClone,
            anchor_frame.size,
            anchor,
            self.colors.anchor,
        ));

        let items: Vec<NodeId> = (0..points.len())
            .map(|index| {
                let visual = self.provider.item_visual(index);
                overlay.insert(
                    NodeDraft::new(NodeKind::Item(index), visual.size, anchor, visual.color)
                        .with_scale(self.config.item_start_scale)
                        .with_opacity(0.0)
                        .with_label(visual.label),
                )
            })
            .collect();

        // Accessories wait above their item's final position, invisible.
        let accessories = points
            .iter()
            .enumerate()
            .map(|(index, &point)| {
                let visual = self.provider.accessory_visual(index)?;
                let item_size = overlay
                    .get(items[index])
                    .map_or(Size::square(self.config.item_size), |n| n.size);
                let center = scene::accessory_center(
                    point,
                    item_size,
                    visual.size,
                    self.config.accessory_gap,
                );
                Some(
                    overlay.insert(
                        NodeDraft::new(
                            NodeKind::Accessory(index),
                            visual.size,
                            center,
                            visual.color,
                        )
                        .with_opacity(0.0)
                        .with_label(visual.label),
                    ),
                )
            })
            .collect();

        MenuSession {
            id,
            phase: Phase::Entering,
            anchor,
            points,
            overlay,
            backdrop,
            highlight,
            anchor_clone,
            items,
            accessories,
            guard: None,
            pending_release: None,
            hovered: None,
            selection: None,
            exits_outstanding: 0,
            notifier: SelectionNotifier::new(),
        }
    }

    fn start_entrance(&mut self, now: Duration) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let config = &self.config;

        self.scheduler.animate(
            now,
            session.highlight,
            [Mutation::Scale(config.highlight_scale)],
            Timing::new(config.highlight_grow(), config.highlight_easing()),
            None,
        );
        self.scheduler.animate(
            now,
            session.backdrop,
            [Mutation::Opacity(config.backdrop_opacity)],
            Timing::linear(config.backdrop_fade_in()),
            None,
        );

        let steps = session
            .items
            .iter()
            .zip(&session.points)
            .map(|(&node, &point)| Step {
                node,
                mutations: vec![
                    Mutation::Position(point),
                    Mutation::Scale(1.0),
                    Mutation::Opacity(1.0),
                ],
                cue: None,
            });
        self.scheduler.animate_staggered(
            now,
            steps,
            Timing::new(config.item_fly_out(), config.item_easing()),
            config.item_stagger(),
        );

        let cue = session.cue(CueKind::GuardElapsed);
        session.guard = Some(self.scheduler.replace_timer(
            session.guard,
            now,
            config.entrance_guard(),
            cue,
        ));
    }

    pub fn drag_changed(&mut self, now: Duration, point: Point) {
        let Some(session) = self.session.as_mut() else {
            log::debug!("drag without a session");
            return;
        };
        if !matches!(session.phase, Phase::Entering | Phase::Tracking) {
            log::debug!("drag ignored while {}", session.phase);
            return;
        }

        let hit = session.hit_test(point);
        if hit == session.hovered {
            return;
        }

        let config = &self.config;
        let hover = Timing::new(config.hover(), config.item_easing());
        for (index, &node) in session.items.iter().enumerate() {
            let was = session.hovered == Some(index);
            let is = hit == Some(index);
            if was != is {
                let scale = if is { config.hover_scale } else { 1.0 };
                self.scheduler
                    .animate(now, node, [Mutation::Scale(scale)], hover, None);
            }
        }

        let fade = Timing::linear(config.accessory_fade());
        for (index, accessory) in session.accessories.iter().enumerate() {
            if let Some(node) = *accessory {
                let opacity = if hit == Some(index) { 1.0 } else { 0.0 };
                self.scheduler
                    .animate(now, node, [Mutation::Opacity(opacity)], fade, None);
            }
        }

        log::trace!("hover {:?} -> {:?}", session.hovered, hit);
        session.hovered = hit;
    }

    pub fn release_ended(&mut self, now: Duration, point: Point) {
        let Some(session) = self.session.as_mut() else {
            log::debug!("release without a session");
            return;
        };

        match session.phase {
            Phase::Entering => {
                log::debug!("release during entrance, deferring exit until the guard fires");
                session.pending_release = Some(point);
            }
            Phase::Tracking => self.begin_exit(now, point),
            Phase::Exiting | Phase::Idle => log::debug!("release ignored while {}", session.phase),
        }
    }

    fn begin_exit(&mut self, now: Duration, release: Point) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let config = &self.config;

        session.selection = session.hit_test(release).and_then(|index| {
            let node = session.overlay.get(session.items[index])?.clone();
            Some(SelectedItem { index, node })
        });
        session.phase = Phase::Exiting;
        session.pending_release = None;

        let cue = session.cue(CueKind::ExitStep);
        let mut outstanding = 0;

        self.scheduler.animate(
            now,
            session.highlight,
            [Mutation::Scale(config.highlight_shrink_scale)],
            Timing::new(config.highlight_shrink(), Easing::EaseInOut),
            Some(cue),
        );
        outstanding += 1;

        for node in [session.backdrop, session.anchor_clone] {
            self.scheduler.animate(
                now,
                node,
                [Mutation::Opacity(0.0)],
                Timing::linear(config.backdrop_fade_out()),
                Some(cue),
            );
            outstanding += 1;
        }

        for node in session.accessories.iter().flatten() {
            self.scheduler.animate(
                now,
                *node,
                [Mutation::Opacity(0.0)],
                Timing::linear(config.accessory_fade()),
                Some(cue),
            );
            outstanding += 1;
        }

        let steps = session.items.iter().map(|&node| Step {
            node,
            mutations: vec![
                Mutation::Position(session.anchor),
                Mutation::Scale(config.item_start_scale),
                Mutation::Opacity(0.0),
            ],
            cue: Some(cue),
        });
        let stagger = self.scheduler.animate_staggered(
            now,
            steps,
            Timing::new(config.item_fly_in(), Easing::EaseIn),
            config.item_stagger(),
        );
        outstanding += stagger.len();

        session.exits_outstanding = outstanding;
        log::debug!(
            "session {} exiting, selection {:?}",
            session.id,
            session.selection.as_ref().map(|s| s.index)
        );
    }

    pub fn tick(&mut self, now: Duration) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        for completion in self.scheduler.tick(now, &mut session.overlay) {
            self.on_cue(now, completion.cue, completion.finished);
        }
    }

    fn on_cue(&mut self, now: Duration, cue: Cue, finished: bool) {
        let Some(session) = self.session.as_mut() else {
            log::debug!("cue for session {} after teardown", cue.session);
            return;
        };
        if session.id != cue.session {
            log::debug!("stale cue for session {}", cue.session);
            return;
        }

        match cue.kind {
            CueKind::GuardElapsed => {
                session.guard = None;
                if session.phase != Phase::Entering {
                    return;
                }
                match session.pending_release {
                    Some(release) => self.begin_exit(now, release),
                    None => {
                        session.phase = Phase::Tracking;
                        log::debug!("session {} tracking", session.id);
                    }
                }
            }
            CueKind::ExitStep => {
                if !finished {
                    log::debug!("exit transition of session {} cut short", session.id);
                }
                session.exits_outstanding = session.exits_outstanding.saturating_sub(1);
                if session.phase == Phase::Exiting && session.exits_outstanding == 0 {
                    self.teardown();
                }
            }
        }
    }

    fn teardown(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };

        session
            .notifier
            .notify(&mut self.delegate, session.selection.as_ref());

        let ids: Vec<NodeId> = session.overlay.nodes().map(|n| n.id).collect();
        for id in ids {
            session.overlay.remove(id);
        }
        if let Some(guard) = session.guard.take() {
            self.scheduler.cancel_timer(guard);
        }
        self.scheduler.clear();

        log::debug!("session {} torn down", session.id);
    }
}
