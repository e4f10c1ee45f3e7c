//! The authoritative paddle simulation.
//!
//! One `Simulation` per room, owned exclusively by the room actor and
//! advanced once per tick. Nothing outside the actor mutates it;
//! readers get immutable [`Snapshot`] copies published by the actor.
//!
//! Geometry: the court is `[0, width] × [0, height]`. The left paddle
//! guards `x = 0`, the right paddle guards `x = width`, and the ball
//! reflects off the two horizontal walls. A ball that crosses a guarded
//! edge outside the paddle's extent scores a point for the other side.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::MatchConfig;

/// Which side of the court a participant defends.
///
/// Room participant order maps to sides: `players[0]` is `Left`,
/// `players[1]` is `Right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Index into `players` / `paddles` / `scores` arrays.
    pub fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// A paddle movement command from a participant.
///
/// Commands set the paddle's velocity; the simulation integrates it
/// each tick. `Up` is toward larger y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaddleCommand {
    Up,
    Down,
    Stop,
}

impl PaddleCommand {
    fn direction(self) -> f32 {
        match self {
            Self::Up => 1.0,
            Self::Down => -1.0,
            Self::Stop => 0.0,
        }
    }
}

/// An immutable copy of the simulation state at one tick.
///
/// `tick` and `elapsed` advance monotonically while the room is live;
/// a terminal room freezes its last snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Ticks simulated so far.
    pub tick: u64,
    /// Simulated time (`tick × dt`), independent of wall clock.
    pub elapsed: Duration,
    /// Ball center, `[x, y]`.
    pub ball_pos: [f32; 2],
    /// Ball velocity, units per second.
    pub ball_vel: [f32; 2],
    /// Paddle center y positions, `[left, right]`.
    pub paddles: [f32; 2],
    /// Points scored, `[left, right]`.
    pub scores: [u8; 2],
}

/// The mutable match simulation. Owned by the room actor.
pub struct Simulation {
    width: f32,
    height: f32,
    paddle_half: f32,
    paddle_speed: f32,
    serve_speed: f32,
    speedup: f32,
    snap: Snapshot,
    /// Current paddle velocity direction per side (-1, 0, +1).
    dirs: [f32; 2],
    /// Who receives the next serve (the side that last conceded).
    serve_to: Side,
    /// Serve counter; alternates the vertical serve direction.
    serves: u32,
}

impl Simulation {
    pub fn new(config: &MatchConfig) -> Self {
        let config = config.clone().validated();
        let mid_y = config.court_height / 2.0;
        let mut sim = Self {
            width: config.court_width,
            height: config.court_height,
            paddle_half: config.paddle_height / 2.0,
            paddle_speed: config.paddle_speed,
            serve_speed: config.ball_speed,
            speedup: config.ball_speedup,
            snap: Snapshot {
                tick: 0,
                elapsed: Duration::ZERO,
                ball_pos: [config.court_width / 2.0, mid_y],
                ball_vel: [0.0, 0.0],
                paddles: [mid_y, mid_y],
                scores: [0, 0],
            },
            dirs: [0.0, 0.0],
            serve_to: Side::Right,
            serves: 0,
        };
        sim.serve();
        sim
    }

    /// Applies a movement command for one side. Takes effect on the
    /// next tick.
    pub fn set_paddle(&mut self, side: Side, cmd: PaddleCommand) {
        self.dirs[side.index()] = cmd.direction();
    }

    /// Advances the simulation by one fixed timestep.
    ///
    /// Returns the side that scored during this tick, if any. Scoring
    /// resets the ball and serves toward the conceding side.
    pub fn step(&mut self, dt: Duration) -> Option<Side> {
        self.snap.tick += 1;
        self.snap.elapsed += dt;
        let dt = dt.as_secs_f32();

        // Paddles move at constant speed, clamped to the court.
        for i in 0..2 {
            let next = self.snap.paddles[i] + self.dirs[i] * self.paddle_speed * dt;
            self.snap.paddles[i] =
                next.clamp(self.paddle_half, self.height - self.paddle_half);
        }

        // Integrate ball motion.
        self.snap.ball_pos[0] += self.snap.ball_vel[0] * dt;
        self.snap.ball_pos[1] += self.snap.ball_vel[1] * dt;

        // Reflect off the horizontal walls.
        if self.snap.ball_pos[1] < 0.0 {
            self.snap.ball_pos[1] = -self.snap.ball_pos[1];
            self.snap.ball_vel[1] = -self.snap.ball_vel[1];
        } else if self.snap.ball_pos[1] > self.height {
            self.snap.ball_pos[1] = 2.0 * self.height - self.snap.ball_pos[1];
            self.snap.ball_vel[1] = -self.snap.ball_vel[1];
        }

        // Resolve the guarded edges.
        if self.snap.ball_pos[0] <= 0.0 && self.snap.ball_vel[0] < 0.0 {
            return self.resolve_edge(Side::Left);
        }
        if self.snap.ball_pos[0] >= self.width && self.snap.ball_vel[0] > 0.0 {
            return self.resolve_edge(Side::Right);
        }
        None
    }

    /// Ball reached `defender`'s edge: either the paddle returns it or
    /// the opponent scores.
    fn resolve_edge(&mut self, defender: Side) -> Option<Side> {
        let paddle_y = self.snap.paddles[defender.index()];
        let offset = self.snap.ball_pos[1] - paddle_y;

        if self.paddle_half > 0.0 && offset.abs() <= self.paddle_half {
            // Returned. Reflect, speed up, and deflect by hit offset so
            // edge hits send the ball at a steeper angle.
            let edge_x = match defender {
                Side::Left => 0.0,
                Side::Right => self.width,
            };
            self.snap.ball_pos[0] = 2.0 * edge_x - self.snap.ball_pos[0];
            let vx = -self.snap.ball_vel[0] * self.speedup;
            // Cap so rallies can't accelerate into tunneling territory.
            let cap = self.serve_speed * 3.0;
            self.snap.ball_vel[0] = vx.clamp(-cap, cap);
            self.snap.ball_vel[1] = (offset / self.paddle_half) * vx.abs() * 0.75;
            return None;
        }

        // Point for the attacker; defender conceded and receives next.
        let scorer = defender.opponent();
        self.snap.scores[scorer.index()] =
            self.snap.scores[scorer.index()].saturating_add(1);
        self.serve_to = defender;
        self.serve();
        Some(scorer)
    }

    /// Resets the ball to center and serves toward `serve_to`.
    fn serve(&mut self) {
        self.serves += 1;
        self.snap.ball_pos = [self.width / 2.0, self.height / 2.0];
        let dir_x = match self.serve_to {
            Side::Left => -1.0,
            Side::Right => 1.0,
        };
        // 3-4-5 serve angle; vertical direction alternates per serve.
        let dir_y = if self.serves % 2 == 0 { -1.0 } else { 1.0 };
        self.snap.ball_vel = [
            dir_x * self.serve_speed * 0.8,
            dir_y * self.serve_speed * 0.6,
        ];
    }

    /// `true` while every component of the snapshot is a finite number.
    /// A `false` here means the simulation is unrecoverable and the
    /// room must abort.
    pub fn is_valid(&self) -> bool {
        self.snap.ball_pos.iter().all(|v| v.is_finite())
            && self.snap.ball_vel.iter().all(|v| v.is_finite())
            && self.snap.paddles.iter().all(|v| v.is_finite())
    }

    /// Score for one side.
    pub fn score(&self, side: Side) -> u8 {
        self.snap.scores[side.index()]
    }

    /// Immutable copy of the current state.
    pub fn snapshot(&self) -> Snapshot {
        self.snap.clone()
    }
}
