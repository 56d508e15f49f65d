//! Environment interface and the bundled continuous mountain car task.
//!
//! The trainer only ever talks to the [`Environment`] trait; the simulator is
//! a collaborator, not part of the learning algorithm. The mountain car
//! implementation exists so the demo runs out of the box.

use ndarray::{array, Array1};
use rand::Rng;

/// A stateful episodic environment with a scalar bounded action.
pub trait Environment {
    /// Start a new episode and return the initial observation.
    fn reset(&mut self) -> Array1<f32>;

    /// Advance one step. Returns (next observation, reward, done).
    fn step(&mut self, action: f32) -> (Array1<f32>, f32, bool);

    /// Visualize the current state. Non-functional to learning; headless
    /// environments leave the default no-op.
    fn render(&mut self) {}

    fn action_low(&self) -> f32;
    fn action_high(&self) -> f32;

    fn observation_dim(&self) -> usize;

    /// Draw one observation uniformly from the observation space. Used only
    /// at startup to fit the feature pipeline.
    fn sample_observation<R: Rng>(&self, rng: &mut R) -> Array1<f32>;
}

/// Continuous mountain car: an underpowered car in a valley that must build
/// momentum to reach the flag on the right hill. Classic control dynamics
/// with a continuous throttle in [-1, 1].
pub struct MountainCarContinuous {
    position: f32,
    velocity: f32,
    min_position: f32,
    max_position: f32,
    max_speed: f32,
    goal_position: f32,
    power: f32,
}

impl MountainCarContinuous {
    pub fn new() -> Self {
        MountainCarContinuous {
            position: -0.5,
            velocity: 0.0,
            min_position: -1.2,
            max_position: 0.6,
            max_speed: 0.07,
            goal_position: 0.45,
            power: 0.0015,
        }
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    fn observation(&self) -> Array1<f32> {
        array![self.position, self.velocity]
    }
}

impl Default for MountainCarContinuous {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for MountainCarContinuous {
    fn reset(&mut self) -> Array1<f32> {
        self.position = rand::random::<f32>() * 0.2 - 0.6; // [-0.6, -0.4]
        self.velocity = 0.0;
        self.observation()
    }

    fn step(&mut self, action: f32) -> (Array1<f32>, f32, bool) {
        let throttle = action.clamp(self.action_low(), self.action_high());
        let force = throttle * self.power;

        self.velocity += force - 0.0025 * (3.0 * self.position).cos();
        self.velocity = self.velocity.clamp(-self.max_speed, self.max_speed);

        self.position += self.velocity;

        // Inelastic wall on the left
        if self.position <= self.min_position {
            self.position = self.min_position;
            self.velocity = 0.0;
        } else if self.position >= self.max_position {
            self.position = self.max_position;
        }

        let done = self.position >= self.goal_position;

        // Throttle costs fuel every step; the flag pays for it
        let mut reward = -0.1 * throttle * throttle;
        if done {
            reward += 100.0;
        }

        (self.observation(), reward, done)
    }

    fn action_low(&self) -> f32 {
        -1.0
    }

    fn action_high(&self) -> f32 {
        1.0
    }

    fn observation_dim(&self) -> usize {
        2
    }

    fn sample_observation<R: Rng>(&self, rng: &mut R) -> Array1<f32> {
        array![
            rng.gen_range(self.min_position..self.max_position),
            rng.gen_range(-self.max_speed..self.max_speed)
        ]
    }
}
