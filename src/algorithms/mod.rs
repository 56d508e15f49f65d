//! Training algorithms. One lives here: the online actor-critic driver.

mod actor_critic;

pub use actor_critic::{
    ActorCritic, ActorCriticBuilder, ActorCriticConfig, EpisodeStats, Transition,
};
