mod client;

pub use client::LighterClient;
