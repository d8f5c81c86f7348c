//! Interactive chat for Prat.AI.
//!
//! Runs the prompt loop: live reply rendering, slash commands, PDF context,
//! and session controls. Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;
