//! Navigation gate and the shell that drives it.
//!
//! [`NavigationGate`] is pure decision logic: every URL the embedded browser
//! wants to load is either allowed in place or diverted to the system
//! browser, and every hardware back press is either taken by in-view
//! history or left to the host. [`Shell`] wires the gate to the platform
//! collaborators and performs the side effects its verdicts call for.

pub mod gate;
pub mod shell;

pub use gate::NavigationGate;
pub use shell::{MountedShell, Shell, ShellState};
