//! # leap_tree
//!
//! Hand-gesture controlled photo tree.  Photos, ornaments and a particle
//! cloud form a spiral tree; hand poses scatter them into a nebula or pull
//! one photo into focus.
//!
//! ## Gesture → Stage mapping
//!
//! | Stage | Gesture | Result |
//! |---|---|---|
//! | Tree | Palm | Nebula |
//! | Nebula | Pointing | Focus |
//! | Nebula | Fist | Tree |
//! | Focus | Palm | next photo |
//! | Focus | Victory | Nebula |
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: hold number keys to fake a hand pose.
//! * `leap` — **Hardware mode**: polls a real LeapMotion controller via LeapC.
//!
//! ### Keyboard
//!
//! | Key | Action |
//! |---|---|
//! | `1`–`4` (hold) | Palm / Fist / Pointing / Victory pose (simulation) |
//! | `C` | Start or stop hand tracking |
//! | `T` `N` `F` | Jump to Tree / Nebula / Focus |
//! | `W` | Show or hide a wish |
//! | `P` | Add a batch of sample photos |
//! | `X` | Drop the next tracking frame |
//! | `Q` / `Escape` | Quit |

pub mod config;
pub mod tracking;
pub mod visualizer;
pub mod app;
pub mod tracing_setup;
