// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Orientation composition for panoramic and stereoscopic viewers.
//!
//! Panoview turns two independent rotation sources, the device's absolute
//! attitude and the user's pan gestures, into one camera pose per frame.
//! The pose is composed on the render thread, eased smoothly between sensor
//! samples, and published lock-free for anyone else who wants to follow it.
//!
//! # Key entry points
//!
//! - [`view::PanoramaView`] - embeddable facade owning the whole pipeline
//! - [`node::OrientationNode`] - the composition root
//! - [`gesture::PanRotationController`] - clamped yaw/pitch with inertia and
//!   reset animations
//! - [`engine::FrameUpdateCoordinator`] - per-frame sequencing and sensor
//!   waits
//! - [`options::Options`] - runtime configuration (rotation limits, camera,
//!   frame timing)
//!
//! # Architecture
//!
//! Sensor samples arrive on their own thread through a
//! [`sensor::SensorFeed`]; gestures arrive on the input thread through a
//! shared [`gesture::PanHandle`]. Once per frame the coordinator samples the
//! device (blocking briefly if the sensor lags), applies device rotation,
//! then the interface correction, then the pan offset, and commits the
//! result through a triple buffer:
//!
//! ```text
//! pose = reference * device * interface * user
//! ```

pub mod engine;
pub mod error;
pub mod gesture;
pub mod interface;
pub mod node;
pub mod options;
pub mod rotation;
pub mod sensor;
pub mod util;
pub mod view;

pub use error::PanoError;
pub use options::Options;
pub use util::FrameTime;
pub use view::PanoramaView;
