//! C ABI over `terra-sim-core` for external renderers.
//!
//! Instances are opaque heap pointers created by a `*_new` function and
//! released with the matching `*_destroy`. Every fallible call returns a
//! [`TerraSimErrorCode`] and records a message retrievable with
//! [`terra_sim_get_last_error`] on the calling thread.
//!
//! Mesh data is copied into caller-owned buffers: query the counts first,
//! allocate, then call the `*_copy_*` functions.

mod error;
mod helpers;
mod particles;
mod terrain;

pub use error::{terra_sim_get_last_error, terra_sim_get_last_error_code, TerraSimErrorCode};
pub use particles::*;
pub use terrain::*;
