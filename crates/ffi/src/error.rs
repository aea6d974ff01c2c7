use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

use terra_sim_core::SimError;

/// Common interface for FFI error types.
///
/// - `code()` - Returns the error code to be passed across FFI boundary
/// - `msg()` - Returns the error message for diagnostic purposes
pub(crate) trait TerraSimError {
    /// Returns the error code to be returned across the FFI boundary.
    fn code(&self) -> TerraSimErrorCode;

    /// Returns the human-readable error message.
    fn msg(&self) -> &str;
}

/// Default implementation of `TerraSimError` for the FFI layer.
///
/// Wraps a `TerraSimErrorCode` with a message, and converts core
/// [`SimError`]s into the matching code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DefaultTerraSimError {
    code: TerraSimErrorCode,
    msg: String,
}

impl DefaultTerraSimError {
    /// Create error for null pointer passed where non-null required.
    ///
    /// # Arguments
    /// * `param_name` - The name of the parameter that was null (e.g., `"out_instance"`, `"ptr"`)
    pub fn null_pointer(param_name: &str) -> Self {
        Self {
            code: TerraSimErrorCode::NullPointer,
            msg: format!("Parameter '{param_name}' cannot be null"),
        }
    }

    /// Create error for poisoned lock.
    ///
    /// # Arguments
    /// * `lock_name` - The name of the lock that was poisoned (e.g., `"terrain"`, `"particles"`)
    pub fn lock_poisoned(lock_name: &str) -> Self {
        Self {
            code: TerraSimErrorCode::LockPoisoned,
            msg: format!("Lock '{lock_name}' was poisoned by a panic in another thread"),
        }
    }

    /// Create error for invalid parameter.
    pub fn invalid_parameter(message: String) -> Self {
        Self {
            code: TerraSimErrorCode::InvalidParameter,
            msg: message,
        }
    }

    /// Create error for a caller buffer that cannot hold the copied data.
    ///
    /// # Arguments
    /// * `buffer_name` - The name of the output buffer (e.g., `"out_positions"`)
    /// * `required` - Number of elements needed
    /// * `capacity` - Number of elements the caller provided
    pub fn buffer_too_small(buffer_name: &str, required: usize, capacity: usize) -> Self {
        Self {
            code: TerraSimErrorCode::BufferTooSmall,
            msg: format!(
                "Buffer '{buffer_name}' holds {capacity} elements but {required} are required"
            ),
        }
    }
}

impl TerraSimError for DefaultTerraSimError {
    fn code(&self) -> TerraSimErrorCode {
        self.code
    }

    fn msg(&self) -> &str {
        &self.msg
    }
}

impl From<SimError> for DefaultTerraSimError {
    fn from(error: SimError) -> Self {
        let code = match error {
            SimError::IndexOutOfRange { .. } => TerraSimErrorCode::IndexOutOfRange,
            SimError::InvalidExtent { .. } => TerraSimErrorCode::InvalidTerrainParameters,
            SimError::MalformedBuffer { .. }
            | SimError::LengthMismatch { .. }
            | SimError::CapacityExceeded { .. }
            | SimError::InvalidParameter { .. } => TerraSimErrorCode::InvalidParameter,
        };
        Self {
            code,
            msg: error.to_string(),
        }
    }
}

/// FFI error codes returned by terrain and particle functions.
/// Follows standard C convention: 0 = success, non-zero = error.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerraSimErrorCode {
    /// Operation completed successfully.
    Ok = 0,

    /// Invalid pointer: null pointer passed where non-null required.
    NullPointer = 1,

    /// Lock poisoned: internal synchronization primitive was poisoned by a panic.
    LockPoisoned = 2,

    /// Invalid terrain parameters: the grid rectangle is empty or not finite.
    InvalidTerrainParameters = 3,

    /// Invalid parameter passed to function.
    InvalidParameter = 4,

    /// A vertex or triangle index is outside the mesh.
    IndexOutOfRange = 5,

    /// The caller-provided output buffer is too small.
    BufferTooSmall = 6,
}

impl From<DefaultTerraSimError> for TerraSimErrorCode {
    fn from(error: DefaultTerraSimError) -> Self {
        error.code
    }
}

thread_local! {
    /// Thread-local storage for the most recent FFI error (C string, error code).
    /// The CString is kept alive here so the pointer handed out stays valid.
    static LAST_ERROR: RefCell<(Option<CString>, TerraSimErrorCode)> = const { RefCell::new((None, TerraSimErrorCode::Ok)) };
}

/// Internal helper to read `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error<F, R>(f: F) -> R
where
    F: FnOnce(&(Option<CString>, TerraSimErrorCode)) -> R,
{
    LAST_ERROR.with_borrow(f)
}

/// Internal helper to mutate `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut (Option<CString>, TerraSimErrorCode)) -> R,
{
    LAST_ERROR.with_borrow_mut(f)
}

/// Retrieve the most recent FFI error message as a null-terminated C string.
///
/// Returns:
/// - A borrowed pointer to the error message if an error occurred.
/// - `null` if the last call on this thread succeeded.
///
/// # Thread Safety
/// Error messages are stored per-thread, so each thread has its own
/// independent error state.
///
/// # Lifetime
/// The returned pointer is valid until the next FFI call on this thread.
///
/// **DO NOT FREE THIS POINTER** - it is managed internally.
///
/// Example:
/// ```cpp
/// TerraSimTerrain* terrain = nullptr;
/// TerraSimErrorCode err = terra_sim_terrain_new(params, 42, &terrain);
/// if (err != Ok) {
///     const char* error = terra_sim_get_last_error();
///     if (error) {
///         printf("Terrain creation failed: %s\n", error);
///     }
/// }
/// ```
#[no_mangle]
pub extern "C" fn terra_sim_get_last_error() -> *const c_char {
    with_last_error(|(cstring, _code)| cstring.as_ref().map_or(ptr::null(), |cs| cs.as_ptr()))
}

/// Retrieve the most recent FFI error code.
///
/// Returns `TerraSimErrorCode::Ok` if the last call on this thread succeeded.
#[no_mangle]
pub extern "C" fn terra_sim_get_last_error_code() -> TerraSimErrorCode {
    with_last_error(|(_cstring, code)| *code)
}
