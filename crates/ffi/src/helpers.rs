use crate::error::{with_last_error_mut, DefaultTerraSimError, TerraSimError, TerraSimErrorCode};
use std::ffi::CString;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Set the thread-local error message and code.
pub(crate) fn set_last_error(error: &impl TerraSimError) {
    with_last_error_mut(|(cstring, code)| {
        *cstring = CString::new(error.msg()).ok();
        *code = error.code();
    });
}

/// Track an error by setting it in thread-local storage and returning its code.
#[inline]
pub(crate) fn track_error(error: &impl TerraSimError) -> TerraSimErrorCode {
    set_last_error(error);
    error.code()
}

/// Record the error of a failed result and hand back its code.
pub(crate) fn track_result<T>(
    result: Result<T, DefaultTerraSimError>,
) -> Result<T, TerraSimErrorCode> {
    result.map_err(|e| track_error(&e))
}

/// Clear the thread-local error message and code.
pub(crate) fn clear_last_error() {
    with_last_error_mut(|(cstring, code)| {
        *cstring = None;
        *code = TerraSimErrorCode::Ok;
    });
}

/// Run an FFI body, recording its error or clearing the last error on success.
pub(crate) fn handle_ffi_result_error<F>(f: F) -> TerraSimErrorCode
where
    F: FnOnce() -> Result<(), DefaultTerraSimError>,
{
    match f() {
        Ok(()) => {
            clear_last_error();
            TerraSimErrorCode::Ok
        }
        Err(e) => track_error(&e),
    }
}

/// Borrow an instance from a pointer handed out by one of the `*_new` functions.
pub(crate) fn instance_from_ptr<'a, T>(ptr: *const T) -> Result<&'a T, DefaultTerraSimError> {
    // SAFETY: non-null pointers come from `Box::into_raw` in a `*_new` function
    // and stay valid until the matching `*_destroy`.
    unsafe { ptr.as_ref() }.ok_or_else(|| DefaultTerraSimError::null_pointer("ptr"))
}

pub(crate) fn read_lock<'a, T>(
    lock: &'a RwLock<T>,
    name: &str,
) -> Result<RwLockReadGuard<'a, T>, DefaultTerraSimError> {
    lock.read()
        .map_err(|_| DefaultTerraSimError::lock_poisoned(name))
}

pub(crate) fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    name: &str,
) -> Result<RwLockWriteGuard<'a, T>, DefaultTerraSimError> {
    lock.write()
        .map_err(|_| DefaultTerraSimError::lock_poisoned(name))
}

/// Copy `src` into a caller-owned buffer of `capacity` elements.
///
/// # Safety
///
/// `out` must be null or point to at least `capacity` writable elements.
pub(crate) unsafe fn copy_to_buffer<T: Copy>(
    src: &[T],
    out: *mut T,
    capacity: usize,
    name: &str,
) -> Result<(), DefaultTerraSimError> {
    if out.is_null() {
        return Err(DefaultTerraSimError::null_pointer(name));
    }
    if capacity < src.len() {
        return Err(DefaultTerraSimError::buffer_too_small(
            name,
            src.len(),
            capacity,
        ));
    }
    // SAFETY: `out` is non-null with room for `src.len()` elements per the caller contract.
    unsafe {
        std::ptr::copy_nonoverlapping(src.as_ptr(), out, src.len());
    }
    Ok(())
}

/// Write `value` through an optional out-pointer; null is ignored.
///
/// # Safety
///
/// `out` must be null or valid for a write of `T`.
pub(crate) unsafe fn write_optional<T>(out: *mut T, value: T) {
    if !out.is_null() {
        unsafe {
            *out = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{terra_sim_get_last_error, terra_sim_get_last_error_code};
    use std::ffi::CStr;

    #[test]
    fn test_copy_checks_capacity() {
        let src = [1.0_f32, 2.0, 3.0];
        let mut out = [0.0_f32; 2];
        let err = unsafe { copy_to_buffer(&src, out.as_mut_ptr(), out.len(), "out") };
        assert_eq!(
            err.map_err(TerraSimErrorCode::from),
            Err(TerraSimErrorCode::BufferTooSmall)
        );

        let mut out = [0.0_f32; 4];
        unsafe { copy_to_buffer(&src, out.as_mut_ptr(), out.len(), "out") }.unwrap();
        assert_eq!(out, [1.0, 2.0, 3.0, 0.0]);
    }

    #[test]
    fn test_last_error_set_and_cleared() {
        let code = handle_ffi_result_error(|| Err(DefaultTerraSimError::null_pointer("x")));
        assert_eq!(code, TerraSimErrorCode::NullPointer);
        assert_eq!(terra_sim_get_last_error_code(), TerraSimErrorCode::NullPointer);
        let msg = unsafe { CStr::from_ptr(terra_sim_get_last_error()) };
        assert_eq!(msg.to_str().unwrap(), "Parameter 'x' cannot be null");

        assert_eq!(handle_ffi_result_error(|| Ok(())), TerraSimErrorCode::Ok);
        assert!(terra_sim_get_last_error().is_null());
    }
}
