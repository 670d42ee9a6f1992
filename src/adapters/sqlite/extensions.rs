//! SQLite extension registration.
//!
//! The sqlite-vec extension is statically linked and must be registered
//! through `sqlite3_auto_extension()` before any connection is created;
//! after that every connection in the process loads `vec0` automatically.

use std::ffi::c_char;
use std::sync::Once;

/// Ensure the extension is only registered once
static INIT: Once = Once::new();

/// Register the sqlite-vec (`vec0`) extension with SQLite.
///
/// Safe to call any number of times; the `Once` guard makes repeat calls
/// no-ops. Panics only if SQLite itself rejects the registration, which
/// indicates an unusable process state.
pub fn register_sqlite_vec() {
    INIT.call_once(|| {
        unsafe {
            let vec_init = sqlite_vec::sqlite3_vec_init as *const ();

            let vec_init_fn: unsafe extern "C" fn(
                *mut libsqlite3_sys::sqlite3,
                *mut *const c_char,
                *const libsqlite3_sys::sqlite3_api_routines,
            ) -> i32 = std::mem::transmute(vec_init);

            let result = libsqlite3_sys::sqlite3_auto_extension(Some(vec_init_fn));

            if result != libsqlite3_sys::SQLITE_OK {
                panic!(
                    "Failed to register sqlite-vec extension: error code {}",
                    result
                );
            }

            tracing::debug!("sqlite-vec extension registered");
        }
    });
}

/// Check whether the `vec0` module answers on this pool.
pub async fn is_vec0_available(pool: &sqlx::SqlitePool) -> bool {
    sqlx::query("SELECT vec_version() as version")
        .fetch_optional(pool)
        .await
        .map(|row| row.is_some())
        .unwrap_or(false)
}
